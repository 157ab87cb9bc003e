pub mod append;
pub mod create;
pub mod destroy;
pub mod list;
pub mod remove;
pub mod show;
pub mod update;

// Re-export handler functions for use in routing
pub use append::append;
pub use create::create;
pub use destroy::destroy as destroy_device;
pub use list::list;
pub use remove::remove as remove_device;
pub use show::show;
pub use update::update;

use uuid::Uuid;

use crate::error::ApiError;

/// A malformed user id can never match the caller, so it surfaces the same
/// fail-closed message as a mismatch.
pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid user ID"))
}

/// Malformed project/device ids surface the same static message as the
/// operation they would have failed.
pub(crate) fn parse_id(raw: &str, context: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(context))
}
