pub mod device;
pub mod project;
pub mod user;

pub use device::Device;
pub use project::{Project, ProjectExpanded};
pub use user::User;
