pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use models::{Device, Project, User};

/// Errors surfaced by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Query/update seam over the document store. Implementations are shared
/// across request handlers; all mutation safety is their concern.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;
    /// Overwrites the stored device list with the in-memory one.
    async fn save_project(&self, project: &Project) -> Result<(), StoreError>;
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn find_project_by_user(&self, user: Uuid) -> Result<Option<Project>, StoreError>;
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError>;

    /// Atomic append of `device` to the project's device list. Returns the
    /// post-update project, or None when the project does not exist.
    async fn push_device(&self, project: Uuid, device: Uuid)
        -> Result<Option<Project>, StoreError>;
    /// Atomic removal of every matching entry from the project's device
    /// list. Returns the post-update project, or None when the project does
    /// not exist.
    async fn pull_device(&self, project: Uuid, device: Uuid)
        -> Result<Option<Project>, StoreError>;

    async fn insert_device(&self, device: &Device) -> Result<(), StoreError>;
    /// Fetch devices by id; ids that do not resolve are simply absent from
    /// the result.
    async fn find_devices(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError>;
    /// Delete a device by id, returning the deleted document. Deleting an
    /// absent device is a no-op returning None.
    async fn delete_device(&self, id: Uuid) -> Result<Option<Device>, StoreError>;
    /// Delete every device back-referencing the given project. Returns the
    /// number of documents removed.
    async fn delete_devices_by_project(&self, project: Uuid) -> Result<u64, StoreError>;
}
