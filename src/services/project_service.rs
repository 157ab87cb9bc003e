use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::auth::OwnerClaim;
use crate::store::models::{Device, Project, ProjectExpanded};
use crate::store::{Store, StoreError};

/// Service failures carry the fixed client-facing message as their
/// Display form; the wrapped store error is for logs only.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Path user id does not match the authenticated caller. Deliberately
    /// the same message whether the target exists or not.
    #[error("Invalid user ID")]
    InvalidUser,

    #[error("Error loading projects")]
    ListFailed(#[source] StoreError),

    #[error("Error loading project")]
    LoadFailed(#[source] StoreError),

    #[error("Error creating new project")]
    CreateFailed(#[source] StoreError),

    #[error("Error updating project")]
    UpdateFailed(#[source] StoreError),

    #[error("Error removing device from project")]
    RemoveFailed(#[source] StoreError),

    #[error("Error deleting device")]
    DeleteFailed(#[source] StoreError),
}

/// Owns the lifecycle of the project aggregate: the project document plus
/// the device documents its list references.
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every project with `user` and `devices` expanded. No filtering, no
    /// pagination.
    pub async fn list_all(&self) -> Result<Vec<ProjectExpanded>, ProjectError> {
        let projects = self
            .store
            .list_projects()
            .await
            .map_err(ProjectError::ListFailed)?;

        let mut expanded = Vec::with_capacity(projects.len());
        for project in projects {
            expanded.push(self.expand(project).await.map_err(ProjectError::ListFailed)?);
        }
        Ok(expanded)
    }

    /// The single project owned by `target`, expanded, or None when the
    /// user owns no project.
    pub async fn get_by_user(
        &self,
        claim: &OwnerClaim,
        target: Uuid,
    ) -> Result<Option<ProjectExpanded>, ProjectError> {
        if !claim.allows(target) {
            return Err(ProjectError::InvalidUser);
        }

        let Some(project) = self
            .store
            .find_project_by_user(target)
            .await
            .map_err(ProjectError::LoadFailed)?
        else {
            return Ok(None);
        };

        Ok(Some(
            self.expand(project).await.map_err(ProjectError::LoadFailed)?,
        ))
    }

    /// Create a project owned by `target` with one device per payload entry.
    /// Device inserts fan out concurrently; the project is persisted once
    /// after the join. Failures are compensated (devices and the fresh
    /// project row deleted) before the error is returned.
    pub async fn create(
        &self,
        claim: &OwnerClaim,
        target: Uuid,
        payloads: Vec<Map<String, Value>>,
    ) -> Result<Project, ProjectError> {
        if !claim.allows(target) {
            return Err(ProjectError::InvalidUser);
        }

        let mut project = Project::new(target);
        self.store
            .insert_project(&project)
            .await
            .map_err(ProjectError::CreateFailed)?;

        match self.create_devices(project.id, payloads).await {
            Ok(ids) => project.devices = ids,
            Err(err) => {
                self.compensate_project(project.id).await;
                return Err(ProjectError::CreateFailed(err));
            }
        }

        if let Err(err) = self.store.save_project(&project).await {
            self.compensate_devices(&project.devices).await;
            self.compensate_project(project.id).await;
            return Err(ProjectError::CreateFailed(err));
        }

        Ok(project)
    }

    /// Replace the project's devices wholesale: delete every device
    /// back-referencing the project, then create the new set as in
    /// `create`. Only the path user id is checked; the loaded record's
    /// owner is not re-verified (legacy contract).
    pub async fn replace_devices(
        &self,
        claim: &OwnerClaim,
        project_id: Uuid,
        target: Uuid,
        payloads: Vec<Map<String, Value>>,
    ) -> Result<Project, ProjectError> {
        if !claim.allows(target) {
            return Err(ProjectError::InvalidUser);
        }

        let mut project = self
            .store
            .find_project(project_id)
            .await
            .map_err(ProjectError::UpdateFailed)?
            .ok_or_else(|| {
                ProjectError::UpdateFailed(StoreError::NotFound(format!(
                    "project {}",
                    project_id
                )))
            })?;

        project.devices.clear();
        self.store
            .delete_devices_by_project(project.id)
            .await
            .map_err(ProjectError::UpdateFailed)?;

        match self.create_devices(project.id, payloads).await {
            Ok(ids) => project.devices = ids,
            Err(err) => {
                // The old devices are already gone and cannot be restored;
                // persist the emptied list so the stored aggregate stays
                // internally consistent.
                if let Err(save_err) = self.store.save_project(&project).await {
                    warn!(
                        "project {} retains a stale device list after failed replace: {}",
                        project.id, save_err
                    );
                }
                return Err(ProjectError::UpdateFailed(err));
            }
        }

        if let Err(err) = self.store.save_project(&project).await {
            self.compensate_devices(&project.devices).await;
            warn!(
                "project {} retains a stale device list after failed replace: {}",
                project.id, err
            );
            return Err(ProjectError::UpdateFailed(err));
        }

        Ok(project)
    }

    /// Append an existing device id to the project's list (plain array
    /// append; duplicates are allowed) and return the updated project.
    pub async fn append_device(
        &self,
        claim: &OwnerClaim,
        project_id: Uuid,
        target: Uuid,
        device_id: Uuid,
    ) -> Result<Project, ProjectError> {
        if !claim.allows(target) {
            return Err(ProjectError::InvalidUser);
        }

        self.store
            .push_device(project_id, device_id)
            .await
            .map_err(ProjectError::UpdateFailed)?
            .ok_or_else(|| {
                ProjectError::UpdateFailed(StoreError::NotFound(format!(
                    "project {}",
                    project_id
                )))
            })
    }

    /// Remove every matching entry from the project's device list. The
    /// device document itself is left in place.
    pub async fn remove_device(
        &self,
        claim: &OwnerClaim,
        device_id: Uuid,
        project_id: Uuid,
        target: Uuid,
    ) -> Result<Project, ProjectError> {
        if !claim.allows(target) {
            return Err(ProjectError::InvalidUser);
        }

        self.store
            .pull_device(project_id, device_id)
            .await
            .map_err(ProjectError::RemoveFailed)?
            .ok_or_else(|| {
                ProjectError::RemoveFailed(StoreError::NotFound(format!(
                    "project {}",
                    project_id
                )))
            })
    }

    /// Delete the device document by id, returning it, or None when it did
    /// not exist (idempotent). The owning project's device list is
    /// intentionally left untouched; expansion skips ids that no longer
    /// resolve.
    pub async fn delete_device(
        &self,
        claim: &OwnerClaim,
        device_id: Uuid,
        target: Uuid,
    ) -> Result<Option<Device>, ProjectError> {
        if !claim.allows(target) {
            return Err(ProjectError::InvalidUser);
        }

        self.store
            .delete_device(device_id)
            .await
            .map_err(ProjectError::DeleteFailed)
    }

    /// Fan out one insert per payload entry and join before returning. On any
    /// failure the inserts that committed are compensated with best-effort
    /// deletes and the first error is returned.
    async fn create_devices(
        &self,
        project_id: Uuid,
        payloads: Vec<Map<String, Value>>,
    ) -> Result<Vec<Uuid>, StoreError> {
        let inserts = payloads.into_iter().map(|attributes| {
            let device = Device::new(project_id, attributes);
            async move {
                self.store
                    .insert_device(&device)
                    .await
                    .map(|_| device.id)
            }
        });
        let results = join_all(inserts).await;

        let mut ids = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(id) => ids.push(id),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            self.compensate_devices(&ids).await;
            return Err(err);
        }
        Ok(ids)
    }

    async fn compensate_devices(&self, ids: &[Uuid]) {
        for id in ids {
            if let Err(err) = self.store.delete_device(*id).await {
                warn!("failed to compensate device {}: {}", id, err);
            }
        }
    }

    async fn compensate_project(&self, id: Uuid) {
        if let Err(err) = self.store.delete_project(id).await {
            warn!("failed to compensate project {}: {}", id, err);
        }
    }

    /// Materialize the `user` and `devices` relations. List order is
    /// authoritative; ids that no longer resolve are skipped.
    async fn expand(&self, project: Project) -> Result<ProjectExpanded, StoreError> {
        let user = self.store.find_user(project.user).await?;
        let fetched = self.store.find_devices(&project.devices).await?;

        let mut by_id: HashMap<Uuid, Device> =
            fetched.into_iter().map(|d| (d.id, d)).collect();
        let devices = project
            .devices
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        Ok(ProjectExpanded {
            id: project.id,
            user,
            devices,
            created_at: project.created_at,
        })
    }
}
