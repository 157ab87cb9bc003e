use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Device, Project, User};
use super::{Store, StoreError};

/// In-memory store for isolated testing and local experiments. A single
/// RwLock over all collections keeps every operation atomic with respect
/// to concurrent requests, which is stricter than a real store but fine
/// for a fake.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    devices: HashMap<Uuid, Device>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record and return it. Test seam; the API itself never
    /// creates users.
    pub async fn seed_user(&self, name: &str, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        user
    }

    pub async fn project_count(&self) -> usize {
        self.inner.read().await.projects.len()
    }

    pub async fn device_count(&self) -> usize {
        self.inner.read().await.devices.len()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn find_project_by_user(&self, user: Uuid) -> Result<Option<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&Project> =
            inner.projects.values().filter(|p| p.user == user).collect();
        owned.sort_by_key(|p| (p.created_at, p.id));
        Ok(owned.first().map(|p| (*p).clone()))
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by_key(|p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.write().await.projects.remove(&id);
        Ok(())
    }

    async fn push_device(
        &self,
        project: Uuid,
        device: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.projects.get_mut(&project).map(|p| {
            p.devices.push(device);
            p.clone()
        }))
    }

    async fn pull_device(
        &self,
        project: Uuid,
        device: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.projects.get_mut(&project).map(|p| {
            p.devices.retain(|id| *id != device);
            p.clone()
        }))
    }

    async fn insert_device(&self, device: &Device) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .devices
            .insert(device.id, device.clone());
        Ok(())
    }

    async fn find_devices(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.devices.get(id).cloned())
            .collect())
    }

    async fn delete_device(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        Ok(self.inner.write().await.devices.remove(&id))
    }

    async fn delete_devices_by_project(&self, project: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.devices.len();
        inner.devices.retain(|_, d| d.project != project);
        Ok((before - inner.devices.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[tokio::test]
    async fn push_on_missing_project_returns_none() {
        let store = MemStore::new();
        let result = store.push_device(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn pull_removes_every_matching_entry() {
        let store = MemStore::new();
        let mut project = Project::new(Uuid::new_v4());
        let device = Uuid::new_v4();
        let other = Uuid::new_v4();
        project.devices = vec![device, other, device];
        store.insert_project(&project).await.unwrap();

        let updated = store.pull_device(project.id, device).await.unwrap().unwrap();
        assert_eq!(updated.devices, vec![other]);
    }

    #[tokio::test]
    async fn delete_device_is_idempotent() {
        let store = MemStore::new();
        let device = Device::new(Uuid::new_v4(), Map::new());
        store.insert_device(&device).await.unwrap();

        assert!(store.delete_device(device.id).await.unwrap().is_some());
        assert!(store.delete_device(device.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_by_project_counts_removed_documents() {
        let store = MemStore::new();
        let project = Uuid::new_v4();
        for _ in 0..3 {
            store
                .insert_device(&Device::new(project, Map::new()))
                .await
                .unwrap();
        }
        store
            .insert_device(&Device::new(Uuid::new_v4(), Map::new()))
            .await
            .unwrap();

        assert_eq!(store.delete_devices_by_project(project).await.unwrap(), 3);
        assert_eq!(store.device_count().await, 1);
    }
}
