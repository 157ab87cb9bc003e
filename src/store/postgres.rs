use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::config;

use super::models::{Device, Project, User};
use super::{Store, StoreError};

/// Postgres-backed document store. Projects carry their device list as a
/// UUID array so push/pull are single atomic UPDATEs; device attributes
/// live in a JSONB column.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let db_config = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
            .connect(database_url)
            .await?;

        info!("Connected database pool ({} connections max)", db_config.max_connections);
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const PROJECT_COLUMNS: &str = "id, user_id, devices, created_at";
const DEVICE_COLUMNS: &str = "id, project_id, attributes, created_at";

fn device_from_row(row: &PgRow) -> Result<Device, StoreError> {
    let attributes: Value = row.try_get("attributes")?;
    let attributes = match attributes {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(StoreError::Malformed(format!(
                "device attributes is not an object: {}",
                other
            )))
        }
    };

    Ok(Device {
        id: row.try_get("id")?,
        project: row.try_get("project_id")?,
        created_at: row.try_get("created_at")?,
        attributes,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO projects (id, user_id, devices, created_at) VALUES ($1, $2, $3, $4)")
            .bind(project.id)
            .bind(project.user)
            .bind(&project.devices)
            .bind(project.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        sqlx::query("UPDATE projects SET devices = $2 WHERE id = $1")
            .bind(project.id)
            .bind(&project.devices)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn find_project_by_user(&self, user: Uuid) -> Result<Option<Project>, StoreError> {
        // One project per user by convention; take the oldest if that is
        // ever violated.
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY created_at LIMIT 1",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(user)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects ORDER BY created_at, id", PROJECT_COLUMNS);
        let projects = sqlx::query_as::<_, Project>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push_device(
        &self,
        project: Uuid,
        device: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        let sql = format!(
            "UPDATE projects SET devices = array_append(devices, $2) WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(project)
            .bind(device)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn pull_device(
        &self,
        project: Uuid,
        device: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        let sql = format!(
            "UPDATE projects SET devices = array_remove(devices, $2) WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(project)
            .bind(device)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn insert_device(&self, device: &Device) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO devices (id, project_id, attributes, created_at) VALUES ($1, $2, $3, $4)")
            .bind(device.id)
            .bind(device.project)
            .bind(Value::Object(device.attributes.clone()))
            .bind(device.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_devices(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!("SELECT {} FROM devices WHERE id = ANY($1)", DEVICE_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(device_from_row).collect()
    }

    async fn delete_device(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        let sql = format!("DELETE FROM devices WHERE id = $1 RETURNING {}", DEVICE_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(device_from_row).transpose()
    }

    async fn delete_devices_by_project(&self, project: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM devices WHERE project_id = $1")
            .bind(project)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
