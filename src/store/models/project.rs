use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Device, User};

/// Aggregate root owned by a user. `devices` is a denormalized forward
/// list of device references, kept in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    #[sqlx(rename = "user_id")]
    pub user: Uuid,
    pub devices: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            devices: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Project with its relations materialized for read responses: the `user`
/// reference replaced by the full user record and each device reference
/// replaced by the device document.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectExpanded {
    pub id: Uuid,
    pub user: Option<User>,
    pub devices: Vec<Device>,
    pub created_at: DateTime<Utc>,
}
