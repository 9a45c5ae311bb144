use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Circle {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Circle {
    pub fn new(owner_id: String, name: String) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            name,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Membership keyed on (circle, email). Created lazily when a guest RSVPs
/// to an invite targeting the circle; never deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CircleMember {
    pub circle_id: String,
    pub email: String,
    pub name: Option<String>,
    pub joined_at: String,
}

impl CircleMember {
    pub fn new(circle_id: String, email: String, name: Option<String>) -> Self {
        Self {
            circle_id,
            email,
            name,
            joined_at: Utc::now().to_rfc3339(),
        }
    }
}
