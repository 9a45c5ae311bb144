use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A time-bounded announcement published by a host. Never mutated after
/// creation; deleting it cascades its RSVPs and circle links.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invite {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub starts_at: String,
    pub ends_at: String,
    pub created_at: String,
}

impl Invite {
    pub fn new(
        creator_id: String,
        title: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            creator_id,
            title,
            starts_at: starts_at.to_rfc3339(),
            ends_at: ends_at.to_rfc3339(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
