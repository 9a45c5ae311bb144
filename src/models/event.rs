use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum EventKind {
    #[serde(rename = "landing_view")]
    #[sqlx(rename = "landing_view")]
    LandingView,
    #[serde(rename = "create_click")]
    #[sqlx(rename = "create_click")]
    CreateClick,
    #[serde(rename = "invite_created")]
    #[sqlx(rename = "invite_created")]
    InviteCreated,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::LandingView => write!(f, "landing_view"),
            EventKind::CreateClick => write!(f, "create_click"),
            EventKind::InviteCreated => write!(f, "invite_created"),
        }
    }
}

/// Raw funnel row: one interaction, attributed to a visitor session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionEvent {
    pub id: String,
    pub session_id: String,
    pub kind: EventKind,
    pub occurred_at: String,
}

impl SessionEvent {
    pub fn new(session_id: String, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            kind,
            occurred_at: Utc::now().to_rfc3339(),
        }
    }
}
