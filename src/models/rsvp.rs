use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum RsvpState {
    #[serde(rename = "join")]
    #[sqlx(rename = "join")]
    Join,
    #[serde(rename = "maybe")]
    #[sqlx(rename = "maybe")]
    Maybe,
    #[serde(rename = "decline")]
    #[sqlx(rename = "decline")]
    Decline,
}

impl std::fmt::Display for RsvpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RsvpState::Join => write!(f, "join"),
            RsvpState::Maybe => write!(f, "maybe"),
            RsvpState::Decline => write!(f, "decline"),
        }
    }
}

/// One logical response per (invite, canonical email). `created_at` is the
/// first-ever submission time and never moves; `state`, `display_name` and
/// `updated_at` track the most recent submission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rsvp {
    pub invite_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub state: RsvpState,
    pub created_at: String,
    pub updated_at: String,
}
