use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::{Rsvp, RsvpState};

/// Record a response for (invite, canonical email) in a single atomic upsert.
/// First submission inserts with created = updated = now; later submissions
/// overwrite state and updated, keep created, and only replace the display
/// name when the incoming one is non-empty. Returns the stored row, read
/// back from the store.
pub async fn record_response(
    db: &SqlitePool,
    invite_id: &str,
    email: &str,
    display_name: Option<&str>,
    state: RsvpState,
    now: DateTime<Utc>,
) -> sqlx::Result<Rsvp> {
    let now = now.to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO rsvps (invite_id, email, display_name, state, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(invite_id, email) DO UPDATE SET
            state = excluded.state,
            display_name = CASE
                WHEN excluded.display_name IS NOT NULL AND excluded.display_name <> ''
                THEN excluded.display_name
                ELSE rsvps.display_name
            END,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(invite_id)
    .bind(email)
    .bind(display_name)
    .bind(state)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM rsvps WHERE invite_id = ? AND email = ?")
        .bind(invite_id)
        .bind(email)
        .fetch_one(db)
        .await
}

/// Full ledger snapshot for an invite, earliest first response first.
pub async fn fetch_roster(db: &SqlitePool, invite_id: &str) -> sqlx::Result<Vec<Rsvp>> {
    sqlx::query_as("SELECT * FROM rsvps WHERE invite_id = ? ORDER BY created_at, email")
        .bind(invite_id)
        .fetch_all(db)
        .await
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RsvpCounts {
    pub total: i64,
    pub join: i64,
    pub maybe: i64,
    pub decline: i64,
}

/// Distinct-respondent counts per state. One row per respondent means a
/// maybe-then-join respondent counts once, under join.
pub async fn state_counts(db: &SqlitePool, invite_id: &str) -> sqlx::Result<RsvpCounts> {
    let rows: Vec<(RsvpState, i64)> =
        sqlx::query_as("SELECT state, COUNT(*) FROM rsvps WHERE invite_id = ? GROUP BY state")
            .bind(invite_id)
            .fetch_all(db)
            .await?;

    let mut counts = RsvpCounts::default();
    for (state, count) in rows {
        counts.total += count;
        match state {
            RsvpState::Join => counts.join = count,
            RsvpState::Maybe => counts.maybe = count,
            RsvpState::Decline => counts.decline = count,
        }
    }
    Ok(counts)
}

/// Timestamp of the earliest response, if any.
pub async fn first_response_at(db: &SqlitePool, invite_id: &str) -> sqlx::Result<Option<String>> {
    let row: (Option<String>,) =
        sqlx::query_as("SELECT MIN(created_at) FROM rsvps WHERE invite_id = ?")
            .bind(invite_id)
            .fetch_one(db)
            .await?;
    Ok(row.0)
}
