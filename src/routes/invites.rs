use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::auth::AuthHost;
use crate::error::AppError;
use crate::ledger::{self, RsvpCounts};
use crate::models::{EventKind, Invite, SessionEvent};
use crate::routes::events::visitor_id;
use crate::timewindow;
use crate::window::{self, InviteStatus};
use crate::AppState;

#[derive(Deserialize)]
pub struct InviteRequest {
    title: String,
    /// Free-text window, e.g. "for 2h" or an explicit RFC3339 range.
    window: String,
    #[serde(default)]
    circle_ids: Vec<String>,
}

#[derive(Serialize)]
struct InviteView {
    #[serde(flatten)]
    invite: Invite,
    status: InviteStatus,
    counts: RsvpCounts,
}

fn validate_invite_request(req: &InviteRequest) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if req.title.len() > 200 {
        return Err(AppError::Validation(
            "title must be under 200 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invites", post(create_invite))
        .route("/invites/{id}", get(show_invite))
        .route("/invites/{id}", delete(delete_invite))
        .route("/invites/{id}/roster", get(roster))
}

async fn create_invite(
    State(state): State<AppState>,
    AuthHost(host): AuthHost,
    session: Session,
    Json(req): Json<InviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_invite_request(&req)?;

    // An unparseable window rejects creation; never default to some window.
    let window = timewindow::parse_window(&req.window, Utc::now())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    for circle_id in &req.circle_ids {
        let owned: Option<(String,)> =
            sqlx::query_as("SELECT id FROM circles WHERE id = ? AND owner_id = ?")
                .bind(circle_id)
                .bind(&host.id)
                .fetch_optional(&state.db)
                .await?;
        if owned.is_none() {
            return Err(AppError::Validation(format!("unknown circle: {circle_id}")));
        }
    }

    let invite = Invite::new(
        host.id,
        req.title.trim().to_string(),
        window.starts_at,
        window.ends_at,
    );

    sqlx::query(
        "INSERT INTO invites (id, creator_id, title, starts_at, ends_at, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&invite.id)
    .bind(&invite.creator_id)
    .bind(&invite.title)
    .bind(&invite.starts_at)
    .bind(&invite.ends_at)
    .bind(&invite.created_at)
    .execute(&state.db)
    .await?;

    for circle_id in &req.circle_ids {
        sqlx::query("INSERT OR IGNORE INTO invite_circles (invite_id, circle_id) VALUES (?, ?)")
            .bind(&invite.id)
            .bind(circle_id)
            .execute(&state.db)
            .await?;
    }

    let event = SessionEvent::new(visitor_id(&session).await?, EventKind::InviteCreated);
    sqlx::query("INSERT INTO session_events (id, session_id, kind, occurred_at) VALUES (?, ?, ?, ?)")
        .bind(&event.id)
        .bind(&event.session_id)
        .bind(event.kind)
        .bind(&event.occurred_at)
        .execute(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(invite)))
}

async fn show_invite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invite: Option<Invite> = sqlx::query_as("SELECT * FROM invites WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let Some(invite) = invite else {
        return Err(AppError::NotFound);
    };

    let counts = ledger::state_counts(&state.db, &invite.id).await?;
    let first_response_at = ledger::first_response_at(&state.db, &invite.id)
        .await?
        .and_then(|t| t.parse::<DateTime<Utc>>().ok());

    let now = Utc::now();
    let ends_at: DateTime<Utc> = invite.ends_at.parse().unwrap_or(now);
    let status = window::classify(ends_at, first_response_at, now);

    Ok(Json(InviteView { invite, status, counts }))
}

async fn roster(
    State(state): State<AppState>,
    AuthHost(host): AuthHost,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invite: Option<Invite> = sqlx::query_as("SELECT * FROM invites WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let Some(invite) = invite else {
        return Err(AppError::NotFound);
    };
    if invite.creator_id != host.id {
        return Err(AppError::Forbidden);
    }

    let roster = ledger::fetch_roster(&state.db, &invite.id).await?;
    Ok(Json(roster))
}

async fn delete_invite(
    State(state): State<AppState>,
    AuthHost(host): AuthHost,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invite: Option<Invite> = sqlx::query_as("SELECT * FROM invites WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let Some(invite) = invite else {
        return Err(AppError::NotFound);
    };
    if invite.creator_id != host.id {
        return Err(AppError::Forbidden);
    }

    // RSVPs and circle links go with it via FK cascade.
    sqlx::query("DELETE FROM invites WHERE id = ?")
        .bind(&invite.id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
