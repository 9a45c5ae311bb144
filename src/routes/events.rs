use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{EventKind, SessionEvent};
use crate::AppState;

const VISITOR_KEY: &str = "visitor_id";

/// Stable per-session visitor id; distinct-session funnel counts key on it.
pub async fn visitor_id(session: &Session) -> Result<String, AppError> {
    if let Some(id) = session.get::<String>(VISITOR_KEY).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(VISITOR_KEY, id.clone()).await?;
    Ok(id)
}

#[derive(Deserialize)]
pub struct EventRequest {
    kind: EventKind,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", post(record_event))
}

async fn record_event(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    // invite_created rows are emitted when an invite is actually created.
    if req.kind == EventKind::InviteCreated {
        return Err(AppError::Validation(
            "invite_created events are recorded internally".to_string(),
        ));
    }

    let event = SessionEvent::new(visitor_id(&session).await?, req.kind);
    sqlx::query("INSERT INTO session_events (id, session_id, kind, occurred_at) VALUES (?, ?, ?, ?)")
        .bind(&event.id)
        .bind(&event.session_id)
        .bind(event.kind)
        .bind(&event.occurred_at)
        .execute(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}
