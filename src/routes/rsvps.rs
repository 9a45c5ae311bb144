use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::MaybeHost;
use crate::error::AppError;
use crate::identity::{self, Respondent};
use crate::ledger;
use crate::models::{Invite, RsvpState};
use crate::AppState;

#[derive(Deserialize)]
pub struct RsvpRequest {
    email: Option<String>,
    name: Option<String>,
    state: RsvpState,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/invites/{id}/rsvp", post(submit_response))
}

async fn submit_response(
    State(state): State<AppState>,
    MaybeHost(host): MaybeHost,
    Path(invite_id): Path<String>,
    Json(req): Json<RsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Session identity wins over anything in the body: account email as the
    // dedup key, profile name as the display name.
    let respondent = match host {
        Some(host) => Respondent::Host {
            email: host.email,
            name: host.name,
        },
        None => Respondent::Guest {
            email: req
                .email
                .ok_or_else(|| AppError::Validation("email is required".to_string()))?,
            name: req.name,
        },
    };
    let resolved = identity::resolve(respondent)?;

    let invite: Option<Invite> = sqlx::query_as("SELECT * FROM invites WHERE id = ?")
        .bind(&invite_id)
        .fetch_optional(&state.db)
        .await?;
    let Some(invite) = invite else {
        return Err(AppError::NotFound);
    };

    let now = Utc::now();
    let ends_at: DateTime<Utc> = invite.ends_at.parse().unwrap_or(now);
    if now > ends_at {
        return Err(AppError::Expired);
    }

    let rsvp = ledger::record_response(
        &state.db,
        &invite.id,
        &resolved.email,
        resolved.display_name.as_deref(),
        req.state,
        now,
    )
    .await?;

    // Membership bookkeeping runs after the commit; it may partially fail
    // and only ever logs.
    if resolved.is_guest {
        let db = state.db.clone();
        let invite_id = invite.id.clone();
        let email = resolved.email.clone();
        let name = resolved.display_name.clone();
        tokio::spawn(async move {
            identity::reconcile_circles(&db, &invite_id, &email, name).await;
        });
    }

    // Host notification gets the full ledger snapshot, read fresh from the
    // store; dispatch failure never unwinds the recorded RSVP.
    let db = state.db.clone();
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        match ledger::fetch_roster(&db, &invite.id).await {
            Ok(roster) => {
                if let Err(e) = notifier.roster_changed(&invite, &roster).await {
                    tracing::warn!("roster notification failed for invite {}: {e}", invite.id);
                }
            }
            Err(e) => tracing::warn!("roster snapshot failed for invite {}: {e}", invite.id),
        }
    });

    Ok(Json(rsvp))
}
