use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::auth::{login_host, logout_host};
use crate::error::AppError;
use crate::models::Host;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    access_code: String,
}

/// Signed-in host as exposed to the client; the access code stays private.
#[derive(Serialize)]
struct SessionHost {
    id: String,
    name: String,
    email: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let host: Option<Host> = sqlx::query_as("SELECT * FROM hosts WHERE access_code = ?")
        .bind(&req.access_code)
        .fetch_optional(&state.db)
        .await?;

    match host {
        Some(host) => {
            let view = SessionHost {
                id: host.id.clone(),
                name: host.name.clone(),
                email: host.email.clone(),
            };
            login_host(&session, host).await?;
            Ok(Json(view).into_response())
        }
        None => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid access code" })),
        )
            .into_response()),
    }
}

async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    logout_host(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
