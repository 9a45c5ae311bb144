use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::AuthHost;
use crate::error::AppError;
use crate::models::{Circle, CircleMember};
use crate::AppState;

/// Circle with member count for queries that join with circle_members
#[derive(FromRow, Serialize)]
struct CircleView {
    id: String,
    name: String,
    member_count: i64,
}

#[derive(Serialize)]
struct CircleDetail {
    #[serde(flatten)]
    circle: Circle,
    members: Vec<CircleMember>,
}

#[derive(Deserialize)]
pub struct CircleRequest {
    name: String,
}

fn validate_circle_request(req: &CircleRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if req.name.len() > 100 {
        return Err(AppError::Validation(
            "name must be under 100 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/circles", get(list_circles))
        .route("/circles", post(create_circle))
        .route("/circles/{id}", get(show_circle))
}

async fn list_circles(
    State(state): State<AppState>,
    AuthHost(host): AuthHost,
) -> Result<impl IntoResponse, AppError> {
    let circles: Vec<CircleView> = sqlx::query_as(
        r#"
        SELECT c.id, c.name, COUNT(cm.email) as member_count
        FROM circles c
        LEFT JOIN circle_members cm ON cm.circle_id = c.id
        WHERE c.owner_id = ?
        GROUP BY c.id
        ORDER BY c.name
        "#,
    )
    .bind(&host.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(circles))
}

async fn create_circle(
    State(state): State<AppState>,
    AuthHost(host): AuthHost,
    Json(req): Json<CircleRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_circle_request(&req)?;

    let circle = Circle::new(host.id, req.name.trim().to_string());

    sqlx::query(
        "INSERT INTO circles (id, owner_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&circle.id)
    .bind(&circle.owner_id)
    .bind(&circle.name)
    .bind(&circle.created_at)
    .bind(&circle.updated_at)
    .execute(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(circle)))
}

async fn show_circle(
    State(state): State<AppState>,
    AuthHost(host): AuthHost,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let circle: Option<Circle> = sqlx::query_as("SELECT * FROM circles WHERE id = ? AND owner_id = ?")
        .bind(&id)
        .bind(&host.id)
        .fetch_optional(&state.db)
        .await?;

    let Some(circle) = circle else {
        return Err(AppError::NotFound);
    };

    let members: Vec<CircleMember> = sqlx::query_as(
        "SELECT * FROM circle_members WHERE circle_id = ? ORDER BY joined_at, email",
    )
    .bind(&circle.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(CircleDetail { circle, members }))
}
