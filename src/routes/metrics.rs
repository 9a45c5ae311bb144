use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthHost;
use crate::error::AppError;
use crate::metrics::{self, DEFAULT_DAILY_WINDOW_DAYS, DEFAULT_HERO_WINDOW_DAYS};
use crate::AppState;

#[derive(Deserialize)]
pub struct WindowQuery {
    days: Option<i64>,
}

fn window_days(query: &WindowQuery, default: i64) -> Result<i64, AppError> {
    let days = query.days.unwrap_or(default);
    if !(1..=365).contains(&days) {
        return Err(AppError::Validation(
            "days must be between 1 and 365".to_string(),
        ));
    }
    Ok(days)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics/hero", get(hero))
        .route("/metrics/daily", get(daily))
}

async fn hero(
    State(state): State<AppState>,
    AuthHost(_host): AuthHost,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = window_days(&query, DEFAULT_HERO_WINDOW_DAYS)?;
    let hero = metrics::compute_hero(&state.db, days, Utc::now()).await?;
    Ok(Json(hero))
}

async fn daily(
    State(state): State<AppState>,
    AuthHost(_host): AuthHost,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = window_days(&query, DEFAULT_DAILY_WINDOW_DAYS)?;
    let tables = metrics::compute_daily_tables(&state.db, days, Utc::now()).await?;
    Ok(Json(tables))
}
