pub mod auth;
pub mod cli;
pub mod db;
pub mod error;
pub mod funnel;
pub mod identity;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod routes;
pub mod timewindow;
pub mod window;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use time::Duration;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use notify::SharedNotifier;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notifier: SharedNotifier,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// This function sets up the session store (and migrates its table), then
/// assembles all route modules, middleware, and state. The notifier handle is
/// injected here so nothing in the app reaches for process-wide singletons.
pub async fn build_app(pool: SqlitePool, notifier: SharedNotifier, secure_cookies: bool) -> Router {
    let session_store = SqliteStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .expect("Failed to migrate session store");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(30)))
        .with_secure(secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax);

    let state = AppState {
        db: pool,
        notifier,
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::events::router())
        .merge(routes::invites::router())
        .merge(routes::rsvps::router())
        .merge(routes::circles::router())
        .merge(routes::metrics::router())
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
