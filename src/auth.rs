use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::Host;

const HOST_KEY: &str = "host";

/// Extractor for routes that require a signed-in host.
pub struct AuthHost(pub Host);

impl<S> FromRequestParts<S> for AuthHost
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection)?;

        let host: Option<Host> = session.get(HOST_KEY).await.ok().flatten();

        host.map(AuthHost).ok_or(AuthRejection)
    }
}

/// Extractor for routes open to both guests and signed-in hosts.
pub struct MaybeHost(pub Option<Host>);

impl<S> FromRequestParts<S> for MaybeHost
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection)?;

        let host: Option<Host> = session.get(HOST_KEY).await.ok().flatten();

        Ok(MaybeHost(host))
    }
}

pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "authentication required" })),
        )
            .into_response()
    }
}

pub async fn login_host(session: &Session, host: Host) -> Result<(), tower_sessions::session::Error> {
    session.insert(HOST_KEY, host).await
}

pub async fn logout_host(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
