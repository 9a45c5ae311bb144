use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

use gather::notify::LogNotifier;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = gather::build_app(pool.clone(), Arc::new(LogNotifier), false).await;

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Create a host in the database and return (host_id, access_code).
    pub async fn create_host(&self, name: &str, email: &str) -> (String, String) {
        let id = uuid::Uuid::new_v4().to_string();
        let access_code = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO hosts (id, name, email, access_code, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(&access_code)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .expect("Failed to create test host");

        (id, access_code)
    }

    /// Log in as the given host and return the session cookie string.
    pub async fn login(&self, access_code: &str) -> String {
        let resp = self
            .post_json(
                "/login",
                serde_json::json!({ "access_code": access_code }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        resp.headers()
            .get("set-cookie")
            .expect("Login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST request with a JSON body and an optional session cookie.
    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// Send a DELETE request with an optional session cookie.
    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("DELETE");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Insert an invite row directly, with full control over its timestamps.
    pub async fn insert_invite(
        &self,
        creator_id: &str,
        title: &str,
        starts_at: &str,
        ends_at: &str,
        created_at: &str,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO invites (id, creator_id, title, starts_at, ends_at, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(creator_id)
        .bind(title)
        .bind(starts_at)
        .bind(ends_at)
        .bind(created_at)
        .execute(&self.db)
        .await
        .expect("Failed to insert test invite");
        id
    }

    /// Insert a ledger row directly, with full control over its timestamps.
    pub async fn insert_rsvp(&self, invite_id: &str, email: &str, state: &str, created_at: &str) {
        sqlx::query(
            "INSERT INTO rsvps (invite_id, email, display_name, state, created_at, updated_at) VALUES (?, ?, NULL, ?, ?, ?)",
        )
        .bind(invite_id)
        .bind(email)
        .bind(state)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.db)
        .await
        .expect("Failed to insert test rsvp");
    }
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body should be JSON")
}

/// Poll until a scalar COUNT query reaches the expected value. RSVP side
/// effects (circle reconciliation, notification) run on spawned tasks, so
/// assertions on them need a little patience.
pub async fn wait_for_count(db: &SqlitePool, sql: &str, binds: &[&str], expected: i64) -> bool {
    for _ in 0..200 {
        let mut query = sqlx::query_as::<_, (i64,)>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        match query.fetch_one(db).await {
            Ok((count,)) if count == expected => return true,
            _ => tokio::time::sleep(std::time::Duration::from_millis(5)).await,
        }
    }
    false
}
