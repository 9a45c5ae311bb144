mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::{body_json, TestApp};
use serde_json::json;

/// Host + invite whose window opened an hour ago and runs two more hours.
async fn active_invite(app: &TestApp) -> String {
    let (host_id, _) = app.create_host("Host", "host@example.com").await;
    let now = Utc::now();
    app.insert_invite(
        &host_id,
        "Game night",
        &(now - Duration::hours(1)).to_rfc3339(),
        &(now + Duration::hours(2)).to_rfc3339(),
        &(now - Duration::hours(1)).to_rfc3339(),
    )
    .await
}

async fn rsvp_row(app: &TestApp, invite_id: &str, email: &str) -> (Option<String>, String, String, String) {
    sqlx::query_as::<_, (Option<String>, String, String, String)>(
        "SELECT display_name, state, created_at, updated_at FROM rsvps WHERE invite_id = ? AND email = ?",
    )
    .bind(invite_id)
    .bind(email)
    .fetch_one(&app.db)
    .await
    .expect("Expected a ledger row")
}

#[tokio::test]
async fn guest_rsvp_creates_one_ledger_row() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;

    let resp = app
        .post_json(
            &format!("/invites/{invite_id}/rsvp"),
            json!({ "email": "Dana@Example.com", "name": "Dana", "state": "join" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["email"], "dana@example.com");
    assert_eq!(body["state"], "join");
    assert_eq!(body["display_name"], "Dana");

    let (name, state, _, _) = rsvp_row(&app, &invite_id, "dana@example.com").await;
    assert_eq!(name.as_deref(), Some("Dana"));
    assert_eq!(state, "join");
}

#[tokio::test]
async fn replayed_submissions_keep_one_row_and_the_first_created_timestamp() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;
    let uri = format!("/invites/{invite_id}/rsvp");
    let body = json!({ "email": "a@x.com", "state": "join" });

    let resp = app.post_json(&uri, body.clone(), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let (_, _, first_created, _) = rsvp_row(&app, &invite_id, "a@x.com").await;

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    app.post_json(&uri, body.clone(), None).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    app.post_json(&uri, body, None).await;

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rsvps WHERE invite_id = ?")
        .bind(&invite_id)
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(count.0, 1);

    let (_, _, created, updated) = rsvp_row(&app, &invite_id, "a@x.com").await;
    assert_eq!(created, first_created);

    let created: DateTime<Utc> = created.parse().unwrap();
    let updated: DateTime<Utc> = updated.parse().unwrap();
    assert!(updated > created);
}

#[tokio::test]
async fn email_case_and_whitespace_collapse_to_one_respondent() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;
    let uri = format!("/invites/{invite_id}/rsvp");

    app.post_json(&uri, json!({ "email": "A@X.com", "state": "join" }), None).await;
    app.post_json(&uri, json!({ "email": " a@x.com ", "state": "maybe" }), None).await;

    let rows: Vec<(String,)> = sqlx::query_as("SELECT email FROM rsvps WHERE invite_id = ?")
        .bind(&invite_id)
        .fetch_all(&app.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "a@x.com");
}

#[tokio::test]
async fn state_overwrite_moves_the_count_not_the_row() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;
    let uri = format!("/invites/{invite_id}/rsvp");

    app.post_json(&uri, json!({ "email": "a@x.com", "state": "maybe" }), None).await;
    app.post_json(&uri, json!({ "email": "a@x.com", "state": "join" }), None).await;

    let resp = app.get(&format!("/invites/{invite_id}"), None).await;
    let body = body_json(resp).await;
    assert_eq!(body["counts"]["total"], 1);
    assert_eq!(body["counts"]["join"], 1);
    assert_eq!(body["counts"]["maybe"], 0);
}

#[tokio::test]
async fn empty_name_never_overwrites_a_recorded_one() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;
    let uri = format!("/invites/{invite_id}/rsvp");

    app.post_json(&uri, json!({ "email": "a@x.com", "name": "Dana", "state": "join" }), None)
        .await;
    app.post_json(&uri, json!({ "email": "a@x.com", "name": "", "state": "decline" }), None)
        .await;
    app.post_json(&uri, json!({ "email": "a@x.com", "state": "maybe" }), None).await;

    let (name, state, _, _) = rsvp_row(&app, &invite_id, "a@x.com").await;
    assert_eq!(name.as_deref(), Some("Dana"));
    assert_eq!(state, "maybe");
}

#[tokio::test]
async fn invalid_guest_email_is_rejected_and_nothing_is_written() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;

    for email in ["not-an-email", "a@b", "a b@x.com", ""] {
        let resp = app
            .post_json(
                &format!("/invites/{invite_id}/rsvp"),
                json!({ "email": email, "state": "join" }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "email {email:?}");
    }

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rsvps")
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn guest_without_email_is_rejected() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;

    let resp = app
        .post_json(
            &format!("/invites/{invite_id}/rsvp"),
            json!({ "state": "join" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unsupported_state_value_is_rejected() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;

    let resp = app
        .post_json(
            &format!("/invites/{invite_id}/rsvp"),
            json!({ "email": "a@x.com", "state": "attending" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn submission_after_window_end_is_rejected_with_gone() {
    let app = TestApp::new().await;
    let (host_id, _) = app.create_host("Host", "host@example.com").await;
    let now = Utc::now();
    let invite_id = app
        .insert_invite(
            &host_id,
            "Over already",
            &(now - Duration::hours(3)).to_rfc3339(),
            &(now - Duration::hours(1)).to_rfc3339(),
            &(now - Duration::hours(3)).to_rfc3339(),
        )
        .await;

    let resp = app
        .post_json(
            &format!("/invites/{invite_id}/rsvp"),
            json!({ "email": "a@x.com", "state": "join" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::GONE);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rsvps WHERE invite_id = ?")
        .bind(&invite_id)
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn rsvp_to_unknown_invite_is_not_found() {
    let app = TestApp::new().await;

    let resp = app
        .post_json(
            "/invites/nope/rsvp",
            json!({ "email": "a@x.com", "state": "join" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_identity_wins_over_body_fields() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;
    let (_host_id, access_code) = app.create_host("Sam Host", "sam@example.com").await;
    let cookie = app.login(&access_code).await;

    let resp = app
        .post_json(
            &format!("/invites/{invite_id}/rsvp"),
            json!({ "email": "spoofed@x.com", "name": "Spoofed", "state": "join" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["email"], "sam@example.com");
    assert_eq!(body["display_name"], "Sam Host");

    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM rsvps WHERE invite_id = ? AND email = 'spoofed@x.com'")
            .bind(&invite_id)
            .fetch_one(&app.db)
            .await
            .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn guest_history_merges_when_the_same_email_signs_in() {
    let app = TestApp::new().await;
    let invite_id = active_invite(&app).await;
    let uri = format!("/invites/{invite_id}/rsvp");

    // Guest responds first, then the same address responds signed-in.
    app.post_json(&uri, json!({ "email": "Pat@Example.com", "name": "pat", "state": "maybe" }), None)
        .await;
    let (_pat_id, access_code) = app.create_host("Pat Turner", "pat@example.com").await;
    let cookie = app.login(&access_code).await;
    let resp = app.post_json(&uri, json!({ "state": "join" }), Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let rows: Vec<(String, Option<String>, String)> =
        sqlx::query_as("SELECT email, display_name, state FROM rsvps WHERE invite_id = ?")
            .bind(&invite_id)
            .fetch_all(&app.db)
            .await
            .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "pat@example.com");
    // Authenticated profile name wins.
    assert_eq!(rows[0].1.as_deref(), Some("Pat Turner"));
    assert_eq!(rows[0].2, "join");
}
