use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use focusledger::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("focusledger-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.database.path = db_path.display().to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> Router {
    let state = focusledger::api::create_app_state_from_config(test_config(), None)
        .await
        .expect("Failed to create app state");
    focusledger::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Signs up and logs in, returning `(user_id, token)`.
async fn register(app: &Router, email: &str) -> (i64, String) {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"email": email, "password": "correct horse", "name": "Tester"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        body["data"]["id"].as_i64().unwrap(),
        body["data"]["token"].as_str().unwrap().to_string(),
    )
}

async fn create_subject(app: &Router, token: &str, name: &str, color: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/subjects",
        Some(token),
        Some(json!({"name": name, "color": color})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_i64().unwrap()
}

async fn record(app: &Router, token: &str, subject_id: i64, start: &str, duration: i64) -> StatusCode {
    let (status, _) = send(
        app,
        "POST",
        "/api/sessions",
        Some(token),
        Some(json!({
            "subjectId": subject_id,
            "startTime": start,
            "endTime": start,
            "duration": duration,
        })),
    )
    .await;
    status
}

#[tokio::test]
async fn test_health_is_public_and_rest_is_not() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send(&app, "GET", "/api/subjects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "GET", "/api/subjects", Some("wrong-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_seeds_three_subjects() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "new@example.com").await;

    let (status, body) = send(&app, "GET", "/api/subjects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let subjects: Vec<(String, String)> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            (
                s["name"].as_str().unwrap().to_string(),
                s["color"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    assert_eq!(
        subjects,
        vec![
            ("Study".to_string(), "#6366f1".to_string()),
            ("Work".to_string(), "#22d3ee".to_string()),
            ("Reading".to_string(), "#f472b6".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_signup_and_login_errors() {
    let app = spawn_app().await;
    register(&app, "taken@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"email": "taken@example.com", "password": "whatever1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"email": "", "password": "whatever1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "taken@example.com", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_and_api_key_header() {
    let app = spawn_app().await;
    send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"email": "cookie@example.com", "password": "correct horse"})),
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    json!({"email": "cookie@example.com", "password": "correct horse"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let login: Value = serde_json::from_slice(&body).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("X-Api-Key", login["data"]["token"].as_str().unwrap())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let me: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(me["data"]["email"], "cookie@example.com");
}

#[tokio::test]
async fn test_token_regeneration_revokes_old_token() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "rotate@example.com").await;

    let (status, body) = send(&app, "POST", "/api/auth/token/regenerate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(fresh, token);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "pw@example.com").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&token),
        Some(json!({"currentPassword": "wrong", "newPassword": "another horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&token),
        Some(json!({"currentPassword": "correct horse", "newPassword": "another horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "pw@example.com", "password": "another horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_subject_crud_is_scoped_to_owner() {
    let app = spawn_app().await;
    let (_, alice) = register(&app, "alice@example.com").await;
    let (_, bob) = register(&app, "bob@example.com").await;

    let (status, body) = send(&app, "POST", "/api/subjects", Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/subjects",
        Some(&alice),
        Some(json!({"name": "Piano"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["color"], "#6366f1");
    let piano = body["data"]["id"].as_i64().unwrap();

    let update = json!({"name": "Piano practice", "color": "#000000"});
    let (status, first) = send(
        &app,
        "PUT",
        &format!("/api/subjects/{piano}"),
        Some(&alice),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(
        &app,
        "PUT",
        &format!("/api/subjects/{piano}"),
        Some(&alice),
        Some(update.clone()),
    )
    .await;
    assert_eq!(first["data"], second["data"]);
    assert_eq!(second["data"]["name"], "Piano practice");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/subjects/{piano}"),
        Some(&bob),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/subjects/{piano}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/subjects/abc", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/subjects/{piano}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/subjects/{piano}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_creation_errors() {
    let app = spawn_app().await;
    let (_, alice) = register(&app, "s-alice@example.com").await;
    let (_, bob) = register(&app, "s-bob@example.com").await;
    let bobs_subject = create_subject(&app, &bob, "Chess", "#111111").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(&alice),
        Some(json!({"subjectId": bobs_subject, "startTime": "2026-03-01T10:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .header(header::AUTHORIZATION, format!("Bearer {alice}"))
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let status = record(&app, &alice, bobs_subject, "2026-03-01T10:00:00Z", 600).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/sessions", Some(&alice), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    let (_, body) = send(&app, "GET", "/api/sessions", Some(&bob), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_range_is_inclusive() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "range@example.com").await;
    let subject = create_subject(&app, &token, "Latin", "#abcdef").await;

    for start in [
        "2026-03-01T00:00:00.000Z",
        "2026-03-10T08:30:00.000Z",
        "2026-03-31T23:59:59.999Z",
        "2026-04-01T00:00:00.000Z",
    ] {
        assert_eq!(record(&app, &token, subject, start, 300).await, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/sessions?from=2026-03-01T00:00:00.000Z&to=2026-03-31T23:59:59.999Z",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0]["startTime"], "2026-03-31T23:59:59.999Z");
    assert_eq!(sessions[2]["startTime"], "2026-03-01T00:00:00.000Z");
    assert_eq!(sessions[0]["subject"]["name"], "Latin");
    assert_eq!(sessions[0]["subject"]["color"], "#abcdef");

    let (status, _) = send(
        &app,
        "GET",
        "/api/sessions?from=yesterday",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_subject_removes_its_sessions() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "cascade@example.com").await;
    let doomed = create_subject(&app, &token, "Doomed", "#ff0000").await;
    let kept = create_subject(&app, &token, "Kept", "#00ff00").await;

    record(&app, &token, doomed, "2026-03-02T09:00:00Z", 1200).await;
    record(&app, &token, doomed, "2026-03-03T09:00:00Z", 1200).await;
    record(&app, &token, kept, "2026-03-04T09:00:00Z", 1200).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/subjects/{doomed}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/sessions", Some(&token), None).await;
    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["subjectId"], kept);

    let (_, body) = send(
        &app,
        "GET",
        "/api/analytics?year=2026&month=3",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["totalMinutes"], 20);
    assert_eq!(body["data"]["subjects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analytics_rounds_each_session() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "rounding@example.com").await;
    let subject = create_subject(&app, &token, "Reading log", "#f472b6").await;

    record(&app, &token, subject, "2026-03-05T09:00:00Z", 61).await;
    record(&app, &token, subject, "2026-03-05T10:00:00Z", 119).await;
    record(&app, &token, subject, "2026-03-06T09:00:00Z", 90).await;
    record(&app, &token, subject, "2026-03-06T10:00:00Z", 90).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/analytics?year=2026&month=3",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let days = body["data"]["days"].as_array().unwrap();
    // March 2026 starts on a Sunday: no padding
    assert_eq!(days.len(), 31);
    assert_eq!(days[4]["date"], "2026-03-05");
    assert_eq!(days[4]["totalMinutes"], 3);
    assert_eq!(days[5]["totalMinutes"], 4);
    assert_eq!(body["data"]["totalMinutes"], 7);

    let (status, _) = send(
        &app,
        "GET",
        "/api/analytics?year=2026&month=13",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        "/api/analytics?year=2026&month=4",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalMinutes"], 0);
    assert!(body["data"]["days"][0].is_null());
}

#[tokio::test]
async fn test_analytics_rejects_unrepresentable_months() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "far@example.com").await;

    for uri in [
        "/api/analytics?year=262142&month=12",
        "/api/analytics?year=10000&month=1",
        "/api/analytics?year=0&month=1",
    ] {
        let (status, body) = send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/analytics?year=9999&month=12",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalMinutes"], 0);
}

#[tokio::test]
async fn test_oversized_duration_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "long@example.com").await;
    let subject = create_subject(&app, &token, "Marathon", "#22d3ee").await;

    let status = record(&app, &token, subject, "2026-03-10T09:00:00Z", i64::MAX).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        "/api/analytics?year=2026&month=3",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalMinutes"], 0);
}

#[tokio::test]
async fn test_session_range_accepts_bare_dates() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "bare@example.com").await;
    let subject = create_subject(&app, &token, "Reading", "#f472b6").await;

    for start in ["2026-03-01T08:00:00Z", "2026-03-02T08:00:00Z"] {
        assert_eq!(record(&app, &token, subject, start, 60).await, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/sessions?from=2026-03-01&to=2026-03-02",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["startTime"], "2026-03-01T08:00:00.000Z");
}

#[tokio::test]
async fn test_subject_icon_can_be_cleared() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "icons@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/subjects",
        Some(&token),
        Some(json!({"name": "Piano", "icon": "♪"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/subjects/{id}");

    let (_, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({"name": "Keys"}))).await;
    assert_eq!(body["data"]["icon"], "♪");

    let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({"icon": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["icon"], Value::Null);
    assert_eq!(body["data"]["name"], "Keys");
}
