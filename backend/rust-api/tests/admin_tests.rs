use axum::http::StatusCode;
use base64::{engine::general_purpose, Engine as _};
use quizroom_api::{
    middlewares::auth::JwtService,
    models::Game,
    services::game_store::GameStore,
};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = common::create_test_app();

    let (status, _) = app
        .send("POST", "/api/v1/admin/games/capitals/sessions", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            "POST",
            "/api/v1/admin/games/capitals/sessions",
            Some("not-a-jwt"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_owner_controls_session() {
    let app = common::create_test_app();
    let intruder = JwtService::new(common::JWT_SECRET)
        .issue("intruder@example.com", 3600)
        .unwrap();

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/admin/games/capitals/sessions",
            Some(&intruder),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let session_id = app.start_session("capitals").await;
    for (method, path) in [
        ("POST", "advance"),
        ("POST", "end"),
        ("GET", "status"),
        ("GET", "results"),
    ] {
        let (status, _) = app
            .send(
                method,
                &format!("/api/v1/admin/sessions/{}/{}", session_id, path),
                Some(&intruder),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, path);
    }
}

#[tokio::test]
async fn test_start_unknown_game_and_double_start() {
    let app = common::create_test_app();

    let (status, body) = app
        .admin("POST", "/api/v1/admin/games/missing/sessions")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let first = app.start_session("capitals").await;
    let (status, body) = app
        .admin("POST", "/api/v1/admin/games/capitals/sessions")
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");

    // a fresh session is allowed once the previous one ended
    let (status, _) = app
        .admin("POST", &format!("/api/v1/admin/sessions/{}/end", first))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let second = app.start_session("capitals").await;
    assert_ne!(first, second);

    let game = app.store.get_game("capitals").await.unwrap().unwrap();
    assert_eq!(game.active_session_id.as_deref(), Some(second.as_str()));
    assert_eq!(game.historical_session_ids, vec![first]);
}

#[tokio::test]
async fn test_start_rejects_game_without_questions() {
    let app = common::create_test_app();
    app.store
        .put_game(&Game {
            id: "empty".to_string(),
            owner: common::HOST.to_string(),
            name: "Empty".to_string(),
            questions: vec![],
            active_session_id: None,
            historical_session_ids: vec![],
        })
        .await
        .unwrap();

    let (status, body) = app.admin("POST", "/api/v1/admin/games/empty/sessions").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");
    assert!(app.state.sessions.registry().is_empty());
}

#[tokio::test]
async fn test_lifecycle_after_end() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    let ana = app.join(&session_id, "Ana").await;
    app.advance(&session_id).await;
    app.admin("POST", &format!("/api/v1/admin/sessions/{}/end", session_id))
        .await;

    let (status, body) = app
        .admin("POST", &format!("/api/v1/admin/sessions/{}/advance", session_id))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");

    let (status, _) = app
        .admin("POST", &format!("/api/v1/admin/sessions/{}/end", session_id))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.submit(&ana, &[0]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "session_not_active");

    // the question was still open when the session ended
    let (status, body) = app
        .send("GET", &format!("/api/v1/play/{}/answer", ana), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question_index"], 0);

    let (_, admin) = app
        .admin("GET", &format!("/api/v1/admin/sessions/{}/status", session_id))
        .await;
    assert_eq!(admin["phase"], json!({ "state": "ended" }));
    assert_eq!(admin["players"], json!(["Ana"]));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = common::create_test_app();
    app.start_session("capitals").await;

    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.send("GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let credentials = general_purpose::STANDARD.encode("metrics:secret");
    let response = {
        use axum::{body::Body, http::Request};
        use tower::ServiceExt;
        app.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .header("authorization", format!("Basic {}", credentials))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("quiz_sessions_total"));
    assert!(text.contains("http_requests_total"));
}
