use axum::http::StatusCode;
use chrono::Duration;
use quizroom_api::services::game_store::GameStore;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_full_session_round_trip() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    assert_eq!(session_id.len(), 6);

    let game = app.store.get_game("capitals").await.unwrap().unwrap();
    assert_eq!(game.active_session_id.as_deref(), Some(session_id.as_str()));

    let ana = app.join(&session_id, "Ana").await;
    let bo = app.join(&session_id, "Bo").await;
    let cy = app.join(&session_id, "Cy").await;

    // lobby
    let (status, body) = app
        .send("GET", &format!("/api/v1/play/{}/status", ana), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["started"], false);
    assert_eq!(body["position"], -1);

    let advanced = app.advance(&session_id).await;
    assert_eq!(advanced, json!({ "position": 0, "ended": false }));

    let (_, body) = app
        .send("GET", &format!("/api/v1/play/{}/question", bo), None, None)
        .await;
    assert_eq!(body["index"], 0);
    assert_eq!(body["type"], "single");
    assert_eq!(body["options"], json!(["Paris", "Lyon", "Nice"]));
    assert_eq!(body["remaining_ms"], 30_000);
    assert!(body.get("correct").is_none());

    app.clock.advance(Duration::seconds(4));
    let (status, _) = app.submit(&ana, &[0]).await;
    assert_eq!(status, StatusCode::OK);
    app.clock.advance(Duration::seconds(2));
    let (status, _) = app.submit(&bo, &[1]).await;
    assert_eq!(status, StatusCode::OK);

    // answers stay hidden while the window is open
    let (status, body) = app
        .send("GET", &format!("/api/v1/play/{}/answer", ana), None, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not_yet_available");

    app.clock.set(common::t0() + Duration::seconds(31));
    let (status, body) = app
        .send("GET", &format!("/api/v1/play/{}/answer", cy), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["correct"], json!([0]));
    assert_eq!(body["correct_text"], json!(["Paris"]));

    let (status, body) = app.submit(&cy, &[0]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "window_closed");

    // nobody answers the second question
    assert_eq!(app.advance(&session_id).await["position"], 1);
    app.clock.advance(Duration::seconds(40));
    let ended = app.advance(&session_id).await;
    assert_eq!(ended, json!({ "position": 1, "ended": true }));

    let (_, body) = app
        .send("GET", &format!("/api/v1/sessions/{}/status", session_id), None, None)
        .await;
    assert_eq!(body["ended"], true);

    let (status, ana_results) = app
        .send("GET", &format!("/api/v1/play/{}/results", ana), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, bo_results) = app
        .send("GET", &format!("/api/v1/play/{}/results", bo), None, None)
        .await;
    let (_, cy_results) = app
        .send("GET", &format!("/api/v1/play/{}/results", cy), None, None)
        .await;

    assert_eq!(ana_results.as_array().unwrap().len(), 1);
    assert_eq!(bo_results.as_array().unwrap().len(), 1);
    assert_eq!(cy_results, json!([]));
    assert_eq!(ana_results[0]["correct"], true);
    assert_eq!(ana_results[0]["points"], 10);
    assert_eq!(ana_results[0]["response_time_ms"], 4_000);
    assert_eq!(bo_results[0]["correct"], false);
    assert_eq!(bo_results[0]["points"], 0);

    let (status, results) = app
        .admin("GET", &format!("/api/v1/admin/sessions/{}/results", session_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let leader = &results["leaderboard"][0];
    assert_eq!(leader["name"], "Ana");
    assert_eq!(leader["score"], 10);
    assert_eq!(leader["accuracy"], 0.5);
    assert_eq!(results["questions"][0]["answer_count"], 2);
    assert_eq!(results["questions"][1]["answer_count"], 0);

    let game = app.store.get_game("capitals").await.unwrap().unwrap();
    assert_eq!(game.active_session_id, None);
    assert_eq!(game.historical_session_ids, vec![session_id]);
}

#[tokio::test]
async fn test_results_before_end_are_rejected() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    let ana = app.join(&session_id, "Ana").await;
    app.advance(&session_id).await;

    let (status, body) = app
        .send("GET", &format!("/api/v1/play/{}/results", ana), None, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "session_not_ended");

    let (status, _) = app
        .admin("GET", &format!("/api/v1/admin/sessions/{}/results", session_id))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_resubmission_overwrites_within_window() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    let ana = app.join(&session_id, "Ana").await;
    app.advance(&session_id).await;

    assert_eq!(app.submit(&ana, &[1]).await.0, StatusCode::OK);
    app.clock.advance(Duration::seconds(3));
    assert_eq!(app.submit(&ana, &[0]).await.0, StatusCode::OK);

    let (_, admin) = app
        .admin("GET", &format!("/api/v1/admin/sessions/{}/status", session_id))
        .await;
    assert_eq!(admin["answered_count"], 1);
    assert_eq!(admin["phase"], json!({ "state": "question_active", "question": 0 }));

    app.admin("POST", &format!("/api/v1/admin/sessions/{}/end", session_id))
        .await;
    let (_, results) = app
        .send("GET", &format!("/api/v1/play/{}/results", ana), None, None)
        .await;
    assert_eq!(results[0]["selections"], json!([0]));
    assert_eq!(results[0]["correct"], true);
}

#[tokio::test]
async fn test_window_boundary_is_closed() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    let ana = app.join(&session_id, "Ana").await;
    app.advance(&session_id).await;

    app.clock.set(common::t0() + Duration::seconds(30));
    let (status, body) = app.submit(&ana, &[0]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "window_closed");

    let (status, _) = app
        .send("GET", &format!("/api/v1/play/{}/answer", ana), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_submissions() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    let ana = app.join(&session_id, "Ana").await;

    let (status, body) = app.submit(&ana, &[0]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "session_not_started");

    app.advance(&session_id).await;

    let (status, body) = app.submit(&ana, &[7]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_selection");

    let (status, body) = app.submit(&ana, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = app.submit("not-a-player", &[0]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown_player");
}

#[tokio::test]
async fn test_join_after_start_is_rejected() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;
    app.advance(&session_id).await;

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/play/join/{}", session_id),
            None,
            Some(json!({ "name": "Late" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");

    let (status, _) = app
        .send(
            "POST",
            "/api/v1/play/join/000000",
            None,
            Some(json!({ "name": "Lost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_name_length_counts_trimmed_name() {
    let app = common::create_test_app();
    let session_id = app.start_session("capitals").await;

    let name = "n".repeat(38);
    app.join(&session_id, &format!("  {}  ", name)).await;

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/play/join/{}", session_id),
            None,
            Some(json!({ "name": "n".repeat(41) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (_, admin) = app
        .admin("GET", &format!("/api/v1/admin/sessions/{}/status", session_id))
        .await;
    assert_eq!(admin["players"], json!([name]));
}
