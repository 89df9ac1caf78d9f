#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use quizroom_api::{
    config::Config,
    create_router,
    middlewares::auth::JwtService,
    models::{AnswerOption, Game, Question, QuestionKind},
    services::{clock::ManualClock, game_store::InMemoryGameStore, AppState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const HOST: &str = "host@example.com";
pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<InMemoryGameStore>,
    pub clock: Arc<ManualClock>,
    pub admin_token: String,
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 19, 30, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        mongo_uri: None,
        mongo_database: "quizroom_test".to_string(),
        leaderboard_size: 5,
        metrics_auth: "metrics:secret".to_string(),
    }
}

fn option(text: &str) -> AnswerOption {
    AnswerOption {
        text: text.to_string(),
    }
}

/// Two questions worth 10 and 20 points, 30 seconds each.
pub fn capitals_game() -> Game {
    Game {
        id: "capitals".to_string(),
        owner: HOST.to_string(),
        name: "Capitals".to_string(),
        questions: vec![
            Question {
                id: "fr".to_string(),
                prompt: "Capital of France?".to_string(),
                media: None,
                duration_seconds: 30,
                points: 10,
                kind: QuestionKind::Single {
                    options: vec![option("Paris"), option("Lyon"), option("Nice")],
                    correct: 0,
                },
            },
            Question {
                id: "eu".to_string(),
                prompt: "Which are EU capitals?".to_string(),
                media: None,
                duration_seconds: 30,
                points: 20,
                kind: QuestionKind::Multiple {
                    options: vec![option("Rome"), option("Oslo"), option("Vienna")],
                    correct: [0, 2].into_iter().collect(),
                },
            },
        ],
        active_session_id: None,
        historical_session_ids: vec![],
    }
}

pub fn create_test_app() -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let store = Arc::new(InMemoryGameStore::with_games([capitals_game()]));
    let clock = Arc::new(ManualClock::new(t0()));
    let state = Arc::new(AppState::with_parts(
        test_config(),
        store.clone(),
        clock.clone(),
    ));
    let admin_token = JwtService::new(JWT_SECRET)
        .issue(HOST, 3600)
        .expect("Failed to mint admin token");

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        clock,
        admin_token,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn admin(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        self.send(method, uri, Some(&self.admin_token), None).await
    }

    pub async fn start_session(&self, game_id: &str) -> String {
        let (status, body) = self
            .admin("POST", &format!("/api/v1/admin/games/{}/sessions", game_id))
            .await;
        assert_eq!(status, StatusCode::CREATED, "start failed: {}", body);
        body["session_id"].as_str().unwrap().to_string()
    }

    pub async fn advance(&self, session_id: &str) -> Value {
        let (status, body) = self
            .admin(
                "POST",
                &format!("/api/v1/admin/sessions/{}/advance", session_id),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "advance failed: {}", body);
        body
    }

    pub async fn join(&self, session_id: &str, name: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                &format!("/api/v1/play/join/{}", session_id),
                None,
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "join failed: {}", body);
        body["player_id"].as_str().unwrap().to_string()
    }

    pub async fn submit(&self, player_id: &str, selections: &[usize]) -> (StatusCode, Value) {
        self.send(
            "PUT",
            &format!("/api/v1/play/{}/answer", player_id),
            None,
            Some(serde_json::json!({ "selections": selections })),
        )
        .await
    }
}
