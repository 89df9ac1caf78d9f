use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Players poll from browsers served elsewhere
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        // Public endpoints
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        // Admin endpoints (require JWT)
        .nest(
            "/api/v1/admin",
            admin_routes().layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::auth_middleware,
            )),
        )
        // Player endpoints, authorized by the opaque player id
        .nest("/api/v1/play", play_routes())
        .route(
            "/api/v1/sessions/{session_id}/status",
            get(handlers::play::session_status),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/games/{game_id}/sessions",
            post(handlers::admin::start_session),
        )
        .route(
            "/sessions/{session_id}/advance",
            post(handlers::admin::advance_session),
        )
        .route(
            "/sessions/{session_id}/end",
            post(handlers::admin::end_session),
        )
        .route(
            "/sessions/{session_id}/status",
            get(handlers::admin::session_status),
        )
        .route(
            "/sessions/{session_id}/results",
            get(handlers::admin::session_results),
        )
}

fn play_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/join/{session_id}", post(handlers::play::join_session))
        .route("/{player_id}/status", get(handlers::play::player_status))
        .route(
            "/{player_id}/question",
            get(handlers::play::current_question),
        )
        .route(
            "/{player_id}/answer",
            get(handlers::play::reveal_answers).put(handlers::play::submit_answer),
        )
        .route("/{player_id}/results", get(handlers::play::player_results))
}
