use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    handlers::error::ApiError,
    middlewares::auth::JwtClaims,
    models::{
        session::StartSessionResponse, AdminStatus, AdvanceOutcome, SessionResults,
    },
    services::AppState,
};

/// POST /api/v1/admin/games/{game_id}/sessions
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Starting session for game={} by admin={}", game_id, claims.sub);

    let session_id = state.sessions.start(&claims.sub, &game_id).await?;
    Ok((StatusCode::CREATED, Json(StartSessionResponse { session_id })))
}

/// POST /api/v1/admin/sessions/{id}/advance
pub async fn advance_session(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(session_id): Path<String>,
) -> Result<Json<AdvanceOutcome>, ApiError> {
    let outcome = state.sessions.advance(&claims.sub, &session_id).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/admin/sessions/{id}/end
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.end(&claims.sub, &session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/sessions/{id}/status
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(session_id): Path<String>,
) -> Result<Json<AdminStatus>, ApiError> {
    Ok(Json(state.sessions.admin_status(&claims.sub, &session_id)?))
}

/// GET /api/v1/admin/sessions/{id}/results
pub async fn session_results(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResults>, ApiError> {
    Ok(Json(
        state.sessions.session_results(&claims.sub, &session_id)?,
    ))
}
