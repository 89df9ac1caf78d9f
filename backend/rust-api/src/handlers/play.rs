use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::ValidatedJson,
    handlers::error::ApiError,
    models::{
        answer::SubmitAnswerResponse,
        session::{JoinSessionRequest, JoinSessionResponse},
        QuestionOutcome, QuestionView, RevealResponse, StatusSnapshot, SubmitAnswerRequest,
    },
    services::AppState,
};

/// POST /api/v1/play/join/{session_id}
pub async fn join_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    ValidatedJson(req): ValidatedJson<JoinSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let player_id = state.sessions.join(&session_id, &req.name)?;
    Ok((StatusCode::CREATED, Json(JoinSessionResponse { player_id })))
}

/// GET /api/v1/sessions/{session_id}/status
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    Ok(Json(state.sessions.session_status(&session_id)?))
}

/// GET /api/v1/play/{player_id}/status
pub async fn player_status(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    Ok(Json(state.sessions.player_status(&player_id)?))
}

/// GET /api/v1/play/{player_id}/question
pub async fn current_question(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<QuestionView>, ApiError> {
    Ok(Json(state.sessions.current_question(&player_id)?))
}

/// PUT /api/v1/play/{player_id}/answer
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let record = state.sessions.submit_answer(&player_id, &req.selections)?;
    Ok(Json(SubmitAnswerResponse {
        question_index: record.question_index,
        submitted_at: record.submitted_at,
    }))
}

/// GET /api/v1/play/{player_id}/answer
pub async fn reveal_answers(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<RevealResponse>, ApiError> {
    Ok(Json(state.sessions.reveal_answers(&player_id)?))
}

/// GET /api/v1/play/{player_id}/results
pub async fn player_results(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<QuestionOutcome>>, ApiError> {
    Ok(Json(state.sessions.player_results(&player_id)?))
}
