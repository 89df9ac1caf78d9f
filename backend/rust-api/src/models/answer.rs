use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::game::Selection;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 16, message = "select between 1 and 16 options"))]
    pub selections: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub question_index: usize,
    pub submitted_at: DateTime<Utc>,
}

/// One ledger entry: the latest submission of a player for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selection: Selection,
    pub submitted_at: DateTime<Utc>,
    pub correct: bool,
    pub answered_within_window: bool,
}

#[derive(Debug, Serialize)]
pub struct RevealResponse {
    pub question_index: usize,
    pub correct: Vec<usize>,
    pub correct_text: Vec<String>,
}

/// Per-question outcome returned to a player once the session ended.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionOutcome {
    pub question_index: usize,
    pub selections: Vec<usize>,
    pub correct: bool,
    pub points: u32,
    pub question_started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub response_time_ms: i64,
}
