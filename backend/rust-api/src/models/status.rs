use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three numbers a polling client reconciles against, plus the server
/// clock reading they were taken at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub started: bool,
    pub ended: bool,
    pub position: i32,
    pub question_started_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u32>,
    pub remaining_ms: i64,
    pub server_time: DateTime<Utc>,
}

/// Player-facing view of the current question. Never carries the correct set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub prompt: String,
    pub media: Option<String>,
    pub options: Vec<String>,
    pub points: u32,
    pub duration_seconds: u32,
    pub question_started_at: DateTime<Utc>,
    pub remaining_ms: i64,
    pub server_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "question", rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    QuestionActive(usize),
    QuestionClosed(usize),
    Ended,
}

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub phase: Phase,
    pub game_id: String,
    pub question_count: usize,
    pub players: Vec<String>,
    pub answered_count: usize,
    pub answers_available: bool,
}
