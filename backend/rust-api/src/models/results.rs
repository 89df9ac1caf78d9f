use serde::Serialize;

use super::answer::QuestionOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerScore {
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub score: u64,
    pub correct_count: usize,
    pub accuracy: f64,
    pub total_response_time_ms: i64,
    /// Indexed by question; `None` where the player never answered.
    pub response_times_ms: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionStats {
    pub question_index: usize,
    pub answer_count: usize,
    pub correct_count: usize,
    pub correct_rate: f64,
    pub average_response_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerAnswers {
    pub player_id: String,
    pub name: String,
    pub answers: Vec<QuestionOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResults {
    pub session_id: String,
    pub question_count: usize,
    pub leaderboard: Vec<PlayerScore>,
    pub questions: Vec<QuestionStats>,
    pub players: Vec<PlayerAnswers>,
}
