use thiserror::Error;

/// Every way a session operation can be refused.
///
/// All variants are detected locally and none of them is retried by the
/// core. `Internal` wraps collaborator failures (game store I/O).
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("session belongs to another admin")]
    Forbidden,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("session has not started yet")]
    SessionNotStarted,

    #[error("session is no longer active")]
    SessionNotActive,

    #[error("session has not ended yet")]
    SessionNotEnded,

    #[error("answer window for question {0} is closed")]
    WindowClosed(usize),

    #[error("answers for question {0} are not available yet")]
    NotYetAvailable(usize),

    #[error("answers for question {0} were already revealed")]
    AnswersAlreadyRevealed(usize),

    #[error("player does not belong to this session")]
    UnknownPlayer,

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl QuizError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        QuizError::InvalidState(message.into())
    }

    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            QuizError::NotFound(_) => "not_found",
            QuizError::Forbidden => "forbidden",
            QuizError::InvalidState(_) => "invalid_state",
            QuizError::SessionNotStarted => "session_not_started",
            QuizError::SessionNotActive => "session_not_active",
            QuizError::SessionNotEnded => "session_not_ended",
            QuizError::WindowClosed(_) => "window_closed",
            QuizError::NotYetAvailable(_) => "not_yet_available",
            QuizError::AnswersAlreadyRevealed(_) => "answers_already_revealed",
            QuizError::UnknownPlayer => "unknown_player",
            QuizError::InvalidSelection(_) => "invalid_selection",
            QuizError::Validation(_) => "validation_failed",
            QuizError::Internal(_) => "internal",
        }
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
