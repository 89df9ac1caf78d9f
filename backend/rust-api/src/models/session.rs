use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const MAX_NAME_CHARS: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinSessionRequest {
    #[validate(custom(function = "validate_display_name"))]
    pub name: String,
}

/// Length is checked on the trimmed name, the form that gets stored.
fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let length = name.trim().chars().count();
    if length == 0 || length > MAX_NAME_CHARS {
        return Err(ValidationError::new("name_length")
            .with_message(Cow::Borrowed("name must be 1-40 characters")));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct JoinSessionResponse {
    pub player_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvanceOutcome {
    pub position: i32,
    pub ended: bool,
}
