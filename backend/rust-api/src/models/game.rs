use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};

pub const JUDGEMENT_OPTIONS: [&str; 2] = ["True", "False"];

/// Authoring-side game document. Only the session lifecycle fields
/// (`active_session_id`, `historical_session_ids`) are written by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub active_session_id: Option<String>,
    #[serde(default)]
    pub historical_session_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub media: Option<String>,
    pub duration_seconds: u32,
    pub points: u32,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Single {
        options: Vec<AnswerOption>,
        correct: usize,
    },
    Multiple {
        options: Vec<AnswerOption>,
        correct: BTreeSet<usize>,
    },
    Judgement {
        correct: bool,
    },
}

/// A submission resolved against its question's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Selection {
    Single(usize),
    Multiple(BTreeSet<usize>),
    Judgement(bool),
}

impl Selection {
    /// Option indices as sent over the wire (judgement: 0 = True, 1 = False).
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Selection::Single(index) => vec![*index],
            Selection::Multiple(set) => set.iter().copied().collect(),
            Selection::Judgement(value) => vec![if *value { 0 } else { 1 }],
        }
    }
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Single { .. } => "single",
            QuestionKind::Multiple { .. } => "multiple",
            QuestionKind::Judgement { .. } => "judgement",
        }
    }

    pub fn option_texts(&self) -> Vec<String> {
        match self {
            QuestionKind::Single { options, .. } | QuestionKind::Multiple { options, .. } => {
                options.iter().map(|o| o.text.clone()).collect()
            }
            QuestionKind::Judgement { .. } => {
                JUDGEMENT_OPTIONS.iter().map(|s| s.to_string()).collect()
            }
        }
    }

    fn option_count(&self) -> usize {
        match self {
            QuestionKind::Single { options, .. } | QuestionKind::Multiple { options, .. } => {
                options.len()
            }
            QuestionKind::Judgement { .. } => JUDGEMENT_OPTIONS.len(),
        }
    }

    pub fn correct_selection(&self) -> Selection {
        match self {
            QuestionKind::Single { correct, .. } => Selection::Single(*correct),
            QuestionKind::Multiple { correct, .. } => Selection::Multiple(correct.clone()),
            QuestionKind::Judgement { correct } => Selection::Judgement(*correct),
        }
    }
}

impl Question {
    /// Checks the question can be played: positive duration and points,
    /// a non-empty option list and a correct set inside it.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_seconds == 0 {
            return Err(format!("question {} has no duration", self.id));
        }
        if self.points == 0 {
            return Err(format!("question {} awards no points", self.id));
        }
        match &self.kind {
            QuestionKind::Single { options, correct } => {
                if options.is_empty() {
                    return Err(format!("question {} has no options", self.id));
                }
                if *correct >= options.len() {
                    return Err(format!("question {} marks a missing option", self.id));
                }
            }
            QuestionKind::Multiple { options, correct } => {
                if options.is_empty() || correct.is_empty() {
                    return Err(format!("question {} has no correct options", self.id));
                }
                if correct.iter().any(|i| *i >= options.len()) {
                    return Err(format!("question {} marks a missing option", self.id));
                }
            }
            QuestionKind::Judgement { .. } => {}
        }
        Ok(())
    }

    /// Turns raw option indices into a typed selection for this question.
    pub fn resolve(&self, indices: &[usize]) -> QuizResult<Selection> {
        let count = self.kind.option_count();
        if indices.is_empty() {
            return Err(QuizError::InvalidSelection("no option selected".into()));
        }
        if let Some(bad) = indices.iter().find(|i| **i >= count) {
            return Err(QuizError::InvalidSelection(format!(
                "option {} does not exist",
                bad
            )));
        }

        match &self.kind {
            QuestionKind::Single { .. } | QuestionKind::Judgement { .. } => {
                let first = indices[0];
                if indices.iter().any(|i| *i != first) {
                    return Err(QuizError::InvalidSelection(format!(
                        "{} questions take exactly one option",
                        self.kind.label()
                    )));
                }
                Ok(match self.kind {
                    QuestionKind::Judgement { .. } => Selection::Judgement(first == 0),
                    _ => Selection::Single(first),
                })
            }
            QuestionKind::Multiple { .. } => {
                Ok(Selection::Multiple(indices.iter().copied().collect()))
            }
        }
    }

    pub fn is_correct(&self, selection: &Selection) -> bool {
        *selection == self.kind.correct_selection()
    }
}
