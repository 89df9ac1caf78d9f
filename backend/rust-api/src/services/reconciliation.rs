//! Snapshot views for polling clients.
//!
//! Every view is complete on its own: a client that missed any number of
//! polls recovers from the next response alone. Remaining time is always
//! `max(duration - (now - question_started_at), 0)`.

use chrono::{DateTime, Utc};

use crate::error::{QuizError, QuizResult};
use crate::models::{AdminStatus, QuestionView, StatusSnapshot};
use crate::services::session_machine::SessionState;
use crate::utils::time::remaining_ms;

pub fn status(state: &SessionState, now: DateTime<Utc>) -> StatusSnapshot {
    let current = state.current();
    let remaining = match current {
        Some((_, question, started_at)) if state.is_active() => {
            remaining_ms(now, started_at, question.duration_seconds)
        }
        _ => 0,
    };

    StatusSnapshot {
        started: state.is_active() && current.is_some(),
        ended: !state.is_active(),
        position: state.position(),
        question_started_at: current.map(|(_, _, started_at)| started_at),
        duration_seconds: current.map(|(_, question, _)| question.duration_seconds),
        remaining_ms: remaining,
        server_time: now,
    }
}

pub fn current_question(state: &SessionState, now: DateTime<Utc>) -> QuizResult<QuestionView> {
    let (index, question, started_at) = state.current().ok_or(QuizError::SessionNotStarted)?;
    let remaining = if state.is_active() {
        remaining_ms(now, started_at, question.duration_seconds)
    } else {
        0
    };

    Ok(QuestionView {
        index,
        total: state.questions().len(),
        id: question.id.clone(),
        kind: question.kind.label().to_string(),
        prompt: question.prompt.clone(),
        media: question.media.clone(),
        options: question.kind.option_texts(),
        points: question.points,
        duration_seconds: question.duration_seconds,
        question_started_at: started_at,
        remaining_ms: remaining,
        server_time: now,
    })
}

pub fn admin_status(state: &SessionState, now: DateTime<Utc>) -> AdminStatus {
    let answered_count = usize::try_from(state.position())
        .map(|index| state.ledger().answered_count(index))
        .unwrap_or(0);

    AdminStatus {
        snapshot: status(state, now),
        phase: state.phase(now),
        game_id: state.game_id().to_string(),
        question_count: state.questions().len(),
        players: state.roster().names(),
        answered_count,
        answers_available: state.answers_available(now),
    }
}

/// What changed between two consecutive polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Started,
    QuestionChanged { position: i32 },
    Ended,
}

/// Client-side memory of the last snapshot seen. Holds nothing that cannot
/// be rebuilt from the next snapshot, so dropping it is always safe.
#[derive(Debug, Clone, Default)]
pub struct ClientCursor {
    last: Option<StatusSnapshot>,
    /// `local_clock - server_clock`, measured at the last poll.
    offset_ms: i64,
}

impl ClientCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a fresh snapshot received at local time `local_now`.
    pub fn observe(&mut self, snapshot: StatusSnapshot, local_now: DateTime<Utc>) -> Transition {
        self.offset_ms = (local_now - snapshot.server_time).num_milliseconds();

        let transition = match &self.last {
            _ if snapshot.ended => {
                if self.last.as_ref().is_some_and(|prev| prev.ended) {
                    Transition::Unchanged
                } else {
                    Transition::Ended
                }
            }
            None if snapshot.started => Transition::QuestionChanged {
                position: snapshot.position,
            },
            Some(prev) if !prev.started && snapshot.started => Transition::Started,
            Some(prev)
                if prev.question_started_at != snapshot.question_started_at
                    || prev.position != snapshot.position =>
            {
                Transition::QuestionChanged {
                    position: snapshot.position,
                }
            }
            _ => Transition::Unchanged,
        };

        self.last = Some(snapshot);
        transition
    }

    /// Remaining time for the current question at local time `local_now`,
    /// corrected by the offset measured at the last poll.
    pub fn remaining_ms(&self, local_now: DateTime<Utc>) -> i64 {
        let Some(last) = &self.last else {
            return 0;
        };
        match (last.question_started_at, last.duration_seconds) {
            (Some(started_at), Some(duration)) if !last.ended => {
                let server_now = local_now - chrono::Duration::milliseconds(self.offset_ms);
                remaining_ms(server_now, started_at, duration)
            }
            _ => 0,
        }
    }

    pub fn last(&self) -> Option<&StatusSnapshot> {
        self.last.as_ref()
    }
}
