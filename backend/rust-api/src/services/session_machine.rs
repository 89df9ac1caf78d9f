//! Lifecycle of one running quiz session.
//!
//! `SessionState` is a plain value: every transition takes the current time
//! as an argument and either mutates the state completely or returns an
//! error without touching it. Question expiry is never stored; it is derived
//! from `(now, question_started_at, duration)` whenever it is needed.
//!
//! The roster and the answer ledger are shared between clones, so a
//! snapshot copy costs the timeline only. Writes to them are the last step
//! of a transition and happen under the session's write lock.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{QuizError, QuizResult};
use crate::models::{
    session::MAX_NAME_CHARS, AdvanceOutcome, AnswerRecord, Game, Phase, Player, Question,
    QuestionOutcome, Selection,
};
use crate::services::ledger::AnswerLedger;
use crate::services::roster::Roster;
use crate::utils::time::window_closed;

pub const LOBBY_POSITION: i32 = -1;

#[derive(Debug, Clone)]
pub struct SessionState {
    id: String,
    game_id: String,
    owner: String,
    questions: Arc<[Question]>,
    position: i32,
    /// One entry per position reached, stamped when the position was entered.
    question_started_at: Vec<DateTime<Utc>>,
    roster: Arc<Roster>,
    ledger: Arc<AnswerLedger>,
    revealed: BTreeSet<usize>,
    active: bool,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Opens a session in the lobby with a snapshot of the game's questions.
    pub fn new(id: String, game: &Game, now: DateTime<Utc>) -> QuizResult<Self> {
        if game.questions.is_empty() {
            return Err(QuizError::invalid_state("game has no questions"));
        }
        for question in &game.questions {
            question.validate().map_err(QuizError::InvalidState)?;
        }

        Ok(Self {
            id,
            game_id: game.id.clone(),
            owner: game.owner.clone(),
            questions: game.questions.clone().into(),
            position: LOBBY_POSITION,
            question_started_at: Vec::new(),
            roster: Arc::default(),
            ledger: Arc::default(),
            revealed: BTreeSet::new(),
            active: true,
            created_at: now,
            ended_at: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Players in join order.
    pub fn players(&self) -> Vec<Player> {
        self.roster.players()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.roster.contains(player_id)
    }

    pub fn started_at(&self, question_index: usize) -> Option<DateTime<Utc>> {
        self.question_started_at.get(question_index).copied()
    }

    /// Index and definition of the question at the current position.
    pub fn current(&self) -> Option<(usize, &Question, DateTime<Utc>)> {
        let index = usize::try_from(self.position).ok()?;
        Some((
            index,
            self.questions.get(index)?,
            self.started_at(index)?,
        ))
    }

    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        if !self.active {
            return Phase::Ended;
        }
        match self.current() {
            None => Phase::Lobby,
            Some((index, question, started_at)) => {
                if window_closed(now, started_at, question.duration_seconds) {
                    Phase::QuestionClosed(index)
                } else {
                    Phase::QuestionActive(index)
                }
            }
        }
    }

    /// Moves to the next question, closing the current one early if its
    /// window is still open. Past the last question the session ends.
    pub fn advance(&mut self, now: DateTime<Utc>) -> QuizResult<AdvanceOutcome> {
        if !self.active {
            return Err(QuizError::invalid_state("session has already ended"));
        }

        let next = self.position + 1;
        if next as usize >= self.questions.len() {
            self.finish(now);
            return Ok(AdvanceOutcome {
                position: self.position,
                ended: true,
            });
        }

        self.position = next;
        self.question_started_at.push(now);
        debug_assert_eq!(self.question_started_at.len(), next as usize + 1);

        Ok(AdvanceOutcome {
            position: self.position,
            ended: false,
        })
    }

    pub fn end(&mut self, now: DateTime<Utc>) -> QuizResult<()> {
        if !self.active {
            return Err(QuizError::invalid_state("session has already ended"));
        }
        self.finish(now);
        Ok(())
    }

    fn finish(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.ended_at = Some(now);
        self.ledger.freeze();
    }

    pub fn join(&mut self, player_id: String, name: &str, now: DateTime<Utc>) -> QuizResult<()> {
        if !self.active {
            return Err(QuizError::invalid_state("session has already ended"));
        }
        if self.position != LOBBY_POSITION {
            return Err(QuizError::invalid_state("session has already begun"));
        }
        let name = name.trim();
        let length = name.chars().count();
        if length == 0 || length > MAX_NAME_CHARS {
            return Err(QuizError::Validation(format!(
                "name must be 1-{} characters",
                MAX_NAME_CHARS
            )));
        }
        if self.roster.contains(&player_id) {
            return Err(QuizError::invalid_state("player already joined"));
        }

        self.roster.insert(Player {
            id: player_id,
            name: name.to_string(),
            joined_at: now,
        });
        Ok(())
    }

    /// Records (or replaces) the player's answer to the current question.
    pub fn submit(
        &mut self,
        player_id: &str,
        selections: &[usize],
        now: DateTime<Utc>,
    ) -> QuizResult<AnswerRecord> {
        if !self.has_player(player_id) {
            return Err(QuizError::UnknownPlayer);
        }
        if !self.active {
            return Err(QuizError::SessionNotActive);
        }
        let (index, question, started_at) = self.current().ok_or(QuizError::SessionNotStarted)?;

        if window_closed(now, started_at, question.duration_seconds) {
            return Err(QuizError::WindowClosed(index));
        }
        // Only reachable when the clock stepped back after a reveal.
        if self.revealed.contains(&index) {
            return Err(QuizError::AnswersAlreadyRevealed(index));
        }

        let selection = question.resolve(selections)?;
        let record = AnswerRecord {
            question_index: index,
            correct: question.is_correct(&selection),
            selection,
            submitted_at: now,
            answered_within_window: true,
        };
        self.ledger.upsert(player_id, record.clone())?;
        Ok(record)
    }

    /// Whether the correct set of the current question may be shown: its
    /// window has closed, or the session ended while it was open.
    pub fn answers_available(&self, now: DateTime<Utc>) -> bool {
        match self.phase(now) {
            Phase::QuestionClosed(_) => true,
            Phase::Ended => self.position >= 0,
            Phase::Lobby | Phase::QuestionActive(_) => false,
        }
    }

    /// The question index whose answers may be revealed right now.
    pub fn revealable(&self, now: DateTime<Utc>) -> QuizResult<usize> {
        let index = usize::try_from(self.position).map_err(|_| QuizError::SessionNotStarted)?;
        if !self.answers_available(now) {
            return Err(QuizError::NotYetAvailable(index));
        }
        Ok(index)
    }

    pub fn is_revealed(&self, question_index: usize) -> bool {
        self.revealed.contains(&question_index)
    }

    /// Latches the reveal flag. Returns `true` on the first latch.
    pub fn mark_revealed(&mut self, question_index: usize) -> bool {
        self.revealed.insert(question_index)
    }

    pub fn correct_selection(&self, question_index: usize) -> Option<Selection> {
        self.questions
            .get(question_index)
            .map(|q| q.kind.correct_selection())
    }

    pub fn outcome(&self, record: &AnswerRecord) -> Option<QuestionOutcome> {
        let question = self.questions.get(record.question_index)?;
        let started_at = self.started_at(record.question_index)?;
        Some(QuestionOutcome {
            question_index: record.question_index,
            selections: record.selection.indices(),
            correct: record.correct,
            points: if record.correct { question.points } else { 0 },
            question_started_at: started_at,
            submitted_at: record.submitted_at,
            response_time_ms: (record.submitted_at - started_at).num_milliseconds(),
        })
    }

    /// The player's recorded answers, only once the session has ended.
    pub fn player_results(&self, player_id: &str) -> QuizResult<Vec<QuestionOutcome>> {
        if !self.has_player(player_id) {
            return Err(QuizError::NotFound("player"));
        }
        if self.active {
            return Err(QuizError::SessionNotEnded);
        }
        Ok(self
            .ledger
            .for_player(player_id)
            .iter()
            .filter_map(|record| self.outcome(record))
            .collect())
    }
}
