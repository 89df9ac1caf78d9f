use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

use crate::error::{QuizError, QuizResult};
use crate::metrics::{record_submission, PLAYERS_JOINED_TOTAL, SESSIONS_ACTIVE, SESSIONS_TOTAL};
use crate::models::{
    AdminStatus, AdvanceOutcome, AnswerRecord, Game, QuestionOutcome, QuestionView, RevealResponse,
    SessionResults, StatusSnapshot,
};
use crate::services::clock::Clock;
use crate::services::game_store::GameStore;
use crate::services::reconciliation;
use crate::services::registry::{SessionHandle, SessionRegistry};
use crate::services::scoring;
use crate::services::session_machine::SessionState;
use crate::utils::retry::{with_retry, RetryPolicy};

const SESSION_CODE_ATTEMPTS: usize = 32;

/// Entry point for every session operation. Admin operations take the
/// verified admin identity; player operations take the opaque player id.
pub struct SessionService {
    registry: SessionRegistry,
    games: Arc<dyn GameStore>,
    clock: Arc<dyn Clock>,
    /// Serializes start/archive per game so a game never gets two active sessions.
    game_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
    leaderboard_size: Option<usize>,
    archive_retry: RetryPolicy,
}

impl SessionService {
    pub fn new(games: Arc<dyn GameStore>, clock: Arc<dyn Clock>, leaderboard_size: usize) -> Self {
        Self {
            registry: SessionRegistry::new(),
            games,
            clock,
            game_locks: DashMap::new(),
            leaderboard_size: Some(leaderboard_size),
            archive_retry: RetryPolicy::default(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn game_lock(&self, game_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.game_locks
            .entry(game_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn authorize(state: &SessionState, admin_id: &str) -> QuizResult<()> {
        if state.owner() != admin_id {
            tracing::warn!(
                session_id = state.id(),
                admin_id,
                "Admin does not own this session"
            );
            return Err(QuizError::Forbidden);
        }
        Ok(())
    }

    fn owned_session(&self, admin_id: &str, session_id: &str) -> QuizResult<Arc<SessionHandle>> {
        let handle = self.registry.get(session_id)?;
        Self::authorize(&handle.snapshot(), admin_id)?;
        Ok(handle)
    }

    pub async fn start(&self, admin_id: &str, game_id: &str) -> QuizResult<String> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self
            .games
            .get_game(game_id)
            .await?
            .ok_or(QuizError::NotFound("game"))?;
        if game.owner != admin_id {
            return Err(QuizError::Forbidden);
        }

        if let Some(active_id) = game.active_session_id.take() {
            let still_running = self
                .registry
                .get(&active_id)
                .map(|handle| handle.snapshot().is_active())
                .unwrap_or(false);
            if still_running {
                return Err(QuizError::invalid_state(format!(
                    "game already has active session {}",
                    active_id
                )));
            }
            tracing::warn!(game_id, session_id = %active_id, "Archiving stale active session");
            if !game.historical_session_ids.contains(&active_id) {
                game.historical_session_ids.push(active_id);
            }
        }

        let now = self.clock.now();
        let session_id = self.register_session(&game, now)?;

        game.active_session_id = Some(session_id.clone());
        if let Err(err) = self.games.put_game(&game).await {
            self.registry.remove(&session_id);
            tracing::error!(game_id, "Failed to record active session: {:#}", err);
            return Err(err.into());
        }

        SESSIONS_TOTAL.with_label_values(&["started"]).inc();
        SESSIONS_ACTIVE.inc();
        tracing::info!(game_id, session_id = %session_id, admin_id, "Session started");

        Ok(session_id)
    }

    fn register_session(&self, game: &Game, now: DateTime<Utc>) -> QuizResult<String> {
        let mut rng = rand::rng();
        for _ in 0..SESSION_CODE_ATTEMPTS {
            let code = rng.random_range(100_000..1_000_000u32).to_string();
            if self.registry.contains(&code) {
                continue;
            }
            let state = SessionState::new(code.clone(), game, now)?;
            if self.registry.insert(state) {
                return Ok(code);
            }
        }
        Err(QuizError::Internal(anyhow!("could not allocate a free session code")))
    }

    pub async fn advance(&self, admin_id: &str, session_id: &str) -> QuizResult<AdvanceOutcome> {
        let handle = self.owned_session(admin_id, session_id)?;
        let outcome = handle.mutate(|s| s.advance(self.clock.now()))?;

        if outcome.ended {
            tracing::info!(session_id, "Advanced past last question, session ended");
            self.on_ended(&handle).await?;
        } else {
            tracing::info!(session_id, position = outcome.position, "Question started");
        }
        Ok(outcome)
    }

    pub async fn end(&self, admin_id: &str, session_id: &str) -> QuizResult<()> {
        let handle = self.owned_session(admin_id, session_id)?;
        handle.mutate(|s| s.end(self.clock.now()))?;
        tracing::info!(session_id, "Session ended by admin");
        self.on_ended(&handle).await
    }

    async fn on_ended(&self, handle: &SessionHandle) -> QuizResult<()> {
        SESSIONS_TOTAL.with_label_values(&["ended"]).inc();
        SESSIONS_ACTIVE.dec();

        let state = handle.snapshot();
        self.archive(state.game_id(), state.id()).await
    }

    /// Moves the session id from the game's active slot into its history.
    async fn archive(&self, game_id: &str, session_id: &str) -> QuizResult<()> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        with_retry(&self.archive_retry, || async {
            let mut game = self
                .games
                .get_game(game_id)
                .await?
                .ok_or_else(|| anyhow!("game {} disappeared", game_id))?;
            if game.active_session_id.as_deref() == Some(session_id) {
                game.active_session_id = None;
            }
            if !game.historical_session_ids.iter().any(|id| id == session_id) {
                game.historical_session_ids.push(session_id.to_string());
            }
            self.games.put_game(&game).await
        })
        .await
        .map_err(|err| {
            tracing::error!(game_id, session_id, "Failed to archive session: {:#}", err);
            QuizError::Internal(err)
        })
    }

    pub fn join(&self, session_id: &str, name: &str) -> QuizResult<String> {
        let handle = self.registry.get(session_id)?;
        let player_id = Uuid::new_v4().to_string();
        handle.mutate(|s| s.join(player_id.clone(), name, self.clock.now()))?;
        self.registry.register_player(&player_id, session_id);

        PLAYERS_JOINED_TOTAL.inc();
        tracing::info!(session_id, player_id = %player_id, "Player joined");
        Ok(player_id)
    }

    pub fn session_status(&self, session_id: &str) -> QuizResult<StatusSnapshot> {
        let state = self.registry.get(session_id)?.snapshot();
        Ok(reconciliation::status(&state, self.clock.now()))
    }

    pub fn player_status(&self, player_id: &str) -> QuizResult<StatusSnapshot> {
        let state = self.registry.for_player(player_id)?.snapshot();
        Ok(reconciliation::status(&state, self.clock.now()))
    }

    pub fn admin_status(&self, admin_id: &str, session_id: &str) -> QuizResult<AdminStatus> {
        let state = self.owned_session(admin_id, session_id)?.snapshot();
        Ok(reconciliation::admin_status(&state, self.clock.now()))
    }

    pub fn current_question(&self, player_id: &str) -> QuizResult<QuestionView> {
        let state = self.registry.for_player(player_id)?.snapshot();
        reconciliation::current_question(&state, self.clock.now())
    }

    pub fn submit_answer(&self, player_id: &str, selections: &[usize]) -> QuizResult<AnswerRecord> {
        let handle = self
            .registry
            .for_player(player_id)
            .map_err(|_| QuizError::UnknownPlayer)?;

        match handle.mutate(|s| s.submit(player_id, selections, self.clock.now())) {
            Ok(record) => {
                record_submission(if record.correct { "correct" } else { "incorrect" });
                tracing::debug!(
                    player_id,
                    question = record.question_index,
                    "Answer recorded"
                );
                Ok(record)
            }
            Err(err) => {
                record_submission(err.code());
                tracing::debug!(player_id, "Answer rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Correct options of the current question once its window closed.
    /// The first successful call latches the question as revealed.
    pub fn reveal_answers(&self, player_id: &str) -> QuizResult<RevealResponse> {
        let handle = self.registry.for_player(player_id)?;
        let snapshot = handle.snapshot();
        let mut index = snapshot.revealable(self.clock.now())?;

        if !snapshot.is_revealed(index) {
            index = handle.mutate(|s| {
                let index = s.revealable(self.clock.now())?;
                if s.mark_revealed(index) {
                    tracing::info!(session_id = s.id(), question = index, "Answers revealed");
                }
                Ok(index)
            })?;
        }

        let question = &snapshot.questions()[index];
        let correct = question.kind.correct_selection().indices();
        let texts = question.kind.option_texts();
        Ok(RevealResponse {
            question_index: index,
            correct_text: correct.iter().map(|i| texts[*i].clone()).collect(),
            correct,
        })
    }

    pub fn player_results(&self, player_id: &str) -> QuizResult<Vec<QuestionOutcome>> {
        let state = self.registry.for_player(player_id)?.snapshot();
        state.player_results(player_id)
    }

    pub fn session_results(&self, admin_id: &str, session_id: &str) -> QuizResult<SessionResults> {
        let state = self.owned_session(admin_id, session_id)?.snapshot();
        scoring::aggregate(&state, self.leaderboard_size)
    }
}
