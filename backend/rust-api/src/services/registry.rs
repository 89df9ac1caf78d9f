use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::{QuizError, QuizResult};
use crate::services::session_machine::SessionState;

/// One running (or archived) session.
///
/// Readers load the latest published snapshot without locking. Writers are
/// serialized by `write_lock`, work on a private copy of the timeline and
/// publish it only if the transition succeeded, so a rejected transition
/// leaves no trace. The copy shares the roster and ledger with the published
/// state, so its cost does not grow with the number of players.
pub struct SessionHandle {
    write_lock: Mutex<()>,
    state: ArcSwap<SessionState>,
}

impl SessionHandle {
    pub fn new(state: SessionState) -> Self {
        Self {
            write_lock: Mutex::new(()),
            state: ArcSwap::from_pointee(state),
        }
    }

    pub fn snapshot(&self) -> Arc<SessionState> {
        self.state.load_full()
    }

    pub fn mutate<T>(
        &self,
        transition: impl FnOnce(&mut SessionState) -> QuizResult<T>,
    ) -> QuizResult<T> {
        let _guard = self.write_lock.lock();
        let mut next = SessionState::clone(&self.state.load());
        let out = transition(&mut next)?;
        self.state.store(Arc::new(next));
        Ok(out)
    }
}

/// Session id -> session, and player id -> session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<SessionHandle>>,
    players: DashMap<String, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the session unless its id is taken. Returns `false` on collision.
    pub fn insert(&self, state: SessionState) -> bool {
        match self.sessions.entry(state.id().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(SessionHandle::new(state)));
                true
            }
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn get(&self, session_id: &str) -> QuizResult<Arc<SessionHandle>> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(QuizError::NotFound("session"))
    }

    pub fn register_player(&self, player_id: &str, session_id: &str) {
        self.players
            .insert(player_id.to_string(), session_id.to_string());
    }

    pub fn session_of(&self, player_id: &str) -> Option<String> {
        self.players.get(player_id).map(|entry| entry.value().clone())
    }

    /// Resolves a player id to its session handle.
    pub fn for_player(&self, player_id: &str) -> QuizResult<Arc<SessionHandle>> {
        let session_id = self
            .session_of(player_id)
            .ok_or(QuizError::NotFound("player"))?;
        self.get(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
