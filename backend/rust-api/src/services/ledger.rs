use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::error::{QuizError, QuizResult};
use crate::models::AnswerRecord;

/// Per player, per question: at most one submission. A later submission
/// for the same question replaces the earlier one.
///
/// Shared by every snapshot of a session, so a write touches one player
/// entry instead of copying the whole ledger. Once frozen (session ended)
/// it rejects further writes.
#[derive(Debug, Default)]
pub struct AnswerLedger {
    entries: DashMap<String, BTreeMap<usize, AnswerRecord>>,
    frozen: AtomicBool,
}

impl AnswerLedger {
    /// Returns the record it replaced, if any.
    pub fn upsert(&self, player_id: &str, record: AnswerRecord) -> QuizResult<Option<AnswerRecord>> {
        if self.is_frozen() {
            return Err(QuizError::SessionNotActive);
        }
        Ok(self
            .entries
            .entry(player_id.to_string())
            .or_default()
            .insert(record.question_index, record))
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn get(&self, player_id: &str, question_index: usize) -> Option<AnswerRecord> {
        self.entries
            .get(player_id)?
            .get(&question_index)
            .cloned()
    }

    /// A player's submissions ordered by question index.
    pub fn for_player(&self, player_id: &str) -> Vec<AnswerRecord> {
        self.entries
            .get(player_id)
            .map(|answers| answers.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn for_question(&self, question_index: usize) -> Vec<(String, AnswerRecord)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .get(&question_index)
                    .map(|record| (entry.key().clone(), record.clone()))
            })
            .collect()
    }

    pub fn answered_count(&self, question_index: usize) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().contains_key(&question_index))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
