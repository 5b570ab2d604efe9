//! Final scoring and persistence of completed sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::plan::FeedbackMode;
use crate::question::Question;
use crate::storage::{BestScores, HistoryEntry, HistoryLog, KeyValueStore};

/// Final figures of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub level: String,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
    /// Ended by the session countdown rather than by answering everything.
    pub time_up: bool,
    pub feedback_mode: FeedbackMode,
}

/// `round(score / max(1, total) * 100)`, halves rounding up.
pub fn percent(score: u32, total: u32) -> u32 {
    let total = u64::from(total.max(1));
    ((u64::from(score) * 200 + total) / (2 * total)) as u32
}

/// Score to report at completion.
///
/// Instant mode keeps the running score. Deferred mode re-scans the stored
/// selections; unanswered and never-reached questions count as misses.
pub fn final_score(
    feedback_mode: FeedbackMode,
    running_score: u32,
    questions: &[Question],
    selections: &[Option<usize>],
) -> u32 {
    match feedback_mode {
        FeedbackMode::Instant => running_score,
        FeedbackMode::Deferred => questions
            .iter()
            .enumerate()
            .filter(|(i, q)| {
                selections
                    .get(*i)
                    .copied()
                    .flatten()
                    .is_some_and(|sel| q.is_correct(sel))
            })
            .count() as u32,
    }
}

/// Writes completed sessions to the history log and best-score table.
pub struct ResultRecorder<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> ResultRecorder<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Prepend a history entry and raise the level's best score if beaten.
    ///
    /// Returns the stored entry and the best score after the update.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn record(
        &self,
        outcome: &QuizOutcome,
        at: DateTime<Utc>,
    ) -> Result<(HistoryEntry, u32), StorageError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: at,
            level: outcome.level.clone(),
            score: outcome.score,
            total: outcome.total,
            percent: outcome.percent,
        };
        HistoryLog::new(&self.store).prepend(entry.clone())?;

        let best = BestScores::new(&self.store);
        let improved = best.update(&outcome.level, outcome.score)?;
        let best_score = best.get(&outcome.level)?;

        tracing::info!(
            level = %outcome.level,
            score = outcome.score,
            total = outcome.total,
            percent = outcome.percent,
            time_up = outcome.time_up,
            new_best = improved,
            "quiz result recorded"
        );
        Ok((entry, best_score))
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        HistoryLog::new(&self.store).entries()
    }

    pub fn clear_history(&self) -> Result<(), StorageError> {
        HistoryLog::new(&self.store).clear()
    }

    pub fn best(&self, level: &str) -> Result<u32, StorageError> {
        BestScores::new(&self.store).get(level)
    }
}
