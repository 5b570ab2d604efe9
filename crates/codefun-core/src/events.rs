use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::{FeedbackMode, TimerMode};
use crate::recorder::QuizOutcome;
use crate::session::{AnswerOutcome, SessionState};
use crate::storage::HistoryEntry;
use crate::timer::CountdownKind;

/// Every state change in the quiz produces an Event.
/// The presentation layer renders them; it never mutates the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    LevelSelected {
        level: String,
    },
    QuizStarted {
        level: String,
        question_count: usize,
        timer_mode: TimerMode,
        feedback_mode: FeedbackMode,
        at: DateTime<Utc>,
    },
    QuestionPresented {
        index: usize,
        total: usize,
        question: String,
        options: Vec<String>,
        progress_pct: u32,
        /// Running score; hidden in deferred mode.
        score: Option<u32>,
    },
    TimerTicked {
        timer: CountdownKind,
        remaining_secs: u32,
    },
    /// The per-question countdown ran out before an answer.
    QuestionTimedOut {
        index: usize,
    },
    /// Answer locked in. Correctness fields are `None` in deferred mode.
    AnswerRevealed {
        index: usize,
        selected: Option<usize>,
        correct_index: Option<usize>,
        outcome: Option<AnswerOutcome>,
        score: Option<u32>,
    },
    QuizCompleted {
        outcome: QuizOutcome,
        at: DateTime<Utc>,
    },
    /// Completion persisted to history; `best_score` is after the update.
    ResultRecorded {
        entry: HistoryEntry,
        best_score: u32,
    },
    /// Completion could not be persisted. The quiz itself still completed.
    RecordFailed {
        level: String,
        message: String,
    },
    QuizAborted {
        at: DateTime<Utc>,
    },
    QuizRetried {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        level: Option<String>,
        index: usize,
        total: usize,
        score: Option<u32>,
        progress_pct: u32,
        /// `MM:SS` of the visible countdown, `None` when no timer runs.
        timer_display: Option<String>,
        at: DateTime<Utc>,
    },
}
