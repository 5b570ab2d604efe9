//! Session configuration.
//!
//! Turns the user's choices (level, question count, timer mode, feedback
//! mode) into a frozen [`SessionPlan`]. Seconds per question come from a
//! per-level table; levels missing from the table run without a timer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Question count used when the user leaves the field empty or zero.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    None,
    /// Budget resets at every question.
    #[serde(rename = "per", alias = "perquestion", alias = "per_question")]
    PerQuestion,
    /// One shared budget across the whole session.
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// Reveal correctness after every question.
    Instant,
    /// Reveal only at the end of the session.
    #[serde(alias = "final")]
    Deferred,
}

impl std::str::FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(TimerMode::None),
            "per" | "per-question" | "per_question" | "perquestion" => Ok(TimerMode::PerQuestion),
            "total" => Ok(TimerMode::Total),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

impl std::str::FromStr for FeedbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instant" => Ok(FeedbackMode::Instant),
            "deferred" | "final" => Ok(FeedbackMode::Deferred),
            other => Err(format!("unknown feedback mode: {other}")),
        }
    }
}

/// Seconds allowed per question, keyed by level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTimes(IndexMap<String, u32>);

impl Default for LevelTimes {
    fn default() -> Self {
        let mut table = IndexMap::new();
        table.insert("7-11".to_string(), 20);
        table.insert("12-15".to_string(), 15);
        table.insert("16-18".to_string(), 10);
        Self(table)
    }
}

impl LevelTimes {
    pub fn new(table: IndexMap<String, u32>) -> Self {
        Self(table)
    }

    pub fn seconds_for(&self, level: &str) -> Option<u32> {
        self.0.get(level).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.0.iter()
    }
}

/// Frozen configuration for one quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub level: String,
    pub question_count: u32,
    pub timer_mode: TimerMode,
    pub feedback_mode: FeedbackMode,
    pub time_per_question: u32,
}

impl SessionPlan {
    /// Total-mode budget for the number of questions actually sampled.
    pub fn total_budget_secs(&self, actual_question_count: usize) -> u32 {
        self.time_per_question
            .saturating_mul(u32::try_from(actual_question_count).unwrap_or(u32::MAX))
    }
}

/// Derive a plan from user choices.
///
/// A zero `question_count` falls back to [`DEFAULT_QUESTION_COUNT`]. Levels
/// without an entry in `times` force [`TimerMode::None`].
///
/// # Errors
/// Returns `QuizError::InvalidConfiguration` when no level is selected.
pub fn derive_plan(
    level: Option<&str>,
    question_count: u32,
    feedback_mode: FeedbackMode,
    timer_mode: TimerMode,
    times: &LevelTimes,
) -> Result<SessionPlan, QuizError> {
    let level = level
        .filter(|l| !l.is_empty())
        .ok_or(QuizError::InvalidConfiguration)?;

    let question_count = if question_count == 0 {
        DEFAULT_QUESTION_COUNT
    } else {
        question_count
    };

    let (timer_mode, time_per_question) = match times.seconds_for(level) {
        Some(secs) => (timer_mode, secs),
        None => (TimerMode::None, 0),
    };

    Ok(SessionPlan {
        level: level.to_string(),
        question_count,
        timer_mode,
        feedback_mode,
        time_per_question,
    })
}
