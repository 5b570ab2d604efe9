//! Command dispatch for the presentation layer.
//!
//! [`QuizApp`] is the only thing a front end talks to. It exposes the user
//! actions (select a level, start, answer, quit, retry) plus [`QuizApp::pump`]
//! for delivering due timer wakes, and returns the resulting events. When a
//! session completes the result is recorded before the events are handed
//! back, so a `QuizCompleted` event is always followed by `ResultRecorded`.

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::error::{QuizError, Result};
use crate::events::Event;
use crate::plan::{derive_plan, FeedbackMode, LevelTimes, TimerMode};
use crate::question::QuestionBank;
use crate::recorder::ResultRecorder;
use crate::session::QuizSession;
use crate::storage::{KeyValueStore, QuizConfig};
use crate::timer::Scheduler;

/// User choices from the configuration dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOptions {
    pub question_count: u32,
    pub timer_mode: TimerMode,
    pub feedback_mode: FeedbackMode,
}

impl From<&QuizConfig> for StartOptions {
    fn from(cfg: &QuizConfig) -> Self {
        Self {
            question_count: cfg.question_count,
            timer_mode: cfg.timer_mode,
            feedback_mode: cfg.feedback_mode,
        }
    }
}

pub struct QuizApp<S: Scheduler, K: KeyValueStore> {
    bank: QuestionBank,
    level_times: LevelTimes,
    selected_level: Option<String>,
    session: QuizSession<S>,
    recorder: ResultRecorder<K>,
    rng: Pcg64,
}

impl<S: Scheduler, K: KeyValueStore> QuizApp<S, K> {
    pub fn new(
        bank: QuestionBank,
        level_times: LevelTimes,
        session: QuizSession<S>,
        recorder: ResultRecorder<K>,
    ) -> Self {
        Self {
            bank,
            level_times,
            selected_level: None,
            session,
            recorder,
            rng: Pcg64::seed_from_u64(rand::random()),
        }
    }

    /// Fix the shuffle seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg64::seed_from_u64(seed);
        self
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn level_times(&self) -> &LevelTimes {
        &self.level_times
    }

    pub fn session(&self) -> &QuizSession<S> {
        &self.session
    }

    pub fn recorder(&self) -> &ResultRecorder<K> {
        &self.recorder
    }

    pub fn selected_level(&self) -> Option<&str> {
        self.selected_level.as_deref()
    }

    /// Milliseconds until the next timer wake, if any is pending.
    pub fn until_next_wake_ms(&self) -> Option<u64> {
        self.session.scheduler().until_next_ms()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// # Errors
    /// `NoQuestionsAvailable` when the bank has no such level.
    pub fn select_level(&mut self, level: &str) -> Result<Vec<Event>> {
        if !self.bank.contains(level) {
            return Err(QuizError::NoQuestionsAvailable {
                level: level.to_string(),
            }
            .into());
        }
        self.selected_level = Some(level.to_string());
        Ok(vec![Event::LevelSelected {
            level: level.to_string(),
        }])
    }

    /// Derive a plan for the selected level and start the session.
    ///
    /// # Errors
    /// `InvalidConfiguration` without a selected level. `NoQuestionsAvailable`
    /// and `MalformedQuestion` also clear the selection, returning the user
    /// to level selection.
    pub fn start(&mut self, options: StartOptions) -> Result<Vec<Event>> {
        let plan = derive_plan(
            self.selected_level.as_deref(),
            options.question_count,
            options.feedback_mode,
            options.timer_mode,
            &self.level_times,
        )?;

        let pool = self.bank.pool(&plan.level);
        match self.session.start(plan, pool, &mut self.rng) {
            Ok(events) => Ok(events),
            Err(err) => {
                tracing::warn!(error = %err, "quiz could not start");
                self.quit();
                Err(err.into())
            }
        }
    }

    /// # Errors
    /// Propagates session errors. Storage failures while recording surface
    /// as `Event::RecordFailed`.
    pub fn submit_answer(&mut self, option: usize) -> Result<Vec<Event>> {
        let events = self.session.submit_answer(option)?;
        self.settle(events)
    }

    /// Skip the rest of the reveal pause.
    pub fn advance(&mut self) -> Result<Vec<Event>> {
        let events = self.session.advance();
        self.settle(events)
    }

    /// Deliver due timer wakes.
    pub fn pump(&mut self) -> Result<Vec<Event>> {
        let events = self.session.pump();
        self.settle(events)
    }

    /// Abandon the session and return to level selection.
    pub fn quit(&mut self) -> Vec<Event> {
        self.selected_level = None;
        self.session.abort()
    }

    /// # Errors
    /// `InvalidState` when there is nothing to retry.
    pub fn retry(&mut self) -> Result<Vec<Event>> {
        let events = self.session.retry()?;
        self.settle(events)
    }

    /// Record any completion among `events`.
    ///
    /// A storage failure becomes a `RecordFailed` event in place of
    /// `ResultRecorded`, so the rest of the batch still reaches the caller.
    fn settle(&mut self, events: Vec<Event>) -> Result<Vec<Event>> {
        let mut out = Vec::with_capacity(events.len() + 1);
        for event in events {
            let recorded = match &event {
                Event::QuizCompleted { outcome, .. } => {
                    Some(match self.recorder.record(outcome, Utc::now()) {
                        Ok((entry, best_score)) => Event::ResultRecorded { entry, best_score },
                        Err(err) => {
                            tracing::error!(level = %outcome.level, error = %err, "failed to record result");
                            Event::RecordFailed {
                                level: outcome.level.clone(),
                                message: err.to_string(),
                            }
                        }
                    })
                }
                _ => None,
            };
            out.push(event);
            out.extend(recorded);
        }
        Ok(out)
    }
}
