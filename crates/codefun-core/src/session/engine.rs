//! Quiz session state machine.
//!
//! The session owns every piece of in-progress state and an injected
//! [`Scheduler`]. It has no internal thread: timer ticks and the reveal
//! pause arrive as wakes that the driver feeds back through
//! [`QuizSession::pump`] (or [`QuizSession::on_wake`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> InProgress(0) -> InProgress(1) -> ... -> Completed
//!            |                                       |
//!            +-- total countdown expires ------------+ (time_up)
//! any -> Idle on abort; InProgress | Completed -> InProgress(0) on retry
//! ```
//!
//! Every command returns the events it produced, in order.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampler::sample_questions;
use crate::error::QuizError;
use crate::events::Event;
use crate::plan::{FeedbackMode, SessionPlan, TimerMode};
use crate::question::Question;
use crate::recorder::{final_score, percent, QuizOutcome};
use crate::timer::{format_mm_ss, Countdown, CountdownKind, Scheduler, Tick, TimerHandle, Wake};

/// Pause between locking an answer and showing the next question.
pub const REVEAL_DELAY_MS: u64 = 700;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    InProgress,
    Completed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::InProgress => "in progress",
            SessionState::Completed => "completed",
        }
    }
}

/// How a locked answer turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Unanswered,
}

/// Position within the session for progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// 1-based number of the question on screen.
    pub current: usize,
    pub total: usize,
    pub pct: u32,
}

pub struct QuizSession<S: Scheduler> {
    scheduler: S,
    reveal_delay_ms: u64,
    state: SessionState,
    plan: Option<SessionPlan>,
    questions: Vec<Question>,
    index: usize,
    score: u32,
    /// Answer for the question on screen, once locked.
    selected: Option<usize>,
    submitted: bool,
    /// Locked answer per question, by index.
    selections: Vec<Option<usize>>,
    per_question: Countdown,
    total: Countdown,
    pending_advance: Option<TimerHandle>,
    outcome: Option<QuizOutcome>,
}

impl<S: Scheduler> QuizSession<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            reveal_delay_ms: REVEAL_DELAY_MS,
            state: SessionState::Idle,
            plan: None,
            questions: Vec::new(),
            index: 0,
            score: 0,
            selected: None,
            submitted: false,
            selections: Vec::new(),
            per_question: Countdown::new(CountdownKind::PerQuestion),
            total: Countdown::new(CountdownKind::Total),
            pending_advance: None,
            outcome: None,
        }
    }

    pub fn with_reveal_delay(mut self, delay_ms: u64) -> Self {
        self.reveal_delay_ms = delay_ms;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn plan(&self) -> Option<&SessionPlan> {
        self.plan.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress => self.questions.get(self.index),
            _ => None,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn selections(&self) -> &[Option<usize>] {
        &self.selections
    }

    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    pub fn remaining_per_question_secs(&self) -> u32 {
        self.per_question.remaining_secs()
    }

    pub fn remaining_total_secs(&self) -> u32 {
        self.total.remaining_secs()
    }

    pub fn is_per_question_timer_armed(&self) -> bool {
        self.per_question.is_armed()
    }

    pub fn is_total_timer_armed(&self) -> bool {
        self.total.is_armed()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn progress(&self) -> Progress {
        let total = self.questions.len();
        Progress {
            current: (self.index + 1).min(total),
            total,
            pct: percent(self.index as u32, total as u32),
        }
    }

    /// `MM:SS` of the countdown the plan shows, if any.
    pub fn timer_display(&self) -> Option<String> {
        if self.state == SessionState::Idle {
            return None;
        }
        match self.plan.as_ref()?.timer_mode {
            TimerMode::None => None,
            TimerMode::PerQuestion => Some(format_mm_ss(self.per_question.remaining_secs())),
            TimerMode::Total => Some(format_mm_ss(self.total.remaining_secs())),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            level: self.plan.as_ref().map(|p| p.level.clone()),
            index: self.index,
            total: self.questions.len(),
            score: self.visible_score(),
            progress_pct: self.progress().pct,
            timer_display: self.timer_display(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Sample questions for `plan` from `pool` and show the first one.
    ///
    /// # Errors
    /// `NoQuestionsAvailable` for an empty pool, `MalformedQuestion` when
    /// the first sampled question lacks text or options. The session is
    /// left idle in both cases.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        plan: SessionPlan,
        pool: &[Question],
        rng: &mut R,
    ) -> Result<Vec<Event>, QuizError> {
        self.discard();

        let sampled = sample_questions(pool, plan.question_count as usize, rng);
        let Some(first) = sampled.first() else {
            return Err(QuizError::NoQuestionsAvailable { level: plan.level });
        };
        if !first.is_well_formed() {
            return Err(QuizError::MalformedQuestion { level: plan.level });
        }

        tracing::debug!(
            level = %plan.level,
            requested = plan.question_count,
            sampled = sampled.len(),
            "starting quiz"
        );
        self.plan = Some(plan);
        self.questions = sampled;
        Ok(self.begin())
    }

    /// Lock in an answer for the current question.
    ///
    /// A second answer for the same question is ignored.
    ///
    /// # Errors
    /// `InvalidState` outside a running quiz, `OptionOutOfRange` for an
    /// index the question does not have.
    pub fn submit_answer(&mut self, option: usize) -> Result<Vec<Event>, QuizError> {
        if self.state != SessionState::InProgress {
            return Err(QuizError::InvalidState {
                action: "answer",
                state: self.state.as_str(),
            });
        }
        if self.submitted {
            return Ok(Vec::new());
        }
        let len = self.questions.get(self.index).map_or(0, |q| q.options.len());
        if option >= len {
            return Err(QuizError::OptionOutOfRange { option, len });
        }
        Ok(self.lock_answer(Some(option)))
    }

    /// Per-question countdown ran out: lock an empty answer.
    pub fn expire_per_question_timer(&mut self) -> Vec<Event> {
        if self.state != SessionState::InProgress || self.submitted {
            return Vec::new();
        }
        let mut events = vec![Event::QuestionTimedOut { index: self.index }];
        events.extend(self.lock_answer(None));
        events
    }

    /// Move past an answered question without waiting out the reveal pause.
    pub fn advance(&mut self) -> Vec<Event> {
        if self.state != SessionState::InProgress || !self.submitted {
            return Vec::new();
        }
        if let Some(handle) = self.pending_advance.take() {
            self.scheduler.cancel(handle);
        }
        self.index += 1;
        self.present()
    }

    /// Throw the session away. Nothing is recorded.
    pub fn abort(&mut self) -> Vec<Event> {
        let was_active = self.state != SessionState::Idle;
        self.discard();
        if was_active {
            tracing::debug!("quiz aborted");
            vec![Event::QuizAborted { at: Utc::now() }]
        } else {
            Vec::new()
        }
    }

    /// Replay the same questions in the same order from a clean slate.
    ///
    /// # Errors
    /// `InvalidState` when there is no session to retry.
    pub fn retry(&mut self) -> Result<Vec<Event>, QuizError> {
        if self.state == SessionState::Idle || self.plan.is_none() {
            return Err(QuizError::InvalidState {
                action: "retry",
                state: self.state.as_str(),
            });
        }
        tracing::debug!("quiz retried");
        let mut events = vec![Event::QuizRetried { at: Utc::now() }];
        events.extend(self.begin());
        Ok(events)
    }

    /// Handle one wake from the scheduler. Wakes from cancelled or
    /// replaced timers are ignored.
    pub fn on_wake(&mut self, handle: TimerHandle, wake: Wake) -> Vec<Event> {
        if self.state != SessionState::InProgress {
            return Vec::new();
        }
        match wake {
            Wake::QuestionTick => match self.per_question.tick(&mut self.scheduler, handle) {
                Tick::Stale => Vec::new(),
                Tick::Running { remaining_secs } => vec![Event::TimerTicked {
                    timer: CountdownKind::PerQuestion,
                    remaining_secs,
                }],
                Tick::Expired => {
                    let mut events = vec![Event::TimerTicked {
                        timer: CountdownKind::PerQuestion,
                        remaining_secs: 0,
                    }];
                    events.extend(self.expire_per_question_timer());
                    events
                }
            },
            Wake::TotalTick => match self.total.tick(&mut self.scheduler, handle) {
                Tick::Stale => Vec::new(),
                Tick::Running { remaining_secs } => vec![Event::TimerTicked {
                    timer: CountdownKind::Total,
                    remaining_secs,
                }],
                Tick::Expired => {
                    let mut events = vec![Event::TimerTicked {
                        timer: CountdownKind::Total,
                        remaining_secs: 0,
                    }];
                    events.extend(self.finish(true));
                    events
                }
            },
            Wake::Advance => {
                if self.pending_advance != Some(handle) {
                    return Vec::new();
                }
                self.pending_advance = None;
                self.advance()
            }
        }
    }

    /// Deliver every wake that is due, in deadline order.
    pub fn pump(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((handle, wake)) = self.scheduler.poll_due() {
            events.extend(self.on_wake(handle, wake));
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn visible_score(&self) -> Option<u32> {
        match self.plan.as_ref()?.feedback_mode {
            FeedbackMode::Instant => Some(self.score),
            FeedbackMode::Deferred => None,
        }
    }

    /// Reset run state over the current plan and questions.
    fn begin(&mut self) -> Vec<Event> {
        self.stop_timers();
        self.index = 0;
        self.score = 0;
        self.selected = None;
        self.submitted = false;
        self.selections = vec![None; self.questions.len()];
        self.outcome = None;
        self.per_question.clear();
        self.total.clear();
        self.state = SessionState::InProgress;

        let Some(plan) = self.plan.clone() else {
            return Vec::new();
        };
        if plan.timer_mode == TimerMode::Total {
            let budget = plan.total_budget_secs(self.questions.len());
            self.total.arm(&mut self.scheduler, budget);
        }

        let mut events = vec![Event::QuizStarted {
            level: plan.level,
            question_count: self.questions.len(),
            timer_mode: plan.timer_mode,
            feedback_mode: plan.feedback_mode,
            at: Utc::now(),
        }];
        events.extend(self.present());
        events
    }

    /// Show the question at `index`, or finish past the end.
    fn present(&mut self) -> Vec<Event> {
        self.per_question.disarm(&mut self.scheduler);
        let Some(question) = self.questions.get(self.index).cloned() else {
            return self.finish(false);
        };
        self.selected = None;
        self.submitted = false;

        if let Some(plan) = &self.plan {
            if plan.timer_mode == TimerMode::PerQuestion {
                let secs = plan.time_per_question;
                self.per_question.arm(&mut self.scheduler, secs);
            }
        }

        vec![Event::QuestionPresented {
            index: self.index,
            total: self.questions.len(),
            question: question.question,
            options: question.options,
            progress_pct: self.progress().pct,
            score: self.visible_score(),
        }]
    }

    fn lock_answer(&mut self, selection: Option<usize>) -> Vec<Event> {
        self.submitted = true;
        self.selected = selection;
        if let Some(slot) = self.selections.get_mut(self.index) {
            *slot = selection;
        }
        self.per_question.disarm(&mut self.scheduler);

        let Some(question) = self.questions.get(self.index) else {
            return Vec::new();
        };
        let outcome = match selection {
            Some(sel) if question.is_correct(sel) => AnswerOutcome::Correct,
            Some(_) => AnswerOutcome::Incorrect,
            None => AnswerOutcome::Unanswered,
        };
        let correct_index = question.answer_index;
        let instant = matches!(
            self.plan.as_ref().map(|p| p.feedback_mode),
            Some(FeedbackMode::Instant)
        );
        if instant && outcome == AnswerOutcome::Correct {
            self.score += 1;
        }

        self.pending_advance = Some(
            self.scheduler
                .schedule_once(Wake::Advance, self.reveal_delay_ms),
        );

        vec![Event::AnswerRevealed {
            index: self.index,
            selected: selection,
            correct_index: instant.then_some(correct_index),
            outcome: instant.then_some(outcome),
            score: self.visible_score(),
        }]
    }

    /// Enter `Completed`. Runs at most once per run.
    fn finish(&mut self, time_up: bool) -> Vec<Event> {
        if self.state != SessionState::InProgress {
            return Vec::new();
        }
        self.stop_timers();
        let Some(plan) = self.plan.as_ref() else {
            return Vec::new();
        };

        let score = final_score(plan.feedback_mode, self.score, &self.questions, &self.selections);
        let total = self.questions.len() as u32;
        self.score = score;
        self.state = SessionState::Completed;

        let outcome = QuizOutcome {
            level: plan.level.clone(),
            score,
            total,
            percent: percent(score, total),
            time_up,
            feedback_mode: plan.feedback_mode,
        };
        tracing::info!(
            level = %outcome.level,
            score,
            total,
            time_up,
            "quiz completed"
        );
        self.outcome = Some(outcome.clone());
        vec![Event::QuizCompleted {
            outcome,
            at: Utc::now(),
        }]
    }

    fn stop_timers(&mut self) {
        self.per_question.disarm(&mut self.scheduler);
        self.total.disarm(&mut self.scheduler);
        if let Some(handle) = self.pending_advance.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn discard(&mut self) {
        self.stop_timers();
        self.state = SessionState::Idle;
        self.plan = None;
        self.questions.clear();
        self.selections.clear();
        self.index = 0;
        self.score = 0;
        self.selected = None;
        self.submitted = false;
        self.per_question.clear();
        self.total.clear();
        self.outcome = None;
    }
}
