//! # CodeFun Quiz Core Library
//!
//! Core logic for a leveled, timed multiple-choice quiz. All operations are
//! exposed through [`QuizApp`]; the CLI binary is a thin terminal front end
//! over the same library.
//!
//! ## Architecture
//!
//! - **Question Bank**: leveled question pools loaded once from JSON
//! - **Plan**: turns user choices into a frozen [`SessionPlan`]
//! - **Session**: the quiz state machine, driven by scheduler wakes rather
//!   than internal threads
//! - **Timer**: injected [`Scheduler`] with one-second countdowns; a
//!   [`ManualClock`] makes it deterministic under test
//! - **Recorder / Storage**: history log, best scores and theme in a
//!   key-value store (SQLite on disk), TOML configuration
//!
//! ## Key Components
//!
//! - [`QuizApp`]: command dispatch for front ends
//! - [`QuizSession`]: session state machine
//! - [`ResultRecorder`]: scoring and persistence on completion
//! - [`Config`]: application configuration management

pub mod app;
pub mod error;
pub mod events;
pub mod plan;
pub mod question;
pub mod recorder;
pub mod session;
pub mod storage;
pub mod timer;

pub use app::{QuizApp, StartOptions};
pub use error::{ConfigError, CoreError, QuizError, StorageError};
pub use events::Event;
pub use plan::{derive_plan, FeedbackMode, LevelTimes, SessionPlan, TimerMode};
pub use question::{LevelSummary, Question, QuestionBank};
pub use recorder::{QuizOutcome, ResultRecorder};
pub use session::{AnswerOutcome, Progress, QuizSession, SessionState};
pub use storage::{Config, HistoryEntry, KeyValueStore, MemoryStore, SqliteStore, Theme};
pub use timer::{Clock, ManualClock, Scheduler, SystemClock, TimerQueue};
