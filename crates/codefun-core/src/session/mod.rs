mod engine;
mod sampler;

pub use engine::{AnswerOutcome, Progress, QuizSession, SessionState, REVEAL_DELAY_MS};
pub use sampler::sample_questions;
