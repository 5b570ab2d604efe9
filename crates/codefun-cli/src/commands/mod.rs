pub mod best;
pub mod config;
pub mod history;
pub mod levels;
pub mod play;
pub mod theme;

use std::path::{Path, PathBuf};

use codefun_core::storage::data_dir;
use codefun_core::{Config, QuestionBank};

/// Where to read questions from.
///
/// An explicit path wins. A relative configured path is looked up in the
/// working directory first, then in the data directory.
pub fn questions_path(config: &Config, explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let configured = PathBuf::from(&config.quiz.questions_path);
    if configured.is_absolute() || configured.exists() {
        return configured;
    }
    match data_dir() {
        Ok(dir) if dir.join(&configured).exists() => dir.join(configured),
        _ => configured,
    }
}

/// Load the question bank. A failure here is fatal for quiz commands.
pub fn load_bank(
    config: &Config,
    explicit: Option<&Path>,
) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let path = questions_path(config, explicit);
    Ok(QuestionBank::load(&path)?)
}
