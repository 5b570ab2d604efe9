//! TOML-based application configuration.
//!
//! Stores the quiz defaults offered to the user:
//! - Question count, timer mode and feedback mode
//! - Location of the question document
//! - Reveal pause between an answer and the next question
//! - Seconds per question for each level
//!
//! Configuration is stored at `~/.config/codefun/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::plan::{FeedbackMode, LevelTimes, TimerMode, DEFAULT_QUESTION_COUNT};

/// Defaults for a new quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    #[serde(default = "default_timer_mode")]
    pub timer_mode: TimerMode,
    #[serde(default = "default_feedback_mode")]
    pub feedback_mode: FeedbackMode,
    #[serde(default = "default_questions_path")]
    pub questions_path: String,
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/codefun/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub quiz: QuizConfig,
    /// Seconds per question by level.
    #[serde(default)]
    pub levels: LevelTimes,
}

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}
fn default_timer_mode() -> TimerMode {
    TimerMode::PerQuestion
}
fn default_feedback_mode() -> FeedbackMode {
    FeedbackMode::Instant
}
fn default_questions_path() -> String {
    "questions.json".into()
}
fn default_reveal_delay_ms() -> u64 {
    700
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            timer_mode: default_timer_mode(),
            feedback_mode: default_feedback_mode(),
            questions_path: default_questions_path(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn invalid(key: &str, message: impl ToString) -> ConfigError {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| Self::invalid(key, e))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value.parse::<u64>().map_err(|e| Self::invalid(key, e))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| Self::invalid(key, e))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// `levels.<name>` may introduce a new level; every other key must
    /// already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit
    /// the field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| Self::invalid(key, e))?;

        match key.strip_prefix("levels.") {
            Some(level) if !level.is_empty() => {
                let secs = value.parse::<u32>().map_err(|e| Self::invalid(key, e))?;
                let levels = json
                    .get_mut("levels")
                    .and_then(serde_json::Value::as_object_mut)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                levels.insert(level.to_string(), serde_json::Value::Number(secs.into()));
            }
            _ => Self::set_json_value_by_path(&mut json, key, value)?,
        }

        *self = serde_json::from_value(json).map_err(|e| Self::invalid(key, e))?;
        Ok(())
    }

    /// Set a value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }
}
