//! Leveled question bank.
//!
//! The bank is loaded once from a JSON document of the form
//!
//! ```text
//! { "<level>": [ { "question": "...", "options": ["..", ".."], "answerIndex": 0 }, ... ] }
//! ```
//!
//! and is read-only afterwards. Level order follows the document order.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "answerIndex", alias = "answer_index")]
    pub answer_index: usize,
}

impl Question {
    pub fn new(question: impl Into<String>, options: &[&str], answer_index: usize) -> Self {
        Self {
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer_index,
        }
    }

    /// Text present and at least two options to choose from.
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && self.options.len() >= 2
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer_index
    }
}

/// Level name plus how many questions it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level: String,
    pub question_count: usize,
}

/// Immutable mapping from level identifier to its question pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    levels: IndexMap<String, Vec<Question>>,
}

impl QuestionBank {
    pub fn new(levels: IndexMap<String, Vec<Question>>) -> Self {
        Self { levels }
    }

    /// Read and parse a question document from disk.
    ///
    /// # Errors
    /// Returns `QuizError::LoadFailure` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, QuizError> {
        let source_name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| QuizError::LoadFailure {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content, &source_name)
    }

    /// Parse a question document.
    ///
    /// Structural problems (non-array options, missing `answerIndex`),
    /// questions with fewer than two options and answer indices pointing
    /// past the options fail the whole load. Empty text is tolerated here
    /// and rejected when a session starts.
    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, QuizError> {
        let levels: IndexMap<String, Vec<Question>> =
            serde_json::from_str(content).map_err(|e| QuizError::LoadFailure {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;

        for (level, questions) in &levels {
            for (i, q) in questions.iter().enumerate() {
                if q.options.len() < 2 {
                    return Err(QuizError::LoadFailure {
                        source_name: source_name.to_string(),
                        message: format!(
                            "level '{level}' question {}: needs at least 2 options, found {}",
                            i + 1,
                            q.options.len()
                        ),
                    });
                }
                if q.answer_index >= q.options.len() {
                    return Err(QuizError::LoadFailure {
                        source_name: source_name.to_string(),
                        message: format!(
                            "level '{level}' question {}: answerIndex {} out of range for {} options",
                            i + 1,
                            q.answer_index,
                            q.options.len()
                        ),
                    });
                }
            }
        }

        tracing::debug!(source = source_name, levels = levels.len(), "question bank loaded");
        Ok(Self { levels })
    }

    /// Levels in document order with their pool sizes.
    pub fn levels(&self) -> Vec<LevelSummary> {
        self.levels
            .iter()
            .map(|(level, qs)| LevelSummary {
                level: level.clone(),
                question_count: qs.len(),
            })
            .collect()
    }

    pub fn contains(&self, level: &str) -> bool {
        self.levels.contains_key(level)
    }

    /// Question pool for a level; empty for unknown levels.
    pub fn pool(&self, level: &str) -> &[Question] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "7-11": [
            { "question": "What does print do?", "options": ["Shows text", "Deletes"], "answerIndex": 0 },
            { "question": "2 + 2?", "options": ["3", "4", "5"], "answerIndex": 1 }
        ],
        "12-15": [
            { "question": "A loop repeats?", "options": ["Yes", "No"], "answerIndex": 0 }
        ]
    }"#;

    #[test]
    fn parses_levels_in_document_order() {
        let bank = QuestionBank::from_json_str(DOC, "inline").unwrap();
        let levels = bank.levels();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].level, "7-11");
        assert_eq!(levels[0].question_count, 2);
        assert_eq!(levels[1].level, "12-15");
        assert_eq!(bank.pool("7-11")[1].answer_index, 1);
    }

    #[test]
    fn unknown_level_has_empty_pool() {
        let bank = QuestionBank::from_json_str(DOC, "inline").unwrap();
        assert!(bank.pool("99").is_empty());
        assert!(!bank.contains("99"));
    }

    #[test]
    fn malformed_document_is_load_failure() {
        let err = QuestionBank::from_json_str("{ not json", "inline").unwrap_err();
        assert!(matches!(err, QuizError::LoadFailure { .. }));

        let err = QuestionBank::from_json_str(
            r#"{ "A": [ { "question": "q", "options": "nope", "answerIndex": 0 } ] }"#,
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, QuizError::LoadFailure { .. }));
    }

    #[test]
    fn answer_index_out_of_range_is_rejected() {
        let err = QuestionBank::from_json_str(
            r#"{ "A": [ { "question": "q", "options": ["a", "b"], "answerIndex": 2 } ] }"#,
            "inline",
        )
        .unwrap_err();
        match err {
            QuizError::LoadFailure { message, .. } => assert!(message.contains("out of range")),
            other => panic!("Expected LoadFailure, got {other:?}"),
        }
    }

    #[test]
    fn questions_need_two_options() {
        for options in [r#"[]"#, r#"["only"]"#] {
            let doc = format!(
                r#"{{ "A": [
                    {{ "question": "fine", "options": ["a", "b"], "answerIndex": 0 }},
                    {{ "question": "short", "options": {options}, "answerIndex": 0 }}
                ] }}"#
            );
            match QuestionBank::from_json_str(&doc, "inline").unwrap_err() {
                QuizError::LoadFailure { message, .. } => {
                    assert!(message.contains("question 2"), "{message}");
                    assert!(message.contains("at least 2 options"), "{message}");
                }
                other => panic!("Expected LoadFailure, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_options_field_is_rejected() {
        let err = QuestionBank::from_json_str(
            r#"{ "A": [ { "question": "q", "answerIndex": 0 } ] }"#,
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, QuizError::LoadFailure { .. }));
    }

    #[test]
    fn empty_text_loads_but_is_not_well_formed() {
        let bank = QuestionBank::from_json_str(
            r#"{ "A": [ { "question": "", "options": ["a", "b"], "answerIndex": 1 } ] }"#,
            "inline",
        )
        .unwrap();
        assert!(!bank.pool("A")[0].is_well_formed());
    }

    #[test]
    fn missing_file_is_load_failure() {
        let err = QuestionBank::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, QuizError::LoadFailure { .. }));
    }

    #[test]
    fn well_formed_requires_text_and_two_options() {
        assert!(Question::new("q", &["a", "b"], 0).is_well_formed());
        assert!(!Question::new("", &["a", "b"], 0).is_well_formed());
        assert!(!Question::new("q", &["a"], 0).is_well_formed());
    }
}
