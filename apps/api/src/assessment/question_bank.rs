use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::assessment::models::{
    AnswerOption, DifficultyTier, Question, OPTIONS_PER_QUESTION, OPTION_LABELS,
};
use crate::assessment::scoring::normalize_answer;

const EMBEDDED_BANK: &str = include_str!("../../data/questions.json");

/// Search queries shorter than this return nothing.
pub const MIN_SEARCH_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question '{id}': {reason}")]
    Invalid { id: String, reason: String },

    #[error("duplicate question id '{0}'")]
    DuplicateId(String),
}

/// On-disk shape. Options are a plain list; labels are assigned by position.
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    id: String,
    text: String,
    domain: String,
    tier: DifficultyTier,
    options: Vec<String>,
    correct_answer: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionBankError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: String| QuestionBankError::Invalid {
            id: record.id.clone(),
            reason,
        };

        if record.id.trim().is_empty() {
            return Err(invalid("id is empty".to_string()));
        }
        if record.text.trim().is_empty() {
            return Err(invalid("text is empty".to_string()));
        }
        if record.domain.trim().is_empty() {
            return Err(invalid("domain is empty".to_string()));
        }
        if record.options.len() != OPTIONS_PER_QUESTION {
            return Err(invalid(format!(
                "expected {OPTIONS_PER_QUESTION} options, found {}",
                record.options.len()
            )));
        }
        let wanted = normalize_answer(&record.correct_answer);
        if !record.options.iter().any(|o| normalize_answer(o) == wanted) {
            return Err(invalid(format!(
                "correct answer '{}' is not one of the options",
                record.correct_answer
            )));
        }

        let mut texts = record.options.into_iter();
        let options = OPTION_LABELS.map(|label| AnswerOption {
            label,
            text: texts.next().unwrap_or_default(),
        });

        Ok(Question {
            id: record.id,
            text: record.text,
            domain: record.domain,
            tier: record.tier,
            options,
            correct_answer: record.correct_answer,
        })
    }
}

/// Immutable catalog of quiz questions, loaded once at startup.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(QuestionBankError::DuplicateId(q.id.clone()));
            }
        }
        Ok(Self { questions })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, QuestionBankError> {
        let records: Vec<QuestionRecord> = serde_json::from_str(raw)?;
        let questions = records
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuestionBankError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn embedded() -> Result<Self, QuestionBankError> {
        Self::from_json_str(EMBEDDED_BANK)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions of one tier, in bank order.
    pub fn pool(&self, tier: DifficultyTier) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.tier == tier).collect()
    }

    pub fn tier_counts(&self) -> Vec<(DifficultyTier, usize)> {
        DifficultyTier::ALL
            .into_iter()
            .map(|t| (t, self.questions.iter().filter(|q| q.tier == t).count()))
            .collect()
    }

    /// Distinct domains in first-seen order.
    pub fn domains(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|q| q.domain.as_str())
            .filter(|d| seen.insert(*d))
            .collect()
    }

    /// Question texts containing `query`, case-insensitive.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }
        self.questions
            .iter()
            .filter(|q| q.text.to_lowercase().contains(&needle))
            .map(|q| q.text.as_str())
            .collect()
    }
}
