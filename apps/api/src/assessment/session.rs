use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::assessment::models::{
    AnswerOption, AnswerRecord, AssessmentResult, DifficultyTier, Question, OPTIONS_PER_QUESTION,
};
use crate::assessment::question_bank::QuestionBank;
use crate::assessment::sampler::{sample_questions, SampleRange};
use crate::assessment::scoring::build_result;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("question '{0}' is not part of this session")]
    UnknownQuestion(String),

    #[error("'{choice}' is not an option of question '{question_id}'")]
    InvalidChoice { question_id: String, choice: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    Selecting,
    InProgress { index: usize },
    Scored { result: AssessmentResult },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Selecting => "selecting",
            SessionState::InProgress { .. } => "in_progress",
            SessionState::Scored { .. } => "scored",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    Started,
    NoQuestionsAvailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved { index: usize },
    Scored(AssessmentResult),
}

/// One user's in-flight assessment. The answer record is owned here and
/// discarded with the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub tier: Option<DifficultyTier>,
    pub state: SessionState,
    pub questions: Vec<Question>,
    pub answers: AnswerRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every successful save; 0 until first saved.
    #[serde(default)]
    pub version: u64,
}

impl AssessmentSession {
    pub fn new(user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            tier: None,
            state: SessionState::Selecting,
            questions: Vec::new(),
            answers: AnswerRecord::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state.name(),
        }
    }

    /// Samples questions for `tier_label`. A label naming no known tier, or a
    /// tier with no questions, leaves the session in `Selecting`.
    pub fn choose_tier<R: Rng>(
        &mut self,
        tier_label: &str,
        bank: &QuestionBank,
        range: SampleRange,
        rng: &mut R,
    ) -> Result<TierOutcome, SessionError> {
        if self.state != SessionState::Selecting {
            return Err(self.invalid("choose a tier"));
        }

        let Ok(tier) = tier_label.parse::<DifficultyTier>() else {
            return Ok(TierOutcome::NoQuestionsAvailable);
        };
        let questions = sample_questions(bank, tier, range, rng);
        if questions.is_empty() {
            return Ok(TierOutcome::NoQuestionsAvailable);
        }

        self.tier = Some(tier);
        self.questions = questions;
        self.answers.clear();
        self.state = SessionState::InProgress { index: 0 };
        self.touch();
        Ok(TierOutcome::Started)
    }

    /// Upserts the answer for `question_id`.
    pub fn select_answer(&mut self, question_id: &str, choice: &str) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::InProgress { .. }) {
            return Err(self.invalid("select an answer"));
        }
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;
        if !question.has_option(choice) {
            return Err(SessionError::InvalidChoice {
                question_id: question_id.to_string(),
                choice: choice.to_string(),
            });
        }

        self.answers
            .insert(question_id.to_string(), choice.to_string());
        self.touch();
        Ok(())
    }

    /// Moves to the next question, or scores when already on the last one.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let SessionState::InProgress { index } = self.state else {
            return Err(self.invalid("advance"));
        };
        let last = self.questions.len().saturating_sub(1);
        if index < last {
            self.state = SessionState::InProgress { index: index + 1 };
            self.touch();
            return Ok(Advance::Moved { index: index + 1 });
        }

        let Some(tier) = self.tier else {
            return Err(self.invalid("advance"));
        };
        let result = build_result(tier, &self.questions, &self.answers);
        self.state = SessionState::Scored {
            result: result.clone(),
        };
        self.touch();
        Ok(Advance::Scored(result))
    }

    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        let SessionState::InProgress { index } = self.state else {
            return Err(self.invalid("retreat"));
        };
        let index = index.saturating_sub(1);
        self.state = SessionState::InProgress { index };
        self.touch();
        Ok(index)
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.state {
            SessionState::Scored { result } => Some(result),
            _ => None,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A question as shown to the user: no correct answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub domain: String,
    pub options: [AnswerOption; OPTIONS_PER_QUESTION],
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub status: &'static str,
    pub tier: Option<DifficultyTier>,
    pub index: Option<usize>,
    pub total_questions: usize,
    pub answered: usize,
    pub current: Option<QuestionView>,
}

impl From<&AssessmentSession> for SessionView {
    fn from(session: &AssessmentSession) -> Self {
        let index = match session.state {
            SessionState::InProgress { index } => Some(index),
            _ => None,
        };
        let current = index
            .and_then(|i| session.questions.get(i))
            .map(|q| QuestionView {
                id: q.id.clone(),
                text: q.text.clone(),
                domain: q.domain.clone(),
                options: q.options.clone(),
                selected: session.answers.get(&q.id).cloned(),
            });
        SessionView {
            session_id: session.id,
            status: session.state.name(),
            tier: session.tier,
            index,
            total_questions: session.questions.len(),
            answered: session.answers.len(),
            current,
        }
    }
}
