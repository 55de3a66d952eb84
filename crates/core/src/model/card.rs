use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::review::ReviewHistory;

//
// ─── CARD VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card question cannot be empty")]
    EmptyQuestion,

    #[error("card answer cannot be empty")]
    EmptyAnswer,
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A question/answer pair together with its learning state.
///
/// Learning fields are optional in persisted data: a card that was never
/// rated loads with zero mastery, zero reviews and an empty history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    question: String,
    answer: String,
    #[serde(default)]
    pub(crate) mastery: f64,
    #[serde(default)]
    pub(crate) review_count: u32,
    #[serde(default)]
    pub(crate) last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) review_history: ReviewHistory,
}

impl Card {
    /// Creates an unreviewed card.
    ///
    /// # Errors
    ///
    /// Returns `CardError` if the question or answer is blank.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Result<Self, CardError> {
        let question = question.into();
        let answer = answer.into();
        if question.trim().is_empty() {
            return Err(CardError::EmptyQuestion);
        }
        if answer.trim().is_empty() {
            return Err(CardError::EmptyAnswer);
        }

        Ok(Self {
            question,
            answer,
            mastery: 0.0,
            review_count: 0,
            last_reviewed: None,
            review_history: ReviewHistory::new(),
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Current mastery in `[0, 1]`.
    #[must_use]
    pub fn mastery(&self) -> f64 {
        self.mastery
    }

    #[must_use]
    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    #[must_use]
    pub fn last_reviewed(&self) -> Option<DateTime<Utc>> {
        self.last_reviewed
    }

    #[must_use]
    pub fn review_history(&self) -> &ReviewHistory {
        &self.review_history
    }

    /// True once the card has received at least one rating.
    #[must_use]
    pub fn is_reviewed(&self) -> bool {
        self.last_reviewed.is_some()
    }

    /// Combined character count of question and answer.
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.question.chars().count() + self.answer.chars().count()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
