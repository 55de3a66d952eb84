use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Number of ratings kept per card; older entries are evicted first.
pub const REVIEW_HISTORY_LIMIT: usize = 10;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while interpreting a rating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid confidence rating: {0} (expected 1, 2 or 3)")]
    InvalidConfidence(u8),
}

//
// ─── CONFIDENCE ───────────────────────────────────────────────────────────────
//

/// Self-reported recall confidence given after revealing an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Confidence {
    /// Could not recall, or only with a struggle.
    Hard,
    /// Recalled with some effort.
    Medium,
    /// Recalled immediately.
    Easy,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::Hard, Confidence::Medium, Confidence::Easy];

    /// Converts a numeric rating (1-3) to a `Confidence`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidConfidence` if the value is not 1, 2 or 3.
    pub fn from_u8(value: u8) -> Result<Self, ReviewError> {
        match value {
            1 => Ok(Self::Hard),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Easy),
            _ => Err(ReviewError::InvalidConfidence(value)),
        }
    }

    /// Numeric rating on the 1-3 scale.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Confidence::Hard => 1,
            Confidence::Medium => 2,
            Confidence::Easy => 3,
        }
    }
}

impl TryFrom<u8> for Confidence {
    type Error = ReviewError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<Confidence> for u8 {
    fn from(value: Confidence) -> Self {
        value.value()
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Hard => "hard",
            Confidence::Medium => "medium",
            Confidence::Easy => "easy",
        };
        f.write_str(label)
    }
}

//
// ─── REVIEW HISTORY ───────────────────────────────────────────────────────────
//

/// A single rating event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub confidence: Confidence,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ReviewEntry {
    #[must_use]
    pub fn new(confidence: Confidence, timestamp: DateTime<Utc>) -> Self {
        Self {
            confidence,
            timestamp,
        }
    }
}

/// Bounded rating history, stored oldest first.
///
/// Never holds more than [`REVIEW_HISTORY_LIMIT`] entries. Persisted histories
/// that are longer keep only their most recent entries when loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ReviewEntry>", into = "Vec<ReviewEntry>")]
pub struct ReviewHistory {
    entries: VecDeque<ReviewEntry>,
}

impl ReviewHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, evicting the oldest one once the limit is exceeded.
    pub fn push(&mut self, entry: ReviewEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > REVIEW_HISTORY_LIMIT {
            self.entries.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ReviewEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Entries from newest to oldest.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &ReviewEntry> + ExactSizeIterator {
        self.entries.iter().rev()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ReviewEntry> {
        self.entries.back()
    }
}

impl From<Vec<ReviewEntry>> for ReviewHistory {
    fn from(entries: Vec<ReviewEntry>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.push(entry);
        }
        history
    }
}

impl From<ReviewHistory> for Vec<ReviewEntry> {
    fn from(history: ReviewHistory) -> Self {
        history.entries.into()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
