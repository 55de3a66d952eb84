use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Deck.
///
/// New decks take the creation instant in epoch milliseconds, which keeps
/// identifiers compatible with collections exported by the browser app.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(u64);

impl DeckId {
    /// Creates a new `DeckId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Derives an identifier from a creation timestamp.
    ///
    /// Timestamps before the epoch map to zero.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(u64::try_from(at.timestamp_millis()).unwrap_or(0))
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the next identifier in sequence.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeckId({})", self.0)
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

impl FromStr for DeckId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn deck_id_from_timestamp_uses_millis() {
        let id = DeckId::from_timestamp(fixed_now());
        assert_eq!(id.value(), 1_700_000_000_000);
    }

    #[test]
    fn deck_id_parses_and_displays() {
        let id: DeckId = " 42 ".parse().unwrap();
        assert_eq!(id, DeckId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "DeckId(42)");
        assert!("abc".parse::<DeckId>().is_err());
    }

    #[test]
    fn next_saturates() {
        assert_eq!(DeckId::new(7).next(), DeckId::new(8));
        assert_eq!(DeckId::new(u64::MAX).next(), DeckId::new(u64::MAX));
    }
}
