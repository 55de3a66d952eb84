//! Session sizing and per-card review advice derived from mastery.

use std::fmt;

use serde::Serialize;

use crate::model::{Card, Deck};

/// Session length used when there is nothing to size (25 minutes).
pub const DEFAULT_SESSION_SECS: u32 = 1500;
pub const MIN_SESSION_SECS: u32 = 300;
pub const MAX_SESSION_SECS: u32 = 3600;

const BASE_SECS_PER_CARD: f64 = 30.0;
const COMPLEXITY_CAP_CHARS: usize = 500;
const ROUNDING_MINUTES: f64 = 5.0;

//
// ─── SESSION LENGTH ────────────────────────────────────────────────────────────
//

/// Estimated study time for one card: 30s scaled up to 2x for low mastery
/// and up to 2x again for long content.
#[must_use]
pub fn seconds_for_card(card: &Card) -> f64 {
    let mastery_factor = 1.0 + (1.0 - card.mastery().clamp(0.0, 1.0));

    #[allow(clippy::cast_precision_loss)]
    let capped_len = card.content_len().min(COMPLEXITY_CAP_CHARS) as f64;
    #[allow(clippy::cast_precision_loss)]
    let complexity_factor = 1.0 + capped_len / COMPLEXITY_CAP_CHARS as f64;

    BASE_SECS_PER_CARD * mastery_factor * complexity_factor
}

/// Recommended session length in seconds.
///
/// Sums per-card estimates, rounds up to the next 5-minute boundary and
/// clamps to 5..=60 minutes. A missing or empty deck gets the 25-minute
/// default. The result is always a multiple of 300.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn recommended_session_seconds(deck: Option<&Deck>) -> u32 {
    let Some(deck) = deck.filter(|d| !d.is_empty()) else {
        return DEFAULT_SESSION_SECS;
    };

    let total: f64 = deck.cards().iter().map(seconds_for_card).sum();
    let minutes = (total / 60.0 / ROUNDING_MINUTES).ceil() * ROUNDING_MINUTES;
    let seconds = (minutes * 60.0).clamp(f64::from(MIN_SESSION_SECS), f64::from(MAX_SESSION_SECS));

    // Clamped to [300, 3600] above, so the cast is exact.
    seconds as u32
}

//
// ─── RECOMMENDATION ────────────────────────────────────────────────────────────
//

/// Qualitative review frequency for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Recommendation {
    FocusNeeded,
    MakingProgress,
    AlmostThere,
    WellLearned,
}

impl Recommendation {
    #[must_use]
    pub fn for_mastery(mastery: f64) -> Self {
        if mastery < 0.3 {
            Self::FocusNeeded
        } else if mastery < 0.6 {
            Self::MakingProgress
        } else if mastery < 0.9 {
            Self::AlmostThere
        } else {
            Self::WellLearned
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::FocusNeeded => "Focus needed: Review this card frequently",
            Self::MakingProgress => "Making progress: Review every few days",
            Self::AlmostThere => "Almost there: Review weekly",
            Self::WellLearned => "Well learned: Review monthly to maintain",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[must_use]
pub fn recommendation(card: &Card) -> Recommendation {
    Recommendation::for_mastery(card.mastery())
}

//
// ─── SESSION PLAN ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPlan {
    pub index: usize,
    pub mastery: f64,
    pub recommendation: Recommendation,
}

/// Session length plus advice for every card, in deck order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPlan {
    pub session_secs: u32,
    pub deck_mastery: f64,
    pub cards: Vec<CardPlan>,
}

impl SessionPlan {
    /// Cards still below "almost there".
    pub fn needs_focus(&self) -> impl Iterator<Item = &CardPlan> {
        self.cards.iter().filter(|c| {
            matches!(
                c.recommendation,
                Recommendation::FocusNeeded | Recommendation::MakingProgress
            )
        })
    }
}

#[must_use]
pub fn plan_session(deck: &Deck) -> SessionPlan {
    SessionPlan {
        session_secs: recommended_session_seconds(Some(deck)),
        deck_mastery: deck.mastery(),
        cards: deck
            .cards()
            .iter()
            .enumerate()
            .map(|(index, card)| CardPlan {
                index,
                mastery: card.mastery(),
                recommendation: recommendation(card),
            })
            .collect(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
