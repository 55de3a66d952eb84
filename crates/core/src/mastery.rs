//! Per-card mastery scoring and deck aggregation.
//!
//! A rating blends three signals into a target score:
//! - time decay since the previous rating (30-day exponential scale)
//! - the confidence given right now
//! - consistency across the bounded rating history, newest weighted most
//!
//! The card then moves toward that target by exponential smoothing. Easier
//! ratings move it faster (smoothing 0.3 for hard up to 0.5 for easy).
//!
//! ```
//! # use study_core::mastery::rate_card;
//! # use study_core::model::{Card, Confidence, Deck, DeckId};
//! # use study_core::time::fixed_now;
//! let card = Card::new("cześć", "hello").unwrap();
//! let mut deck = Deck::new(DeckId::new(1), "Polish", vec![card], fixed_now()).unwrap();
//!
//! let rated = rate_card(&mut deck, 0, Confidence::Easy, fixed_now())?;
//! assert!((rated.mastery - 0.405).abs() < 1e-3);
//! assert_eq!(deck.mastery(), rated.deck_mastery);
//! # Ok::<(), study_core::mastery::MasteryError>(())
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Card, Confidence, Deck, ReviewEntry, ReviewHistory};
use crate::time::days_between;

pub const TIME_WEIGHT: f64 = 0.3;
pub const CONFIDENCE_WEIGHT: f64 = 0.4;
pub const CONSISTENCY_WEIGHT: f64 = 0.3;

/// e-folding time of the forgetting curve, in days.
pub const DECAY_SCALE_DAYS: f64 = 30.0;

/// Gap assumed for a card that has never been rated.
pub const UNREVIEWED_GAP_DAYS: f64 = 30.0;

pub const SMOOTHING_BASE: f64 = 0.3;
pub const SMOOTHING_STEP: f64 = 0.1;

/// Mastery at or above which a card counts as learned.
pub const MASTERED_THRESHOLD: f64 = 0.9;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MasteryError {
    #[error("card index {index} is out of range for a deck of {len} cards")]
    CardOutOfRange { index: usize, len: usize },
}

//
// ─── SIGNALS ───────────────────────────────────────────────────────────────────
//

/// Forgetting factor for a gap of `days`; 1 for an immediate re-review,
/// approaching 0 as the gap grows.
#[must_use]
pub fn time_decay(days: f64) -> f64 {
    (-days.max(0.0) / DECAY_SCALE_DAYS).exp()
}

/// Maps hard/medium/easy to 0, 0.5 and 1.
#[must_use]
pub fn confidence_impact(confidence: Confidence) -> f64 {
    (f64::from(confidence.value()) - 1.0) / 2.0
}

/// Recency-weighted mean confidence impact over the history.
///
/// Position `i` (0 = most recent) carries weight `e^(-i/N)`. An empty
/// history scores 0.
#[must_use]
pub fn consistency_score(history: &ReviewHistory) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = history.len() as f64;

    let (weighted, total_weight) = history.iter_recent_first().enumerate().fold(
        (0.0, 0.0),
        |(weighted, total), (i, entry)| {
            #[allow(clippy::cast_precision_loss)]
            let weight = (-(i as f64) / n).exp();
            (
                weighted + confidence_impact(entry.confidence) * weight,
                total + weight,
            )
        },
    );

    weighted / total_weight
}

#[must_use]
pub fn smoothing_factor(confidence: Confidence) -> f64 {
    SMOOTHING_BASE + (f64::from(confidence.value()) - 1.0) * SMOOTHING_STEP
}

/// Review-count weighted mean of card masteries.
///
/// Every card contributes, including never-rated ones at mastery 0 with
/// weight `1 / (total_reviews + card_count)`. An empty deck scores 0.
#[must_use]
pub fn deck_mastery(cards: &[Card]) -> f64 {
    if cards.is_empty() {
        return 0.0;
    }

    let total_reviews: f64 = cards.iter().map(|c| f64::from(c.review_count())).sum();
    #[allow(clippy::cast_precision_loss)]
    let denominator = total_reviews + cards.len() as f64;

    cards
        .iter()
        .map(|c| (f64::from(c.review_count()) + 1.0) / denominator * c.mastery())
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

//
// ─── CARD UPDATE ───────────────────────────────────────────────────────────────
//

/// The signals that produced a mastery update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasteryBreakdown {
    pub days_since_last_review: f64,
    pub time_decay: f64,
    pub confidence_impact: f64,
    pub consistency: f64,
    /// Weighted target before smoothing.
    pub target: f64,
    pub smoothing: f64,
}

/// Result of a single card update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardUpdate {
    pub previous: f64,
    pub mastery: f64,
    pub breakdown: MasteryBreakdown,
}

impl CardUpdate {
    /// True when this rating lifted the card across [`MASTERED_THRESHOLD`].
    #[must_use]
    pub fn newly_mastered(&self) -> bool {
        self.previous < MASTERED_THRESHOLD && self.mastery >= MASTERED_THRESHOLD
    }
}

/// Applies one rating to a card and returns the new mastery.
///
/// Increments the review count, stamps `last_reviewed`, appends to the
/// bounded history, then smooths mastery toward the weighted target. The
/// result is always within `[0, 1]`.
pub fn update_card_mastery(
    card: &mut Card,
    confidence: Confidence,
    now: DateTime<Utc>,
) -> CardUpdate {
    let days = card
        .last_reviewed
        .map_or(UNREVIEWED_GAP_DAYS, |last| days_between(last, now));

    card.review_count = card.review_count.saturating_add(1);
    card.last_reviewed = Some(now);
    card.review_history.push(ReviewEntry::new(confidence, now));

    let decay = time_decay(days);
    let impact = confidence_impact(confidence);
    let consistency = consistency_score(&card.review_history);
    let target =
        decay * TIME_WEIGHT + impact * CONFIDENCE_WEIGHT + consistency * CONSISTENCY_WEIGHT;

    let smoothing = smoothing_factor(confidence);
    let previous = sanitize(card.mastery);
    card.mastery = (previous * (1.0 - smoothing) + target * smoothing).clamp(0.0, 1.0);

    CardUpdate {
        previous,
        mastery: card.mastery,
        breakdown: MasteryBreakdown {
            days_since_last_review: days,
            time_decay: decay,
            confidence_impact: impact,
            consistency,
            target,
            smoothing,
        },
    }
}

// Persisted blobs may carry out-of-range or NaN values.
fn sanitize(mastery: f64) -> f64 {
    if mastery.is_finite() {
        mastery.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

//
// ─── DECK RATING ───────────────────────────────────────────────────────────────
//

/// Outcome of rating a card inside its deck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub mastery: f64,
    pub deck_mastery: f64,
    pub update: CardUpdate,
}

impl Rating {
    #[must_use]
    pub fn newly_mastered(&self) -> bool {
        self.update.newly_mastered()
    }
}

/// Rates the card at `index` and recomputes the owning deck's mastery.
///
/// # Errors
///
/// Returns `MasteryError::CardOutOfRange` if the deck has no card at `index`;
/// the deck is left untouched in that case.
pub fn rate_card(
    deck: &mut Deck,
    index: usize,
    confidence: Confidence,
    now: DateTime<Utc>,
) -> Result<Rating, MasteryError> {
    let len = deck.len();
    let card = deck
        .card_mut(index)
        .ok_or(MasteryError::CardOutOfRange { index, len })?;

    let update = update_card_mastery(card, confidence, now);
    deck.recompute_mastery();

    Ok(Rating {
        mastery: update.mastery,
        deck_mastery: deck.mastery(),
        update,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeckId;
    use crate::time::fixed_now;
    use chrono::Duration;

    const EPS: f64 = 1e-9;

    fn card() -> Card {
        Card::new("Q", "A").unwrap()
    }

    fn deck_of(n: usize) -> Deck {
        let cards = (0..n)
            .map(|i| Card::new(format!("Q{i}"), format!("A{i}")).unwrap())
            .collect();
        Deck::new(DeckId::new(1), "Deck", cards, fixed_now()).unwrap()
    }

    fn weighted_mean(cards: &[Card]) -> f64 {
        let total: f64 = cards.iter().map(|c| f64::from(c.review_count()) + 1.0).sum();
        cards
            .iter()
            .map(|c| (f64::from(c.review_count()) + 1.0) * c.mastery())
            .sum::<f64>()
            / total
    }

    #[test]
    fn first_easy_rating_matches_worked_example() {
        let mut card = card();
        let update = update_card_mastery(&mut card, Confidence::Easy, fixed_now());

        let b = update.breakdown;
        assert!((b.days_since_last_review - 30.0).abs() < EPS);
        assert!((b.time_decay - (-1.0f64).exp()).abs() < EPS);
        assert!((b.confidence_impact - 1.0).abs() < EPS);
        assert!((b.consistency - 1.0).abs() < EPS);
        assert!((b.target - 0.810_363_8).abs() < 1e-6);
        assert!((b.smoothing - 0.5).abs() < EPS);
        assert!((update.mastery - 0.405_181_9).abs() < 1e-6);

        assert_eq!(card.review_count(), 1);
        assert_eq!(card.last_reviewed(), Some(fixed_now()));
        assert_eq!(card.review_history().len(), 1);
    }

    #[test]
    fn smoothing_ranges_from_hard_to_easy() {
        assert!((smoothing_factor(Confidence::Hard) - 0.3).abs() < EPS);
        assert!((smoothing_factor(Confidence::Medium) - 0.4).abs() < EPS);
        assert!((smoothing_factor(Confidence::Easy) - 0.5).abs() < EPS);
    }

    #[test]
    fn confidence_impact_maps_to_unit_interval() {
        assert_eq!(confidence_impact(Confidence::Hard), 0.0);
        assert_eq!(confidence_impact(Confidence::Medium), 0.5);
        assert_eq!(confidence_impact(Confidence::Easy), 1.0);
    }

    #[test]
    fn time_decay_uses_previous_review() {
        let mut card = card();
        update_card_mastery(&mut card, Confidence::Medium, fixed_now());
        let update =
            update_card_mastery(&mut card, Confidence::Medium, fixed_now() + Duration::days(3));

        assert!((update.breakdown.days_since_last_review - 3.0).abs() < EPS);
        assert!((update.breakdown.time_decay - (-0.1f64).exp()).abs() < EPS);
    }

    #[test]
    fn consistency_weights_recent_ratings_most() {
        let start = fixed_now();
        let mut improving = ReviewHistory::new();
        improving.push(ReviewEntry::new(Confidence::Hard, start));
        improving.push(ReviewEntry::new(Confidence::Easy, start + Duration::days(1)));

        let mut declining = ReviewHistory::new();
        declining.push(ReviewEntry::new(Confidence::Easy, start));
        declining.push(ReviewEntry::new(Confidence::Hard, start + Duration::days(1)));

        let up = consistency_score(&improving);
        let down = consistency_score(&declining);
        assert!(up > 0.5);
        assert!(down < 0.5);

        // weights 1 and e^-0.5
        let w1 = (-0.5f64).exp();
        assert!((up - 1.0 / (1.0 + w1)).abs() < EPS);
        assert!((down - w1 / (1.0 + w1)).abs() < EPS);
    }

    #[test]
    fn consistency_of_empty_history_is_zero() {
        assert_eq!(consistency_score(&ReviewHistory::new()), 0.0);
    }

    #[test]
    fn mastery_stays_in_unit_interval_for_any_sequence() {
        let mut card = card();
        let mut now = fixed_now();
        let pattern = [
            Confidence::Easy,
            Confidence::Hard,
            Confidence::Medium,
            Confidence::Easy,
            Confidence::Easy,
            Confidence::Hard,
        ];
        for (step, confidence) in pattern.iter().cycle().take(60).enumerate() {
            let gap = if step % 7 == 0 { 90 } else { 1 };
            now += Duration::hours(gap);
            let update = update_card_mastery(&mut card, *confidence, now);
            assert!((0.0..=1.0).contains(&update.mastery));
            assert!(card.review_history().len() <= crate::model::REVIEW_HISTORY_LIMIT);
        }
        assert_eq!(card.review_count(), 60);
    }

    #[test]
    fn repeated_easy_ratings_never_decrease_below_blend() {
        let mut card = card();
        let mut now = fixed_now();
        for _ in 0..20 {
            now += Duration::hours(12);
            let update = update_card_mastery(&mut card, Confidence::Easy, now);
            let s = update.breakdown.smoothing;
            let expected = update.previous * (1.0 - s) + update.breakdown.target * s;
            assert!((update.mastery - expected).abs() < EPS);
            let lo = update.previous.min(update.breakdown.target);
            let hi = update.previous.max(update.breakdown.target);
            assert!(update.mastery >= lo - EPS && update.mastery <= hi + EPS);
        }
        assert!(card.mastery() > 0.9);
    }

    #[test]
    fn hard_rating_can_lower_mastery() {
        let mut card = card();
        let mut now = fixed_now();
        for _ in 0..10 {
            now += Duration::hours(1);
            update_card_mastery(&mut card, Confidence::Easy, now);
        }
        let before = card.mastery();
        now += Duration::days(40);
        let update = update_card_mastery(&mut card, Confidence::Hard, now);
        assert!(update.mastery < before);
    }

    #[test]
    fn corrupted_mastery_is_sanitized() {
        let mut card: Card =
            serde_json::from_str(r#"{"question":"Q","answer":"A","mastery":7.5}"#).unwrap();
        let update = update_card_mastery(&mut card, Confidence::Hard, fixed_now());
        assert_eq!(update.previous, 1.0);
        assert!(update.mastery <= 1.0);
    }

    #[test]
    fn newly_mastered_only_on_crossing() {
        let mut card = card();
        let mut now = fixed_now();
        let mut crossings = 0;
        for _ in 0..30 {
            now += Duration::hours(6);
            if update_card_mastery(&mut card, Confidence::Easy, now).newly_mastered() {
                crossings += 1;
            }
        }
        assert_eq!(crossings, 1);
    }

    #[test]
    fn deck_mastery_includes_unreviewed_cards() {
        let mut deck = deck_of(3);
        let rating = rate_card(&mut deck, 0, Confidence::Easy, fixed_now()).unwrap();

        // weights: reviewed card 2/4, the others 1/4 each at mastery 0
        assert!((rating.deck_mastery - rating.mastery * 0.5).abs() < EPS);
        assert_eq!(deck.mastery(), rating.deck_mastery);
    }

    #[test]
    fn deck_mastery_tracks_weighted_mean_after_every_rating() {
        let mut deck = deck_of(4);
        let mut now = fixed_now();
        let script = [
            (0, Confidence::Easy),
            (1, Confidence::Hard),
            (0, Confidence::Medium),
            (3, Confidence::Easy),
            (2, Confidence::Hard),
            (0, Confidence::Easy),
        ];
        for (index, confidence) in script {
            now += Duration::hours(5);
            rate_card(&mut deck, index, confidence, now).unwrap();
            assert!((deck.mastery() - weighted_mean(deck.cards())).abs() < EPS);
            assert!((0.0..=1.0).contains(&deck.mastery()));
        }
    }

    #[test]
    fn rating_missing_card_fails_without_changes() {
        let mut deck = deck_of(2);
        let before = deck.clone();
        let err = rate_card(&mut deck, 5, Confidence::Easy, fixed_now()).unwrap_err();
        assert_eq!(err, MasteryError::CardOutOfRange { index: 5, len: 2 });
        assert_eq!(deck, before);
    }

    #[test]
    fn empty_deck_has_zero_mastery() {
        assert_eq!(deck_mastery(&[]), 0.0);
    }
}
