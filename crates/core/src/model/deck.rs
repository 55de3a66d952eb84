use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mastery;
use crate::model::card::Card;
use crate::model::ids::DeckId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("deck name cannot be empty")]
    EmptyName,

    #[error("card index {index} is out of range for a deck of {len} cards")]
    CardOutOfRange { index: usize, len: usize },
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// Named, ordered collection of cards studied as a unit.
///
/// Card order is navigation order. `mastery` is derived from the cards and
/// refreshed whenever a card is rated, added or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    id: DeckId,
    name: String,
    #[serde(default)]
    cards: Vec<Card>,
    #[serde(default)]
    mastery: f64,
    #[serde(default)]
    last_studied: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// Creates a deck holding the given cards.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::EmptyName` if the trimmed name is empty.
    pub fn new(
        id: DeckId,
        name: impl Into<String>,
        cards: Vec<Card>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DeckError> {
        let name = validate_name(name.into())?;
        let mut deck = Self {
            id,
            name,
            cards,
            mastery: 0.0,
            last_studied: None,
            category: None,
            created_at: Some(created_at),
        };
        deck.recompute_mastery();
        Ok(deck)
    }

    /// Attaches a free-form category label (imported decks use `"imported"`).
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> DeckId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Review-count weighted mastery of the whole deck.
    #[must_use]
    pub fn mastery(&self) -> f64 {
        self.mastery
    }

    #[must_use]
    pub fn last_studied(&self) -> Option<DateTime<Utc>> {
        self.last_studied
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Number of cards that have been rated at least once.
    #[must_use]
    pub fn reviewed_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_reviewed()).count()
    }

    // Mutators

    /// # Errors
    ///
    /// Returns `DeckError::EmptyName` if the trimmed name is empty.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DeckError> {
        self.name = validate_name(name.into())?;
        Ok(())
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.recompute_mastery();
    }

    /// Removes and returns the card at `index`.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::CardOutOfRange` if there is no such card.
    pub fn remove_card(&mut self, index: usize) -> Result<Card, DeckError> {
        if index >= self.cards.len() {
            return Err(DeckError::CardOutOfRange {
                index,
                len: self.cards.len(),
            });
        }
        let card = self.cards.remove(index);
        self.recompute_mastery();
        Ok(card)
    }

    pub fn mark_studied(&mut self, now: DateTime<Utc>) {
        self.last_studied = Some(now);
    }

    /// Recomputes deck mastery over every card, reviewed or not.
    pub fn recompute_mastery(&mut self) {
        self.mastery = mastery::deck_mastery(&self.cards);
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// Mutable access for reordering, e.g. shuffling before a session.
    pub fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }
}

fn validate_name(name: String) -> Result<String, DeckError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DeckError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
