//! Case-insensitive lookup over deck names and card text.

use serde::Serialize;

use crate::model::{Card, Deck, DeckId};

/// A deck that matched a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub deck_id: DeckId,
    /// The deck's own name contains the query.
    pub name_matches: bool,
    /// Cards whose question or answer contains the query.
    pub matching_cards: usize,
}

impl SearchHit {
    /// True when only card content matched, not the deck name.
    #[must_use]
    pub fn cards_only(&self) -> bool {
        !self.name_matches && self.matching_cards > 0
    }
}

fn card_matches(card: &Card, needle: &str) -> bool {
    card.question().to_lowercase().contains(needle) || card.answer().to_lowercase().contains(needle)
}

/// Decks whose name or any card contains `query`, in collection order.
///
/// An empty query matches every deck by name.
#[must_use]
pub fn search_decks(decks: &[Deck], query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    decks
        .iter()
        .filter_map(|deck| {
            let name_matches = deck.name().to_lowercase().contains(&needle);
            let matching_cards = deck
                .cards()
                .iter()
                .filter(|card| card_matches(card, &needle))
                .count();
            (name_matches || matching_cards > 0).then_some(SearchHit {
                deck_id: deck.id(),
                name_matches,
                matching_cards,
            })
        })
        .collect()
}
