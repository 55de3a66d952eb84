mod card;
mod deck;
mod ids;
mod review;

pub use ids::DeckId;

pub use card::{Card, CardError};
pub use deck::{Deck, DeckError};
pub use review::{Confidence, REVIEW_HISTORY_LIMIT, ReviewEntry, ReviewError, ReviewHistory};
