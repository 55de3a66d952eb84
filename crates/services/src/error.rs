//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use study_core::interchange::InterchangeError;
use study_core::mastery::MasteryError;
use study_core::model::{CardError, DeckError, DeckId};

/// Errors emitted by `DeckManager`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeckManagerError {
    #[error("deck {0} not found")]
    DeckNotFound(DeckId),
    #[error("no deck selected")]
    NoDeckSelected,
    #[error("deck has no cards")]
    EmptyDeck,
    #[error("no study session in progress")]
    NoActiveSession,
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Mastery(#[from] MasteryError),
    #[error(transparent)]
    Interchange(#[from] InterchangeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
