#![forbid(unsafe_code)]

pub mod deck_manager;
pub mod error;

pub use study_core::Clock;

pub use deck_manager::{DeckManager, RatedCard, SessionStart, SessionSummary};
pub use error::DeckManagerError;
