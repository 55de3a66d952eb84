use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::Deck;
use study_core::stats::Statistics;
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the deck collection is stored.
pub const DECKS_KEY: &str = "decks";
/// Key under which study statistics are stored.
pub const STATS_KEY: &str = "studyStats";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// String-keyed JSON document store.
///
/// No transactions: each `save` replaces the whole value and the last
/// writer wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds invalid JSON.
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn save(&self, key: &str, value: &Value) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.clone());
        Ok(())
    }
}

/// Typed access to the deck collection and statistics over any store.
#[derive(Clone)]
pub struct Storage {
    pub store: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    async fn load_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.load(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn save_typed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.store.save(key, &value).await?;
        debug!(key, "saved document");
        Ok(())
    }

    /// Load the deck collection; a missing document is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the document is not a deck list.
    pub async fn load_decks(&self) -> Result<Vec<Deck>, StorageError> {
        let decks: Vec<Deck> = self.load_typed(DECKS_KEY).await?.unwrap_or_default();
        debug!(count = decks.len(), "loaded decks");
        Ok(decks)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be serialized or written.
    pub async fn save_decks(&self, decks: &[Deck]) -> Result<(), StorageError> {
        self.save_typed(DECKS_KEY, decks).await
    }

    /// Load statistics, falling back to fresh ones when absent or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the store itself fails.
    pub async fn load_stats(&self) -> Result<Statistics, StorageError> {
        let mut stats = match self.load_typed::<Statistics>(STATS_KEY).await {
            Ok(stats) => stats.unwrap_or_default(),
            Err(StorageError::Serialization(err)) => {
                warn!(%err, "discarding unreadable statistics");
                Statistics::default()
            }
            Err(err) => return Err(err),
        };
        stats.normalize();
        Ok(stats)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the statistics cannot be serialized or written.
    pub async fn save_stats(&self, stats: &Statistics) -> Result<(), StorageError> {
        self.save_typed(STATS_KEY, stats).await
    }
}
