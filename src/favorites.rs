//! Persisted favorite currency pairs
//!
//! An ordered list of (from, to) pairs kept in the durable store. Items are
//! identified by list position, not value, so duplicates are allowed and
//! removal is positional. Operations take and return whole lists (value
//! semantics); the only shared state is the single persisted copy, rewritten
//! on every mutation.

use crate::currency::CurrencyCode;
use crate::error::{ConverterError, Result};
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};

const FAVORITES_KEY: &str = "favorites";

/// A saved (from, to) currency combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl FavoritePair {
    /// Create a favorite pair
    pub fn new(from: impl Into<CurrencyCode>, to: impl Into<CurrencyCode>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Favorites list over a durable key-value store
#[derive(Debug)]
pub struct FavoritesStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the persisted list. Absent or malformed data yields an empty
    /// list; corruption is logged and dropped, never surfaced.
    pub fn load(&self) -> Vec<FavoritePair> {
        let Some(text) = self.store.get(FAVORITES_KEY) else {
            return Vec::new();
        };

        match Self::decode(&text) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Discarding malformed favorites list: {}", e);
                Vec::new()
            }
        }
    }

    fn decode(text: &str) -> Result<Vec<FavoritePair>> {
        serde_json::from_str(text).map_err(|e| ConverterError::Parse(e.to_string()))
    }

    /// Append `pair` unconditionally (duplicates permitted), persist, and
    /// return the new list
    pub fn add(&mut self, list: Vec<FavoritePair>, pair: FavoritePair) -> Result<Vec<FavoritePair>> {
        let mut updated = list;
        updated.push(pair);
        self.persist(&updated)?;
        Ok(updated)
    }

    /// Remove the pair at `index`, persist, and return the new list.
    ///
    /// Callers are expected to pass a valid position; an out-of-range index
    /// is a contract violation and fails hard.
    pub fn remove_at(&mut self, list: Vec<FavoritePair>, index: usize) -> Result<Vec<FavoritePair>> {
        if index >= list.len() {
            return Err(ConverterError::IndexOutOfBounds {
                index,
                len: list.len(),
            });
        }

        let mut updated = list;
        updated.remove(index);
        self.persist(&updated)?;
        Ok(updated)
    }

    fn persist(&mut self, list: &[FavoritePair]) -> Result<()> {
        let encoded = serde_json::to_string(list)?;
        self.store.put(FAVORITES_KEY, &encoded)
    }
}
