//! Cached exchange-rate tables with an hour-long freshness window
//!
//! Wraps the durable [`KeyValueStore`] and decides hit/miss for the latest
//! rate path. One full rate table is kept per base currency, governed by a
//! single shared freshness timestamp: storing any base resets the clock for
//! every cached base. That shared-clock behavior is load-bearing for
//! compatibility with existing stores and is kept as-is.

use crate::currency::{CurrencyCode, RateTable};
use crate::error::{ConverterError, Result};
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Store key for the per-base rate tables
const RATES_KEY: &str = "exchangeRates";
/// Store key for the shared freshness timestamp (epoch millis, as digits)
const TIMESTAMP_KEY: &str = "ratesTimestamp";
/// Store key for the known currency-code list
const CURRENCIES_KEY: &str = "currencies";

/// Cached rate tables are valid for one hour
pub const FRESHNESS_WINDOW_MILLIS: i64 = 3_600_000;

/// Decode a persisted value, surfacing corruption as a parse fault.
/// Readers recover from it locally; it never reaches a user.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| ConverterError::Parse(e.to_string()))
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLookup {
    /// A usable rate within the freshness window
    Fresh(f64),
    /// The pair is cached but the freshness window has elapsed
    Stale,
    /// No cached table covers this pair
    Missing,
}

/// Rate cache over a durable key-value store
#[derive(Debug)]
pub struct RateCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> RateCache<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Look up the rate for `base` -> `quote` at `now_millis`.
    ///
    /// Identity pairs are always `Fresh(1.0)` without touching the store.
    /// `Stale` and `Missing` both mean the caller must fall through to a
    /// live fetch; they differ only in whether any table covered the pair.
    pub fn get_rate(&self, base: &CurrencyCode, quote: &CurrencyCode, now_millis: i64) -> RateLookup {
        if base == quote {
            return RateLookup::Fresh(1.0);
        }

        let tables = self.tables();
        let rate = match tables.get(base).and_then(|table| table.get(quote)) {
            Some(&rate) => rate,
            None => return RateLookup::Missing,
        };

        match self.fetched_at() {
            Some(fetched_at) if now_millis - fetched_at < FRESHNESS_WINDOW_MILLIS => {
                RateLookup::Fresh(rate)
            }
            _ => RateLookup::Stale,
        }
    }

    /// Overwrite the table for `base` and reset the shared freshness clock.
    ///
    /// Tables for other bases are kept; only the timestamp they share is
    /// refreshed. Persisted immediately.
    pub fn store(&mut self, base: &CurrencyCode, table: &RateTable, now_millis: i64) -> Result<()> {
        let mut tables = self.tables();
        tables.insert(base.clone(), table.clone());

        let encoded = serde_json::to_string(&tables)?;
        self.store.put(RATES_KEY, &encoded)?;
        self.store.put(TIMESTAMP_KEY, &now_millis.to_string())?;
        Ok(())
    }

    /// The cached currency-code list, if one has been stored
    pub fn currencies(&self) -> Option<Vec<CurrencyCode>> {
        let text = self.store.get(CURRENCIES_KEY)?;
        match decode(&text) {
            Ok(list) => Some(list),
            Err(e) => {
                log::warn!("Discarding malformed currency list: {}", e);
                None
            }
        }
    }

    /// Persist the currency-code list
    pub fn store_currencies(&mut self, currencies: &[CurrencyCode]) -> Result<()> {
        let encoded = serde_json::to_string(currencies)?;
        self.store.put(CURRENCIES_KEY, &encoded)
    }

    fn tables(&self) -> HashMap<CurrencyCode, RateTable> {
        let Some(text) = self.store.get(RATES_KEY) else {
            return HashMap::new();
        };

        match decode(&text) {
            Ok(tables) => tables,
            Err(e) => {
                log::warn!("Discarding malformed rate tables: {}", e);
                HashMap::new()
            }
        }
    }

    fn fetched_at(&self) -> Option<i64> {
        self.store.get(TIMESTAMP_KEY)?.parse().ok()
    }
}
