//! Converter session: selection state, rate resolution, and display glue
//!
//! Owns the pieces the UI talks to: the selected pair, the rate cache, the
//! favorites list, and a live rate source. Fetches are asynchronous and may
//! land after the selection has moved on, so every fetch is tagged with the
//! generation current when it was initiated; a result carrying an old
//! generation is discarded on arrival instead of being applied to a
//! different pair's display.

use crate::cache::{RateCache, RateLookup};
use crate::convert::{convert, parse_amount, Conversion};
use crate::currency::{CurrencyCode, CurrencyPair};
use crate::error::{ConverterError, Result};
use crate::favorites::{FavoritePair, FavoritesStore};
use crate::fetch::RateSource;
use crate::history::{build_series, HistoricalSeries};
use crate::store::KeyValueStore;
use chrono::NaiveDate;

/// Headless converter session
pub struct ConverterSession<S: KeyValueStore, R: RateSource> {
    cache: RateCache<S>,
    favorites: FavoritesStore<S>,
    source: R,
    pair: CurrencyPair,
    favorites_list: Vec<FavoritePair>,
    generation: u64,
    rate: Option<f64>,
    series: Option<HistoricalSeries>,
}

impl<S: KeyValueStore, R: RateSource> ConverterSession<S, R> {
    /// Create a session over the given stores and rate source.
    ///
    /// Favorites are loaded once here; the two stores may be clones of one
    /// shared handle (see `KeyValueStore` for `Arc<Mutex<S>>`). Starts on
    /// USD -> EUR.
    pub fn new(cache_store: S, favorites_store: S, source: R) -> Self {
        let favorites = FavoritesStore::new(favorites_store);
        let favorites_list = favorites.load();

        Self {
            cache: RateCache::new(cache_store),
            favorites,
            source,
            pair: CurrencyPair::new("USD", "EUR"),
            favorites_list,
            generation: 0,
            rate: None,
            series: None,
        }
    }

    /// The currently selected pair
    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// The generation tag for the current selection
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The resolved rate for the current selection, if any
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// The historical series for the current selection, if built
    pub fn series(&self) -> Option<&HistoricalSeries> {
        self.series.as_ref()
    }

    /// The favorites list
    pub fn favorites(&self) -> &[FavoritePair] {
        &self.favorites_list
    }

    /// Select a new pair. Any in-flight fetch for the old selection is
    /// invalidated; its result will be discarded on arrival.
    pub fn select_pair(&mut self, pair: CurrencyPair) {
        if pair == self.pair {
            return;
        }
        self.pair = pair;
        self.generation += 1;
        self.rate = None;
        self.series = None;
    }

    /// Exchange from and to
    pub fn swap(&mut self) {
        self.select_pair(self.pair.swapped());
    }

    /// Select the favorite at `index` as the current pair
    pub fn select_favorite(&mut self, index: usize) -> Result<()> {
        let favorite = self.favorites_list.get(index).cloned().ok_or(
            ConverterError::IndexOutOfBounds {
                index,
                len: self.favorites_list.len(),
            },
        )?;
        self.select_pair(CurrencyPair {
            from: favorite.from,
            to: favorite.to,
        });
        Ok(())
    }

    /// Save the current pair as a favorite (duplicates allowed)
    pub fn add_favorite(&mut self) -> Result<()> {
        let pair = FavoritePair {
            from: self.pair.from.clone(),
            to: self.pair.to.clone(),
        };
        self.favorites_list = self
            .favorites
            .add(std::mem::take(&mut self.favorites_list), pair)?;
        Ok(())
    }

    /// Remove the favorite at `index`
    pub fn remove_favorite(&mut self, index: usize) -> Result<()> {
        self.favorites_list = self
            .favorites
            .remove_at(std::mem::take(&mut self.favorites_list), index)?;
        Ok(())
    }

    /// The currency list for the pickers: the cached list when present,
    /// otherwise the keys of a freshly fetched USD table, persisted for
    /// next time.
    pub async fn load_currencies(&mut self) -> Result<Vec<CurrencyCode>> {
        if let Some(list) = self.cache.currencies() {
            return Ok(list);
        }

        let table = self.source.fetch_latest(&CurrencyCode::new("USD")).await?;
        let mut list: Vec<CurrencyCode> = table.into_keys().collect();
        list.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        self.cache.store_currencies(&list)?;
        Ok(list)
    }

    /// Resolve and apply the rate for the current selection.
    ///
    /// Identity pairs are 1.0 by definition. Otherwise a fresh cache hit is
    /// used; on a stale or missing entry the full table for the base is
    /// fetched, cached, and read. Returns `Ok(true)` when the result was
    /// applied, `Ok(false)` when it arrived superseded and was discarded.
    /// Errors surface to the caller as the user-visible failure message.
    pub async fn refresh_rate(&mut self, now_millis: i64) -> Result<bool> {
        let generation = self.generation;
        let pair = self.pair.clone();
        let rate = self.resolve_rate(&pair, now_millis).await?;
        Ok(self.apply_rate(generation, rate))
    }

    /// Build and apply the historical series for the current selection,
    /// ending at `today`. Returns whether the result was applied.
    pub async fn refresh_series(&mut self, today: NaiveDate) -> bool {
        let generation = self.generation;
        let pair = self.pair.clone();
        let series = build_series(&self.source, &pair, today).await;
        self.apply_series(generation, series)
    }

    /// Apply a resolved rate if `generation` is still current
    pub fn apply_rate(&mut self, generation: u64, rate: f64) -> bool {
        if generation != self.generation {
            log::debug!("Discarding superseded rate for generation {}", generation);
            return false;
        }
        self.rate = Some(rate);
        true
    }

    /// Apply a built series if `generation` is still current
    pub fn apply_series(&mut self, generation: u64, series: HistoricalSeries) -> bool {
        if generation != self.generation {
            log::debug!("Discarding superseded series for generation {}", generation);
            return false;
        }
        self.series = Some(series);
        true
    }

    /// Convert a free-text amount at the resolved rate. `None` until a rate
    /// has been applied for the current selection.
    pub fn convert_amount(&self, amount_text: &str) -> Option<Conversion> {
        self.rate.map(|rate| convert(parse_amount(amount_text), rate))
    }

    async fn resolve_rate(&mut self, pair: &CurrencyPair, now_millis: i64) -> Result<f64> {
        if pair.is_identity() {
            return Ok(1.0);
        }

        match self.cache.get_rate(&pair.from, &pair.to, now_millis) {
            RateLookup::Fresh(rate) => Ok(rate),
            RateLookup::Stale | RateLookup::Missing => {
                let table = self.source.fetch_latest(&pair.from).await?;
                self.cache.store(&pair.from, &table, now_millis)?;
                table.get(&pair.to).copied().ok_or_else(|| {
                    ConverterError::Upstream(format!(
                        "Rate table for {} has no entry for {}",
                        pair.from, pair.to
                    ))
                })
            }
        }
    }
}
