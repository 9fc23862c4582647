//! # ratewise
//!
//! Headless currency-conversion core: cached exchange rates with an
//! hour-long freshness window, a persisted favorites list, pure conversion
//! arithmetic, and a 7-day historical rate series for trend charts.
//!
//! Rates come from a public third-party rate service; persistence is a
//! local key-value store. Rendering is someone else's job; this crate
//! produces the data behind the pickers, the result panel, and the chart.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ratewise::prelude::*;
//! use chrono::Utc;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn run() -> ratewise::error::Result<()> {
//! let store = Arc::new(Mutex::new(FileStore::open("converter-state.json")));
//! let source = ExchangeRateApiSource::new()?;
//! let mut session = ConverterSession::new(Arc::clone(&store), store, source);
//!
//! session.select_pair(CurrencyPair::new("USD", "EUR"));
//! session.refresh_rate(Utc::now().timestamp_millis()).await?;
//!
//! if let Some(result) = session.convert_amount("100") {
//!     println!("100 USD = {} EUR at {}", result.display_amount, result.display_rate);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod convert;
pub mod currency;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod history;
pub mod session;
pub mod store;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::cache::{RateCache, RateLookup};
    pub use crate::convert::{convert, parse_amount, Conversion};
    pub use crate::currency::{CurrencyCode, CurrencyPair, RateTable};
    pub use crate::error::{ConverterError, Result};
    pub use crate::favorites::{FavoritePair, FavoritesStore};
    pub use crate::fetch::{ExchangeRateApiSource, RateSource};
    pub use crate::history::{build_series, HistoricalPoint, HistoricalSeries};
    pub use crate::session::ConverterSession;
    pub use crate::store::{FileStore, KeyValueStore, MemoryStore};
}
