//! Live exchange-rate fetching
//!
//! Talks to the public rate service: one endpoint serving the full latest
//! table for a base currency, another serving a single historical rate for a
//! (date, base, quote) triple. Failures are normalized into the crate's
//! error kinds; no retry logic lives here, a failed attempt surfaces
//! immediately to the caller.

use crate::currency::{CurrencyCode, CurrencyPair, RateTable};
use crate::error::{ConverterError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

const LATEST_BASE_URL: &str = "https://api.exchangerate-api.com/v4/latest";
const HISTORICAL_BASE_URL: &str = "https://api.exchangerate.host";

/// Per-request timeout on the historical path. A timed-out date is treated
/// as failed for that date only.
const HISTORICAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of live exchange rates
pub trait RateSource: Send + Sync {
    /// Fetch the full latest rate table for `base`
    fn fetch_latest(
        &self,
        base: &CurrencyCode,
    ) -> impl Future<Output = Result<RateTable>> + Send;

    /// Fetch a single historical rate for `pair` on `date`.
    ///
    /// `Ok(None)` means the service has no data for that date/pair; the
    /// caller filters it out without aborting the whole series.
    fn fetch_historical(
        &self,
        date: NaiveDate,
        pair: &CurrencyPair,
    ) -> impl Future<Output = Result<Option<f64>>> + Send;
}

/// HTTP-backed rate source
pub struct ExchangeRateApiSource {
    client: Client,
    latest_base_url: String,
    historical_base_url: String,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<CurrencyCode, f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    #[serde(default)]
    rates: Option<HashMap<CurrencyCode, f64>>,
}

impl ExchangeRateApiSource {
    /// Create a source against the default public endpoints
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("ratewise/0.1")
            .build()
            .map_err(|e| ConverterError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            latest_base_url: LATEST_BASE_URL.to_string(),
            historical_base_url: HISTORICAL_BASE_URL.to_string(),
        })
    }

    /// Override the service endpoints (local stubs, alternate providers)
    pub fn with_base_urls(latest: impl Into<String>, historical: impl Into<String>) -> Result<Self> {
        let mut source = Self::new()?;
        source.latest_base_url = latest.into();
        source.historical_base_url = historical.into();
        Ok(source)
    }

    fn normalize(e: reqwest::Error) -> ConverterError {
        if e.is_timeout() || e.is_connect() {
            ConverterError::Network(e.to_string())
        } else {
            ConverterError::Upstream(e.to_string())
        }
    }
}

impl RateSource for ExchangeRateApiSource {
    async fn fetch_latest(&self, base: &CurrencyCode) -> Result<RateTable> {
        let url = format!("{}/{}", self.latest_base_url, base);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::normalize)?;

        if !response.status().is_success() {
            return Err(ConverterError::Upstream(format!(
                "Rate service returned {} for {}",
                response.status(),
                base
            )));
        }

        let body: LatestResponse = response
            .json()
            .await
            .map_err(|e| ConverterError::Upstream(format!("Malformed rate table: {}", e)))?;

        Ok(body.rates)
    }

    async fn fetch_historical(&self, date: NaiveDate, pair: &CurrencyPair) -> Result<Option<f64>> {
        let url = format!(
            "{}/{}?base={}&symbols={}",
            self.historical_base_url,
            date.format("%Y-%m-%d"),
            pair.from,
            pair.to
        );

        let response = self
            .client
            .get(&url)
            .timeout(HISTORICAL_TIMEOUT)
            .send()
            .await
            .map_err(Self::normalize)?;

        if !response.status().is_success() {
            return Err(ConverterError::Upstream(format!(
                "Rate service returned {} for {} on {}",
                response.status(),
                pair,
                date
            )));
        }

        let body: HistoricalResponse = response
            .json()
            .await
            .map_err(|e| ConverterError::Upstream(format!("Malformed historical rate: {}", e)))?;

        Ok(body.rates.and_then(|rates| rates.get(&pair.to).copied()))
    }
}
