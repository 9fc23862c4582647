//! Historical rate series for the trend chart
//!
//! Builds the "last 7 days" series for a currency pair by fetching one rate
//! per calendar date. The date range is inclusive on both ends (today-7
//! through today), which yields 8 points; that is the observed behavior the
//! chart was built around and is kept deliberately, label notwithstanding.

use crate::currency::CurrencyPair;
use crate::fetch::RateSource;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use serde::Serialize;

/// Days back from today for the series start
const LOOKBACK_DAYS: i64 = 7;

/// Notice shown when the whole series had to fall back to sample data
const FALLBACK_NOTICE: &str = "Unable to load historical data. Using sample data.";

/// One dated rate observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// A built series: live data, or the fixed sample when nothing was usable
#[derive(Debug, Clone, PartialEq)]
pub enum HistoricalSeries {
    /// Date-ordered live points; may be shorter than the requested range
    /// when some dates had no data
    Success { points: Vec<HistoricalPoint> },
    /// Fixed sample series plus a user-visible notice. The sample does not
    /// reflect the requested currencies.
    Fallback {
        points: Vec<HistoricalPoint>,
        notice: String,
    },
}

impl HistoricalSeries {
    /// The points to plot, regardless of origin
    pub fn points(&self) -> &[HistoricalPoint] {
        match self {
            HistoricalSeries::Success { points } => points,
            HistoricalSeries::Fallback { points, .. } => points,
        }
    }

    /// The user-visible notice, set only in the fallback case
    pub fn notice(&self) -> Option<&str> {
        match self {
            HistoricalSeries::Success { .. } => None,
            HistoricalSeries::Fallback { notice, .. } => Some(notice),
        }
    }

    /// Whether this series is the built-in sample
    pub fn is_fallback(&self) -> bool {
        matches!(self, HistoricalSeries::Fallback { .. })
    }
}

/// The calendar dates the series covers: `today - 7` through `today`,
/// both endpoints included, so 8 dates in all.
pub fn series_dates(today: NaiveDate) -> Vec<NaiveDate> {
    let start = today - Duration::days(LOOKBACK_DAYS);
    let mut dates = Vec::new();
    let mut current = start;
    while current <= today {
        dates.push(current);
        current = current + Duration::days(1);
    }
    dates
}

/// The fixed sample series used when live data is entirely unavailable
pub fn sample_series() -> Vec<HistoricalPoint> {
    let rates = [1.1, 1.15, 1.2, 1.25, 1.2, 1.18, 1.22];
    rates
        .iter()
        .enumerate()
        .map(|(i, &rate)| HistoricalPoint {
            date: NaiveDate::from_ymd_opt(2023, 1, 1 + i as u32).unwrap(),
            rate,
        })
        .collect()
}

/// Build the historical series for `pair`, ending at `today`.
///
/// All per-date requests are issued concurrently and joined; sequential
/// fetching would compound the per-request latency eightfold. A date whose
/// request fails or returns no data is dropped from the series without
/// aborting the rest. Only when no date survives does the series fall back
/// to the built-in sample.
pub async fn build_series<R: RateSource>(
    source: &R,
    pair: &CurrencyPair,
    today: NaiveDate,
) -> HistoricalSeries {
    let dates = series_dates(today);
    let fetches = dates.iter().map(|&date| source.fetch_historical(date, pair));
    let outcomes = join_all(fetches).await;

    let mut points = Vec::new();
    for (date, outcome) in dates.into_iter().zip(outcomes) {
        match outcome {
            Ok(Some(rate)) => points.push(HistoricalPoint { date, rate }),
            Ok(None) => {}
            Err(e) => {
                log::warn!("Historical rate for {} on {} failed: {}", pair, date, e);
            }
        }
    }

    if points.is_empty() {
        HistoricalSeries::Fallback {
            points: sample_series(),
            notice: FALLBACK_NOTICE.to_string(),
        }
    } else {
        HistoricalSeries::Success { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{CurrencyCode, RateTable};
    use crate::error::{ConverterError, Result};
    use std::collections::HashMap;

    /// Per-date scripted outcome for the stub source
    #[derive(Clone, Copy)]
    enum Outcome {
        Rate(f64),
        Absent,
        Fail,
    }

    struct ScriptedSource {
        outcomes: HashMap<NaiveDate, Outcome>,
    }

    impl ScriptedSource {
        fn uniform(today: NaiveDate, outcome: Outcome) -> Self {
            let outcomes = series_dates(today)
                .into_iter()
                .map(|date| (date, outcome))
                .collect();
            Self { outcomes }
        }
    }

    impl RateSource for ScriptedSource {
        async fn fetch_latest(&self, base: &CurrencyCode) -> Result<RateTable> {
            Err(ConverterError::Upstream(format!(
                "latest rates not scripted for {}",
                base
            )))
        }

        async fn fetch_historical(
            &self,
            date: NaiveDate,
            _pair: &CurrencyPair,
        ) -> Result<Option<f64>> {
            match self.outcomes.get(&date) {
                Some(Outcome::Rate(rate)) => Ok(Some(*rate)),
                Some(Outcome::Absent) | None => Ok(None),
                Some(Outcome::Fail) => Err(ConverterError::Network("connection refused".into())),
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn pair() -> CurrencyPair {
        CurrencyPair::new("USD", "EUR")
    }

    #[test]
    fn test_series_dates_are_eight_inclusive() {
        let dates = series_dates(today());

        assert_eq!(dates.len(), 8);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(dates[7], today());
        for window in dates.windows(2) {
            assert_eq!(window[1] - window[0], Duration::days(1));
        }
    }

    #[test]
    fn test_sample_series_shape() {
        let sample = sample_series();

        assert_eq!(sample.len(), 7);
        assert_eq!(sample[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(sample[0].rate, 1.1);
        assert_eq!(sample[6].rate, 1.22);
    }

    #[tokio::test]
    async fn test_full_success() {
        let source = ScriptedSource::uniform(today(), Outcome::Rate(0.91));
        let series = build_series(&source, &pair(), today()).await;

        assert!(!series.is_fallback());
        assert_eq!(series.points().len(), 8);
        assert!(series.notice().is_none());
    }

    #[tokio::test]
    async fn test_partial_absent_yields_shorter_series() {
        let mut source = ScriptedSource::uniform(today(), Outcome::Rate(0.91));
        let dates = series_dates(today());
        for absent in [dates[1], dates[3], dates[6]] {
            source.outcomes.insert(absent, Outcome::Absent);
        }

        let series = build_series(&source, &pair(), today()).await;

        assert!(!series.is_fallback());
        assert_eq!(series.points().len(), 5);

        // Surviving points stay in date order with the absent dates gone
        let expected: Vec<NaiveDate> = dates
            .iter()
            .enumerate()
            .filter(|(i, _)| ![1, 3, 6].contains(i))
            .map(|(_, &d)| d)
            .collect();
        let actual: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_single_failed_date_is_dropped() {
        let mut source = ScriptedSource::uniform(today(), Outcome::Rate(0.91));
        source.outcomes.insert(series_dates(today())[0], Outcome::Fail);

        let series = build_series(&source, &pair(), today()).await;

        assert!(!series.is_fallback());
        assert_eq!(series.points().len(), 7);
    }

    #[tokio::test]
    async fn test_all_absent_triggers_fallback() {
        let source = ScriptedSource::uniform(today(), Outcome::Absent);
        let series = build_series(&source, &pair(), today()).await;

        assert!(series.is_fallback());
        assert_eq!(series.points(), sample_series().as_slice());
        assert_eq!(
            series.notice(),
            Some("Unable to load historical data. Using sample data.")
        );
    }

    #[tokio::test]
    async fn test_all_failed_triggers_fallback() {
        let source = ScriptedSource::uniform(today(), Outcome::Fail);
        let series = build_series(&source, &pair(), today()).await;

        assert!(series.is_fallback());
        assert_eq!(series.points(), sample_series().as_slice());
    }
}
