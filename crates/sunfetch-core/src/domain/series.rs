use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::query::LEGACY_HISTORY_KEY;
use crate::Metric;

/// Timestamp key (as reported by the provider) to value.
pub type MetricSeries = BTreeMap<String, f64>;

/// Provider-independent result: metric key to time series.
///
/// Produced whole by an adapter and never patched afterwards; a refresh
/// replaces the entire value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalResult {
    metrics: BTreeMap<String, MetricSeries>,
}

impl CanonicalResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `series` under `key`, dropping values that are not finite or
    /// negative.
    pub fn insert_series(&mut self, key: impl Into<String>, series: MetricSeries) -> usize {
        let key = key.into();
        let before = series.len();
        let series: MetricSeries = series
            .into_iter()
            .filter(|(_, value)| value.is_finite() && *value >= 0.0)
            .collect();
        let dropped = before - series.len();
        if dropped > 0 {
            tracing::debug!(metric = %key, dropped, "dropped non-finite or negative values");
        }
        self.metrics.insert(key, series);
        dropped
    }

    /// Stores one history series under the requested metric, the historical
    /// metric and the legacy history key.
    pub fn insert_history(&mut self, requested: Metric, series: MetricSeries) {
        self.insert_series(requested.as_str(), series.clone());
        self.insert_series(Metric::HistoricalEnergy.as_str(), series.clone());
        self.insert_series(LEGACY_HISTORY_KEY, series);
    }

    pub fn series(&self, key: &str) -> Option<&MetricSeries> {
        self.metrics.get(key)
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricSeries> {
        self.series(metric.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.metrics.values().map(BTreeMap::len).sum()
    }
}

/// One emitted sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub const fn new(time: OffsetDateTime, value: f64) -> Self {
        Self { time, value }
    }
}

/// Ordered output for one query target. Points are ascending by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub ref_id: String,
    pub metric: Metric,
    pub points: Vec<TimeSeriesPoint>,
}
