use std::sync::Arc;

use serde::Deserialize;
use time::{Duration, UtcOffset};

use super::{get_json, relay_url};
use crate::config::Routes;
use crate::data_source::{FetchFuture, FetchRequest, ForecastError, ForecastSource, ResolvedParams};
use crate::domain::timestamp::{format_instant, parse_instant};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{CanonicalResult, DataType, Metric, MetricSeries, ProviderId};

/// Length of one Solcast forecast period. Points are stamped at its start.
pub const SOLCAST_WINDOW: Duration = Duration::minutes(30);

/// Adapter for the site-based rooftop forecast API.
///
/// Only instantaneous power is produced; the key must be configured and
/// every request needs a rooftop site id.
#[derive(Clone)]
pub struct SolcastAdapter {
    http_client: Arc<dyn HttpClient>,
    relay_url: String,
    routes: Routes,
    key_configured: bool,
    timeout_ms: Option<u64>,
}

impl SolcastAdapter {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        relay_url: impl Into<String>,
        routes: Routes,
        key_configured: bool,
    ) -> Self {
        Self {
            http_client,
            relay_url: relay_url.into(),
            routes,
            key_configured,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_forecast(&self, request: &FetchRequest) -> Result<CanonicalResult, ForecastError> {
        if !self.key_configured {
            return Err(ForecastError::configuration("Solcast API key is not configured"));
        }
        let site_id = site_id(&request.params)?;
        if request.data_type == DataType::Historical {
            return Err(ForecastError::validation(
                "Solcast does not provide historical data",
            ));
        }

        let segments = [
            String::from("rooftop_sites"),
            urlencoding::encode(site_id).into_owned(),
            String::from("forecasts"),
        ];
        let http_request = HttpRequest::get(relay_url(&self.relay_url, &self.routes.alt, &segments))
            .with_timeout_ms(self.timeout_ms);

        let payload: ForecastsPayload =
            get_json(self.http_client.as_ref(), ProviderId::Solcast, http_request).await?;
        let (series, skipped) = power_series(payload.into_entries());
        if skipped > 0 {
            tracing::warn!(site_id, skipped, "skipped Solcast entries without a usable period end or estimate");
        }

        let mut result = CanonicalResult::new();
        result.insert_series(Metric::Power.as_str(), series);
        Ok(result)
    }
}

impl ForecastSource for SolcastAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Solcast
    }

    fn fetch<'a>(&'a self, request: FetchRequest) -> FetchFuture<'a> {
        Box::pin(async move { self.fetch_forecast(&request).await })
    }
}

fn site_id(params: &ResolvedParams) -> Result<&str, ForecastError> {
    params
        .site_id
        .as_deref()
        .filter(|site| !site.trim().is_empty())
        .ok_or_else(|| ForecastError::validation("Solcast requires a rooftop site id"))
}

/// Converts forecast entries to watts keyed by the period start.
///
/// Returns the series and the number of entries that were skipped.
fn power_series(entries: Vec<SolcastEntry>) -> (MetricSeries, usize) {
    let mut series = MetricSeries::new();
    let mut skipped = 0;

    for entry in entries {
        let point = entry.pv_estimate.and_then(|kilowatts| {
            let period_end = parse_instant(&entry.period_end, UtcOffset::UTC)?;
            let key = format_instant(period_end - SOLCAST_WINDOW)?;
            Some((key, (kilowatts * 1_000.0).round()))
        });

        match point {
            Some((key, watts)) => {
                series.insert(key, watts);
            }
            None => skipped += 1,
        }
    }

    (series, skipped)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ForecastsPayload {
    Wrapped { forecasts: Vec<SolcastEntry> },
    Bare(Vec<SolcastEntry>),
}

impl ForecastsPayload {
    fn into_entries(self) -> Vec<SolcastEntry> {
        match self {
            Self::Wrapped { forecasts } => forecasts,
            Self::Bare(entries) => entries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SolcastEntry {
    period_end: String,
    #[serde(default)]
    pv_estimate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(period_end: &str, pv_estimate: Option<f64>) -> SolcastEntry {
        SolcastEntry {
            period_end: String::from(period_end),
            pv_estimate,
        }
    }

    #[test]
    fn entries_are_stamped_at_period_start_in_watts() {
        let (series, skipped) = power_series(vec![
            entry("2025-07-06T10:30:00.0000000Z", Some(1.2345)),
            entry("2025-07-06T11:00:00Z", Some(0.0)),
        ]);

        assert_eq!(skipped, 0);
        assert_eq!(series.get("2025-07-06T10:00:00Z"), Some(&1235.0));
        assert_eq!(series.get("2025-07-06T10:30:00Z"), Some(&0.0));
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let (series, skipped) = power_series(vec![
            entry("not a time", Some(1.0)),
            entry("2025-07-06T11:00:00Z", None),
            entry("2025-07-06T11:30:00Z", Some(2.0)),
        ]);

        assert_eq!(skipped, 2);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn payload_accepts_wrapped_and_bare_lists() {
        let wrapped: ForecastsPayload = serde_json::from_str(
            r#"{"forecasts":[{"period_end":"2025-07-06T10:30:00Z","pv_estimate":1.0,"period":"PT30M"}]}"#,
        )
        .expect("wrapped");
        let bare: ForecastsPayload =
            serde_json::from_str(r#"[{"period_end":"2025-07-06T10:30:00Z","pv_estimate":1.0}]"#)
                .expect("bare");

        assert_eq!(wrapped.into_entries().len(), 1);
        assert_eq!(bare.into_entries().len(), 1);
    }

    #[test]
    fn blank_site_id_is_a_validation_error() {
        let params = ResolvedParams {
            site_id: Some(String::from("  ")),
            ..crate::resolver::default_params()
        };

        let error = site_id(&params).expect_err("blank site");

        assert_eq!(error.kind(), crate::ForecastErrorKind::Validation);
    }
}
