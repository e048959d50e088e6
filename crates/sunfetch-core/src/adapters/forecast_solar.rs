use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use super::{get_json, relay_url};
use crate::config::Routes;
use crate::data_source::{FetchFuture, FetchRequest, ForecastError, ForecastSource, ResolvedParams};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{CanonicalResult, DataType, DateRange, Metric, MetricSeries, ProviderId};

/// Adapter for the coordinate-based estimate/history API.
///
/// With a paid key the paid route is tried first and forecast requests fall
/// back to the free route on failure. History is paid-only.
#[derive(Clone)]
pub struct ForecastSolarAdapter {
    http_client: Arc<dyn HttpClient>,
    relay_url: String,
    routes: Routes,
    paid_tier: bool,
    timeout_ms: Option<u64>,
}

impl ForecastSolarAdapter {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        relay_url: impl Into<String>,
        routes: Routes,
        paid_tier: bool,
    ) -> Self {
        Self {
            http_client,
            relay_url: relay_url.into(),
            routes,
            paid_tier,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_forecast(&self, params: &ResolvedParams) -> Result<CanonicalResult, ForecastError> {
        if self.paid_tier {
            match self.fetch_estimate(&self.routes.paid, params).await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    tracing::warn!(error = %error, "paid tier estimate failed; retrying on free tier");
                }
            }
        }

        self.fetch_estimate(&self.routes.free, params).await
    }

    async fn fetch_estimate(
        &self,
        route: &str,
        params: &ResolvedParams,
    ) -> Result<CanonicalResult, ForecastError> {
        let mut segments = vec![String::from("estimate")];
        segments.extend(coordinate_segments(params));
        let request = HttpRequest::get(relay_url(&self.relay_url, route, &segments))
            .with_timeout_ms(self.timeout_ms);

        let response: EstimateResponse =
            get_json(self.http_client.as_ref(), ProviderId::ForecastSolar, request).await?;
        log_message(route, response.message.as_ref());

        let estimate = response
            .result
            .ok_or_else(|| ForecastError::parse("estimate response carries no result"))?;

        let mut result = CanonicalResult::new();
        for (metric, series) in [
            (Metric::Power, estimate.watts),
            (Metric::PeriodEnergy, estimate.watt_hours_period),
            (Metric::CumulativeEnergy, estimate.watt_hours),
            (Metric::DailyEnergy, estimate.watt_hours_day),
        ] {
            if let Some(series) = series {
                result.insert_series(metric.as_str(), series);
            }
        }
        Ok(result)
    }

    async fn fetch_history(
        &self,
        params: &ResolvedParams,
        metric: Metric,
    ) -> Result<CanonicalResult, ForecastError> {
        if !self.paid_tier {
            return Err(ForecastError::configuration(
                "historical data requires a paid key",
            ));
        }

        let range = params
            .date_range
            .unwrap_or_else(|| DateRange::trailing_week(OffsetDateTime::now_utc().date()));

        let mut segments = vec![String::from("history"), String::from("watthours")];
        segments.extend(coordinate_segments(params));
        segments.push(range.start_str());
        segments.push(range.end_str());
        let request = HttpRequest::get(relay_url(&self.relay_url, &self.routes.paid, &segments))
            .with_timeout_ms(self.timeout_ms);

        let response: HistoryResponse =
            get_json(self.http_client.as_ref(), ProviderId::ForecastSolar, request).await?;
        log_message(&self.routes.paid, response.message.as_ref());

        let series = response
            .result
            .ok_or_else(|| ForecastError::parse("history response carries no result"))?
            .into_series(metric);

        let mut result = CanonicalResult::new();
        result.insert_history(metric, series);
        Ok(result)
    }
}

impl ForecastSource for ForecastSolarAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ForecastSolar
    }

    fn fetch<'a>(&'a self, request: FetchRequest) -> FetchFuture<'a> {
        Box::pin(async move {
            match request.data_type {
                DataType::Forecast => self.fetch_forecast(&request.params).await,
                DataType::Historical => self.fetch_history(&request.params, request.metric).await,
            }
        })
    }
}

fn coordinate_segments(params: &ResolvedParams) -> [String; 5] {
    [
        params.latitude.to_string(),
        params.longitude.to_string(),
        params.tilt.to_string(),
        params.azimuth.to_string(),
        params.kwp.to_string(),
    ]
}

fn log_message(route: &str, message: Option<&ResponseMessage>) {
    let Some(message) = message else {
        return;
    };

    if let Some(limit) = &message.ratelimit {
        tracing::info!(
            route,
            zone = limit.zone.as_deref().unwrap_or("-"),
            period = limit.period,
            limit = limit.limit,
            remaining = limit.remaining,
            "forecast_solar rate limit"
        );
    }
    if let Some(info) = &message.info {
        tracing::debug!(route, info = %info, "forecast_solar response info");
    }
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    #[serde(default)]
    result: Option<EstimateResult>,
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct EstimateResult {
    #[serde(default)]
    watts: Option<MetricSeries>,
    #[serde(default)]
    watt_hours_period: Option<MetricSeries>,
    #[serde(default)]
    watt_hours: Option<MetricSeries>,
    #[serde(default)]
    watt_hours_day: Option<MetricSeries>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    result: Option<HistoryResult>,
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryResult {
    Flat(MetricSeries),
    Nested(BTreeMap<String, MetricSeries>),
}

impl HistoryResult {
    fn into_series(self, metric: Metric) -> MetricSeries {
        match self {
            Self::Flat(series) => series,
            Self::Nested(mut by_metric) => by_metric
                .remove(metric.as_str())
                .or_else(|| by_metric.remove(Metric::CumulativeEnergy.as_str()))
                .or_else(|| by_metric.into_values().next())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    ratelimit: Option<RateLimit>,
    #[serde(default)]
    info: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RateLimit {
    #[serde(default)]
    zone: Option<String>,
    #[serde(default)]
    period: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    remaining: Option<i64>,
}
