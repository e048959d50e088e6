//! Retrieval service: one instance per configured data source.
//!
//! `run_query` takes every target of a refresh through resolution, the
//! cache and rate gate, the provider adapter and the assembler. Targets run
//! concurrently and fail independently.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};
use tracing::Instrument;

use crate::adapters::{ForecastSolarAdapter, SolcastAdapter};
use crate::assembler::assemble;
use crate::cache::{CacheKey, RequestCache};
use crate::config::{DataSourceConfig, SecureFlags};
use crate::data_source::{FetchRequest, ForecastError, ForecastSource, ResolvedParams};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::provider_policy::CachePolicy;
use crate::resolver::{default_params, resolve_query};
use crate::{DataType, ForecastPeriod, Metric, ProviderId, QueryDescriptor, TimeSeries};

/// Dashboard time range a batch was requested for. Recorded, not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "time::serde::rfc3339")]
    pub from: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to: OffsetDateTime,
}

/// Failure of one target in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub ref_id: String,
    pub error: ForecastError,
}

impl TargetFailure {
    fn new(ref_id: &str, error: ForecastError) -> Self {
        Self {
            ref_id: ref_id.to_owned(),
            error,
        }
    }
}

impl Display for TargetFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "target {}: {}", self.ref_id, self.error)
    }
}

impl std::error::Error for TargetFailure {}

pub type TargetResult = Result<TimeSeries, TargetFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    Success,
    Error,
}

/// Outcome of a connectivity test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub status: ConnectivityStatus,
    pub message: String,
}

impl ConnectivityReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ConnectivityStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ConnectivityStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConnectivityStatus::Success
    }
}

/// Builder for [`ForecastService`].
///
/// Registers both provider adapters over one shared HTTP client. Adapters
/// added with [`with_adapter`](Self::with_adapter) replace the built-in
/// adapter of the same provider.
///
/// ```rust,ignore
/// use sunfetch_core::{DataSourceConfig, ForecastServiceBuilder, SecureFlags};
///
/// let service = ForecastServiceBuilder::new(DataSourceConfig::load("source.json")?)
///     .with_secure_flags(SecureFlags { forecast_solar_key: true, solcast_key: false })
///     .build();
/// ```
pub struct ForecastServiceBuilder {
    config: DataSourceConfig,
    secure_flags: SecureFlags,
    http_client: Option<Arc<dyn HttpClient>>,
    policy: CachePolicy,
    adapters: Vec<Arc<dyn ForecastSource>>,
    reference_date: Option<Date>,
}

impl ForecastServiceBuilder {
    pub fn new(config: DataSourceConfig) -> Self {
        Self {
            config,
            secure_flags: SecureFlags::default(),
            http_client: None,
            policy: CachePolicy::default(),
            adapters: Vec::new(),
            reference_date: None,
        }
    }

    pub fn with_secure_flags(mut self, secure_flags: SecureFlags) -> Self {
        self.secure_flags = secure_flags;
        self
    }

    /// Transport shared by the built-in adapters. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ForecastSource>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Pins the local date that day periods are computed from.
    pub fn with_reference_date(mut self, date: Date) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn build(self) -> ForecastService {
        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestHttpClient::new()),
        };
        let timeout_ms = self.config.request_timeout_ms;

        if self.config.has_credential_flag && !self.secure_flags.forecast_solar_key {
            tracing::warn!(
                "paid tier is flagged but no Forecast.Solar key is stored; paid calls will fall back"
            );
        }

        let mut adapters: HashMap<ProviderId, Arc<dyn ForecastSource>> = HashMap::new();
        adapters.insert(
            ProviderId::ForecastSolar,
            Arc::new(
                ForecastSolarAdapter::new(
                    Arc::clone(&http_client),
                    self.config.relay_url.clone(),
                    self.config.routes.clone(),
                    self.config.has_credential_flag,
                )
                .with_timeout_ms(timeout_ms),
            ),
        );
        adapters.insert(
            ProviderId::Solcast,
            Arc::new(
                SolcastAdapter::new(
                    http_client,
                    self.config.relay_url.clone(),
                    self.config.routes.clone(),
                    self.secure_flags.solcast_key,
                )
                .with_timeout_ms(timeout_ms),
            ),
        );
        for adapter in self.adapters {
            adapters.insert(adapter.id(), adapter);
        }

        let local_offset = self.config.local_offset();
        ForecastService {
            config: self.config,
            adapters,
            cache: RequestCache::new(self.policy),
            local_offset,
            reference_date: self.reference_date,
        }
    }
}

/// Long-lived retrieval service owning the cache and rate-gate state.
pub struct ForecastService {
    config: DataSourceConfig,
    adapters: HashMap<ProviderId, Arc<dyn ForecastSource>>,
    cache: RequestCache,
    local_offset: UtcOffset,
    reference_date: Option<Date>,
}

impl ForecastService {
    pub fn builder(config: DataSourceConfig) -> ForecastServiceBuilder {
        ForecastServiceBuilder::new(config)
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    pub const fn local_offset(&self) -> UtcOffset {
        self.local_offset
    }

    /// Local date day periods are computed from.
    pub fn today(&self) -> Date {
        self.reference_date
            .unwrap_or_else(|| OffsetDateTime::now_utc().to_offset(self.local_offset).date())
    }

    pub fn resolve_query(&self, descriptor: &QueryDescriptor) -> Result<ResolvedParams, ForecastError> {
        resolve_query(descriptor, &self.config.locations)
    }

    /// Runs every target concurrently and returns one result per
    /// descriptor, in input order.
    ///
    /// All targets are resolved before any provider is called, so a bad
    /// location reference never costs a network round trip.
    pub async fn run_query(
        &self,
        descriptors: &[QueryDescriptor],
        time_range: Option<TimeRange>,
    ) -> Vec<TargetResult> {
        let span = tracing::info_span!(
            "run_query",
            targets = descriptors.len(),
            from = ?time_range.map(|range| range.from),
            to = ?time_range.map(|range| range.to),
        );

        let resolved: Vec<_> = descriptors
            .iter()
            .map(|descriptor| self.resolve_query(descriptor))
            .collect();

        let targets = descriptors.iter().zip(resolved).map(|(descriptor, params)| async move {
            let outcome = match params {
                Ok(params) => self.run_target(descriptor, params).await,
                Err(error) => Err(error),
            };
            outcome.map_err(|error| {
                tracing::warn!(ref_id = %descriptor.ref_id, error = %error, "target failed");
                TargetFailure::new(&descriptor.ref_id, error)
            })
        });

        join_all(targets).instrument(span).await
    }

    async fn run_target(
        &self,
        descriptor: &QueryDescriptor,
        params: ResolvedParams,
    ) -> Result<TimeSeries, ForecastError> {
        let provider = descriptor.provider.unwrap_or(self.config.provider);
        let adapter = self.adapter(provider)?;

        let period = match descriptor.data_type {
            DataType::Forecast => descriptor.forecast_period,
            DataType::Historical => ForecastPeriod::All,
        };
        let key = CacheKey::new(provider, &params, descriptor.data_type, descriptor.metric, period);
        let request = FetchRequest {
            params,
            data_type: descriptor.data_type,
            metric: descriptor.metric,
        };

        let result = self
            .cache
            .obtain(key, descriptor.metric, || adapter.fetch(request))
            .await?;

        Ok(TimeSeries {
            ref_id: descriptor.ref_id.clone(),
            metric: descriptor.metric,
            points: assemble(
                &result,
                descriptor.metric.as_str(),
                period,
                self.today(),
                self.local_offset,
            ),
        })
    }

    /// Issues one uncached forecast request with the configured defaults.
    ///
    /// Never fails; every error is folded into the report.
    pub async fn test_connectivity(&self) -> ConnectivityReport {
        let provider = self.config.provider;
        let adapter = match self.adapter(provider) {
            Ok(adapter) => adapter,
            Err(error) => return ConnectivityReport::error(error.message()),
        };

        let mut params = self
            .config
            .locations
            .first()
            .map(|location| ResolvedParams {
                latitude: location.latitude,
                longitude: location.longitude,
                tilt: location.tilt_degrees,
                azimuth: location.azimuth_degrees,
                kwp: location.peak_power_kwp,
                site_id: None,
                date_range: None,
            })
            .unwrap_or_else(default_params);
        params.site_id = self.config.default_site_id.clone();

        match adapter
            .fetch(FetchRequest::forecast(params, Metric::Power))
            .await
        {
            Ok(result) => ConnectivityReport::success(format!(
                "{} connection OK ({} data points)",
                provider.display_name(),
                result.point_count()
            )),
            Err(error) => {
                tracing::debug!(%provider, error = %error, "connectivity test failed");
                ConnectivityReport::error(error.message())
            }
        }
    }

    fn adapter(&self, provider: ProviderId) -> Result<&Arc<dyn ForecastSource>, ForecastError> {
        self.adapters.get(&provider).ok_or_else(|| {
            ForecastError::configuration(format!("no adapter registered for provider '{provider}'"))
        })
    }
}
