//! In-memory result cache and per-provider rate gate.
//!
//! A cached result is served while it is younger than its effective TTL.
//! Past that, a new provider call is only made if the provider has not been
//! called successfully within its minimum interval; otherwise the stale
//! entry is served. Entries are overwritten on refresh and never evicted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::data_source::{ForecastError, ResolvedParams};
use crate::provider_policy::CachePolicy;
use crate::{CanonicalResult, DataType, DateRange, ForecastPeriod, Metric, ProviderId};

/// Every parameter that affects a provider result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: ProviderId,
    /// latitude, longitude, tilt, azimuth, kwp as IEEE bit patterns.
    coordinates: [u64; 5],
    site_id: Option<String>,
    data_type: DataType,
    metric: Metric,
    date_range: Option<DateRange>,
    forecast_period: ForecastPeriod,
}

impl CacheKey {
    pub fn new(
        provider: ProviderId,
        params: &ResolvedParams,
        data_type: DataType,
        metric: Metric,
        forecast_period: ForecastPeriod,
    ) -> Self {
        Self {
            provider,
            coordinates: [
                coordinate_bits(params.latitude),
                coordinate_bits(params.longitude),
                coordinate_bits(params.tilt),
                coordinate_bits(params.azimuth),
                coordinate_bits(params.kwp),
            ],
            site_id: params.site_id.clone(),
            data_type,
            metric,
            date_range: params.date_range,
            forecast_period,
        }
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }
}

fn coordinate_bits(value: f64) -> u64 {
    // -0.0 and 0.0 address the same location
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: Arc<CanonicalResult>,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    last_call: HashMap<ProviderId, Instant>,
}

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Stale,
    Fetched,
}

/// Result cache plus rate-gate state, shared by every target of one data source.
#[derive(Debug, Clone)]
pub struct RequestCache {
    inner: Arc<RwLock<CacheInner>>,
    policy: CachePolicy,
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl RequestCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner::default())),
            policy,
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Returns the result for `key`, calling `fetcher` only when the cache
    /// and the rate gate allow it.
    ///
    /// A failing fetch leaves both the cache and the rate gate untouched.
    pub async fn obtain<F, Fut>(
        &self,
        key: CacheKey,
        metric: Metric,
        fetcher: F,
    ) -> Result<Arc<CanonicalResult>, ForecastError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CanonicalResult, ForecastError>>,
    {
        self.obtain_with_outcome(key, metric, fetcher)
            .await
            .map(|(result, _)| result)
    }

    pub async fn obtain_with_outcome<F, Fut>(
        &self,
        key: CacheKey,
        metric: Metric,
        fetcher: F,
    ) -> Result<(Arc<CanonicalResult>, CacheOutcome), ForecastError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CanonicalResult, ForecastError>>,
    {
        let provider = key.provider();
        let ttl = self.policy.effective_ttl(provider, metric);
        let min_interval = self.policy.min_interval(provider);

        {
            let inner = self.inner.read().await;
            let now = Instant::now();

            if let Some(entry) = inner.entries.get(&key) {
                let age = now.saturating_duration_since(entry.fetched_at);
                if age < ttl {
                    tracing::debug!(%provider, %metric, age_secs = age.as_secs(), "cache hit");
                    return Ok((Arc::clone(&entry.result), CacheOutcome::Hit));
                }

                let since_last_call = inner
                    .last_call
                    .get(&provider)
                    .map(|last| now.saturating_duration_since(*last));
                if since_last_call.is_some_and(|elapsed| elapsed < min_interval) {
                    tracing::debug!(
                        %provider,
                        %metric,
                        age_secs = age.as_secs(),
                        "rate gate closed; serving stale cache entry"
                    );
                    return Ok((Arc::clone(&entry.result), CacheOutcome::Stale));
                }
            }
        }

        tracing::debug!(%provider, %metric, "cache miss; calling provider");
        let result = Arc::new(fetcher().await?);

        let mut inner = self.inner.write().await;
        let completed = Instant::now();
        inner.last_call.insert(provider, completed);
        inner.entries.insert(
            key,
            CacheEntry {
                result: Arc::clone(&result),
                fetched_at: completed,
            },
        );

        Ok((result, CacheOutcome::Fetched))
    }

    /// Instant of the last successful call to `provider`.
    pub async fn last_call(&self, provider: ProviderId) -> Option<Instant> {
        self.inner.read().await.last_call.get(&provider).copied()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.last_call.clear();
    }
}
