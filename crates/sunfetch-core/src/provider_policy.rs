use std::time::Duration;

use crate::{Metric, ProviderId};

/// Cache freshness and outbound call spacing for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    /// TTL for results that only change a few times a day.
    pub base_ttl: Duration,
    /// Floor for the TTL of fast-moving metrics.
    pub min_ttl: Duration,
    /// Minimum spacing between two successful calls to the provider.
    pub min_interval: Duration,
    /// When set, every metric uses `base_ttl`.
    pub uniform_ttl: bool,
}

impl ProviderPolicy {
    pub fn forecast_solar_default() -> Self {
        Self {
            provider_id: ProviderId::ForecastSolar,
            base_ttl: Duration::from_secs(30 * 60),
            min_ttl: Duration::from_secs(10 * 60),
            min_interval: Duration::from_secs(5 * 60),
            uniform_ttl: false,
        }
    }

    pub fn solcast_default() -> Self {
        Self {
            provider_id: ProviderId::Solcast,
            base_ttl: Duration::from_secs(30 * 60),
            min_ttl: Duration::from_secs(30 * 60),
            min_interval: Duration::from_secs(30 * 60),
            uniform_ttl: true,
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::ForecastSolar => Self::forecast_solar_default(),
            ProviderId::Solcast => Self::solcast_default(),
        }
    }

    /// How long a cached result for `metric` stays fresh.
    ///
    /// Daily totals keep the full base TTL; intra-day metrics refresh at
    /// `max(min_ttl, base_ttl / 3)`.
    pub fn effective_ttl(&self, metric: Metric) -> Duration {
        if self.uniform_ttl || metric == Metric::DailyEnergy {
            return self.base_ttl;
        }
        self.min_ttl.max(self.base_ttl / 3)
    }
}

/// Policies for every provider a data source may call.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    forecast_solar: ProviderPolicy,
    solcast: ProviderPolicy,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            forecast_solar: ProviderPolicy::forecast_solar_default(),
            solcast: ProviderPolicy::solcast_default(),
        }
    }
}

impl CachePolicy {
    pub fn with_provider(mut self, policy: ProviderPolicy) -> Self {
        match policy.provider_id {
            ProviderId::ForecastSolar => self.forecast_solar = policy,
            ProviderId::Solcast => self.solcast = policy,
        }
        self
    }

    pub fn provider(&self, provider_id: ProviderId) -> &ProviderPolicy {
        match provider_id {
            ProviderId::ForecastSolar => &self.forecast_solar,
            ProviderId::Solcast => &self.solcast,
        }
    }

    pub fn effective_ttl(&self, provider_id: ProviderId, metric: Metric) -> Duration {
        self.provider(provider_id).effective_ttl(metric)
    }

    pub fn min_interval(&self, provider_id: ProviderId) -> Duration {
        self.provider(provider_id).min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn forecast_solar_daily_totals_keep_thirty_minutes() {
        let policy = CachePolicy::default();

        assert_eq!(
            policy.effective_ttl(ProviderId::ForecastSolar, Metric::DailyEnergy),
            30 * MINUTE
        );
    }

    #[test]
    fn forecast_solar_intraday_metrics_refresh_after_ten_minutes() {
        let policy = CachePolicy::default();

        for metric in [
            Metric::Power,
            Metric::PeriodEnergy,
            Metric::CumulativeEnergy,
            Metric::HistoricalEnergy,
        ] {
            assert_eq!(
                policy.effective_ttl(ProviderId::ForecastSolar, metric),
                10 * MINUTE,
                "metric {metric}"
            );
        }
    }

    #[test]
    fn solcast_uses_thirty_minutes_for_everything() {
        let policy = CachePolicy::default();

        assert_eq!(policy.effective_ttl(ProviderId::Solcast, Metric::Power), 30 * MINUTE);
        assert_eq!(policy.min_interval(ProviderId::Solcast), 30 * MINUTE);
        assert_eq!(policy.min_interval(ProviderId::ForecastSolar), 5 * MINUTE);
    }

    #[test]
    fn overriding_one_provider_keeps_the_other() {
        let policy = CachePolicy::default().with_provider(ProviderPolicy {
            min_interval: Duration::ZERO,
            ..ProviderPolicy::forecast_solar_default()
        });

        assert_eq!(policy.min_interval(ProviderId::ForecastSolar), Duration::ZERO);
        assert_eq!(policy.min_interval(ProviderId::Solcast), 30 * MINUTE);
    }
}
