use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Forecast providers a data source can be configured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Coordinate-based estimate/history API with free and paid tiers.
    #[serde(alias = "primary", alias = "forecastsolar")]
    ForecastSolar,
    /// Rooftop-site based API, addressed by site id.
    #[serde(alias = "alt")]
    Solcast,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ForecastSolar => "forecast_solar",
            Self::Solcast => "solcast",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ForecastSolar => "Forecast.Solar",
            Self::Solcast => "Solcast",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "forecast_solar" | "forecastsolar" | "primary" => Ok(Self::ForecastSolar),
            "solcast" | "alt" => Ok(Self::Solcast),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
