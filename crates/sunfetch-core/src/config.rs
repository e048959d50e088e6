//! Persisted data-source configuration.
//!
//! ```json
//! {
//!   "provider": "forecast_solar",
//!   "hasCredentialFlag": true,
//!   "locations": [
//!     { "id": "loc_roof", "name": "Roof", "latitude": 48.14, "longitude": 11.58,
//!       "tilt": 35, "azimuth": 170, "kwp": 9.8 }
//!   ],
//!   "utcOffsetMinutes": 120
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::{ConfigError, Location, ProviderId};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/api/datasources/proxy";

/// Route names appended to the relay base URL, one per provider tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routes {
    #[serde(default = "default_free_route")]
    pub free: String,
    #[serde(default = "default_paid_route")]
    pub paid: String,
    #[serde(default = "default_alt_route")]
    pub alt: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            free: default_free_route(),
            paid: default_paid_route(),
            alt: default_alt_route(),
        }
    }
}

fn default_relay_url() -> String {
    String::from(DEFAULT_RELAY_URL)
}

fn default_free_route() -> String {
    String::from("forecast-solar")
}

fn default_paid_route() -> String {
    String::from("forecast-solar-paid")
}

fn default_alt_route() -> String {
    String::from("solcast")
}

/// Credential-presence flags read from secure storage.
///
/// The credentials themselves are injected by the relay and never reach
/// this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureFlags {
    #[serde(default)]
    pub forecast_solar_key: bool,
    #[serde(default)]
    pub solcast_key: bool,
}

/// Configuration of one forecast data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderId,
    /// Enables the paid tier and historical data of the coordinate-based provider.
    #[serde(default)]
    pub has_credential_flag: bool,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default)]
    pub routes: Routes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

fn default_provider() -> ProviderId {
    ProviderId::ForecastSolar
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            has_credential_flag: false,
            locations: Vec::new(),
            relay_url: default_relay_url(),
            routes: Routes::default(),
            default_site_id: None,
            utc_offset_minutes: None,
            request_timeout_ms: None,
        }
    }
}

impl DataSourceConfig {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn with_credential_flag(mut self, has_credential_flag: bool) -> Self {
        self.has_credential_flag = has_credential_flag;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_relay_url(mut self, relay_url: impl Into<String>) -> Self {
        self.relay_url = relay_url.into();
        self
    }

    pub fn with_default_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.default_site_id = Some(site_id.into());
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for location in &self.locations {
            location
                .validate()
                .map_err(|source| ConfigError::InvalidLocation {
                    id: location.id.clone(),
                    source,
                })?;
            if !seen.insert(location.id.as_str()) {
                return Err(ConfigError::DuplicateLocation {
                    id: location.id.clone(),
                });
            }
        }

        if let Some(minutes) = self.utc_offset_minutes {
            configured_offset(minutes)?;
        }
        Ok(())
    }

    /// Wall-clock offset used for day windows and naive timestamps.
    ///
    /// Falls back to the host's offset, then UTC.
    ///
    /// The offset is a fixed one, read once when the service is built. Day
    /// windows that lie across a DST change are therefore off by the DST
    /// shift; set `utcOffsetMinutes` explicitly to pin it.
    pub fn local_offset(&self) -> UtcOffset {
        self.utc_offset_minutes
            .and_then(|minutes| configured_offset(minutes).ok())
            .or_else(|| UtcOffset::current_local_offset().ok())
            .unwrap_or(UtcOffset::UTC)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }
}

fn configured_offset(minutes: i32) -> Result<UtcOffset, ConfigError> {
    if !(-1439..=1439).contains(&minutes) {
        return Err(ConfigError::InvalidUtcOffset { minutes });
    }
    UtcOffset::from_whole_seconds(minutes * 60).map_err(|_| ConfigError::InvalidUtcOffset { minutes })
}
