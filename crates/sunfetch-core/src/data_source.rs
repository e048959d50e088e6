//! Forecast source trait and request/error types.
//!
//! This module defines the adapter contract (`ForecastSource`) every
//! provider implementation follows. The cache and the service only ever
//! talk to this trait, so each adapter can be swapped for a fake in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use sunfetch_core::{DataType, FetchRequest, ForecastSource, Metric};
//!
//! async fn watts(source: &dyn ForecastSource, request: FetchRequest) {
//!     let result = source.fetch(request).await?;
//!     for (time, value) in result.metric(Metric::Power).into_iter().flatten() {
//!         println!("{time}: {value} W");
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{CanonicalResult, DataType, DateRange, Metric, ProviderId, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastErrorKind {
    /// Missing credential, or a tier that does not offer the request.
    Configuration,
    /// A required query field is missing or malformed.
    Validation,
    /// A referenced location id is not configured.
    NotFound,
    /// The provider answered with a non-success status or could not be reached.
    Upstream,
    /// The provider answered with a body of unexpected shape.
    Parse,
}

/// Structured error surfaced per query target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastError {
    kind: ForecastErrorKind,
    message: String,
}

impl ForecastError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: ForecastErrorKind::Configuration,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ForecastErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn location_not_found(location_id: &str) -> Self {
        Self {
            kind: ForecastErrorKind::NotFound,
            message: format!("location '{location_id}' is not configured"),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ForecastErrorKind::Upstream,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ForecastErrorKind::Parse,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ForecastErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Upstream failures and unparseable upstream bodies are handled alike.
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self.kind,
            ForecastErrorKind::Upstream | ForecastErrorKind::Parse
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ForecastErrorKind::Configuration => "forecast.configuration",
            ForecastErrorKind::Validation => "forecast.validation",
            ForecastErrorKind::NotFound => "forecast.not_found",
            ForecastErrorKind::Upstream => "forecast.upstream",
            ForecastErrorKind::Parse => "forecast.parse",
        }
    }
}

impl Display for ForecastError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ForecastError {}

impl From<ValidationError> for ForecastError {
    fn from(error: ValidationError) -> Self {
        Self::validation(error.to_string())
    }
}

/// Fully resolved location parameters for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParams {
    pub latitude: f64,
    pub longitude: f64,
    pub tilt: f64,
    pub azimuth: f64,
    pub kwp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Everything an adapter needs to perform one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub params: ResolvedParams,
    pub data_type: DataType,
    pub metric: Metric,
}

impl FetchRequest {
    pub fn forecast(params: ResolvedParams, metric: Metric) -> Self {
        Self {
            params,
            data_type: DataType::Forecast,
            metric,
        }
    }

    pub fn historical(params: ResolvedParams, metric: Metric) -> Self {
        Self {
            params,
            data_type: DataType::Historical,
            metric,
        }
    }
}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CanonicalResult, ForecastError>> + Send + 'a>>;

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync` as one adapter serves every
/// concurrently resolving target of a data source.
pub trait ForecastSource: Send + Sync {
    /// Returns the provider this adapter talks to.
    fn id(&self) -> ProviderId;

    /// Retrieves and normalizes one result.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError`] if:
    /// - a required credential or site id is missing (no call is made)
    /// - the provider answers with a non-success status
    /// - the response body does not have the expected shape
    fn fetch<'a>(&'a self, request: FetchRequest) -> FetchFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_count_as_upstream() {
        assert!(ForecastError::parse("bad body").is_upstream());
        assert!(ForecastError::upstream("502").is_upstream());
        assert!(!ForecastError::configuration("no key").is_upstream());
    }

    #[test]
    fn display_appends_stable_code() {
        let error = ForecastError::location_not_found("loc_x");
        assert_eq!(
            error.to_string(),
            "location 'loc_x' is not configured (forecast.not_found)"
        );
        assert_eq!(error.kind(), ForecastErrorKind::NotFound);
    }

    #[test]
    fn validation_errors_convert_to_validation_kind() {
        let error = ForecastError::from(ValidationError::EmptyLocationId);
        assert_eq!(error.kind(), ForecastErrorKind::Validation);
    }
}
