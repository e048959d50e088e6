//! # Domain Models
//!
//! Canonical domain types for solar forecast retrieval.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Location`] | Configured PV installation |
//! | [`InlineLocation`] | Ad-hoc location parameters on a query |
//! | [`QueryDescriptor`] | One visualization target |
//! | [`Metric`] | Canonical metric catalogue |
//! | [`ForecastPeriod`] | Day filter applied before emission |
//! | [`DateRange`] | Inclusive history window |
//! | [`CanonicalResult`] | Metric key to timestamp/value series |
//! | [`TimeSeries`] | Ordered output for one target |
//!
//! ## Validation
//!
//! Locations, date ranges and period labels validate on construction and
//! deserialization:
//!
//! ```rust,ignore
//! use sunfetch_core::{DateRange, ValidationError};
//!
//! let range = DateRange::parse("2025-07-01", "2025-07-06")?;
//! assert!(matches!(
//!     DateRange::parse("2025-07-06", "2025-07-01"),
//!     Err(ValidationError::InvertedDateRange { .. })
//! ));
//! ```

mod location;
mod query;
mod series;
pub mod timestamp;

pub use location::{
    InlineLocation, Location, DEFAULT_AZIMUTH_DEGREES, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
    DEFAULT_PEAK_POWER_KWP, DEFAULT_TILT_DEGREES,
};
pub use query::{
    format_date, parse_date, DataType, DateRange, ForecastPeriod, Metric, QueryDescriptor,
    LEGACY_HISTORY_KEY,
};
pub use series::{CanonicalResult, MetricSeries, TimeSeries, TimeSeriesPoint};
