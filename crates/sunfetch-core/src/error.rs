use thiserror::Error;

/// Validation and contract errors exposed by `sunfetch-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid provider '{value}', expected one of forecast_solar, solcast")]
    InvalidProvider { value: String },
    #[error(
        "invalid metric '{value}', expected one of watts, watt_hours, watt_hours_period, watt_hours_day, historical_watt_hours"
    )]
    InvalidMetric { value: String },
    #[error("invalid forecast period '{value}', expected today, tomorrow, day2..day6 or all")]
    InvalidForecastPeriod { value: String },
    #[error("invalid data type '{value}', expected forecast or historical")]
    InvalidDataType { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("location id cannot be empty")]
    EmptyLocationId,
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Top-level error type for loading a persisted data-source configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("location '{id}' is invalid: {source}")]
    InvalidLocation {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("duplicate location id '{id}'")]
    DuplicateLocation { id: String },

    #[error("utcOffsetMinutes must be within -1439..=1439, got {minutes}")]
    InvalidUtcOffset { minutes: i32 },
}
