//! # Sunfetch Core
//!
//! Solar production forecast retrieval, normalization and request caching.
//!
//! ## Overview
//!
//! This crate provides the retrieval layer behind a solar forecast data
//! source:
//!
//! - **Query resolution** from configured locations or inline parameters
//! - **Provider adapters** for a coordinate-based forecast API (free and paid
//!   tiers) and a site-based rooftop forecast API
//! - **Canonical results** mapping metric keys to timestamp/value series
//! - **Request cache and rate gate** protecting provider quotas
//! - **Time-series assembly** with day filtering and ordering
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Forecast.Solar, Solcast) |
//! | [`assembler`] | Period filter and ordering of output series |
//! | [`cache`] | Result cache and per-provider rate gate |
//! | [`config`] | Persisted data-source configuration |
//! | [`data_source`] | Adapter trait and request/error types |
//! | [`domain`] | Domain models (Location, QueryDescriptor, CanonicalResult) |
//! | [`error`] | Validation and configuration errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`provider_policy`] | Per-provider TTL and call interval |
//! | [`resolver`] | Location reference resolution |
//! | [`service`] | Retrieval service and batch entry point |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sunfetch_core::{DataSourceConfig, ForecastPeriod, ForecastService, Metric, QueryDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DataSourceConfig::load("datasource.json")?;
//!     let service = ForecastService::builder(config).build();
//!
//!     let targets = vec![QueryDescriptor::new("A", Metric::Power).with_period(ForecastPeriod::Today)];
//!     for result in service.run_query(&targets, None).await {
//!         let series = result?;
//!         for point in &series.points {
//!             println!("{}: {} W", point.time, point.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Host     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ForecastService │────▶│ Query Resolver   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Cache/Rate Gate │────▶│ ForecastSource   │────▶ HTTP Client
//! └────────┬────────┘     │ (Adapter Trait)  │      (reqwest)
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Assembler       │
//! │ (TimeSeries)    │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-target failures carry a structured [`ForecastError`]:
//!
//! ```rust
//! use sunfetch_core::{ForecastError, ForecastErrorKind};
//!
//! fn describe(error: &ForecastError) -> &'static str {
//!     match error.kind() {
//!         ForecastErrorKind::Configuration => "check the data source settings",
//!         ForecastErrorKind::NotFound => "the location was removed",
//!         _ if error.is_upstream() => "the provider is unavailable",
//!         _ => "the query is invalid",
//!     }
//! }
//!
//! assert_eq!(
//!     describe(&ForecastError::location_not_found("loc_x")),
//!     "the location was removed"
//! );
//! ```

pub mod adapters;
pub mod assembler;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider_policy;
pub mod resolver;
pub mod service;
pub mod source;

pub use adapters::{ForecastSolarAdapter, SolcastAdapter, SOLCAST_WINDOW};
pub use assembler::{assemble, day_window};
pub use cache::{CacheKey, CacheOutcome, RequestCache};
pub use config::{DataSourceConfig, Routes, SecureFlags, DEFAULT_RELAY_URL};
pub use data_source::{
    FetchFuture, FetchRequest, ForecastError, ForecastErrorKind, ForecastSource, ResolvedParams,
};
pub use domain::*;
pub use error::{ConfigError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider_policy::{CachePolicy, ProviderPolicy};
pub use resolver::{default_params, resolve_query};
pub use service::{
    ConnectivityReport, ConnectivityStatus, ForecastService, ForecastServiceBuilder, TargetFailure,
    TargetResult, TimeRange,
};
pub use source::ProviderId;
