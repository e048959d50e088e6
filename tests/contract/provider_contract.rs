//! Contract tests for the provider adapters.
//!
//! Every adapter is driven through the `ForecastSource` trait against a fake
//! transport, checking endpoint shape, tier selection and the mapping into
//! canonical results.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use sunfetch_core::{
    default_params, DateRange, FetchRequest, ForecastErrorKind, ForecastSolarAdapter,
    ForecastSource, HttpClient, HttpResponse, Metric, ProviderId, ResolvedParams, Routes,
    SolcastAdapter, LEGACY_HISTORY_KEY,
};
use time::OffsetDateTime;

use support::{estimate_body, solcast_body, FakeHttpClient, RELAY};

fn forecast_solar(http: &Arc<FakeHttpClient>, paid_tier: bool) -> ForecastSolarAdapter {
    ForecastSolarAdapter::new(
        Arc::clone(http) as Arc<dyn HttpClient>,
        RELAY,
        Routes::default(),
        paid_tier,
    )
}

fn solcast(http: &Arc<FakeHttpClient>, key_configured: bool) -> SolcastAdapter {
    SolcastAdapter::new(
        Arc::clone(http) as Arc<dyn HttpClient>,
        RELAY,
        Routes::default(),
        key_configured,
    )
}

fn site(site_id: &str) -> ResolvedParams {
    ResolvedParams {
        site_id: Some(site_id.to_owned()),
        ..default_params()
    }
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn adapters_report_their_provider_id() {
    let http = FakeHttpClient::new();

    assert_eq!(forecast_solar(&http, false).id(), ProviderId::ForecastSolar);
    assert_eq!(solcast(&http, true).id(), ProviderId::Solcast);
}

// =============================================================================
// Forecast.Solar: Forecast Endpoint
// =============================================================================

#[tokio::test]
async fn free_tier_estimate_uses_coordinate_path_and_copies_all_metrics() {
    // Given: No paid credential and a relay serving the free estimate
    let http = FakeHttpClient::new().respond("/forecast-solar/estimate/", HttpResponse::ok_json(estimate_body()));
    let adapter = forecast_solar(&http, false);

    // When: A forecast is fetched with the default parameters
    let result = adapter
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect("free tier succeeds");

    // Then: One call hits the documented path and all four metrics are present
    assert_eq!(
        http.urls(),
        vec![format!("{RELAY}/forecast-solar/estimate/51.13/10.42/30/180/5")]
    );
    for metric in Metric::FORECAST {
        assert!(result.metric(metric).is_some(), "{metric} should be copied");
    }
    assert_eq!(
        result.metric(Metric::Power).and_then(|s| s.get("2025-07-06 10:00:00")),
        Some(&500.0)
    );
    assert_eq!(result.metric(Metric::DailyEnergy).map(|s| s.len()), Some(2));
}

#[tokio::test]
async fn paid_tier_is_tried_first_when_credential_is_flagged() {
    let http = FakeHttpClient::new()
        .respond("/forecast-solar-paid/estimate/", HttpResponse::ok_json(estimate_body()));
    let adapter = forecast_solar(&http, true);

    adapter
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect("paid tier succeeds");

    let urls = http.urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains("/forecast-solar-paid/estimate/"));
}

#[tokio::test]
async fn failed_paid_forecast_falls_back_to_free_tier_once() {
    // Given: The paid route answers 401 while the free route works
    let http = FakeHttpClient::new()
        .respond(
            "/forecast-solar-paid/",
            HttpResponse::with_status(401, r#"{"message":{"text":"invalid key"}}"#),
        )
        .respond("/forecast-solar/estimate/", HttpResponse::ok_json(estimate_body()));
    let adapter = forecast_solar(&http, true);

    // When: A forecast is fetched
    let result = adapter
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect("free tier rescues the request");

    // Then: Paid first, then exactly one free call
    let urls = http.urls();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].contains("/forecast-solar-paid/estimate/"));
    assert!(urls[1].contains("/forecast-solar/estimate/"));
    assert!(!result.is_empty());
}

#[tokio::test]
async fn missing_metric_maps_are_absent_not_errors() {
    let http = FakeHttpClient::new().respond(
        "/estimate/",
        HttpResponse::ok_json(r#"{"result":{"watts":{"2025-07-06 10:00:00":500}},"message":{}}"#),
    );

    let result = forecast_solar(&http, false)
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect("partial result");

    assert!(result.metric(Metric::Power).is_some());
    assert!(result.metric(Metric::DailyEnergy).is_none());
}

// =============================================================================
// Forecast.Solar: Historical Endpoint
// =============================================================================

#[tokio::test]
async fn history_without_paid_credential_fails_before_any_call() {
    let http = FakeHttpClient::new();

    let error = forecast_solar(&http, false)
        .fetch(FetchRequest::historical(default_params(), Metric::CumulativeEnergy))
        .await
        .expect_err("history needs a paid key");

    assert_eq!(error.kind(), ForecastErrorKind::Configuration);
    assert!(error.message().contains("historical data requires a paid key"));
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn history_uses_requested_range_and_stores_three_aliases() {
    // Given: A paid credential and an explicit date range
    let http = FakeHttpClient::new().respond(
        "/forecast-solar-paid/history/watthours/",
        HttpResponse::ok_json(r#"{"result":{"2025-07-01 12:00:00":1200,"2025-07-02 12:00:00":1300}}"#),
    );
    let params = ResolvedParams {
        date_range: Some(DateRange::parse("2025-07-01", "2025-07-03").expect("range")),
        ..default_params()
    };

    // When: History is fetched for cumulative energy
    let result = forecast_solar(&http, true)
        .fetch(FetchRequest::historical(params, Metric::CumulativeEnergy))
        .await
        .expect("history succeeds");

    // Then: The range is in the path and the series is stored three times
    assert_eq!(
        http.urls(),
        vec![format!(
            "{RELAY}/forecast-solar-paid/history/watthours/51.13/10.42/30/180/5/2025-07-01/2025-07-03"
        )]
    );
    let requested = result.metric(Metric::CumulativeEnergy).expect("requested key");
    assert_eq!(result.metric(Metric::HistoricalEnergy), Some(requested));
    assert_eq!(result.series(LEGACY_HISTORY_KEY), Some(requested));
    assert_eq!(requested.len(), 2);
}

#[tokio::test]
async fn history_defaults_to_trailing_week_ending_today_utc() {
    let http = FakeHttpClient::new()
        .respond("/history/watthours/", HttpResponse::ok_json(r#"{"result":{}}"#));

    forecast_solar(&http, true)
        .fetch(FetchRequest::historical(default_params(), Metric::CumulativeEnergy))
        .await
        .expect("history succeeds");

    let expected = DateRange::trailing_week(OffsetDateTime::now_utc().date());
    let url = &http.urls()[0];
    assert!(
        url.ends_with(&format!("/{}/{}", expected.start_str(), expected.end_str())),
        "unexpected history url {url}"
    );
}

#[tokio::test]
async fn failed_paid_history_propagates_without_free_fallback() {
    let http = FakeHttpClient::new()
        .respond("/forecast-solar-paid/", HttpResponse::with_status(503, ""))
        .respond("/forecast-solar/", HttpResponse::ok_json(estimate_body()));

    let error = forecast_solar(&http, true)
        .fetch(FetchRequest::historical(default_params(), Metric::CumulativeEnergy))
        .await
        .expect_err("no free history exists");

    assert_eq!(error.kind(), ForecastErrorKind::Upstream);
    assert!(error.message().contains("503 Service Unavailable"));
    assert_eq!(http.call_count(), 1);
}

// =============================================================================
// Solcast
// =============================================================================

#[tokio::test]
async fn solcast_without_key_is_a_configuration_error() {
    let http = FakeHttpClient::new();

    let error = solcast(&http, false)
        .fetch(FetchRequest::forecast(site("abcd-1234"), Metric::Power))
        .await
        .expect_err("key required");

    assert_eq!(error.kind(), ForecastErrorKind::Configuration);
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn solcast_without_site_id_is_a_validation_error() {
    let http = FakeHttpClient::new();

    let error = solcast(&http, true)
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect_err("site required");

    assert_eq!(error.kind(), ForecastErrorKind::Validation);
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn solcast_rejects_historical_requests() {
    let http = FakeHttpClient::new();

    let error = solcast(&http, true)
        .fetch(FetchRequest::historical(site("abcd-1234"), Metric::Power))
        .await
        .expect_err("no history endpoint");

    assert_eq!(error.kind(), ForecastErrorKind::Validation);
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn solcast_entries_become_watts_at_window_start() {
    // Given: A rooftop site answering with two 30 minute periods
    let http = FakeHttpClient::new().respond("/rooftop_sites/", HttpResponse::ok_json(solcast_body()));

    // When: The site forecast is fetched
    let result = solcast(&http, true)
        .fetch(FetchRequest::forecast(site("site/with space"), Metric::Power))
        .await
        .expect("solcast succeeds");

    // Then: The site id is escaped and only watts are populated
    assert_eq!(
        http.urls(),
        vec![format!("{RELAY}/solcast/rooftop_sites/site%2Fwith%20space/forecasts")]
    );
    let watts = result.metric(Metric::Power).expect("watts");
    assert_eq!(watts.get("2025-07-06T11:00:00Z"), Some(&500.0));
    assert_eq!(watts.get("2025-07-06T11:30:00Z"), Some(&750.0));
    assert!(result.metric(Metric::DailyEnergy).is_none());
}

// =============================================================================
// Upstream Failures
// =============================================================================

#[tokio::test]
async fn error_status_message_is_extracted_from_body() {
    let http = FakeHttpClient::new().respond(
        "/estimate/",
        HttpResponse::with_status(429, r#"{"message":{"type":"error","text":"Rate limit for API calls reached.","code":429}}"#),
    );

    let error = forecast_solar(&http, false)
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect_err("rate limited");

    assert!(error.is_upstream());
    assert!(error.message().contains("Rate limit for API calls reached."));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let http = FakeHttpClient::new().respond("/rooftop_sites/", HttpResponse::ok_json("<html>relay down</html>"));

    let error = solcast(&http, true)
        .fetch(FetchRequest::forecast(site("abcd"), Metric::Power))
        .await
        .expect_err("not json");

    assert_eq!(error.kind(), ForecastErrorKind::Parse);
    assert!(error.is_upstream());
}

#[tokio::test]
async fn transport_failure_is_an_upstream_error() {
    let http = FakeHttpClient::new().fail("/estimate/", "connection refused");

    let error = forecast_solar(&http, false)
        .fetch(FetchRequest::forecast(default_params(), Metric::Power))
        .await
        .expect_err("transport down");

    assert_eq!(error.kind(), ForecastErrorKind::Upstream);
    assert!(error.message().contains("connection refused"));
}
