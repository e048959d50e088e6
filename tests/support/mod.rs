//! Shared fixtures for behavior tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sunfetch_core::{
    DataSourceConfig, ForecastService, ForecastServiceBuilder, HttpClient, HttpError, HttpRequest,
    HttpResponse, Location, SecureFlags,
};
use time::macros::date;
use time::Date;

pub const RELAY: &str = "http://relay.test/api/datasources/proxy";
pub const TODAY: Date = date!(2025 - 07 - 06);

/// Fake transport answering by URL fragment and recording every request.
///
/// Routes are matched in insertion order; unmatched URLs answer 404.
#[derive(Default)]
pub struct FakeHttpClient {
    routes: Mutex<Vec<(String, Result<HttpResponse, HttpError>)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(self: &Arc<Self>, fragment: &str, response: HttpResponse) -> Arc<Self> {
        self.routes
            .lock()
            .expect("route table should not be poisoned")
            .push((fragment.to_owned(), Ok(response)));
        Arc::clone(self)
    }

    pub fn fail(self: &Arc<Self>, fragment: &str, message: &str) -> Arc<Self> {
        self.routes
            .lock()
            .expect("route table should not be poisoned")
            .push((fragment.to_owned(), Err(HttpError::new(message))));
        Arc::clone(self)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.url).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

impl HttpClient for FakeHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .lock()
            .expect("route table should not be poisoned")
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| {
                Ok(HttpResponse::with_status(
                    404,
                    r#"{"message":{"text":"no route"}}"#,
                ))
            });
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        Box::pin(async move { response })
    }
}

pub fn roof() -> Location {
    Location {
        id: String::from("loc_roof"),
        name: String::from("Roof"),
        latitude: 48.14,
        longitude: 11.58,
        tilt_degrees: 35.0,
        azimuth_degrees: 170.0,
        peak_power_kwp: 9.8,
        description: None,
    }
}

pub fn config() -> DataSourceConfig {
    DataSourceConfig::default()
        .with_relay_url(RELAY)
        .with_utc_offset_minutes(0)
        .with_location(roof())
}

pub fn service(config: DataSourceConfig, http: &Arc<FakeHttpClient>) -> ForecastService {
    service_with_flags(config, http, SecureFlags::default())
}

pub fn service_with_flags(
    config: DataSourceConfig,
    http: &Arc<FakeHttpClient>,
    flags: SecureFlags,
) -> ForecastService {
    ForecastServiceBuilder::new(config)
        .with_http_client(Arc::clone(http) as Arc<dyn HttpClient>)
        .with_secure_flags(flags)
        .with_reference_date(TODAY)
        .build()
}

/// Forecast.Solar estimate body with one point per metric on `TODAY`.
pub fn estimate_body() -> String {
    String::from(
        r#"{
            "result": {
                "watts": {
                    "2025-07-06 11:00:00": 700,
                    "2025-07-06 10:00:00": 500,
                    "2025-07-07 10:00:00": 650
                },
                "watt_hours_period": {"2025-07-06 10:00:00": 250, "2025-07-06 11:00:00": 600},
                "watt_hours": {"2025-07-06 10:00:00": 250, "2025-07-06 11:00:00": 850},
                "watt_hours_day": {"2025-07-06": 9000, "2025-07-07": 8500}
            },
            "message": {
                "code": 0,
                "type": "success",
                "text": "",
                "ratelimit": {"period": 3600, "limit": 12, "remaining": 11},
                "info": {"place": "Roof", "timezone": "UTC"}
            }
        }"#,
    )
}

pub fn solcast_body() -> String {
    String::from(
        r#"{"forecasts":[
            {"period_end":"2025-07-06T12:00:00.0000000Z","pv_estimate":0.75,"period":"PT30M"},
            {"period_end":"2025-07-06T11:30:00.0000000Z","pv_estimate":0.5,"period":"PT30M"}
        ]}"#,
    )
}
