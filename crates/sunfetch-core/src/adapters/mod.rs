mod forecast_solar;
mod solcast;

pub use forecast_solar::ForecastSolarAdapter;
pub use solcast::{SolcastAdapter, SOLCAST_WINDOW};

use serde::de::DeserializeOwned;

use crate::data_source::ForecastError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::ProviderId;

/// Joins the relay base, a route and path segments with single slashes.
fn relay_url(relay: &str, route: &str, segments: &[String]) -> String {
    let mut url = String::from(relay.trim_end_matches('/'));
    for part in std::iter::once(route).chain(segments.iter().map(String::as_str)) {
        let part = part.trim_matches('/');
        if part.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(part);
    }
    url
}

/// Executes `request` and decodes a JSON body.
///
/// Transport failures and non-success statuses map to `Upstream`, bodies
/// of unexpected shape to `Parse`.
async fn get_json<T: DeserializeOwned>(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<T, ForecastError> {
    let url = request.url.clone();
    tracing::debug!(%provider, %url, "requesting provider");

    let response = http_client.execute(request).await.map_err(|error| {
        ForecastError::upstream(format!(
            "{} transport error: {}",
            provider.display_name(),
            error.message()
        ))
    })?;

    if !response.is_success() {
        return Err(ForecastError::upstream(format!(
            "{} request failed: {}",
            provider.display_name(),
            response.failure_message()
        )));
    }

    serde_json::from_str(&response.body).map_err(|error| {
        ForecastError::parse(format!(
            "failed to parse {} response: {error}",
            provider.display_name()
        ))
    })
}
