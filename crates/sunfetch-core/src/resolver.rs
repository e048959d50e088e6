//! Resolves a query's location reference into concrete provider parameters.

use crate::data_source::{ForecastError, ResolvedParams};
use crate::{
    InlineLocation, Location, QueryDescriptor, DEFAULT_AZIMUTH_DEGREES, DEFAULT_LATITUDE,
    DEFAULT_LONGITUDE, DEFAULT_PEAK_POWER_KWP, DEFAULT_TILT_DEGREES,
};

/// Produces the parameter tuple for `descriptor`.
///
/// A referenced location id wins unless the descriptor asks for its inline
/// parameters. An id missing from `locations` fails with
/// [`ForecastErrorKind::NotFound`](crate::ForecastErrorKind::NotFound).
pub fn resolve_query(
    descriptor: &QueryDescriptor,
    locations: &[Location],
) -> Result<ResolvedParams, ForecastError> {
    let referenced = descriptor
        .location_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty() && !descriptor.use_custom_location);

    let mut params = match referenced {
        Some(id) => {
            let location = locations
                .iter()
                .find(|location| location.id == id)
                .ok_or_else(|| ForecastError::location_not_found(id))?;
            from_location(location)
        }
        None => from_inline(&descriptor.custom_location),
    };

    params.site_id = descriptor
        .site_id
        .as_deref()
        .map(str::trim)
        .filter(|site| !site.is_empty())
        .map(str::to_owned);
    params.date_range = descriptor.date_range;

    Ok(params)
}

fn from_location(location: &Location) -> ResolvedParams {
    ResolvedParams {
        latitude: location.latitude,
        longitude: location.longitude,
        tilt: location.tilt_degrees,
        azimuth: location.azimuth_degrees,
        kwp: location.peak_power_kwp,
        site_id: None,
        date_range: None,
    }
}

fn from_inline(inline: &InlineLocation) -> ResolvedParams {
    ResolvedParams {
        latitude: inline.latitude.unwrap_or(DEFAULT_LATITUDE),
        longitude: inline.longitude.unwrap_or(DEFAULT_LONGITUDE),
        tilt: inline.tilt_degrees.unwrap_or(DEFAULT_TILT_DEGREES),
        azimuth: inline.azimuth_degrees.unwrap_or(DEFAULT_AZIMUTH_DEGREES),
        kwp: inline.peak_power_kwp.unwrap_or(DEFAULT_PEAK_POWER_KWP),
        site_id: None,
        date_range: None,
    }
}

/// Parameters used when neither a location nor inline values are given.
pub fn default_params() -> ResolvedParams {
    from_inline(&InlineLocation::default())
}
