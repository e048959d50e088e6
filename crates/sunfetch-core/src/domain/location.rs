use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ValidationError;

pub const DEFAULT_LATITUDE: f64 = 51.13;
pub const DEFAULT_LONGITUDE: f64 = 10.42;
pub const DEFAULT_TILT_DEGREES: f64 = 30.0;
pub const DEFAULT_AZIMUTH_DEGREES: f64 = 180.0;
pub const DEFAULT_PEAK_POWER_KWP: f64 = 5.0;

/// A configured PV installation.
///
/// Azimuth follows the compass convention: 180 faces south.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(alias = "tilt")]
    pub tilt_degrees: f64,
    #[serde(alias = "azimuth")]
    pub azimuth_degrees: f64,
    #[serde(alias = "kwp")]
    pub peak_power_kwp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Location {
    /// Creates a validated location with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        tilt_degrees: f64,
        azimuth_degrees: f64,
        peak_power_kwp: f64,
    ) -> Result<Self, ValidationError> {
        let location = Self {
            id: format!("loc_{}", Uuid::new_v4().simple()),
            name: name.into(),
            latitude,
            longitude,
            tilt_degrees,
            azimuth_degrees,
            peak_power_kwp,
            description: None,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyLocationId);
        }
        validate_range("latitude", self.latitude, -90.0, 90.0)?;
        validate_range("longitude", self.longitude, -180.0, 180.0)?;
        validate_range("tiltDegrees", self.tilt_degrees, 0.0, 90.0)?;
        validate_range("azimuthDegrees", self.azimuth_degrees, 0.0, 360.0)?;
        validate_finite("peakPowerKwp", self.peak_power_kwp)?;
        if self.peak_power_kwp < 0.0 {
            return Err(ValidationError::NegativeValue {
                field: "peakPowerKwp",
            });
        }
        Ok(())
    }
}

/// Ad-hoc location parameters supplied inline on a query.
///
/// Only absent fields fall back to defaults; an explicit `0.0` is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "tilt")]
    pub tilt_degrees: Option<f64>,
    #[serde(default, alias = "azimuth")]
    pub azimuth_degrees: Option<f64>,
    #[serde(default, alias = "kwp")]
    pub peak_power_kwp: Option<f64>,
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteValue { field })
    }
}

fn validate_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
