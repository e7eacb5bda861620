//! Request and response bodies shared by both hops.

use serde::{Deserialize, Serialize, Serializer};

use crate::weather::{celsius_to_fahrenheit, celsius_to_kelvin};

/// Inbound body of `POST /` on either hop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CepRequest {
    pub cep: String,
}

/// Successful response of the resolution hop.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemperatureResponse {
    #[serde(rename = "temp_C", serialize_with = "compact_float")]
    pub celsius: f64,
    #[serde(rename = "temp_F", serialize_with = "compact_float")]
    pub fahrenheit: f64,
    #[serde(rename = "temp_K", serialize_with = "compact_float")]
    pub kelvin: f64,
    pub city: String,
}

impl TemperatureResponse {
    /// Convert a Celsius reading into all three scales.
    pub fn new(celsius: f64, city: impl Into<String>) -> Self {
        Self {
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
            kelvin: celsius_to_kelvin(celsius),
            city: city.into(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

// Whole numbers go out as integers (`22`, not `22.0`) to keep the wire
// format existing clients already parse.
fn compact_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
