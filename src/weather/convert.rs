//! Temperature unit conversion.

/// Offset used for Kelvin.
///
/// Kept at the integer 273 (not 273.15) so responses stay identical to what
/// existing clients already receive.
pub const KELVIN_OFFSET: f64 = 273.0;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}
