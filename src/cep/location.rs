//! Normalized location shape shared by every geocoding provider.

use serde::Serialize;

use crate::cep::PostalCode;

/// A postal code resolved by one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub postal_code: PostalCode,
    /// Neighborhood or district, when the provider reports one.
    pub district: Option<String>,
    /// Two-letter state code.
    pub state: Option<String>,
    /// City name used for the temperature lookup.
    pub city: Option<String>,
}

impl Location {
    /// A location is usable only when it names a city. Whitespace-only
    /// names count as missing.
    pub fn is_usable(&self) -> bool {
        self.city_name().is_some()
    }

    /// The city name exactly as the provider reported it, ignoring blank
    /// values. It is passed to the weather lookup and echoed untrimmed.
    pub fn city_name(&self) -> Option<&str> {
        self.city.as_deref().filter(|c| !c.trim().is_empty())
    }
}
