//! Temperature enrichment.
//!
//! # Data Flow
//! ```text
//! resolved city name
//!     → client.rs (WeatherAPI current conditions, Celsius)
//!     → convert.rs (Fahrenheit, Kelvin)
//! ```
//!
//! # Design Decisions
//! - One outbound call per request, never retried
//! - Conversion functions are pure and total

pub mod client;
pub mod convert;

pub use client::{TemperatureReading, TemperatureSource, WeatherApiClient, WeatherError};
pub use convert::{celsius_to_fahrenheit, celsius_to_kelvin};
