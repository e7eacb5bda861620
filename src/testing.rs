//! In-process fakes for providers and the weather source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::cep::{Location, PostalCode};
use crate::observability::TraceContext;
use crate::providers::{LocationProvider, ProviderError};
use crate::weather::{TemperatureReading, TemperatureSource, WeatherError};

pub const HOUR_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    City(&'static str),
    Empty,
    Fail,
    Panic,
}

pub struct MockProvider {
    name: &'static str,
    delay: Duration,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &'static str, delay_ms: u64, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(delay_ms),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, code: &PostalCode, _trace: &TraceContext) -> Result<Location, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match self.behavior {
            Behavior::City(city) => Ok(Location {
                postal_code: code.clone(),
                district: None,
                state: Some("SP".into()),
                city: Some(city.into()),
            }),
            Behavior::Empty => Ok(Location {
                postal_code: code.clone(),
                district: None,
                state: None,
                city: None,
            }),
            Behavior::Fail => Err(ProviderError::Status(500)),
            Behavior::Panic => panic!("provider blew up"),
        }
    }
}

/// Weather source returning a fixed reading, or failing when `celsius` is `None`.
pub struct MockWeather {
    celsius: Option<f64>,
    cities: Mutex<Vec<String>>,
}

impl MockWeather {
    pub fn new(celsius: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            celsius,
            cities: Mutex::new(Vec::new()),
        })
    }

    /// Cities requested so far, in order.
    pub fn cities(&self) -> Vec<String> {
        self.cities.lock().unwrap().clone()
    }
}

#[async_trait]
impl TemperatureSource for MockWeather {
    async fn fetch_temperature(
        &self,
        city: &str,
        _trace: &TraceContext,
    ) -> Result<TemperatureReading, WeatherError> {
        self.cities.lock().unwrap().push(city.to_string());
        match self.celsius {
            Some(celsius) => Ok(TemperatureReading { celsius }),
            None => Err(WeatherError::Status(503)),
        }
    }
}
