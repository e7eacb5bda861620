//! Postal code to temperature service library.

pub mod cep;
pub mod config;
pub mod http;
pub mod pipeline;
pub mod providers;
pub mod resolver;
pub mod weather;
pub mod lifecycle;
pub mod observability;

#[cfg(test)]
mod testing;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
