//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Edge hop:
//!     client → server.rs (layers: request ID, trace, timeout, body limit)
//!            → edge.rs (decode, validate, forward with traceparent)
//!            → resolution hop
//!
//! Resolution hop:
//!     edge → server.rs (same layers)
//!          → resolution.rs (decode, run pipeline)
//!          → response.rs (error → status + JSON body)
//! ```

pub mod edge;
pub mod request;
pub mod resolution;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{HttpServer, ServerError};
