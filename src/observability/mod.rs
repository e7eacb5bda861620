//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every hop produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → trace.rs (spans correlated by W3C trace context)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Trace context flows edge → resolver → providers via `traceparent`
//! - Request ID flows edge → resolver via `x-request-id`
//! - Metrics are optional; without a recorder they cost nothing

pub mod logging;
pub mod metrics;
pub mod trace;

pub use trace::{SpanScope, SpanStatus, TraceContext, Tracer, TRACEPARENT};
