//! Per-request pipeline of the resolution hop.
//!
//! # State Machine
//! ```text
//! Received → Validated → Resolving → Resolved → Enriching → Responded
//!               │            │                       │
//!               ▼            ▼                       ▼
//!          422 invalid   404 not found /       500 failed to get
//!                        404 timeout               temperature
//! ```
//!
//! # Design Decisions
//! - No branching back: every exit is terminal
//! - Enrichment strictly follows a successful resolution
//! - HTTP status mapping lives in `http::response`, not here

pub mod model;
pub mod resolution;

pub use model::{CepRequest, ErrorBody, TemperatureResponse};
pub use resolution::{PipelineError, Stage, TemperaturePipeline};
