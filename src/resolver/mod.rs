//! Redundant location resolution.
//!
//! # Data Flow
//! ```text
//! PostalCode
//!     → spawn provider A ─┐
//!     → spawn provider B ─┼─▶ select! (first event wins)
//!     → deadline timer ───┘
//!     → Location | ResolveError::{NotFound, Timeout}
//! ```
//!
//! # Design Decisions
//! - Arrival order decides; there is no provider priority
//! - The first reply decides even when it carries no city: a fast "not
//!   found" preempts a slower provider that might have answered
//! - Losing provider tasks are detached, not aborted; each one is bounded by
//!   the same deadline so nothing outlives it

pub mod redundant;

pub use redundant::{ResolveError, RedundantResolver, DEFAULT_DEADLINE};
