//! Postal code (CEP) domain types.
//!
//! # Data Flow
//! ```text
//! raw request input
//!     → code.rs (format check, PostalCode newtype)
//!     → [providers resolve the code]
//!     → location.rs (normalized Location shape)
//! ```
//!
//! # Design Decisions
//! - A PostalCode can only exist if it passed validation
//! - Provider-specific payloads never leave the providers module; they are
//!   normalized into Location first

pub mod code;
pub mod location;

pub use code::{validate, InvalidPostalCode, PostalCode};
pub use location::Location;
