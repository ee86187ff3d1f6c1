//! TEMPO Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the TEMPO protocol:
//! - Correlation identifiers (RequestId)
//! - Session time primitives (SessionInstant, TimeSource, TimeSince)
//! - Error taxonomy (TempoError)

pub mod error;
pub mod id;
pub mod time;

pub use error::*;
pub use id::*;
pub use time::*;
