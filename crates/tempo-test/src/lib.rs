//! TEMPO Test - Deterministic harness for temporal testing
//!
//! Simulates:
//! - Manually driven session clocks
//! - Ordered, latent links between client and server
//! - Full sync sessions with measurable convergence

pub mod harness;
pub mod link;
pub mod time;

pub use harness::*;
pub use link::*;
pub use time::*;
