//! TEMPO Time - Smoothed simulation clock and tick scheduling
//!
//! This crate implements the tick clock:
//! - Clock state and its pure transition functions (smoothing, dilation)
//! - TickClock: fractional ticks from injected wall-clock reads
//! - TickScheduler: whole-tick delivery to registered consumers

pub mod clock;
pub mod config;
pub mod curve;
pub mod scheduler;
pub mod state;

pub use clock::*;
pub use config::*;
pub use curve::*;
pub use scheduler::*;
pub use state::*;
