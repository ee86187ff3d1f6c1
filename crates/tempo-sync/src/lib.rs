//! TEMPO Sync - RTT-based clock synchronization protocol
//!
//! This crate implements the synchronization pair:
//! - Wire messages (SyncRequest, SyncResponse, DilationSignal)
//! - ClockSyncClient: periodic exchanges feeding a TickClock
//! - ClockSyncServer: stateless echo of the authoritative clock

pub mod client;
pub mod config;
pub mod server;
pub mod wire;

pub use client::*;
pub use config::*;
pub use server::*;
pub use wire::*;
