//! TEMPO Net - UDP binding for the sync protocol
//!
//! The protocol itself is transport-agnostic; this is the minimal tokio
//! binding for running a sync pair over real sockets.

pub mod udp;

pub use udp::*;
