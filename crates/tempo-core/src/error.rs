//! Error types for the TEMPO protocol

use thiserror::Error;

/// Core TEMPO errors
#[derive(Error, Debug)]
pub enum TempoError {
    // Configuration errors
    #[error("Tick rate must be positive, got {0}")]
    InvalidTickRate(u32),

    #[error("Degenerate dilation curve: {0}")]
    DegenerateDilationCurve(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(u8),

    // Scheduling errors
    #[error("Tick consumer fault: {0}")]
    ConsumerFault(String),

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),
}

/// Result type for TEMPO operations
pub type TempoResult<T> = Result<T, TempoError>;
