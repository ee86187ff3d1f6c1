//! Sync protocol messages and wire codec
//!
//! Little-endian layouts, one kind byte followed by the payload:
//! - SyncRequest   (kind 0): bytes 1-4 request id (i32)
//! - SyncResponse  (kind 1): bytes 1-4 request id (i32), bytes 5-12 server time ms (i64)
//! - DilationSignal (kind 2): no payload

use bytes::{Buf, BufMut};

use tempo_core::{RequestId, SessionInstant, TempoError, TempoResult};

/// Message kind discriminants
pub const KIND_REQUEST: u8 = 0;
pub const KIND_RESPONSE: u8 = 1;
pub const KIND_DILATION: u8 = 2;

/// Encoded sizes in bytes
pub const REQUEST_SIZE: usize = 5;
pub const RESPONSE_SIZE: usize = 13;
pub const DILATION_SIZE: usize = 1;

/// Client -> server: ask for the server's current clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncRequest {
    pub request_id: RequestId,
}

/// Server -> client: the server's clock reading, correlation id echoed
/// verbatim from the matching request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncResponse {
    pub request_id: RequestId,
    pub server_time: SessionInstant,
}

/// Server -> client: absorb a small discrepancy smoothly instead of
/// re-anchoring. Carries no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DilationSignal;

/// Messages a client receives from the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerMessage {
    Response(SyncResponse),
    Dilation(DilationSignal),
}

/// Messages a server receives from a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientMessage {
    Request(SyncRequest),
}

impl ClientMessage {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ClientMessage::Request(request) => {
                let mut buf = Vec::with_capacity(REQUEST_SIZE);
                buf.put_u8(KIND_REQUEST);
                buf.put_i32_le(request.request_id.0);
                buf
            }
        }
    }

    pub fn decode(mut buf: &[u8]) -> TempoResult<Self> {
        if buf.is_empty() {
            return Err(TempoError::BufferTooShort {
                expected: 1,
                actual: 0,
            });
        }

        match buf.get_u8() {
            KIND_REQUEST => {
                if buf.remaining() < REQUEST_SIZE - 1 {
                    return Err(TempoError::BufferTooShort {
                        expected: REQUEST_SIZE,
                        actual: buf.remaining() + 1,
                    });
                }
                Ok(ClientMessage::Request(SyncRequest {
                    request_id: RequestId::new(buf.get_i32_le()),
                }))
            }
            kind => Err(TempoError::UnknownMessageKind(kind)),
        }
    }
}

impl ServerMessage {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ServerMessage::Response(response) => {
                let mut buf = Vec::with_capacity(RESPONSE_SIZE);
                buf.put_u8(KIND_RESPONSE);
                buf.put_i32_le(response.request_id.0);
                buf.put_i64_le(response.server_time.as_millis());
                buf
            }
            ServerMessage::Dilation(_) => vec![KIND_DILATION],
        }
    }

    pub fn decode(mut buf: &[u8]) -> TempoResult<Self> {
        if buf.is_empty() {
            return Err(TempoError::BufferTooShort {
                expected: 1,
                actual: 0,
            });
        }

        match buf.get_u8() {
            KIND_RESPONSE => {
                if buf.remaining() < RESPONSE_SIZE - 1 {
                    return Err(TempoError::BufferTooShort {
                        expected: RESPONSE_SIZE,
                        actual: buf.remaining() + 1,
                    });
                }
                Ok(ServerMessage::Response(SyncResponse {
                    request_id: RequestId::new(buf.get_i32_le()),
                    server_time: SessionInstant::from_millis(buf.get_i64_le()),
                }))
            }
            KIND_DILATION => Ok(ServerMessage::Dilation(DilationSignal)),
            kind => Err(TempoError::UnknownMessageKind(kind)),
        }
    }
}
