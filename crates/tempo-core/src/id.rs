//! Identity types for the TEMPO protocol

use std::fmt;

/// Correlation id pairing a sync request to its eventual response.
///
/// Allocated monotonically by the client; unique while the request is
/// pending. Wraparound is not handled, practical session lengths never
/// reach it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(pub i32);

impl RequestId {
    pub const ZERO: RequestId = RequestId(0);

    #[inline]
    pub fn new(id: i32) -> Self {
        RequestId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        RequestId(i32::from_le_bytes(bytes))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Req({})", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
