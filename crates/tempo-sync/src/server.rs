//! Clock sync server - answers requests with the current clock reading

use tempo_core::SessionInstant;

use crate::{SyncRequest, SyncResponse};

/// Answers synchronization requests with the server's wall-clock
/// reading.
///
/// Stateless: no per-request bookkeeping, no validation beyond echoing
/// the correlation id. It cannot fail except through the transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockSyncServer;

impl ClockSyncServer {
    pub fn new() -> Self {
        ClockSyncServer
    }

    /// Stamp a response for `request` at `now`.
    pub fn handle_request(&self, now: SessionInstant, request: &SyncRequest) -> SyncResponse {
        SyncResponse {
            request_id: request.request_id,
            server_time: now,
        }
    }
}
