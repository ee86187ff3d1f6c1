//! Clock sync client - periodic RTT measurement feeding the tick clock

use std::collections::HashMap;
use std::time::Duration;

use tempo_core::{RequestId, SessionInstant, TempoResult, TimeSince};
use tempo_time::TickClock;

use crate::{ServerMessage, SyncConfig, SyncRequest, SyncResponse};

/// Result of the most recent matched exchange.
#[derive(Clone, Copy, Debug)]
pub struct SyncStatus {
    /// Corrected server time estimate fed into the clock
    pub server_estimate: SessionInstant,
    /// When the matching response arrived
    pub updated_at: SessionInstant,
    /// Measured round-trip time
    pub rtt: Duration,
}

/// Periodically measures offset and latency to the authoritative clock
/// and feeds corrections into a [`TickClock`].
///
/// One exchange moves `Idle -> RequestSent -> Matched`; a request whose
/// response never arrives stays pending for the life of the client.
/// There is no timeout or retry policy, the periodic re-send is a
/// scheduled re-attempt rather than an error-triggered one.
pub struct ClockSyncClient {
    config: SyncConfig,
    pending: HashMap<RequestId, SessionInstant>,
    next_request_id: i32,
    send_timer: TimeSince,
    last_sync: Option<SyncStatus>,
}

impl ClockSyncClient {
    /// Create a client whose send timer starts with a full interval
    /// already elapsed, so the first update issues a request right away.
    pub fn new(config: SyncConfig, now: SessionInstant) -> TempoResult<Self> {
        config.validate()?;
        Ok(ClockSyncClient {
            send_timer: TimeSince::with_elapsed(now, config.request_interval),
            config,
            pending: HashMap::new(),
            next_request_id: 0,
            last_sync: None,
        })
    }

    /// Drain already-received messages in order, then issue the periodic
    /// request once the interval has elapsed. Returns the request for
    /// the transport to send, if one is due.
    pub fn update(
        &mut self,
        now: SessionInstant,
        clock: &mut TickClock,
        received: &[ServerMessage],
    ) -> Option<SyncRequest> {
        for message in received {
            match message {
                ServerMessage::Response(response) => self.handle_response(now, response, clock),
                ServerMessage::Dilation(_) => self.handle_dilation(now, clock),
            }
        }
        self.poll_request(now)
    }

    /// Match a response against its pending request and re-anchor the
    /// clock. Responses with an unknown correlation id are logged and
    /// discarded; they touch nothing.
    pub fn handle_response(
        &mut self,
        now: SessionInstant,
        response: &SyncResponse,
        clock: &mut TickClock,
    ) {
        let Some(sent_at) = self.pending.remove(&response.request_id) else {
            tracing::warn!(
                "received time response with unknown request id {}",
                response.request_id
            );
            return;
        };

        let rtt = now - sent_at;
        // Half the round trip estimates one-way latency. This assumes the
        // upstream and downstream legs are symmetric.
        let target = response.server_time + rtt / 2 + self.config.command_buffer();
        clock.set_time(now, target);

        self.last_sync = Some(SyncStatus {
            server_estimate: target,
            updated_at: now,
            rtt,
        });
        tracing::debug!(
            rtt_ms = rtt.as_millis() as u64,
            "re-anchored clock from sync response"
        );
    }

    /// Absorb a server-signaled discrepancy smoothly, without a full
    /// re-anchor.
    pub fn handle_dilation(&mut self, now: SessionInstant, clock: &mut TickClock) {
        clock.dilate(now);
    }

    /// Issue the periodic request once `request_interval` has elapsed.
    /// The timer resets only when a request is actually issued.
    pub fn poll_request(&mut self, now: SessionInstant) -> Option<SyncRequest> {
        if self.send_timer.elapsed(now) <= self.config.request_interval {
            return None;
        }

        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        self.pending.insert(id, now);
        self.send_timer.reset(now);

        Some(SyncRequest { request_id: id })
    }

    /// Requests still awaiting a response. Entries only leave this set
    /// when their response arrives.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// The most recent matched exchange, if any.
    pub fn last_sync(&self) -> Option<&SyncStatus> {
        self.last_sync.as_ref()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}
