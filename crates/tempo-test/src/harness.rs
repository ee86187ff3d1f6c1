//! End-to-end sync harness
//!
//! One authoritative server and one client, joined by two ordered links
//! and stepped frame by frame. The server's session epoch deliberately
//! differs from the client's so convergence is measurable: after a few
//! exchanges the client's perceived time should sit at the server clock
//! plus the command buffer, regardless of the initial offset.

use std::time::Duration;

use tempo_core::{SessionInstant, TempoResult};
use tempo_sync::{
    ClientMessage, ClockSyncClient, ClockSyncServer, DilationSignal, ServerMessage, SyncConfig,
};
use tempo_time::{ClockConfig, TickClock};

use crate::OrderedLink;

/// A client/server pair on simulated links.
pub struct SyncHarness {
    /// Client frame clock (client session time)
    pub now: SessionInstant,
    /// Offset from client session time to server session time
    pub server_offset_ms: i64,
    pub client: ClockSyncClient,
    pub clock: TickClock,
    pub server: ClockSyncServer,
    pub uplink: OrderedLink<ClientMessage>,
    pub downlink: OrderedLink<ServerMessage>,
}

impl SyncHarness {
    pub fn new(
        server_offset_ms: i64,
        latency: Duration,
        jitter: Duration,
        seed: u64,
    ) -> TempoResult<Self> {
        let start = SessionInstant::ZERO;
        Ok(SyncHarness {
            now: start,
            server_offset_ms,
            client: ClockSyncClient::new(SyncConfig::default(), start)?,
            clock: TickClock::new(ClockConfig::default(), start)?,
            server: ClockSyncServer::new(),
            uplink: OrderedLink::new(latency, jitter, seed),
            downlink: OrderedLink::new(latency, jitter, seed.wrapping_add(1)),
        })
    }

    /// The server's current session time.
    pub fn server_now(&self) -> SessionInstant {
        SessionInstant::from_millis(self.now.as_millis() + self.server_offset_ms)
    }

    /// Advance one frame: deliver due uplink traffic to the server,
    /// drain due downlink traffic into the client, send whatever the
    /// client decided to send.
    pub fn step(&mut self, frame: Duration) {
        self.now = self.now + frame;

        // Server first, so a request drained this frame gets its
        // response onto the downlink in the same frame.
        for message in self.uplink.drain_ready(self.now) {
            let ClientMessage::Request(request) = message;
            let response = self.server.handle_request(self.server_now(), &request);
            self.downlink
                .send(self.now, ServerMessage::Response(response));
        }

        let received = self.downlink.drain_ready(self.now);
        if let Some(request) = self.client.update(self.now, &mut self.clock, &received) {
            self.uplink.send(self.now, ClientMessage::Request(request));
        }
    }

    /// Queue a dilation signal onto the downlink, as the server would.
    pub fn send_dilation(&mut self) {
        self.downlink
            .send(self.now, ServerMessage::Dilation(DilationSignal));
    }

    /// Error between the client's perceived time and where it should
    /// converge: the server clock plus the command buffer. Millis.
    pub fn convergence_error_ms(&self) -> f64 {
        let tps = self.clock.config().ticks_per_second as f64;
        let perceived_ms = self.clock.fractional_tick(self.now) / tps * 1000.0;
        let target = self.server_now() + self.client.config().command_buffer();
        perceived_ms - target.as_millis_f64()
    }

    /// Step through `duration` at a fixed frame length, recording the
    /// convergence error after every frame.
    pub fn run(&mut self, duration: Duration, frame: Duration) -> ConvergenceReport {
        let frames = duration.as_millis() / frame.as_millis().max(1);
        let mut report = ConvergenceReport::default();

        for _ in 0..frames {
            self.step(frame);
            report.samples.push(self.convergence_error_ms());
        }

        report
    }
}

/// Convergence errors sampled once per frame.
#[derive(Debug, Default)]
pub struct ConvergenceReport {
    pub samples: Vec<f64>,
}

impl ConvergenceReport {
    pub fn final_error_ms(&self) -> f64 {
        self.samples.last().copied().unwrap_or(0.0)
    }

    pub fn max_abs_error_ms(&self) -> f64 {
        self.samples.iter().fold(0.0, |max, s| s.abs().max(max))
    }
}

/// Predefined scenarios
pub mod scenarios {
    use super::*;

    /// Client two seconds behind the server over a clean 40ms link.
    pub fn behind_server() -> SyncHarness {
        SyncHarness::new(2_000, Duration::from_millis(40), Duration::ZERO, 0)
            .expect("valid default configuration")
    }

    /// Client slightly ahead of the server over a clean 40ms link.
    pub fn ahead_of_server() -> SyncHarness {
        SyncHarness::new(-300, Duration::from_millis(40), Duration::ZERO, 0)
            .expect("valid default configuration")
    }

    /// Moderate offset over a 60ms link with up to 30ms of jitter.
    pub fn jittery_link() -> SyncHarness {
        SyncHarness::new(500, Duration::from_millis(60), Duration::from_millis(30), 7)
            .expect("valid default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(50);

    #[test]
    fn test_behind_server_converges_exactly() {
        let mut harness = scenarios::behind_server();
        let report = harness.run(Duration::from_secs(10), FRAME);

        // Starts a full two seconds (plus buffer and latency) out.
        assert!(report.samples[0] < -1_000.0);
        // Symmetric fixed latency cancels in the half-RTT estimate, so
        // convergence is exact once the blend settles.
        assert!(report.final_error_ms().abs() < 0.5);
    }

    #[test]
    fn test_ahead_of_server_converges() {
        let mut harness = scenarios::ahead_of_server();
        let report = harness.run(Duration::from_secs(10), FRAME);

        assert!(report.final_error_ms().abs() < 0.5);
    }

    #[test]
    fn test_rtt_includes_frame_quantization() {
        let mut harness = scenarios::behind_server();
        harness.run(Duration::from_secs(2), FRAME);

        // 80ms of wire time, observed at 50ms frame boundaries.
        let status = harness.client.last_sync().expect("synced within two seconds");
        assert!(status.rtt >= Duration::from_millis(80));
        assert!(status.rtt <= Duration::from_millis(200));
    }

    #[test]
    fn test_jittery_link_stays_bounded_and_monotone() {
        let mut harness = scenarios::jittery_link();

        let mut last_tick = harness.clock.fractional_tick(harness.now);
        let mut settled_error: f64 = 0.0;
        for frame in 0..600 {
            harness.step(FRAME);
            let tick = harness.clock.fractional_tick(harness.now);
            assert!(tick >= last_tick);
            last_tick = tick;

            if frame >= 100 {
                settled_error = settled_error.max(harness.convergence_error_ms().abs());
            }
        }

        // Jitter bounds the estimate error, it never drifts away.
        assert!(settled_error < 100.0);
    }

    #[test]
    fn test_dilation_episode_rises_and_clears() {
        let mut harness = scenarios::behind_server();
        harness.run(Duration::from_secs(2), FRAME);

        harness.send_dilation();
        let mut peak: f64 = 0.0;
        for _ in 0..80 {
            harness.step(FRAME);
            peak = peak.max(harness.clock.dilation(harness.now));
        }

        // The episode reached full weight within its 3s window and was
        // gone again afterwards.
        assert!(peak > 0.9);
        assert_eq!(harness.clock.dilation(harness.now), 0.0);
    }

    #[test]
    fn test_unanswered_requests_accumulate() {
        // Sever the uplink by making it absurdly slow: requests never
        // arrive, so pending entries are never matched.
        let mut harness = SyncHarness::new(
            0,
            Duration::from_secs(3_600),
            Duration::ZERO,
            0,
        )
        .expect("valid default configuration");

        harness.run(Duration::from_secs(16), FRAME);
        assert!(harness.client.pending_len() >= 3);
        assert!(harness.client.last_sync().is_none());
    }
}
