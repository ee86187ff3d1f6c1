//! Session time primitives for the TEMPO protocol
//!
//! All protocol timestamps are whole milliseconds since the session
//! epoch: the moment the local [`TimeSource`] was created. Wall-clock
//! reads are injected through [`TimeSource`] rather than taken from
//! ambient global state, so every clock operation stays a function of
//! explicit state plus a provided instant.

use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

/// A point in session time, in whole milliseconds since the session epoch.
///
/// Signed so that derived anchors (e.g. a timer seeded with elapsed time
/// already on the clock) may sit before the epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionInstant(pub i64);

impl SessionInstant {
    pub const ZERO: SessionInstant = SessionInstant(0);

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        SessionInstant(millis)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        SessionInstant(self.0.saturating_add(duration.as_millis() as i64))
    }

    #[inline]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        SessionInstant(self.0.saturating_sub(duration.as_millis() as i64))
    }
}

impl Add<Duration> for SessionInstant {
    type Output = SessionInstant;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        SessionInstant(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Duration> for SessionInstant {
    type Output = SessionInstant;

    #[inline]
    fn sub(self, rhs: Duration) -> Self::Output {
        SessionInstant(self.0 - rhs.as_millis() as i64)
    }
}

impl Sub<SessionInstant> for SessionInstant {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: SessionInstant) -> Self::Output {
        let diff = self.0 - rhs.0;
        if diff >= 0 {
            Duration::from_millis(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for SessionInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

/// Injected wall-clock capability.
///
/// Implementations must be cheap to read and monotonic within a session.
pub trait TimeSource {
    /// Current session time.
    fn now(&self) -> SessionInstant;
}

/// Time source backed by the OS monotonic clock, with the session epoch
/// fixed at construction.
pub struct SystemTimeSource {
    epoch: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        SystemTimeSource {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> SessionInstant {
        SessionInstant(self.epoch.elapsed().as_millis() as i64)
    }
}

/// Elapsed-time counter over session time.
///
/// Stores only its anchor; reading requires the current instant, which
/// keeps the counter free of ambient clock reads.
#[derive(Clone, Copy, Debug)]
pub struct TimeSince {
    anchor: SessionInstant,
}

impl TimeSince {
    /// Counter showing zero elapsed at `now`.
    pub fn new(now: SessionInstant) -> Self {
        TimeSince { anchor: now }
    }

    /// Counter that already shows `elapsed` at `now`.
    pub fn with_elapsed(now: SessionInstant, elapsed: Duration) -> Self {
        TimeSince { anchor: now - elapsed }
    }

    /// Time accumulated since the anchor.
    pub fn elapsed(&self, now: SessionInstant) -> Duration {
        now - self.anchor
    }

    /// Restart the counter from `now`.
    pub fn reset(&mut self, now: SessionInstant) {
        self.anchor = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_instant_arithmetic() {
        let t = SessionInstant::from_millis(1000);
        let later = t + Duration::from_millis(150);

        assert_eq!(later.as_millis(), 1150);
        assert_eq!(later - t, Duration::from_millis(150));
        // Differences saturate at zero rather than going negative
        assert_eq!(t - later, Duration::ZERO);
    }

    #[test]
    fn test_time_since_seeded_elapsed() {
        let now = SessionInstant::from_millis(0);
        let timer = TimeSince::with_elapsed(now, Duration::from_secs(5));

        assert_eq!(timer.elapsed(now), Duration::from_secs(5));
        assert_eq!(
            timer.elapsed(now + Duration::from_millis(50)),
            Duration::from_millis(5050)
        );
    }

    #[test]
    fn test_time_since_reset() {
        let mut timer = TimeSince::new(SessionInstant::ZERO);
        let now = SessionInstant::from_millis(700);

        timer.reset(now);
        assert_eq!(timer.elapsed(now), Duration::ZERO);
        assert_eq!(
            timer.elapsed(now + Duration::from_millis(30)),
            Duration::from_millis(30)
        );
    }

    #[test]
    fn test_system_time_source_monotonic() {
        let source = SystemTimeSource::new();

        let t1 = source.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = source.now();

        assert!(t2 > t1);
    }
}
