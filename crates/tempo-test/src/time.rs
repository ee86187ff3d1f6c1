//! Controllable time sources for deterministic tests

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use tempo_core::{SessionInstant, TimeSource};

/// Shared, manually advanced time source.
///
/// Clones observe the same underlying clock, so a harness can hold one
/// handle while the components it drives hold others.
#[derive(Clone)]
pub struct ManualTimeSource {
    now: Arc<Mutex<SessionInstant>>,
}

impl ManualTimeSource {
    pub fn new(start: SessionInstant) -> Self {
        ManualTimeSource {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, now: SessionInstant) {
        *self.now.lock() = now;
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new(SessionInstant::ZERO)
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> SessionInstant {
        *self.now.lock()
    }
}
