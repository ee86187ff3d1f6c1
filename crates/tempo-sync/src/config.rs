//! Sync protocol configuration

use std::time::Duration;

use tempo_core::{TempoError, TempoResult};

/// Clock synchronization configuration
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Period between sync requests
    pub request_interval: Duration,
    /// Ticks of input lead the client keeps ahead of the raw network
    /// estimate
    pub input_buffer_ticks: u32,
    /// Simulation tick rate; must match the driven clock's
    pub ticks_per_second: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            request_interval: Duration::from_secs(5),
            input_buffer_ticks: 4,
            ticks_per_second: 20,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> TempoResult<()> {
        if self.ticks_per_second == 0 {
            return Err(TempoError::InvalidTickRate(self.ticks_per_second));
        }
        Ok(())
    }

    /// Fixed buffer added to the corrected server time so the client
    /// runs slightly ahead of the raw network estimate, anticipating
    /// local input and command processing lag.
    #[inline]
    pub fn command_buffer(&self) -> Duration {
        Duration::from_millis(
            (1000.0 / self.ticks_per_second as f64 * self.input_buffer_ticks as f64) as u64,
        )
    }
}
