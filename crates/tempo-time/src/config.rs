//! Tick clock configuration

use std::time::Duration;

use tempo_core::{TempoError, TempoResult};

use crate::DilationCurve;

/// Tick clock configuration
#[derive(Clone, Debug)]
pub struct ClockConfig {
    /// Simulation tick rate
    pub ticks_per_second: u32,
    /// Window over which a re-anchor is blended in rather than applied
    /// instantly
    pub smooth_window: Duration,
    /// Peak tick-rate offset applied during a dilation episode
    pub dilation_amount: Duration,
    /// Duration of one dilation episode
    pub dilation_window: Duration,
    /// Shape of the dilation ramp
    pub dilation_curve: DilationCurve,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            ticks_per_second: 20,
            smooth_window: Duration::from_millis(500),
            dilation_amount: Duration::from_millis(50),
            dilation_window: Duration::from_millis(3000),
            dilation_curve: DilationCurve::default(),
        }
    }
}

impl ClockConfig {
    /// Validate the configuration. Faults surface here, at construction
    /// time, never at use time.
    pub fn validate(&self) -> TempoResult<()> {
        if self.ticks_per_second == 0 {
            return Err(TempoError::InvalidTickRate(self.ticks_per_second));
        }
        Ok(())
    }

    /// Time covered by one whole tick.
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.ticks_per_second as f64)
    }
}
