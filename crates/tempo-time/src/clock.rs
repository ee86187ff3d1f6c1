//! TickClock - fractional ticks from injected wall-clock reads

use tempo_core::{SessionInstant, TempoResult};

use crate::{state, ClockConfig, ClockState};

/// Converts session time into a fractional tick value, absorbing
/// re-anchor corrections over a smoothing window and applying bounded
/// tick-rate dilation.
///
/// The clock never reads the ambient time; every operation takes the
/// current instant, so behavior is fully determined by explicit inputs.
pub struct TickClock {
    config: ClockConfig,
    state: ClockState,
}

impl TickClock {
    /// Create a clock anchored at `now`. Configuration faults are
    /// rejected here, never at use time.
    pub fn new(config: ClockConfig, now: SessionInstant) -> TempoResult<Self> {
        config.validate()?;
        Ok(TickClock {
            state: ClockState::new(now.as_millis_f64()),
            config,
        })
    }

    /// Fractional tick at `now`. Pure observation, mutates nothing.
    pub fn fractional_tick(&self, now: SessionInstant) -> f64 {
        state::tick_float(&self.state, &self.config, now.as_millis_f64())
    }

    /// Last whole tick boundary crossed by `now`.
    pub fn whole_tick(&self, now: SessionInstant) -> u64 {
        let tick = self.fractional_tick(now).floor();
        if tick <= 0.0 {
            0
        } else {
            tick as u64
        }
    }

    /// Current dilation contribution, in ticks.
    pub fn dilation(&self, now: SessionInstant) -> f64 {
        state::dilation_amount(&self.state, &self.config, self.fractional_tick(now))
    }

    /// Re-anchor the clock toward `target`, blending the correction over
    /// the smoothing window instead of applying it instantly. A call
    /// mid-blend supersedes the blend in progress.
    pub fn set_time(&mut self, now: SessionInstant, target: SessionInstant) {
        self.state = state::set_time(
            self.state,
            &self.config,
            now.as_millis_f64(),
            target.as_millis_f64(),
        );
    }

    /// Begin or re-mirror a dilation episode at the current tick. A
    /// no-op while an episode is still ramping toward its peak.
    pub fn dilate(&mut self, now: SessionInstant) {
        let tick = self.whole_tick(now);
        self.state = state::dilate(self.state, &self.config, tick);
    }

    /// Whole ticks elapsed past the last delivered tick.
    pub fn due_ticks(&self, now: SessionInstant) -> u64 {
        self.whole_tick(now).saturating_sub(self.state.last_tick)
    }

    /// Mark `count` ticks as delivered.
    pub fn advance(&mut self, count: u64) {
        self.state.last_tick += count;
    }

    /// Last whole tick delivered to consumers.
    pub fn last_tick(&self) -> u64 {
        self.state.last_tick
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }
}
