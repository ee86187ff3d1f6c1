//! Clock state and its pure transition functions
//!
//! State is plain data owned by exactly one `TickClock`. Every operation
//! here is a pure function of `(state, config, input)` returning either
//! an observation or the next state; the owning clock performs the
//! replacement. Nothing in this module reads the ambient clock.

use crate::ClockConfig;

/// Smoothing and dilation state for one tick clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockState {
    /// Last whole tick delivered to consumers
    pub last_tick: u64,
    /// Session time (ms) of the last re-anchor
    pub time_updated_at: f64,
    /// Signed correction (ms) bridging the perceived time at
    /// `time_updated_at` toward `target_time`
    pub offset: f64,
    /// Session time (ms) the clock is converging toward
    pub target_time: f64,
    /// Dilation window start, as a position (ms) on the tick timeline
    pub dilation_from: f64,
    /// Dilation window end, as a position (ms) on the tick timeline
    pub dilation_to: f64,
}

impl ClockState {
    /// Fresh state anchored at `now_ms`. The dilation window starts
    /// already elapsed, so no dilation applies until the first episode.
    pub fn new(now_ms: f64) -> Self {
        ClockState {
            last_tick: 0,
            time_updated_at: now_ms,
            offset: 0.0,
            target_time: now_ms,
            dilation_from: 0.0,
            dilation_to: 1.0,
        }
    }
}

#[inline]
fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * clamp01(t)
}

/// Inverse lerp with the empty-window convention: a zero-width window
/// maps every input to 0.
#[inline]
fn inverse_lerp(a: f64, b: f64, v: f64) -> f64 {
    if (b - a).abs() <= f64::EPSILON {
        0.0
    } else {
        clamp01((v - a) / (b - a))
    }
}

/// Blended time estimate at `now_ms`.
///
/// Inside the smoothing window the estimate walks linearly from the time
/// perceived at the last re-anchor (`target_time - offset`) up to
/// `target_time`; at and past the window's end it is `target_time`
/// exactly. This is what keeps a correction from snapping: the gap
/// between the old and new estimates is paid out over the window.
pub fn base_time(state: &ClockState, config: &ClockConfig, now_ms: f64) -> f64 {
    let smooth_ms = config.smooth_window.as_secs_f64() * 1000.0;
    if now_ms < state.time_updated_at + smooth_ms {
        let progress = inverse_lerp(
            state.time_updated_at,
            state.time_updated_at + smooth_ms,
            now_ms,
        );
        return state.target_time - state.offset * (1.0 - progress);
    }
    state.target_time
}

/// Fractional tick at `now_ms`: the blended time converted to ticks,
/// plus the dilation contribution evaluated at the undilated tick value.
pub fn tick_float(state: &ClockState, config: &ClockConfig, now_ms: f64) -> f64 {
    let elapsed = now_ms - state.time_updated_at;
    let current = base_time(state, config, now_ms) + elapsed;
    let tick = current / 1000.0 * config.ticks_per_second as f64;

    tick + dilation_amount(state, config, tick)
}

/// Dilation contribution, in ticks, at a given tick value.
///
/// The tick's position on the timeline is mapped into the dilation
/// window; the curve weight at that progress scales the configured peak
/// offset. Outside the window the contribution is zero because a valid
/// curve is zero at both ends.
pub fn dilation_amount(state: &ClockState, config: &ClockConfig, tick: f64) -> f64 {
    let tps = config.ticks_per_second as f64;
    let max_tick = config.dilation_amount.as_secs_f64() * tps;
    let position_ms = tick / tps * 1000.0;
    let progress = inverse_lerp(state.dilation_from, state.dilation_to, position_ms);

    f64::from(config.dilation_curve.evaluate(progress as f32)) * max_tick
}

/// Re-anchor toward `target_ms`.
///
/// The currently perceived time (blend included) becomes the new
/// starting point, so the transition is continuous; whatever error
/// remains from a blend in progress folds into the new offset.
/// Corrections supersede, they never queue.
pub fn set_time(state: ClockState, config: &ClockConfig, now_ms: f64, target_ms: f64) -> ClockState {
    let elapsed = now_ms - state.time_updated_at;
    let perceived = base_time(&state, config, now_ms) + elapsed;

    ClockState {
        offset: target_ms - perceived,
        time_updated_at: now_ms,
        target_time: target_ms,
        ..state
    }
}

/// Begin or re-mirror a dilation episode at whole tick `tick`.
///
/// While the current episode is still ramping toward its peak
/// (progress < 0.5) the call is ignored. Past the midpoint the window is
/// mirrored around the present position, collapsing the remaining
/// ramp-down into the start of a fresh ramp-up without a discontinuity.
pub fn dilate(state: ClockState, config: &ClockConfig, tick: u64) -> ClockState {
    let position_ms = tick as f64 / config.ticks_per_second as f64 * 1000.0;
    let progress = inverse_lerp(state.dilation_from, state.dilation_to, position_ms);

    if progress < 0.5 {
        return state;
    }

    let window_ms = config.dilation_window.as_secs_f64() * 1000.0;
    let ahead = lerp(0.0, window_ms, progress).round();
    let behind = lerp(0.0, window_ms, 1.0 - progress).round();

    ClockState {
        dilation_from: position_ms - behind,
        dilation_to: position_ms + ahead,
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> ClockConfig {
        ClockConfig::default()
    }

    #[test]
    fn test_fresh_state_tracks_wall_clock() {
        let config = config();
        let state = ClockState::new(1000.0);

        // 1:1 with wall time, 20 ticks per second
        assert_eq!(tick_float(&state, &config, 1000.0), 20.0);
        assert_eq!(tick_float(&state, &config, 2000.0), 40.0);
    }

    #[test]
    fn test_set_time_is_continuous() {
        let config = config();
        let state = ClockState::new(0.0);
        let before = tick_float(&state, &config, 10_000.0);

        let state = set_time(state, &config, 10_000.0, 10_300.0);
        let after = tick_float(&state, &config, 10_000.0);

        assert!((after - before).abs() < 1e-9);
    }

    #[test]
    fn test_blend_converges_exactly() {
        let config = config();
        let state = ClockState::new(0.0);
        let state = set_time(state, &config, 10_000.0, 10_250.0);

        // At the end of the smoothing window the blend is gone entirely.
        assert_eq!(base_time(&state, &config, 10_500.0), 10_250.0);
        assert_eq!(base_time(&state, &config, 11_000.0), 10_250.0);
    }

    #[test]
    fn test_blend_absorbs_half_at_midpoint() {
        let config = config();
        let state = ClockState::new(0.0);
        let state = set_time(state, &config, 10_000.0, 10_200.0);

        // Perceived before: 10_000. Halfway through the window the clock
        // has paid out half the 200ms correction on top of real elapsed
        // time.
        let elapsed = 250.0;
        let perceived = base_time(&state, &config, 10_250.0) + elapsed;
        assert!((perceived - (10_000.0 + 100.0 + elapsed)).abs() < 1e-9);
    }

    #[test]
    fn test_new_correction_supersedes_blend() {
        let config = config();
        let state = ClockState::new(0.0);
        let state = set_time(state, &config, 10_000.0, 10_200.0);

        // Re-anchor mid-blend; the residual error folds into the new
        // offset and the transition stays continuous.
        let before = tick_float(&state, &config, 10_250.0);
        let state = set_time(state, &config, 10_250.0, 10_600.0);
        let after = tick_float(&state, &config, 10_250.0);

        assert!((after - before).abs() < 1e-9);
        assert_eq!(state.target_time, 10_600.0);
        assert_eq!(base_time(&state, &config, 10_750.0), 10_600.0);
    }

    #[test]
    fn test_dilate_noop_while_ramping_up() {
        let config = config();
        let mut state = ClockState::new(0.0);
        state.dilation_from = 5_000.0;
        state.dilation_to = 8_000.0;

        // Tick 103 sits at 5_150ms: 5% into the window, still ramping.
        let after = dilate(state, &config, 103);
        assert_eq!(after, state);
    }

    #[test]
    fn test_dilate_mirrors_window_past_peak() {
        let config = config();
        let mut state = ClockState::new(0.0);
        state.dilation_from = 5_000.0;
        state.dilation_to = 8_000.0;

        // Tick 145 sits at 7_250ms: progress 0.75.
        let after = dilate(state, &config, 145);
        assert_eq!(after.dilation_to - 7_250.0, 3_000.0 * 0.75);
        assert_eq!(7_250.0 - after.dilation_from, 3_000.0 * 0.25);
    }

    #[test]
    fn test_dilate_after_elapsed_window_starts_fresh_ramp() {
        let config = config();
        let state = ClockState::new(0.0);

        // The construction window is already elapsed at any position
        // past 1ms, so a dilate starts a full window from here.
        let after = dilate(state, &config, 100);
        assert_eq!(after.dilation_from, 5_000.0);
        assert_eq!(after.dilation_to, 8_000.0);
    }

    #[test]
    fn test_dilation_amount_follows_curve() {
        let config = config();
        let mut state = ClockState::new(0.0);
        state.dilation_from = 5_000.0;
        state.dilation_to = 8_000.0;

        // Peak offset is 50ms of tick time = 1 whole tick at 20tps.
        assert_eq!(dilation_amount(&state, &config, 100.0), 0.0);
        assert!((dilation_amount(&state, &config, 115.0) - 1.0).abs() < 1e-6);
        assert_eq!(dilation_amount(&state, &config, 170.0), 0.0);
    }

    #[test]
    fn test_tick_float_includes_dilation() {
        let config = config();
        let mut state = ClockState::new(0.0);
        state.dilation_from = 0.0;
        state.dilation_to = 3_000.0;

        // At 1_500ms the undilated tick is 30, mid-window, full weight.
        assert!((tick_float(&state, &config, 1_500.0) - 31.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn tick_float_monotone_through_corrections(
            correction in -400.0f64..400.0,
            set_at in 1_000i64..5_000,
            steps in proptest::collection::vec(1i64..100, 1..60),
        ) {
            let config = config();
            let mut state = ClockState::new(0.0);
            let mut now = 0.0f64;
            let mut last = tick_float(&state, &config, now);
            let mut corrected = false;

            for step in steps {
                now += step as f64;
                if !corrected && now >= set_at as f64 {
                    let perceived = base_time(&state, &config, now)
                        + (now - state.time_updated_at);
                    state = set_time(state, &config, now, perceived + correction);
                    corrected = true;
                }
                let tick = tick_float(&state, &config, now);
                prop_assert!(tick >= last);
                last = tick;
            }
        }
    }
}
