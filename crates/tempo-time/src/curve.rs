//! Dilation ramp shaping

use tempo_core::{TempoError, TempoResult};

/// A keyframe on the dilation curve: normalized time and weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    #[inline]
    pub fn new(time: f32, value: f32) -> Self {
        Keyframe { time, value }
    }
}

/// Piecewise-linear curve shaping how dilation ramps up and down.
///
/// Domain and range are both [0, 1]. A valid curve starts and ends at
/// zero weight so a dilation episode begins and ends at the undilated
/// tick rate.
#[derive(Clone, Debug)]
pub struct DilationCurve {
    keys: Vec<Keyframe>,
}

impl DilationCurve {
    /// Build a curve from keyframes, sorted by time and validated.
    pub fn from_keyframes(mut keys: Vec<Keyframe>) -> TempoResult<Self> {
        if keys.len() < 2 {
            return Err(TempoError::DegenerateDilationCurve(
                "curve needs at least two keyframes".into(),
            ));
        }

        keys.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for key in &keys {
            let in_domain = key.time.is_finite() && (0.0..=1.0).contains(&key.time);
            let in_range = key.value.is_finite() && (0.0..=1.0).contains(&key.value);
            if !in_domain || !in_range {
                return Err(TempoError::DegenerateDilationCurve(
                    "keyframes must lie within [0, 1] x [0, 1]".into(),
                ));
            }
        }

        let curve = DilationCurve { keys };
        if curve.evaluate(0.0) != 0.0 || curve.evaluate(1.0) != 0.0 {
            return Err(TempoError::DegenerateDilationCurve(
                "curve must start and end at zero weight".into(),
            ));
        }

        Ok(curve)
    }

    /// Sample the curve at `t`, clamped to the keyframe range.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.time {
                if (b.time - a.time).abs() <= f32::EPSILON {
                    return b.value;
                }
                let progress = (t - a.time) / (b.time - a.time);
                return a.value + (b.value - a.value) * progress;
            }
        }

        last.value
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }
}

impl Default for DilationCurve {
    /// Trapezoid ramp: zero weight at the edges, full weight through the
    /// middle half of the episode.
    fn default() -> Self {
        DilationCurve::from_keyframes(vec![
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.25, 1.0),
            Keyframe::new(0.75, 1.0),
            Keyframe::new(1.0, 0.0),
        ])
        .expect("default curve is valid")
    }
}
