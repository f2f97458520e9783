//! Geometry of the wake-up sparkle animation.
//!
//! The particle ring is sampled once at startup ([`precompute_offsets`]); each
//! animation run then replays the same ring, lifted a little higher every
//! frame, until the accumulated angle reaches the plan's threshold.

use std::f64::consts::{FRAC_PI_4, TAU};

use crate::config::ParticleSpec;
use crate::state::Offset;

/// Samples `spec.count` points on an ellipse of radii `offset.x` / `offset.z`
/// while climbing linearly towards `offset.y`.
pub fn precompute_offsets(spec: &ParticleSpec) -> Vec<Offset> {
    let count = f64::from(spec.count);
    (0..spec.count)
        .map(|i| {
            let i = f64::from(i);
            let angle = i * TAU / count;
            Offset::new(
                angle.cos() * spec.offset.x,
                i * spec.offset.y / count,
                angle.sin() * spec.offset.z,
            )
        })
        .collect()
}

/// Timing of one animation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationPlan {
    /// Nominal length of the animation in ticks.
    pub duration_ticks: u32,
    /// Ticks between two frame batches.
    pub interval_ticks: u32,
    /// Angle added to the accumulator after every frame batch.
    pub step: f64,
}

impl AnimationPlan {
    pub const DEFAULT_DURATION_TICKS: u32 = 20;
    pub const DEFAULT_INTERVAL_TICKS: u32 = 4;
    pub const DEFAULT_STEP: f64 = FRAC_PI_4;

    pub const fn new(duration_ticks: u32, interval_ticks: u32, step: f64) -> Self {
        Self {
            duration_ticks,
            interval_ticks,
            step,
        }
    }

    /// Accumulated angle at which a run cancels itself.
    pub fn threshold(&self) -> f64 {
        let runs = self.duration_ticks / self.interval_ticks.max(1);
        f64::from(runs) * self.step
    }

    /// Number of frame batches a run emits: `ceil(threshold / step)`.
    ///
    /// Counted on integers so float drift in the accumulator can never add or
    /// drop a batch.
    pub fn frame_batches(&self) -> u32 {
        if self.step <= 0.0 || !self.step.is_finite() {
            return 0;
        }
        let ratio = self.threshold() / self.step;
        // Absorb rounding in the division before taking the ceiling.
        (ratio - 1e-9).ceil().max(0.0) as u32
    }

    /// Accumulator value before frame `frame` is emitted.
    pub fn angle_at(&self, frame: u32) -> f64 {
        f64::from(frame) * self.step
    }

    /// Vertical lift applied to every offset of frame `frame`.
    pub fn height_at(&self, frame: u32) -> f64 {
        self.angle_at(frame) / TAU
    }
}

impl Default for AnimationPlan {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_DURATION_TICKS,
            Self::DEFAULT_INTERVAL_TICKS,
            Self::DEFAULT_STEP,
        )
    }
}
