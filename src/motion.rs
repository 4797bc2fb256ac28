//! Motion model: progress, position, size and fade for each particle.
//!
//! Everything here is a pure function of per-particle state, so the model can
//! be tested without any field or session around it.
//!
//! # Reconstruction
//!
//! Progress is integrated once per frame:
//!
//! ```text
//! attraction = (speed - progress) / 400
//! repulsion  = k / (|pointer - position| + 20)      // after first arrival, pointer inside
//! progress   = min(1.03, progress + attraction - repulsion)
//! ```
//!
//! `k` is 1 while hovering and 5 while pressing. Repulsion can outweigh
//! attraction, so a settled particle keeps getting pushed back for as long as
//! the pointer stays near it.
//!
//! Curve position uses `t = clamp(progress, 0, 1)`. Progress beyond 1 only
//! drives the fade: the marker holds at its endpoint while its pixels appear.
//!
//! # Morph
//!
//! Progress is a function of time since the transition started, with a
//! per-particle delay and duration multiplier. See [`morph_t`].

use crate::curve::CubicCurve;
use crate::input::PointerState;
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Alpha drop per unit of progress past 1.
pub const FADE_RATE: f32 = 2550.0;

/// Below this t, image A is revealed in morph mode.
pub const FADE_OUT_THRESHOLD: f32 = 0.3;

/// Above this t, image B is revealed in morph mode.
pub const FADE_IN_THRESHOLD: f32 = 0.7;

/// External forces acting on a reconstruction particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ForceModel {
    /// Attraction toward the target speed only.
    PureBezier,
    /// Attraction plus pointer repulsion after the first arrival.
    Repulsion {
        /// Numerator while the pointer hovers.
        hover: f32,
        /// Numerator while the pointer is pressed.
        pressed: f32,
        /// Added to the distance before dividing.
        softening: f32,
    },
}

impl Default for ForceModel {
    fn default() -> Self {
        ForceModel::Repulsion {
            hover: 1.0,
            pressed: 5.0,
            softening: 20.0,
        }
    }
}

/// Tunables for reconstruction motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalParams {
    /// Attraction is `(speed - progress) / attraction_divisor`.
    pub attraction_divisor: f32,
    /// Upper bound on progress; the marker disappears when it is reached.
    pub overshoot: f32,
    /// Optional lower bound on progress.
    pub progress_floor: Option<f32>,
    pub force: ForceModel,
}

impl Default for ArrivalParams {
    fn default() -> Self {
        Self {
            attraction_divisor: 400.0,
            overshoot: 1.03,
            progress_floor: Some(0.0),
            force: ForceModel::default(),
        }
    }
}

/// Mutable motion state of one reconstruction particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub progress: f32,
    /// Marker alpha, 1..=255.
    pub alpha: u8,
    /// Progress has exceeded 1 at least once.
    pub completed_first: bool,
    /// Marker is still drawn.
    pub active: bool,
}

impl Default for Arrival {
    fn default() -> Self {
        Self {
            progress: 0.0,
            alpha: 255,
            completed_first: false,
            active: true,
        }
    }
}

/// Curve parameter for a progress value.
#[inline]
pub fn curve_t(progress: f32) -> f32 {
    progress.clamp(0.0, 1.0)
}

#[inline]
pub fn attraction(speed: f32, progress: f32, divisor: f32) -> f32 {
    (speed - progress) / divisor
}

/// Repulsion magnitude from a pointer, already in layout coordinates.
pub fn repulsion(force: ForceModel, pointer: &PointerState, position: glam::Vec2) -> f32 {
    match force {
        ForceModel::PureBezier => 0.0,
        ForceModel::Repulsion {
            hover,
            pressed,
            softening,
        } => {
            if !pointer.inside {
                return 0.0;
            }
            let k = if pointer.pressed { pressed } else { hover };
            k / (pointer.position.distance(position) + softening)
        }
    }
}

/// Marker alpha for a progress value: 255 up to 1, then a linear ramp down,
/// never below 1.
pub fn marker_alpha(progress: f32, overshoot: f32) -> u8 {
    if progress > 1.0 {
        (FADE_RATE * (overshoot - progress)).clamp(1.0, 255.0).floor() as u8
    } else {
        255
    }
}

/// Alpha written for a particle's pixels in the reveal buffer.
#[inline]
pub fn reveal_alpha(progress: f32, marker_alpha: u8) -> u8 {
    if progress < 1.0 {
        0
    } else {
        255 - marker_alpha
    }
}

/// Marker radius while arriving: six times nominal at t = 0, nominal at t = 1.
#[inline]
pub fn arrival_radius(nominal: f32, t: f32) -> f32 {
    nominal * (1.0 + 5.0 * (1.0 - t).max(0.0))
}

/// Advance one reconstruction particle by one frame.
///
/// `pointer` must already be relative to the image origin.
pub fn step_arrival(
    state: &mut Arrival,
    speed: f32,
    curve: &CubicCurve,
    pointer: &PointerState,
    params: &ArrivalParams,
) {
    let mut force = attraction(speed, state.progress, params.attraction_divisor);
    if state.completed_first {
        let position = curve.at(curve_t(state.progress));
        force -= repulsion(params.force, pointer, position);
    }

    let mut progress = (state.progress + force).min(params.overshoot);
    if let Some(floor) = params.progress_floor {
        progress = progress.max(floor);
    }
    state.progress = progress;
    state.active = progress < params.overshoot;
    state.alpha = marker_alpha(progress, params.overshoot);
    if progress > 1.0 {
        state.completed_first = true;
    }
}

/// Linear 0..1 ramp for a transition, after the particle's own delay.
pub fn transition_ramp(
    elapsed: f32,
    delay: f32,
    base_duration: f32,
    speed_multiplier: f32,
) -> f32 {
    let duration = base_duration * speed_multiplier;
    if duration <= 0.0 {
        return 1.0;
    }
    ((elapsed - delay).max(0.0) / duration).clamp(0.0, 1.0)
}

/// Morph progress for a phase: 0 on image A, 1 on image B.
pub fn morph_t(
    phase: Phase,
    elapsed: f32,
    delay: f32,
    base_duration: f32,
    speed_multiplier: f32,
) -> f32 {
    let t = match phase {
        Phase::RestA => 0.0,
        Phase::RestB => 1.0,
        Phase::ToB => transition_ramp(elapsed, delay, base_duration, speed_multiplier),
        Phase::ToA => 1.0 - transition_ramp(elapsed, delay, base_duration, speed_multiplier),
    };
    t.clamp(0.0, 1.0)
}

/// Marker radius in morph mode: 1 at rest, 6 mid-flight.
#[inline]
pub fn morph_radius(t: f32) -> f32 {
    1.0 + 5.0 * (t * PI).sin()
}

/// Channel-wise interpolation, truncated toward zero.
pub fn lerp_rgb(from: [u8; 3], to: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).floor().clamp(0.0, 255.0) as u8;
    [mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])]
}

/// Image A alpha: 255 at t = 0 falling to 0 at the threshold, 0 beyond.
pub fn fade_out_alpha(t: f32, threshold: f32) -> u8 {
    if t < threshold {
        let level = 1.0 - t as f64 / threshold as f64;
        (255.0 * level).floor().clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

/// Image B alpha: 0 up to the threshold, rising to 255 at t = 1.
pub fn fade_in_alpha(t: f32, threshold: f32) -> u8 {
    if t > threshold {
        let level = (t as f64 - threshold as f64) / (1.0 - threshold as f64);
        (255.0 * level).floor().clamp(0.0, 255.0) as u8
    } else {
        0
    }
}
