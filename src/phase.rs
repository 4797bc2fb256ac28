//! Morph phase state machine.
//!
//! ```text
//!            request                  buffer elapsed
//!   RestA ───────────▶ ToB ──────────────────────────▶ RestB
//!     ▲                                                  │
//!     │  buffer elapsed                       request    │
//!     └──────────────── ToA ◀────────────────────────────┘
//! ```
//!
//! Rest phases last until a transition is requested. Transition phases end on
//! their own once a fixed safety buffer has passed, independent of any single
//! particle's delay or speed. The buffer is chosen to cover the slowest
//! particle, but a particle that has not strictly finished is not waited for.
//!
//! Times are milliseconds from the host clock.

use crate::error::{Error, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Global animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Particles rest on image A.
    #[default]
    RestA,
    /// Particles fly from A to B.
    ToB,
    /// Particles rest on image B.
    RestB,
    /// Particles fly from B to A.
    ToA,
}

impl Phase {
    #[inline]
    pub fn is_transition(self) -> bool {
        matches!(self, Phase::ToB | Phase::ToA)
    }

    #[inline]
    pub fn is_rest(self) -> bool {
        !self.is_transition()
    }

    /// Phase entered when a transition is requested, if any.
    pub fn on_request(self) -> Option<Phase> {
        match self {
            Phase::RestA => Some(Phase::ToB),
            Phase::RestB => Some(Phase::ToA),
            Phase::ToB | Phase::ToA => None,
        }
    }

    /// Phase entered when the safety buffer runs out, if any.
    pub fn on_complete(self) -> Option<Phase> {
        match self {
            Phase::ToB => Some(Phase::RestB),
            Phase::ToA => Some(Phase::RestA),
            Phase::RestA | Phase::RestB => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::RestA => "RestA",
            Phase::ToB => "ToB",
            Phase::RestB => "RestB",
            Phase::ToA => "ToA",
        }
    }
}

/// Durations driving the phase machine, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Shortest nominal rest duration.
    pub rest_min: f32,
    /// Longest nominal rest duration.
    pub rest_max: f32,
    /// Base flight time; each particle scales it by its own multiplier.
    pub transition_base: f32,
    /// Time after which a transition phase completes.
    pub safety_buffer: f32,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            rest_min: 3000.0,
            rest_max: 5000.0,
            transition_base: 2500.0,
            safety_buffer: 4000.0,
        }
    }
}

impl PhaseTimings {
    pub fn validate(&self) -> Result<()> {
        if !(self.transition_base > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "transition base duration must be positive, got {}",
                self.transition_base
            )));
        }
        if !(self.safety_buffer > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "safety buffer must be positive, got {}",
                self.safety_buffer
            )));
        }
        if self.rest_min > self.rest_max || self.rest_min < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "rest range {}..{} is invalid",
                self.rest_min, self.rest_max
            )));
        }
        Ok(())
    }
}

/// Drives [`Phase`] from host timestamps.
///
/// The phase and its start time always change together.
#[derive(Debug, Clone)]
pub struct PhaseController {
    phase: Phase,
    phase_start: f64,
    nominal_duration: f32,
    timings: PhaseTimings,
    rng: SmallRng,
}

impl PhaseController {
    /// Controller in `RestA`, with its clock starting at `now`.
    pub fn new(timings: PhaseTimings, seed: u64, now: f64) -> Self {
        let mut controller = Self {
            phase: Phase::RestA,
            phase_start: now,
            nominal_duration: 0.0,
            timings,
            rng: SmallRng::seed_from_u64(seed),
        };
        controller.nominal_duration = controller.nominal_duration_for(Phase::RestA);
        controller
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn phase_start(&self) -> f64 {
        self.phase_start
    }

    /// Milliseconds since the current phase began.
    #[inline]
    pub fn elapsed(&self, now: f64) -> f32 {
        (now - self.phase_start).max(0.0) as f32
    }

    /// Nominal length of the current phase.
    ///
    /// Rest phases get a random value that is informational only; it never
    /// forces a transition.
    #[inline]
    pub fn nominal_duration(&self) -> f32 {
        self.nominal_duration
    }

    #[inline]
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Move the phase clock to a new origin without changing phase.
    pub fn restart_clock(&mut self, now: f64) {
        self.phase_start = now;
    }

    /// Start a transition if resting. Returns whether the phase changed.
    pub fn request_transition(&mut self, now: f64) -> bool {
        match self.phase.on_request() {
            Some(next) => {
                self.enter(next, now);
                true
            }
            None => {
                log::debug!("Transition request ignored during {}", self.phase.name());
                false
            }
        }
    }

    /// Complete a transition once the safety buffer has passed.
    ///
    /// Returns the new phase when a change happened.
    pub fn advance(&mut self, now: f64) -> Option<Phase> {
        if self.phase.is_transition() && self.elapsed(now) > self.timings.safety_buffer {
            let next = self.phase.on_complete()?;
            self.enter(next, now);
            return Some(next);
        }
        None
    }

    fn enter(&mut self, next: Phase, now: f64) {
        log::debug!("Phase {} -> {} at {:.1}ms", self.phase.name(), next.name(), now);
        self.phase = next;
        self.phase_start = now;
        self.nominal_duration = self.nominal_duration_for(next);
    }

    fn nominal_duration_for(&mut self, phase: Phase) -> f32 {
        if phase.is_transition() {
            self.timings.transition_base
        } else if self.timings.rest_max > self.timings.rest_min {
            self.rng.gen_range(self.timings.rest_min..self.timings.rest_max)
        } else {
            self.timings.rest_min
        }
    }
}
