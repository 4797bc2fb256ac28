//! Session configuration.
//!
//! Both configs serialize to JSON. Missing fields fall back to their
//! defaults, so a file only needs the values it changes:
//!
//! ```json
//! { "particle_count": 800, "assignment": "BruteForce", "seed": 7 }
//! ```

use crate::error::{Error, Result};
use crate::motion::{ArrivalParams, ForceModel, FADE_IN_THRESHOLD, FADE_OUT_THRESHOLD};
use crate::phase::PhaseTimings;
use crate::pixels::PixelFilter;
use crate::spatial::AssignmentStrategy;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Drawing surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "surface must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

fn validate_range(name: &str, [min, max]: [f32; 2]) -> Result<()> {
    if !(min <= max) || !min.is_finite() || !max.is_finite() {
        return Err(Error::InvalidConfig(format!("{name} range {min}..{max} is invalid")));
    }
    Ok(())
}

fn validate_extent(name: &str, value: f32) -> Result<()> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(Error::InvalidConfig(format!(
            "{name} must be a non-negative finite number, got {value}"
        )));
    }
    Ok(())
}

/// Configuration for a single-image reconstruction session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Requested particles; capped by the number of meaningful pixels.
    pub particle_count: usize,
    pub filter: PixelFilter,
    pub assignment: AssignmentStrategy,
    pub motion: ArrivalParams,
    /// Target speed per particle, uniform in `[min, max)`.
    pub speed_range: [f32; 2],
    /// Marker radius once arrived.
    pub marker_size: f32,
    /// Start points spread over this multiple of the surface size.
    pub start_spread: f32,
    /// Control handles spread over this multiple of the surface size.
    pub handle_spread: f32,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            particle_count: 3000,
            filter: PixelFilter::reconstruction(),
            assignment: AssignmentStrategy::default(),
            motion: ArrivalParams::default(),
            speed_range: [2.0, 3.0],
            marker_size: 2.5,
            start_spread: 2.5,
            handle_spread: 2.0,
            seed: None,
        }
    }
}

impl ReconstructionConfig {
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_filter(mut self, filter: PixelFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_assignment(mut self, strategy: AssignmentStrategy) -> Self {
        self.assignment = strategy;
        self
    }

    pub fn with_force_model(mut self, force: ForceModel) -> Self {
        self.motion.force = force;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.assignment.validate()?;
        validate_range("speed", self.speed_range)?;
        validate_extent("marker size", self.marker_size)?;
        validate_extent("start spread", self.start_spread)?;
        validate_extent("handle spread", self.handle_spread)?;
        if !(self.motion.attraction_divisor > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "attraction divisor must be positive, got {}",
                self.motion.attraction_divisor
            )));
        }
        if !(self.motion.overshoot >= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "overshoot must be at least 1, got {}",
                self.motion.overshoot
            )));
        }
        if let Some(floor) = self.motion.progress_floor {
            if !(floor < self.motion.overshoot) || !floor.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "progress floor must be finite and below overshoot, got {floor}"
                )));
            }
        }
        if let ForceModel::Repulsion { softening, .. } = self.motion.force {
            if !(softening > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "repulsion softening must be positive, got {softening}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for a two-image morph session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Requested particles; capped by the smaller meaningful-pixel count.
    pub particle_count: usize,
    pub filter: PixelFilter,
    pub assignment: AssignmentStrategy,
    pub timings: PhaseTimings,
    /// Per-particle start delay in milliseconds, uniform in `[min, max)`.
    pub delay_range: [f32; 2],
    /// Per-particle duration multiplier, uniform in `[min, max)`.
    pub speed_multiplier_range: [f32; 2],
    /// Control handles spread over this multiple of the surface size.
    pub handle_spread: f32,
    /// Image A is revealed while `t` is below this.
    pub fade_out_threshold: f32,
    /// Image B is revealed while `t` is above this.
    pub fade_in_threshold: f32,
    pub seed: Option<u64>,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            particle_count: 1500,
            filter: PixelFilter::morph(),
            assignment: AssignmentStrategy::default(),
            timings: PhaseTimings::default(),
            delay_range: [0.0, 500.0],
            speed_multiplier_range: [0.8, 1.2],
            handle_spread: 1.0,
            fade_out_threshold: FADE_OUT_THRESHOLD,
            fade_in_threshold: FADE_IN_THRESHOLD,
            seed: None,
        }
    }
}

impl MorphConfig {
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_filter(mut self, filter: PixelFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_assignment(mut self, strategy: AssignmentStrategy) -> Self {
        self.assignment = strategy;
        self
    }

    pub fn with_timings(mut self, timings: PhaseTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.assignment.validate()?;
        self.timings.validate()?;
        validate_range("delay", self.delay_range)?;
        validate_range("speed multiplier", self.speed_multiplier_range)?;
        validate_extent("handle spread", self.handle_spread)?;
        if !(self.speed_multiplier_range[0] > 0.0) {
            return Err(Error::InvalidConfig(
                "speed multiplier must be positive".to_string(),
            ));
        }
        let (lo, hi) = (self.fade_out_threshold, self.fade_in_threshold);
        if !(0.0 < lo && lo <= hi && hi < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "fade thresholds must satisfy 0 < {lo} <= {hi} < 1"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::BrightnessRule;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ReconstructionConfig::default().validate().is_ok());
        assert!(MorphConfig::default().validate().is_ok());
        assert!(SurfaceSize::new(640, 480).validate().is_ok());
        assert!(SurfaceSize::new(0, 480).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ReconstructionConfig::from_json(
            r#"{ "particle_count": 800, "assignment": "BruteForce", "seed": 7 }"#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 800);
        assert_eq!(config.assignment, AssignmentStrategy::BruteForce);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.speed_range, [2.0, 3.0]);
        assert_eq!(config.motion, ArrivalParams::default());
    }

    #[test]
    fn test_morph_json_roundtrip() {
        let config = MorphConfig::default()
            .with_particle_count(12)
            .with_filter(PixelFilter {
                rule: BrightnessRule::MeanBelow(200),
                require_alpha: false,
            })
            .with_seed(3);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(MorphConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = MorphConfig::from_json("{ particle_count: }").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = ReconstructionConfig {
            speed_range: [3.0, 2.0],
            ..ReconstructionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReconstructionConfig::default()
            .with_assignment(AssignmentStrategy::Indexed { cell_size: -1.0 });
        assert!(config.validate().is_err());

        let config = MorphConfig {
            fade_out_threshold: 0.8,
            ..MorphConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_sizes_and_floor_rejected() {
        let bad = [
            ReconstructionConfig {
                marker_size: -1.0,
                ..ReconstructionConfig::default()
            },
            ReconstructionConfig {
                start_spread: f32::NAN,
                ..ReconstructionConfig::default()
            },
            ReconstructionConfig {
                handle_spread: f32::INFINITY,
                ..ReconstructionConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?}", config);
        }

        let mut config = ReconstructionConfig::default();
        config.motion.progress_floor = Some(f32::NEG_INFINITY);
        assert!(config.validate().is_err());
        config.motion.progress_floor = Some(config.motion.overshoot);
        assert!(config.validate().is_err());
        config.motion.progress_floor = None;
        assert!(config.validate().is_ok());

        let config = ReconstructionConfig {
            marker_size: 0.0,
            start_spread: 0.0,
            ..ReconstructionConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = MorphConfig {
            handle_spread: -0.5,
            ..MorphConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
