//! Particle fields: data-oriented particle storage plus per-frame passes.
//!
//! Particles are stored as parallel arrays (curves, speeds, colors, motion
//! state, ...) indexed by particle id. Each frame runs three passes over them:
//!
//! 1. `update` advances motion state through [`crate::motion`].
//! 2. `paint` writes each particle's owned pixels into the reveal buffer(s).
//! 3. `emit_markers` appends a [`DrawCommand`] per visible particle.
//!
//! Pixel ownership is fixed at construction and only read afterwards.

use crate::config::{MorphConfig, ReconstructionConfig};
use crate::curve::{ControlPoints, CubicCurve};
use crate::frame::{DrawCommand, RevealBuffer};
use crate::input::PointerState;
use crate::motion::{self, Arrival, ArrivalParams};
use crate::phase::Phase;
use crate::pixels::Pixel;
use crate::spatial::{assign_pixels, AssignmentStrategy, PixelAssignment};
use crate::spawn::Spawner;
use glam::Vec2;

/// One reconstruction particle before it is split into the field's arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructionParticle {
    /// Flight path; the end point is the anchor that claims pixels.
    pub curve: CubicCurve,
    /// Target speed; progress is attracted toward it.
    pub speed: f32,
    pub color: [u8; 3],
}

/// Particles flying in from random points to rebuild one image.
#[derive(Debug, Clone)]
pub struct ReconstructionField {
    curves: Vec<CubicCurve>,
    speeds: Vec<f32>,
    colors: Vec<[u8; 3]>,
    states: Vec<Arrival>,
    pixels: PixelAssignment,
    marker_size: f32,
    params: ArrivalParams,
}

impl ReconstructionField {
    /// Build from explicit particles and assign `pixels` to their end points.
    pub fn from_particles(
        particles: &[ReconstructionParticle],
        pixels: &[Pixel],
        strategy: AssignmentStrategy,
        marker_size: f32,
        params: ArrivalParams,
    ) -> Self {
        let anchors: Vec<Vec2> = particles.iter().map(|p| p.curve.end()).collect();
        Self {
            curves: particles.iter().map(|p| p.curve).collect(),
            speeds: particles.iter().map(|p| p.speed).collect(),
            colors: particles.iter().map(|p| p.color).collect(),
            states: vec![Arrival::default(); particles.len()],
            pixels: assign_pixels(pixels, &anchors, strategy),
            marker_size,
            params,
        }
    }

    /// Sample destinations, start points and handles for `pixels`.
    ///
    /// Start points and handles are spread around the image center, scaled
    /// by the surface size. Handles spread around the image origin instead
    /// would bend the curves toward the top-left corner.
    pub(crate) fn spawn(
        pixels: &[Pixel],
        image_size: Vec2,
        surface: Vec2,
        config: &ReconstructionConfig,
        spawner: &mut Spawner,
    ) -> Self {
        let center = image_size * 0.5;
        let particles: Vec<ReconstructionParticle> = spawner
            .distinct_indices(pixels.len(), config.particle_count)
            .into_iter()
            .map(|i| {
                let target = pixels[i];
                let points = ControlPoints {
                    p0: center + spawner.centered_offset(surface * config.start_spread),
                    p1: center + spawner.centered_offset(surface * config.handle_spread),
                    p2: center + spawner.centered_offset(surface * config.handle_spread),
                    p3: target.position(),
                };
                ReconstructionParticle {
                    curve: CubicCurve::new(points),
                    speed: spawner.random_range(config.speed_range[0], config.speed_range[1]),
                    color: target.rgb(),
                }
            })
            .collect();

        Self::from_particles(
            &particles,
            pixels,
            config.assignment,
            config.marker_size,
            config.motion,
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Motion state of one particle.
    #[inline]
    pub fn state(&self, particle: usize) -> &Arrival {
        &self.states[particle]
    }

    #[inline]
    pub fn curve(&self, particle: usize) -> &CubicCurve {
        &self.curves[particle]
    }

    /// Current marker position.
    pub fn position(&self, particle: usize) -> Vec2 {
        self.curves[particle].at(motion::curve_t(self.states[particle].progress))
    }

    /// Pixel ownership, fixed at construction.
    #[inline]
    pub fn assignment(&self) -> &PixelAssignment {
        &self.pixels
    }

    /// Particles whose marker is still drawn.
    pub fn active_count(&self) -> usize {
        self.states.iter().filter(|s| s.active).count()
    }

    /// Advance every particle one frame. `pointer` is image-relative.
    pub fn update(&mut self, pointer: &PointerState) {
        let particles = self.states.iter_mut().zip(&self.speeds).zip(&self.curves);
        for ((state, speed), curve) in particles {
            motion::step_arrival(state, *speed, curve, pointer, &self.params);
        }
    }

    /// Write every owned pixel with its owner's reveal alpha.
    ///
    /// The buffer is expected to be image-sized and already cleared.
    pub fn paint(&self, buffer: &mut RevealBuffer) {
        for (particle, state) in self.states.iter().enumerate() {
            let alpha = motion::reveal_alpha(state.progress, state.alpha);
            for px in self.pixels.pixels_of(particle) {
                buffer.put_index(px.index as usize, px.rgb(), alpha);
            }
        }
    }

    /// Append a marker for each active particle.
    pub fn emit_markers(&self, out: &mut Vec<DrawCommand>) {
        for (particle, state) in self.states.iter().enumerate() {
            if !state.active {
                continue;
            }
            let t = motion::curve_t(state.progress);
            out.push(DrawCommand::new(
                self.curves[particle].at(t),
                motion::arrival_radius(self.marker_size, t),
                self.colors[particle],
                state.alpha,
            ));
        }
    }
}

/// One morph particle before it is split into the field's arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphParticle {
    /// Path from a pixel of image A to a pixel of image B.
    pub curve: CubicCurve,
    pub start_color: [u8; 3],
    pub end_color: [u8; 3],
    /// Milliseconds to wait after a transition starts.
    pub delay: f32,
    /// Scales the base transition duration.
    pub speed_multiplier: f32,
}

/// Particles shuttling between two images.
#[derive(Debug, Clone)]
pub struct MorphField {
    curves: Vec<CubicCurve>,
    start_colors: Vec<[u8; 3]>,
    end_colors: Vec<[u8; 3]>,
    delays: Vec<f32>,
    speed_multipliers: Vec<f32>,
    t: Vec<f32>,
    pixels_a: PixelAssignment,
    pixels_b: PixelAssignment,
    fade_out_threshold: f32,
    fade_in_threshold: f32,
}

impl MorphField {
    /// Build from explicit particles. Image A pixels go to curve starts,
    /// image B pixels to curve ends.
    pub fn from_particles(
        particles: &[MorphParticle],
        pixels_a: &[Pixel],
        pixels_b: &[Pixel],
        strategy: AssignmentStrategy,
        thresholds: (f32, f32),
    ) -> Self {
        let starts: Vec<Vec2> = particles.iter().map(|p| p.curve.start()).collect();
        let ends: Vec<Vec2> = particles.iter().map(|p| p.curve.end()).collect();
        Self {
            curves: particles.iter().map(|p| p.curve).collect(),
            start_colors: particles.iter().map(|p| p.start_color).collect(),
            end_colors: particles.iter().map(|p| p.end_color).collect(),
            delays: particles.iter().map(|p| p.delay).collect(),
            speed_multipliers: particles.iter().map(|p| p.speed_multiplier).collect(),
            t: vec![0.0; particles.len()],
            pixels_a: assign_pixels(pixels_a, &starts, strategy),
            pixels_b: assign_pixels(pixels_b, &ends, strategy),
            fade_out_threshold: thresholds.0,
            fade_in_threshold: thresholds.1,
        }
    }

    /// Pair random A pixels with random B pixels and draw handles around
    /// the stage center.
    pub(crate) fn spawn(
        pixels_a: &[Pixel],
        pixels_b: &[Pixel],
        stage_size: Vec2,
        surface: Vec2,
        config: &MorphConfig,
        spawner: &mut Spawner,
    ) -> Self {
        let count = config.particle_count.min(pixels_a.len()).min(pixels_b.len());
        let starts = spawner.distinct_indices(pixels_a.len(), count);
        let ends = spawner.distinct_indices(pixels_b.len(), count);
        let center = stage_size * 0.5;
        let spread = surface * config.handle_spread;

        let particles: Vec<MorphParticle> = starts
            .into_iter()
            .zip(ends)
            .map(|(a, b)| {
                let (from, to) = (pixels_a[a], pixels_b[b]);
                MorphParticle {
                    curve: CubicCurve::new(ControlPoints {
                        p0: from.position(),
                        p1: center + spawner.centered_offset(spread),
                        p2: center + spawner.centered_offset(spread),
                        p3: to.position(),
                    }),
                    start_color: from.rgb(),
                    end_color: to.rgb(),
                    delay: spawner.random_range(config.delay_range[0], config.delay_range[1]),
                    speed_multiplier: spawner.random_range(
                        config.speed_multiplier_range[0],
                        config.speed_multiplier_range[1],
                    ),
                }
            })
            .collect();

        Self::from_particles(
            &particles,
            pixels_a,
            pixels_b,
            config.assignment,
            (config.fade_out_threshold, config.fade_in_threshold),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Current progress of one particle, 0 = on A, 1 = on B.
    #[inline]
    pub fn t(&self, particle: usize) -> f32 {
        self.t[particle]
    }

    #[inline]
    pub fn curve(&self, particle: usize) -> &CubicCurve {
        &self.curves[particle]
    }

    pub fn position(&self, particle: usize) -> Vec2 {
        self.curves[particle].at(self.t[particle])
    }

    /// Ownership of image A pixels (by curve start).
    #[inline]
    pub fn assignment_a(&self) -> &PixelAssignment {
        &self.pixels_a
    }

    /// Ownership of image B pixels (by curve end).
    #[inline]
    pub fn assignment_b(&self) -> &PixelAssignment {
        &self.pixels_b
    }

    /// Recompute every particle's progress for the phase and its elapsed time.
    pub fn update(&mut self, phase: Phase, elapsed: f32, base_duration: f32) {
        for ((t, delay), mult) in self.t.iter_mut().zip(&self.delays).zip(&self.speed_multipliers) {
            *t = motion::morph_t(phase, elapsed, *delay, base_duration, *mult);
        }
    }

    /// Paint image A pixels of particles near their start and image B pixels
    /// of particles near their end. Buffers are stage-sized and cleared.
    pub fn paint(&self, layer_a: &mut RevealBuffer, layer_b: &mut RevealBuffer) {
        for (particle, &t) in self.t.iter().enumerate() {
            let alpha_a = motion::fade_out_alpha(t, self.fade_out_threshold);
            if alpha_a > 0 {
                for px in self.pixels_a.pixels_of(particle) {
                    layer_a.put(px.x, px.y, px.rgb(), alpha_a);
                }
            }
            let alpha_b = motion::fade_in_alpha(t, self.fade_in_threshold);
            if alpha_b > 0 {
                for px in self.pixels_b.pixels_of(particle) {
                    layer_b.put(px.x, px.y, px.rgb(), alpha_b);
                }
            }
        }
    }

    /// Append one opaque marker per particle.
    pub fn emit_markers(&self, out: &mut Vec<DrawCommand>) {
        for (particle, &t) in self.t.iter().enumerate() {
            out.push(DrawCommand::new(
                self.curves[particle].at(t),
                motion::morph_radius(t),
                motion::lerp_rgb(self.start_colors[particle], self.end_colors[particle], t),
                255,
            ));
        }
    }
}
