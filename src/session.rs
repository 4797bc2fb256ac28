//! Animation sessions owned by the host.
//!
//! A session is created once from its image(s), then driven by the host's
//! frame callback through `tick`. Nothing here schedules frames; to stop,
//! the host stops calling `tick` and drops the session.

use crate::config::{MorphConfig, ReconstructionConfig, SurfaceSize};
use crate::error::Result;
use crate::field::{MorphField, ReconstructionField};
use crate::frame::{DrawCommand, Frame, RevealBuffer};
use crate::input::PointerState;
use crate::phase::{Phase, PhaseController};
use crate::pixels::{extract_pixels, Pixel, SourceImage};
use crate::spawn::Spawner;
use crate::time::FrameClock;
use glam::Vec2;
use std::path::Path;

/// Offset that centers `content` in `surface`, rounded down to whole pixels.
fn centered(surface: Vec2, content: Vec2) -> Vec2 {
    ((surface - content) * 0.5).floor()
}

/// Single-image reconstruction.
///
/// Coordinates are image-local. The layout offset places the image in the
/// middle of the surface and is the only thing a resize changes.
pub struct ReconstructionSession {
    field: ReconstructionField,
    layer: RevealBuffer,
    markers: Vec<DrawCommand>,
    clock: FrameClock,
    surface: SurfaceSize,
    image_size: Vec2,
    offset: Vec2,
    meaningful_pixels: usize,
}

impl ReconstructionSession {
    /// Extract pixels, spawn particles and assign pixel ownership.
    ///
    /// An image without meaningful pixels produces a session with no
    /// particles whose frames are empty.
    pub fn start(
        surface: SurfaceSize,
        image: SourceImage,
        config: ReconstructionConfig,
    ) -> Result<Self> {
        surface.validate()?;
        config.validate()?;

        let pixels = extract_pixels(&image, &config.filter);
        if pixels.is_empty() {
            log::warn!(
                "No meaningful pixels in {}x{} image",
                image.width(),
                image.height()
            );
        } else if config.particle_count > pixels.len() {
            log::warn!(
                "Requested {} particles but only {} meaningful pixels",
                config.particle_count,
                pixels.len()
            );
        }

        let mut spawner = Spawner::new(config.seed);
        let field = ReconstructionField::spawn(
            &pixels,
            image.size(),
            surface.as_vec2(),
            &config,
            &mut spawner,
        );
        log::info!(
            "Reconstruction started: {} particles, {} meaningful pixels, {} assignment",
            field.len(),
            pixels.len(),
            config.assignment.name()
        );

        Ok(Self {
            markers: Vec::with_capacity(field.len()),
            field,
            layer: RevealBuffer::new(image.width(), image.height()),
            clock: FrameClock::new(),
            surface,
            image_size: image.size(),
            offset: centered(surface.as_vec2(), image.size()),
            meaningful_pixels: pixels.len(),
        })
    }

    /// Advance one frame. `pointer` is in surface coordinates.
    pub fn tick(&mut self, now: f64, pointer: &PointerState) -> Frame<'_> {
        self.clock.update(now);
        self.field.update(&pointer.relative_to(self.offset));

        self.layer.clear();
        self.field.paint(&mut self.layer);
        self.markers.clear();
        self.field.emit_markers(&mut self.markers);

        Frame {
            index: self.clock.frame() - 1,
            offset: self.offset,
            markers: &self.markers,
            layers: std::slice::from_ref(&self.layer),
            phase: None,
        }
    }

    /// Re-center for a new surface size. Particles and ownership are kept.
    pub fn resize(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        self.offset = centered(surface.as_vec2(), self.image_size);
        log::debug!(
            "Resized to {}x{}, offset {:?}",
            surface.width,
            surface.height,
            self.offset
        );
    }

    /// Every marker has faded out.
    pub fn is_settled(&self) -> bool {
        self.field.active_count() == 0
    }

    #[inline]
    pub fn field(&self) -> &ReconstructionField {
        &self.field
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Where the image origin sits on the surface.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn meaningful_pixels(&self) -> usize {
        self.meaningful_pixels
    }
}

/// Two-image morph.
///
/// Both images are centered in a shared stage as large as the larger of the
/// two in each dimension. Pixels, curves and reveal buffers use stage
/// coordinates; the layout offset centers the stage on the surface.
pub struct MorphSession {
    field: MorphField,
    phases: PhaseController,
    transition_requested: bool,
    layers: [RevealBuffer; 2],
    markers: Vec<DrawCommand>,
    clock: FrameClock,
    surface: SurfaceSize,
    stage_size: Vec2,
    offset: Vec2,
}

impl MorphSession {
    /// Extract both images, pair their pixels through particles and rest on
    /// image A.
    pub fn start(
        surface: SurfaceSize,
        image_a: SourceImage,
        image_b: SourceImage,
        config: MorphConfig,
    ) -> Result<Self> {
        surface.validate()?;
        config.validate()?;

        let stage_w = image_a.width().max(image_b.width());
        let stage_h = image_a.height().max(image_b.height());
        let stage_size = Vec2::new(stage_w as f32, stage_h as f32);

        let pixels_a = stage_pixels(&image_a, stage_w, stage_h, &config);
        let pixels_b = stage_pixels(&image_b, stage_w, stage_h, &config);
        let available = pixels_a.len().min(pixels_b.len());
        if available == 0 {
            log::warn!(
                "Morph has nothing to move: {} meaningful pixels in A, {} in B",
                pixels_a.len(),
                pixels_b.len()
            );
        } else if config.particle_count > available {
            log::warn!(
                "Requested {} particles but only {} meaningful pixel pairs",
                config.particle_count,
                available
            );
        }

        let mut spawner = Spawner::new(config.seed);
        let field = MorphField::spawn(
            &pixels_a,
            &pixels_b,
            stage_size,
            surface.as_vec2(),
            &config,
            &mut spawner,
        );
        let phases = PhaseController::new(config.timings, spawner.child_seed(), 0.0);
        log::info!(
            "Morph started: {} particles, {}/{} meaningful pixels, {} assignment",
            field.len(),
            pixels_a.len(),
            pixels_b.len(),
            config.assignment.name()
        );

        Ok(Self {
            markers: Vec::with_capacity(field.len()),
            field,
            phases,
            transition_requested: false,
            layers: [
                RevealBuffer::new(stage_w, stage_h),
                RevealBuffer::new(stage_w, stage_h),
            ],
            clock: FrameClock::new(),
            surface,
            stage_size,
            offset: centered(surface.as_vec2(), stage_size),
        })
    }

    /// Ask for the next transition (a click or tap).
    ///
    /// Applied at the start of the next `tick`, with that tick's timestamp.
    /// Requests made while a transition is running are ignored.
    pub fn request_transition(&mut self) {
        self.transition_requested = true;
    }

    /// Advance one frame.
    pub fn tick(&mut self, now: f64) -> Frame<'_> {
        if self.clock.now().is_none() {
            self.phases.restart_clock(now);
        }
        self.clock.update(now);
        let now = self.clock.now().unwrap_or(now);

        if std::mem::take(&mut self.transition_requested) {
            self.phases.request_transition(now);
        }
        self.phases.advance(now);

        let phase = self.phases.phase();
        self.field
            .update(phase, self.phases.elapsed(now), self.phases.timings().transition_base);

        let [layer_a, layer_b] = &mut self.layers;
        layer_a.clear();
        layer_b.clear();
        self.field.paint(layer_a, layer_b);
        self.markers.clear();
        self.field.emit_markers(&mut self.markers);

        Frame {
            index: self.clock.frame() - 1,
            offset: self.offset,
            markers: &self.markers,
            layers: &self.layers,
            phase: Some(phase),
        }
    }

    /// Re-center the stage for a new surface size.
    pub fn resize(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        self.offset = centered(surface.as_vec2(), self.stage_size);
        log::debug!(
            "Resized to {}x{}, offset {:?}",
            surface.width,
            surface.height,
            self.offset
        );
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phases.phase()
    }

    #[inline]
    pub fn phases(&self) -> &PhaseController {
        &self.phases
    }

    #[inline]
    pub fn field(&self) -> &MorphField {
        &self.field
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Where the stage origin sits on the surface.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Stage dimensions in pixels.
    #[inline]
    pub fn stage_size(&self) -> Vec2 {
        self.stage_size
    }
}

/// Meaningful pixels of `image`, moved into stage coordinates.
fn stage_pixels(
    image: &SourceImage,
    stage_w: u32,
    stage_h: u32,
    config: &MorphConfig,
) -> Vec<Pixel> {
    let dx = ((stage_w - image.width()) / 2) as i32;
    let dy = ((stage_h - image.height()) / 2) as i32;
    extract_pixels(image, &config.filter)
        .into_iter()
        .map(|px| px.translated(dx, dy))
        .collect()
}

/// Load one image and start a reconstruction with default settings.
///
/// `particle_count` overrides the default count when given.
pub fn start_reconstruction(
    surface: SurfaceSize,
    path: impl AsRef<Path>,
    particle_count: Option<usize>,
) -> Result<ReconstructionSession> {
    let image = SourceImage::open(path)?;
    let mut config = ReconstructionConfig::default();
    if let Some(count) = particle_count {
        config = config.with_particle_count(count);
    }
    ReconstructionSession::start(surface, image, config)
}

/// Load two images and start a morph with default settings.
pub fn start_morph(
    surface: SurfaceSize,
    path_a: impl AsRef<Path>,
    path_b: impl AsRef<Path>,
    particle_count: Option<usize>,
) -> Result<MorphSession> {
    let image_a = SourceImage::open(path_a)?;
    let image_b = SourceImage::open(path_b)?;
    let mut config = MorphConfig::default();
    if let Some(count) = particle_count {
        config = config.with_particle_count(count);
    }
    MorphSession::start(surface, image_a, image_b, config)
}
