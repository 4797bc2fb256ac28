//! # pixelflock - particle image reconstruction
//!
//! A swarm of particles flies along cubic Bézier curves from scattered
//! starting points to positions sampled from a source image. As the particles
//! settle, every pixel of the image is painted back into a reveal buffer by
//! the particle that owns it, so the picture "emerges" underneath the markers.
//!
//! Two modes are provided:
//!
//! - **Reconstruction** ([`ReconstructionSession`]): one image, force-driven
//!   progress with pointer repulsion once a particle has arrived.
//! - **Morph** ([`MorphSession`]): two images, time-driven progress under a
//!   four-state [`Phase`] machine that flips between the images on request.
//!
//! The crate never touches a drawing surface. The host calls `tick` once per
//! frame and hands the returned [`Frame`] to its own compositor.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pixelflock::prelude::*;
//!
//! let image = SourceImage::open("assets/portrait.png")?;
//! let mut session = ReconstructionSession::start(
//!     SurfaceSize::new(1280, 720),
//!     image,
//!     ReconstructionConfig::default().with_particle_count(3000),
//! )?;
//!
//! // Host frame loop:
//! let pointer = PointerState::outside();
//! let frame = session.tick(timestamp_ms, &pointer);
//! compositor.draw_markers(frame.offset, frame.markers);
//! for layer in frame.layers {
//!     compositor.blit(frame.offset, layer);
//! }
//! ```
//!
//! ## Pixel ownership
//!
//! Every meaningful pixel (see [`PixelFilter`]) is assigned to exactly one
//! particle: the one whose anchor is nearest. The assignment is computed once
//! at start with a uniform grid ([`SpatialGrid`]) and never changes; frames
//! only read it.

pub mod config;
pub mod curve;
mod error;
pub mod field;
pub mod frame;
pub mod input;
pub mod motion;
pub mod phase;
pub mod pixels;
mod session;
pub mod spatial;
mod spawn;
pub mod time;

pub use glam::Vec2;

pub use config::{MorphConfig, ReconstructionConfig, SurfaceSize};
pub use curve::{ControlPoints, CubicCurve};
pub use error::{Error, Result};
pub use field::{MorphField, MorphParticle, ReconstructionField, ReconstructionParticle};
pub use frame::{DrawCommand, Frame, RevealBuffer};
pub use input::PointerState;
pub use motion::ForceModel;
pub use phase::{Phase, PhaseController, PhaseTimings};
pub use pixels::{extract_pixels, BrightnessRule, Pixel, PixelFilter, SourceImage};
pub use session::{start_morph, start_reconstruction, MorphSession, ReconstructionSession};
pub use spatial::{assign_pixels, AssignmentStrategy, CellKey, PixelAssignment, SpatialGrid};
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use pixelflock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{MorphConfig, ReconstructionConfig, SurfaceSize};
    pub use crate::frame::{DrawCommand, Frame, RevealBuffer};
    pub use crate::input::PointerState;
    pub use crate::motion::ForceModel;
    pub use crate::phase::Phase;
    pub use crate::pixels::{BrightnessRule, PixelFilter, SourceImage};
    pub use crate::session::{
        start_morph, start_reconstruction, MorphSession, ReconstructionSession,
    };
    pub use crate::spatial::AssignmentStrategy;
    pub use crate::Vec2;
}
