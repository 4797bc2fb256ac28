//! Random sampling used while building a particle field.
//!
//! All randomness is drawn once at construction: destinations, control
//! handles, speeds, delays. Frames are deterministic given the inputs.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Seeded RNG with helpers for the shapes used by the fields.
pub(crate) struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    /// Seeded spawner. Without a seed, each run differs.
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Fresh seed for a dependent generator.
    pub(crate) fn child_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Uniform value in `[min, max)`; `min` when the range is empty.
    #[inline]
    pub(crate) fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Offset with each axis uniform in `[-extent / 2, extent / 2)`.
    pub(crate) fn centered_offset(&mut self, extent: Vec2) -> Vec2 {
        Vec2::new(
            (self.rng.gen::<f32>() - 0.5) * extent.x,
            (self.rng.gen::<f32>() - 0.5) * extent.y,
        )
    }

    /// `count` distinct indices below `len`, in random order.
    ///
    /// `count` is capped at `len`.
    pub(crate) fn distinct_indices(&mut self, len: usize, count: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, count.min(len)).into_vec()
    }
}
