//! Uniform-grid spatial index and pixel-to-particle assignment.
//!
//! Each particle anchor is bucketed into a square cell of `cell_size` units.
//! A query scans the 3x3 block of cells around the query point and keeps the
//! anchor with the smallest squared distance. When that block is empty the
//! query falls back to a linear scan of every anchor.
//!
//! The local scan is an approximation: an anchor two cells away can be closer
//! than the best one found inside the block. It is exact whenever anchors are
//! dense relative to the cell size, or sparse enough that the block holds at
//! most the true nearest. [`AssignmentStrategy::BruteForce`] is always exact
//! and is fast enough below a few hundred particles.

use crate::error::{Error, Result};
use crate::pixels::Pixel;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default cell edge length in layout units.
pub const DEFAULT_CELL_SIZE: f32 = 40.0;

/// Integer cell coordinates packed into one 64-bit key.
///
/// High 32 bits hold `x`, low 32 bits hold `y`, both as two's complement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(u64);

impl CellKey {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        CellKey(((x as u32 as u64) << 32) | y as u32 as u64)
    }

    /// Cell containing a point.
    #[inline]
    pub fn containing(point: Vec2, cell_size: f32) -> Self {
        Self::new(
            (point.x / cell_size).floor() as i32,
            (point.y / cell_size).floor() as i32,
        )
    }

    #[inline]
    pub fn x(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    #[inline]
    pub fn y(self) -> i32 {
        self.0 as u32 as i32
    }

    /// This cell and its 8 neighbors, column by column.
    pub fn neighborhood(self) -> impl Iterator<Item = CellKey> {
        let (cx, cy) = (self.x(), self.y());
        (cx - 1..=cx + 1).flat_map(move |x| (cy - 1..=cy + 1).map(move |y| CellKey::new(x, y)))
    }
}

/// Bucketed particle anchors.
///
/// Built once per assignment pass. Anchors are static, so the grid is never
/// updated incrementally.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<u32>>,
    anchors: Vec<Vec2>,
}

impl SpatialGrid {
    /// Bucket every anchor. Particle ids are indices into `anchors`.
    pub fn build(anchors: &[Vec2], cell_size: f32) -> Self {
        let mut cells: HashMap<CellKey, Vec<u32>> = HashMap::new();
        for (id, anchor) in anchors.iter().enumerate() {
            cells
                .entry(CellKey::containing(*anchor, cell_size))
                .or_default()
                .push(id as u32);
        }
        Self {
            cell_size,
            cells,
            anchors: anchors.to_vec(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of indexed anchors.
    #[inline]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Particle ids bucketed in one cell.
    pub fn bucket(&self, key: CellKey) -> &[u32] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nearest anchor among the 3x3 cells around `point`, if any.
    pub fn nearest_local(&self, point: Vec2) -> Option<u32> {
        let mut best: Option<(u32, f32)> = None;
        for key in CellKey::containing(point, self.cell_size).neighborhood() {
            for &id in self.bucket(key) {
                let dist_sq = self.anchors[id as usize].distance_squared(point);
                if best.map_or(true, |(_, d)| dist_sq < d) {
                    best = Some((id, dist_sq));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Local query with a full linear scan when the neighborhood is empty.
    ///
    /// Returns `None` only when the grid holds no anchors at all.
    pub fn nearest(&self, point: Vec2) -> Option<u32> {
        self.nearest_local(point)
            .or_else(|| brute_force_nearest(&self.anchors, point))
    }
}

/// Exact nearest anchor by linear scan. Ties go to the lowest id.
pub fn brute_force_nearest(anchors: &[Vec2], point: Vec2) -> Option<u32> {
    let mut best: Option<(u32, f32)> = None;
    for (id, anchor) in anchors.iter().enumerate() {
        let dist_sq = anchor.distance_squared(point);
        if best.map_or(true, |(_, d)| dist_sq < d) {
            best = Some((id as u32, dist_sq));
        }
    }
    best.map(|(id, _)| id)
}

/// How pixels find their owning particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AssignmentStrategy {
    /// Uniform grid with a 3x3 neighborhood scan and linear fallback.
    Indexed { cell_size: f32 },
    /// Linear scan over all anchors for every pixel.
    BruteForce,
}

impl Default for AssignmentStrategy {
    fn default() -> Self {
        AssignmentStrategy::Indexed {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl AssignmentStrategy {
    pub fn validate(&self) -> Result<()> {
        match self {
            AssignmentStrategy::Indexed { cell_size }
                if !(*cell_size > 0.0) || !cell_size.is_finite() =>
            {
                Err(Error::InvalidConfig(format!(
                    "cell size must be a positive finite number, got {cell_size}"
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssignmentStrategy::Indexed { .. } => "indexed",
            AssignmentStrategy::BruteForce => "brute-force",
        }
    }
}

/// Pixels grouped by owning particle.
///
/// Stored flat: the pixels of particle `i` are
/// `pixels[offsets[i]..offsets[i + 1]]`, in source row-major order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelAssignment {
    offsets: Vec<u32>,
    pixels: Vec<Pixel>,
    dropped: usize,
}

impl PixelAssignment {
    /// Assignment with `owners` particles and no pixels.
    pub fn empty(owners: usize) -> Self {
        Self {
            offsets: vec![0; owners + 1],
            pixels: Vec::new(),
            dropped: 0,
        }
    }

    /// Number of particles the assignment covers.
    pub fn owner_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Pixels owned by one particle.
    pub fn pixels_of(&self, particle: usize) -> &[Pixel] {
        let start = self.offsets[particle] as usize;
        let end = self.offsets[particle + 1] as usize;
        &self.pixels[start..end]
    }

    /// Every assigned pixel, grouped by owner.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Total assigned pixels.
    pub fn assigned(&self) -> usize {
        self.pixels.len()
    }

    /// Pixels that found no owner (only when there are no particles).
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Give every pixel to its nearest anchor.
pub fn assign_pixels(
    pixels: &[Pixel],
    anchors: &[Vec2],
    strategy: AssignmentStrategy,
) -> PixelAssignment {
    let owners: Vec<Option<u32>> = match strategy {
        AssignmentStrategy::Indexed { cell_size } => {
            let grid = SpatialGrid::build(anchors, cell_size);
            log::debug!(
                "Spatial grid: {} anchors in {} cells (cell size {})",
                grid.len(),
                grid.occupied_cells(),
                cell_size
            );
            pixels.iter().map(|px| grid.nearest(px.position())).collect()
        }
        AssignmentStrategy::BruteForce => pixels
            .iter()
            .map(|px| brute_force_nearest(anchors, px.position()))
            .collect(),
    };

    // Counting sort by owner keeps each particle's pixels contiguous.
    let mut offsets = vec![0u32; anchors.len() + 1];
    for owner in owners.iter().flatten() {
        offsets[*owner as usize + 1] += 1;
    }
    for i in 1..offsets.len() {
        offsets[i] += offsets[i - 1];
    }

    let mut cursor = offsets.clone();
    let mut sorted = vec![
        Pixel {
            x: 0,
            y: 0,
            r: 0,
            g: 0,
            b: 0,
            index: 0,
        };
        offsets[anchors.len()] as usize
    ];
    let mut dropped = 0;
    for (px, owner) in pixels.iter().zip(&owners) {
        match owner {
            Some(id) => {
                let slot = &mut cursor[*id as usize];
                sorted[*slot as usize] = *px;
                *slot += 1;
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("{} pixels had no particle to claim them", dropped);
    }

    PixelAssignment {
        offsets,
        pixels: sorted,
        dropped,
    }
}
