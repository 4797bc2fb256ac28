//! Per-frame output handed to the host compositor.
//!
//! A [`Frame`] carries two products:
//!
//! 1. **Markers**: one [`DrawCommand`] per visible particle, in particle
//!    order. Order only affects layering.
//! 2. **Layers**: one reveal buffer (reconstruction) or two (morph, image A
//!    then image B) holding the reconstructed pixels with per-pixel alpha.
//!
//! Both are in layout coordinates. The compositor clears its background,
//! draws the markers and blits the layers, all translated by
//! [`Frame::offset`].

use crate::phase::Phase;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A filled disc to draw.
///
/// `#[repr(C)]` and [`Pod`], so a GPU compositor can upload a marker slice
/// directly as an instance buffer (see [`Frame::marker_bytes`]).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawCommand {
    /// Disc center in layout coordinates.
    pub position: [f32; 2],
    /// Disc radius in layout units.
    pub radius: f32,
    /// Straight (non-premultiplied) RGBA.
    pub color: [u8; 4],
}

impl DrawCommand {
    pub fn new(position: Vec2, radius: f32, rgb: [u8; 3], alpha: u8) -> Self {
        Self {
            position: position.to_array(),
            radius,
            color: [rgb[0], rgb[1], rgb[2], alpha],
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }
}

/// RGBA pixel buffer the reconstructed image is painted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    has_content: bool,
}

impl RevealBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 4],
            width,
            height,
            has_content: false,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether anything with non-zero alpha was written since the last clear.
    ///
    /// Compositors may skip blitting a layer without content.
    #[inline]
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.has_content = false;
    }

    /// Write a pixel by coordinates. Out-of-range writes are ignored.
    pub fn put(&mut self, x: i32, y: i32, rgb: [u8; 3], alpha: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        self.put_index(y as usize * self.width as usize + x as usize, rgb, alpha);
    }

    /// Write a pixel by flat index. Out-of-range writes are ignored.
    pub fn put_index(&mut self, index: usize, rgb: [u8; 3], alpha: u8) {
        let i = index * 4;
        if let Some(px) = self.data.get_mut(i..i + 4) {
            px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]);
            self.has_content |= alpha > 0;
        }
    }

    /// RGBA at a coordinate, or `None` outside the buffer.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Copy into an [`image::RgbaImage`].
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.rgba_at(x, y).unwrap_or([0; 4]))
        })
    }
}

/// Everything the compositor needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Index of this frame since the session started.
    pub index: u64,
    /// Where layout origin sits on the surface.
    pub offset: Vec2,
    /// Particle markers, in particle order.
    pub markers: &'a [DrawCommand],
    /// Reveal buffers, bottom first.
    pub layers: &'a [RevealBuffer],
    /// Morph phase, `None` in reconstruction mode.
    pub phase: Option<Phase>,
}

impl<'a> Frame<'a> {
    /// Marker list as raw bytes for GPU upload.
    pub fn marker_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.markers)
    }

    /// Layers that have anything to show.
    pub fn visible_layers(&self) -> impl Iterator<Item = &'a RevealBuffer> {
        self.layers.iter().filter(|layer| layer.has_content())
    }
}
