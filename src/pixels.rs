//! Source images and meaningful-pixel extraction.
//!
//! A source image is a row-major RGBA8 buffer. Extraction keeps the pixels
//! that are not background, according to a [`PixelFilter`]:
//!
//! | Rule | Keeps a pixel when |
//! |------|--------------------|
//! | [`BrightnessRule::MeanBelow`] | `mean(r, g, b) < threshold` |
//! | [`BrightnessRule::NotAllAbove`] | not every channel is `> threshold` |
//!
//! The filter is a plain brightness policy for images on a white background,
//! not a perceptual metric. Callers with other backgrounds supply their own
//! thresholds.
//!
//! # Example
//!
//! ```ignore
//! let image = SourceImage::open("assets/logo.png")?;
//! let pixels = extract_pixels(&image, &PixelFilter::default());
//! ```

use crate::error::{Error, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Wrap raw RGBA data (4 bytes per pixel, row-major).
    ///
    /// # Example
    ///
    /// ```ignore
    /// // 2x1 image: black, white
    /// let image = SourceImage::from_rgba(vec![0, 0, 0, 255, 255, 255, 255, 255], 2, 1)?;
    /// ```
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Open and decode an image file (PNG or JPEG).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_dynamic(img))
    }

    /// Convert an already decoded image.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        let img = img.into_rgba8();
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
        }
    }

    /// Image filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Overwrite one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = (y as usize * self.width as usize + x as usize) * 4;
            self.data[i..i + 4].copy_from_slice(&rgba);
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

    /// Raw RGBA bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size as a vector, for layout math.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Which brightness test marks a pixel as background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrightnessRule {
    /// Meaningful when the mean of R, G, B is strictly below the value.
    MeanBelow(u8),
    /// Meaningful unless all of R, G, B are strictly above the value.
    NotAllAbove(u8),
}

/// Policy deciding which pixels carry image content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFilter {
    /// Brightness test for near-white background.
    pub rule: BrightnessRule,
    /// Also drop fully transparent pixels.
    #[serde(default)]
    pub require_alpha: bool,
}

impl PixelFilter {
    /// Filter used by reconstruction sessions: `mean(r, g, b) < 250`.
    pub const fn reconstruction() -> Self {
        Self {
            rule: BrightnessRule::MeanBelow(250),
            require_alpha: false,
        }
    }

    /// Filter used by morph sessions: not near-white and not transparent.
    pub const fn morph() -> Self {
        Self {
            rule: BrightnessRule::NotAllAbove(240),
            require_alpha: true,
        }
    }

    /// Test a single RGBA value.
    pub fn is_meaningful(&self, [r, g, b, a]: [u8; 4]) -> bool {
        if self.require_alpha && a == 0 {
            return false;
        }
        match self.rule {
            BrightnessRule::MeanBelow(threshold) => {
                // mean < t  <=>  sum < 3t, without the division
                (r as u16 + g as u16 + b as u16) < threshold as u16 * 3
            }
            BrightnessRule::NotAllAbove(threshold) => {
                !(r > threshold && g > threshold && b > threshold)
            }
        }
    }
}

impl Default for PixelFilter {
    fn default() -> Self {
        Self::reconstruction()
    }
}

/// One meaningful image pixel.
///
/// `x`/`y` are layout coordinates (image-local, or stage coordinates in morph
/// mode). `index` always refers to the flat pixel offset in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub index: u32,
}

impl Pixel {
    /// Position as a float vector.
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    #[inline]
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Same pixel shifted by an integer offset.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Collect every meaningful pixel of `image`, in row-major order.
///
/// An image with no meaningful pixels yields an empty vector; sessions treat
/// that as "nothing to reconstruct" rather than an error.
pub fn extract_pixels(image: &SourceImage, filter: &PixelFilter) -> Vec<Pixel> {
    let width = image.width.max(1);
    image
        .data
        .chunks_exact(4)
        .enumerate()
        .filter_map(|(i, px)| {
            let rgba = [px[0], px[1], px[2], px[3]];
            if !filter.is_meaningful(rgba) {
                return None;
            }
            let index = i as u32;
            Some(Pixel {
                x: (index % width) as i32,
                y: (index / width) as i32,
                r: rgba[0],
                g: rgba[1],
                b: rgba[2],
                index,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn test_from_rgba_rejects_wrong_size() {
        let err = SourceImage::from_rgba(vec![0; 12], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSize {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_mean_below_threshold() {
        let filter = PixelFilter::reconstruction();
        assert!(filter.is_meaningful([0, 0, 0, 255]));
        // mean 249.67 < 250
        assert!(filter.is_meaningful([249, 250, 250, 255]));
        // mean exactly 250 is background
        assert!(!filter.is_meaningful([250, 250, 250, 255]));
        assert!(!filter.is_meaningful(WHITE));
        // alpha ignored by default
        assert!(filter.is_meaningful([10, 10, 10, 0]));
    }

    #[test]
    fn test_not_all_above_with_alpha() {
        let filter = PixelFilter::morph();
        assert!(!filter.is_meaningful([241, 241, 241, 255]));
        assert!(filter.is_meaningful([241, 240, 241, 255]));
        assert!(!filter.is_meaningful([0, 0, 0, 0]));
        assert!(filter.is_meaningful([0, 0, 0, 1]));
    }

    #[test]
    fn test_extract_coordinates_and_index() {
        let mut image = SourceImage::filled(3, 2, WHITE);
        image.set_pixel(2, 0, [10, 20, 30, 255]);
        image.set_pixel(1, 1, [40, 50, 60, 255]);

        let pixels = extract_pixels(&image, &PixelFilter::default());
        assert_eq!(pixels.len(), 2);
        assert_eq!(
            pixels[0],
            Pixel {
                x: 2,
                y: 0,
                r: 10,
                g: 20,
                b: 30,
                index: 2
            }
        );
        assert_eq!((pixels[1].x, pixels[1].y, pixels[1].index), (1, 1, 4));
    }

    #[test]
    fn test_extract_blank_image_is_empty() {
        let image = SourceImage::filled(8, 8, WHITE);
        assert!(extract_pixels(&image, &PixelFilter::default()).is_empty());
    }

    #[test]
    fn test_translated_keeps_index() {
        let px = Pixel {
            x: 1,
            y: 2,
            r: 0,
            g: 0,
            b: 0,
            index: 7,
        };
        let moved = px.translated(10, -1);
        assert_eq!((moved.x, moved.y, moved.index), (11, 1, 7));
    }
}
