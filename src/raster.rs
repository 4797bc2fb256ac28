//! Software compositor for the demo binary.
//!
//! Clears to the background gray, draws markers as alpha-blended discs, then
//! blends each reveal layer on top, everything shifted by the frame offset.

use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, Blend};
use pixelflock::{DrawCommand, Frame, RevealBuffer, SurfaceSize};

/// Background gray level.
pub const BACKGROUND: u8 = 200;

const CLEAR: Rgba<u8> = Rgba([BACKGROUND, BACKGROUND, BACKGROUND, 255]);

pub struct Canvas {
    target: Blend<RgbaImage>,
}

impl Canvas {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            target: Blend(RgbaImage::from_pixel(surface.width, surface.height, CLEAR)),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.target.0
    }

    /// Render a full frame, replacing the previous contents.
    pub fn draw(&mut self, frame: &Frame<'_>) {
        self.target.0.pixels_mut().for_each(|px| *px = CLEAR);
        let (ox, oy) = (frame.offset.x, frame.offset.y);
        for marker in frame.markers {
            self.disc(marker, ox, oy);
        }
        for layer in frame.visible_layers() {
            self.blit(layer, ox as i64, oy as i64);
        }
    }

    fn disc(&mut self, marker: &DrawCommand, ox: f32, oy: f32) {
        let radius = marker.radius.round() as i32;
        if radius < 0 {
            return;
        }
        let center = (
            (marker.position[0] + ox).floor() as i32,
            (marker.position[1] + oy).floor() as i32,
        );
        draw_filled_circle_mut(&mut self.target, center, radius, Rgba(marker.color));
    }

    fn blit(&mut self, layer: &RevealBuffer, ox: i64, oy: i64) {
        let image = &mut self.target.0;
        let (width, height) = (image.width() as i64, image.height() as i64);
        for (i, px) in layer.data().chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let x = (i as i64 % layer.width() as i64) + ox;
            let y = (i as i64 / layer.width() as i64) + oy;
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let src = Rgba([px[0], px[1], px[2], px[3]]);
            image.get_pixel_mut(x as u32, y as u32).blend(&src);
        }
    }
}
