//! Software canvas over an ARGB pixel buffer.

use super::{Canvas, Rgba};
use crate::math::ScreenPoint;

/// Owning ARGB (`0xAARRGGBB`) pixel buffer implementing [`Canvas`].
///
/// Circles are filled by testing pixel centers against the radius and
/// source-over blending the fill color. Out-of-bounds pixels are ignored.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl PixelCanvas {
    /// Creates a canvas cleared to `background`.
    #[must_use]
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            pixels: vec![background.to_argb(); width as usize * height as usize],
            width,
            height,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel rows, top to bottom.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(Rgba::from_argb(
                self.pixels[y as usize * self.width as usize + x as usize],
            ))
        } else {
            None
        }
    }

    /// Resets every pixel to `background`.
    pub fn clear(&mut self, background: Rgba) {
        self.pixels.fill(background.to_argb());
    }

    fn blend_pixel(&mut self, x: u32, y: u32, src: Rgba) {
        let idx = y as usize * self.width as usize + x as usize;
        let dst = Rgba::from_argb(self.pixels[idx]);
        self.pixels[idx] = blend_over(src, dst).to_argb();
    }
}

/// Source-over compositing of straight-alpha colors.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_over(src: Rgba, dst: Rgba) -> Rgba {
    let sa = f32::from(src.a) / 255.0;
    let da = f32::from(dst.a) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    let channel = |s: u8, d: u8| {
        let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba {
        r: channel(src.r, dst.r),
        g: channel(src.g, dst.g),
        b: channel(src.b, dst.b),
        a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    }
}

impl Canvas for PixelCanvas {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn fill_circle(&mut self, center: ScreenPoint, radius: f32, color: Rgba) {
        if color.a == 0 || radius <= 0.0 || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }

        let x0 = (center.x - radius).floor().max(0.0);
        let y0 = (center.y - radius).floor().max(0.0);
        let x1 = (center.x + radius).ceil().min(self.width as f32 - 1.0);
        let y1 = (center.y + radius).ceil().min(self.height as f32 - 1.0);
        if x1 < x0 || y1 < y0 {
            return;
        }

        let r_sq = radius * radius;
        for y in y0 as u32..=y1 as u32 {
            let dy = y as f32 + 0.5 - center.y;
            for x in x0 as u32..=x1 as u32 {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r_sq {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }
}
