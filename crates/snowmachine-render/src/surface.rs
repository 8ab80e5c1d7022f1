//! RGBA pixel surface the backends paint into.

use snowmachine_core::{ConfigError, Rgba};

/// Row-major RGBA8 pixel buffer, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptySurface { width, height });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(ConfigError::SurfaceTooLarge { width, height })?;

        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
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
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Read a pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        let px = <[u8; 4]>::try_from(&self.pixels[i..i + 4]).ok()?;
        Some(Rgba::from_array(px))
    }

    /// Overwrite a pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.pixels[i..i + 4].copy_from_slice(&color.to_array());
    }

    /// Fill the whole surface with one colour.
    pub fn clear(&mut self, color: Rgba) {
        let px = color.to_array();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Source-over blend `color` onto a pixel. Out-of-bounds is ignored.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        let i = self.index(x, y);
        let dst = &mut self.pixels[i..i + 4];
        if color.a == 255 {
            dst.copy_from_slice(&color.to_array());
            return;
        }

        let sa = color.a as u32;
        let da = dst[3] as u32;
        let inv = 255 - sa;
        let out_a = sa + (da * inv + 127) / 255;
        let denom = out_a * 255;
        let mix = |s: u8, d: u8| {
            let num = s as u32 * sa * 255 + d as u32 * da * inv;
            ((num + denom / 2) / denom).min(255) as u8
        };

        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = out_a as u8;
    }

    /// Paint a filled circle centred on `(cx, cy)`.
    ///
    /// A pixel is covered when its centre lies inside the circle. Circles
    /// too small to cover any pixel centre still mark the pixel under their
    /// centre so tiny flakes stay visible.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) {
            return;
        }
        let radius = radius.max(0.0);

        if radius < 0.5 {
            if cx >= 0.0 && cy >= 0.0 {
                self.blend_pixel(cx as u32, cy as u32, color);
            }
            return;
        }

        let x0 = ((cx - radius).floor() as i64).max(0);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((cy + radius).ceil() as i64).min(self.height as i64 - 1);
        let r2 = radius * radius;

        for py in y0..=y1 {
            let dy = py as f32 + 0.5 - cy;
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            PixelSurface::new(0, 10),
            Err(ConfigError::EmptySurface {
                width: 0,
                height: 10
            })
        );
        assert!(PixelSurface::new(10, 0).is_err());
    }

    #[test]
    fn test_new_is_transparent() {
        let surface = PixelSurface::new(3, 2).unwrap();
        assert_eq!(surface.bytes().len(), 3 * 2 * 4);
        assert!(surface.bytes().iter().all(|&b| b == 0));
        assert_eq!(surface.pixel(2, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(3, 0), None);
    }

    #[test]
    fn test_clear_and_set() {
        let mut surface = PixelSurface::new(4, 4).unwrap();
        let navy = Rgba::opaque(0, 0, 80);
        surface.clear(navy);
        surface.set_pixel(1, 2, Rgba::WHITE);
        surface.set_pixel(9, 9, Rgba::WHITE);
        assert_eq!(surface.pixel(1, 2), Some(Rgba::WHITE));
        assert_eq!(surface.pixel(0, 0), Some(navy));
        assert_eq!(surface.pixel(3, 3), Some(navy));
    }

    #[test]
    fn test_blend_over_opaque() {
        let mut surface = PixelSurface::new(1, 1).unwrap();
        surface.clear(Rgba::opaque(0, 0, 0));
        surface.blend_pixel(0, 0, Rgba::new(255, 255, 255, 128));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::opaque(128, 128, 128)));
    }

    #[test]
    fn test_blend_over_transparent_keeps_colour() {
        let mut surface = PixelSurface::new(1, 1).unwrap();
        surface.blend_pixel(0, 0, Rgba::new(200, 100, 50, 64));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::new(200, 100, 50, 64)));
    }

    #[test]
    fn test_fill_circle_coverage() {
        let mut surface = PixelSurface::new(10, 10).unwrap();
        surface.fill_circle(5.0, 5.0, 2.0, Rgba::WHITE);
        assert_eq!(surface.pixel(5, 5), Some(Rgba::WHITE));
        assert_eq!(surface.pixel(4, 4), Some(Rgba::WHITE));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(5, 8), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_fill_circle_clipped_at_edges() {
        let mut surface = PixelSurface::new(4, 4).unwrap();
        surface.fill_circle(0.0, 0.0, 3.0, Rgba::WHITE);
        surface.fill_circle(-50.0, 2.0, 3.0, Rgba::WHITE);
        surface.fill_circle(2.0, 1e9, 3.0, Rgba::WHITE);
        assert_eq!(surface.pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(surface.pixel(3, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_tiny_circle_marks_centre_pixel() {
        let mut surface = PixelSurface::new(4, 4).unwrap();
        surface.fill_circle(2.9, 1.1, 0.0, Rgba::WHITE);
        assert_eq!(surface.pixel(2, 1), Some(Rgba::WHITE));

        surface.fill_circle(-0.5, 1.0, 0.2, Rgba::WHITE);
        assert_eq!(surface.pixel(0, 1), Some(Rgba::TRANSPARENT));
    }
}
