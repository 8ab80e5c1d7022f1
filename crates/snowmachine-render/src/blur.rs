//! Stack blur over rectangular regions of a [`PixelSurface`].
//!
//! Stack blur weights each pixel in a window of `2r + 1` by its distance
//! from the centre (a triangle kernel), which approximates a Gaussian. The
//! horizontal pass runs first, then the vertical pass over its output.
//! Samples past the edge of the region repeat the nearest in-region pixel.

use snowmachine_core::{BlurRegion, ConfigError, validate_blur_radius};

use crate::surface::PixelSurface;

/// Multipliers that replace the division by `(r + 1)^2`, indexed by radius.
#[rustfmt::skip]
const STACK_BLUR_MUL: [u32; 255] = [
    512,512,456,512,328,456,335,512,405,328,271,456,388,335,292,512,
    454,405,364,328,298,271,496,456,420,388,360,335,312,292,273,512,
    482,454,428,405,383,364,345,328,312,298,284,271,259,496,475,456,
    437,420,404,388,374,360,347,335,323,312,302,292,282,273,265,512,
    497,482,468,454,441,428,417,405,394,383,373,364,354,345,337,328,
    320,312,305,298,291,284,278,271,265,259,507,496,485,475,465,456,
    446,437,428,420,412,404,396,388,381,374,367,360,354,347,341,335,
    329,323,318,312,307,302,297,292,287,282,278,273,269,265,261,512,
    505,497,489,482,475,468,461,454,447,441,435,428,422,417,411,405,
    399,394,389,383,378,373,368,364,359,354,350,345,341,337,332,328,
    324,320,316,312,309,305,301,298,294,291,287,284,281,278,274,271,
    268,265,262,259,257,507,501,496,491,485,480,475,470,465,460,456,
    451,446,442,437,433,428,424,420,416,412,408,404,400,396,392,388,
    385,381,377,374,370,367,363,360,357,354,350,347,344,341,338,335,
    332,329,326,323,320,318,315,312,310,307,304,302,299,297,294,292,
    289,287,285,282,280,278,275,273,271,269,267,265,263,261,259,
];

/// Shifts paired with [`STACK_BLUR_MUL`], indexed by radius.
#[rustfmt::skip]
const STACK_BLUR_SHR: [u32; 255] = [
     9, 11, 12, 13, 13, 14, 14, 15, 15, 15, 15, 16, 16, 16, 16, 17,
    17, 17, 17, 17, 17, 17, 18, 18, 18, 18, 18, 18, 18, 18, 18, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 20, 20, 20,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 21,
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21,
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
    24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24,
];

/// Stack blur with a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurFilter {
    radius: u32,
}

impl BlurFilter {
    /// Create a filter; the radius must be in `1..=254`.
    pub fn new(radius: u32) -> Result<Self, ConfigError> {
        validate_blur_radius(radius)?;
        Ok(Self { radius })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Blur `region` of `surface` in place.
    ///
    /// The region is clipped to the surface. Pixels outside it are neither
    /// read nor written.
    pub fn apply(&self, surface: &mut PixelSurface, region: &BlurRegion) {
        let Some((x0, y0, x1, y1)) = region.clip(surface.width(), surface.height()) else {
            return;
        };

        let radius = self.radius as usize;
        let row_stride = surface.width() as usize * 4;
        let (w, h) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let mut stack = vec![[0u8; 4]; radius * 2 + 1];
        let pixels = surface.bytes_mut();

        for y in y0..y1 {
            let start = y as usize * row_stride + x0 as usize * 4;
            blur_line(pixels, start, 4, w, radius, &mut stack);
        }
        for x in x0..x1 {
            let start = y0 as usize * row_stride + x as usize * 4;
            blur_line(pixels, start, row_stride, h, radius, &mut stack);
        }
    }
}

#[inline]
fn load(pixels: &[u8], offset: usize) -> [u8; 4] {
    [
        pixels[offset],
        pixels[offset + 1],
        pixels[offset + 2],
        pixels[offset + 3],
    ]
}

/// Blur `len` pixels in place, the first at byte `start` and each following
/// one `step` bytes further on.
///
/// Every pixel is read before it is overwritten: the window's leading edge
/// always runs ahead of the write position.
fn blur_line(
    pixels: &mut [u8],
    start: usize,
    step: usize,
    len: usize,
    radius: usize,
    stack: &mut [[u8; 4]],
) {
    if len == 0 {
        return;
    }
    let div = radius * 2 + 1;
    let mul = STACK_BLUR_MUL[radius] as u64;
    let shr = STACK_BLUR_SHR[radius];
    let last = len - 1;
    let offset = |i: usize| start + i * step;

    let mut sum = [0u64; 4];
    let mut sum_in = [0u64; 4];
    let mut sum_out = [0u64; 4];

    // Left half of the window (and its centre) repeats the first pixel.
    let first = load(pixels, offset(0));
    for (i, slot) in stack.iter_mut().enumerate().take(radius + 1) {
        *slot = first;
        for c in 0..4 {
            sum[c] += first[c] as u64 * (i as u64 + 1);
            sum_out[c] += first[c] as u64;
        }
    }
    for i in 1..=radius {
        let px = load(pixels, offset(i.min(last)));
        stack[i + radius] = px;
        for c in 0..4 {
            sum[c] += px[c] as u64 * (radius + 1 - i) as u64;
            sum_in[c] += px[c] as u64;
        }
    }

    let mut stack_ptr = radius;
    let mut src = radius.min(last);

    for i in 0..len {
        let dst = offset(i);
        for c in 0..4 {
            pixels[dst + c] = ((sum[c] * mul) >> shr).min(255) as u8;
            sum[c] -= sum_out[c];
        }

        let mut stack_start = stack_ptr + div - radius;
        if stack_start >= div {
            stack_start -= div;
        }
        let leaving = stack[stack_start];

        if src < last {
            src += 1;
        }
        let entering = load(pixels, offset(src));
        stack[stack_start] = entering;

        for c in 0..4 {
            sum_out[c] -= leaving[c] as u64;
            sum_in[c] += entering[c] as u64;
            sum[c] += sum_in[c];
        }

        stack_ptr += 1;
        if stack_ptr >= div {
            stack_ptr = 0;
        }
        let centre = stack[stack_ptr];
        for c in 0..4 {
            sum_out[c] += centre[c] as u64;
            sum_in[c] -= centre[c] as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use snowmachine_core::Rgba;

    use super::*;

    /// Surface with a busy, reproducible pattern.
    fn patterned(width: u32, height: u32) -> PixelSurface {
        let mut surface = PixelSurface::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = (x * 37 + y * 91) % 256;
                surface.set_pixel(
                    x,
                    y,
                    Rgba::new(v as u8, (255 - v) as u8, ((x * y) % 256) as u8, 200 + (x % 56) as u8),
                );
            }
        }
        surface
    }

    #[test]
    fn test_rejects_bad_radius() {
        assert_eq!(BlurFilter::new(0), Err(ConfigError::BlurRadius(0)));
        assert!(BlurFilter::new(300).is_err());
        assert_eq!(BlurFilter::new(8).map(|f| f.radius()), Ok(8));
    }

    #[test]
    fn test_uniform_surface_unchanged() {
        let mut surface = PixelSurface::new(20, 12).unwrap();
        surface.clear(Rgba::new(11, 29, 58, 255));
        let before = surface.clone();

        for radius in [1, 2, 8, 30] {
            BlurFilter::new(radius)
                .unwrap()
                .apply(&mut surface, &BlurRegion::full(20, 12));
        }
        assert_eq!(surface, before);
    }

    #[test]
    fn test_pixels_outside_region_untouched() {
        let mut surface = patterned(16, 14);
        let before = surface.clone();
        let region = BlurRegion::new(3, 4, 7, 5);

        BlurFilter::new(4).unwrap().apply(&mut surface, &region);

        let mut changed_inside = false;
        for y in 0..14 {
            for x in 0..16 {
                let inside = (3..10).contains(&x) && (4..9).contains(&y);
                if inside {
                    changed_inside |= surface.pixel(x, y) != before.pixel(x, y);
                } else {
                    assert_eq!(surface.pixel(x, y), before.pixel(x, y), "pixel ({x}, {y})");
                }
            }
        }
        assert!(changed_inside);
    }

    #[test]
    fn test_deterministic() {
        let region = BlurRegion::new(2, 1, 11, 9);
        let filter = BlurFilter::new(3).unwrap();

        let mut a = patterned(15, 12);
        let mut b = patterned(15, 12);
        filter.apply(&mut a, &region);
        filter.apply(&mut b, &region);
        assert_eq!(a.bytes(), b.bytes());
    }

    #[test]
    fn test_spreads_bright_pixel() {
        let black = Rgba::opaque(0, 0, 0);
        let mut surface = PixelSurface::new(9, 9).unwrap();
        surface.clear(black);
        surface.set_pixel(4, 4, Rgba::WHITE);

        BlurFilter::new(2)
            .unwrap()
            .apply(&mut surface, &BlurRegion::full(9, 9));

        let centre = surface.pixel(4, 4).unwrap();
        let neighbour = surface.pixel(5, 4).unwrap();
        let far = surface.pixel(0, 0).unwrap();
        assert!(centre.r < 255 && centre.r > neighbour.r);
        assert!(neighbour.r > 0);
        assert_eq!(far, black);
        // Alpha was uniform, so it stays that way.
        assert_eq!(centre.a, 255);
    }

    #[test]
    fn test_edges_clamp_inside_region() {
        // A uniform patch surrounded by a contrasting colour keeps its colour:
        // samples past the region repeat the region's own edge pixels.
        let mut surface = PixelSurface::new(12, 12).unwrap();
        surface.clear(Rgba::WHITE);
        let navy = Rgba::opaque(0, 0, 90);
        for y in 3..8 {
            for x in 2..9 {
                surface.set_pixel(x, y, navy);
            }
        }

        BlurFilter::new(5)
            .unwrap()
            .apply(&mut surface, &BlurRegion::new(2, 3, 7, 5));

        for y in 3..8 {
            for x in 2..9 {
                assert_eq!(surface.pixel(x, y), Some(navy));
            }
        }
    }

    #[test]
    fn test_region_clipped_to_surface() {
        let mut surface = patterned(10, 10);
        let before = surface.clone();
        BlurFilter::new(3)
            .unwrap()
            .apply(&mut surface, &BlurRegion::new(6, 6, 100, 100));

        assert_eq!(surface.pixel(5, 5), before.pixel(5, 5));
        assert_ne!(surface.bytes(), before.bytes());
    }

    #[test]
    fn test_empty_region_is_noop() {
        let mut surface = patterned(6, 6);
        let before = surface.clone();
        let filter = BlurFilter::new(2).unwrap();
        filter.apply(&mut surface, &BlurRegion::new(1, 1, 0, 4));
        filter.apply(&mut surface, &BlurRegion::new(6, 0, 3, 3));
        assert_eq!(surface, before);
    }

    #[test]
    fn test_single_pixel_region() {
        let mut surface = patterned(5, 5);
        let before = surface.clone();
        BlurFilter::new(8)
            .unwrap()
            .apply(&mut surface, &BlurRegion::new(2, 2, 1, 1));
        assert_eq!(surface, before);
    }
}
