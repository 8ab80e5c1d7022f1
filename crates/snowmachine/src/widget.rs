//! Presents a [`PixelSurface`] in the terminal, two pixels per cell.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use snowmachine_core::Rgba;
use snowmachine_render::PixelSurface;

/// Upper half block: foreground paints the top pixel, background the bottom.
const UPPER_HALF: char = '▀';

/// Widget drawing a surface with half-block cells.
///
/// Cell `(col, row)` shows surface pixels `(col, 2 * row)` and
/// `(col, 2 * row + 1)`, flattened onto an opaque backdrop.
pub struct SurfaceWidget<'a> {
    surface: &'a PixelSurface,
    backdrop: Rgba,
}

impl<'a> SurfaceWidget<'a> {
    pub fn new(surface: &'a PixelSurface, backdrop: Rgba) -> Self {
        Self { surface, backdrop }
    }
}

impl Widget for SurfaceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let backdrop = Rgba { a: 255, ..self.backdrop };

        for row in 0..area.height {
            for col in 0..area.width {
                let (x, y) = (col as u32, row as u32 * 2);
                let Some(top) = self.surface.pixel(x, y) else {
                    continue;
                };
                let top = top.over(backdrop);
                let bottom = self
                    .surface
                    .pixel(x, y + 1)
                    .map_or(backdrop, |px| px.over(backdrop));

                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(UPPER_HALF)
                        .set_fg(top.into())
                        .set_bg(bottom.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;

    #[test]
    fn test_two_pixels_per_cell() {
        let mut surface = PixelSurface::new(2, 4).unwrap();
        surface.clear(Rgba::opaque(0, 0, 0));
        surface.set_pixel(0, 0, Rgba::WHITE);
        surface.set_pixel(1, 3, Rgba::opaque(10, 20, 30));

        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 2));
        SurfaceWidget::new(&surface, Rgba::opaque(0, 0, 0)).render(buf.area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 255, 255));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 0));

        let cell = &buf[(1, 1)];
        assert_eq!(cell.fg, Color::Rgb(0, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn test_transparent_pixels_show_backdrop() {
        let surface = PixelSurface::new(1, 2).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        SurfaceWidget::new(&surface, Rgba::opaque(5, 6, 7)).render(buf.area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(5, 6, 7));
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(5, 6, 7));
    }

    #[test]
    fn test_area_larger_than_surface() {
        let mut surface = PixelSurface::new(1, 3).unwrap();
        surface.clear(Rgba::WHITE);
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 3));
        SurfaceWidget::new(&surface, Rgba::opaque(0, 0, 0)).render(buf.area, &mut buf);

        // Odd surface height: the last row's bottom half is backdrop.
        assert_eq!(buf[(0, 1)].fg, Color::Rgb(255, 255, 255));
        assert_eq!(buf[(0, 1)].bg, Color::Rgb(0, 0, 0));
        // Columns and rows past the surface are left alone.
        assert_eq!(buf[(2, 0)].symbol(), " ");
        assert_eq!(buf[(0, 2)].symbol(), " ");
    }
}
