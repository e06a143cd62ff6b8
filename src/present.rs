// Terminal presenter - draws the canvas raster with half-block characters
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::canvas::Canvas;
use crate::types::Rgb;

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: &str = "\u{2580}";

pub struct CanvasView<'a> {
    canvas: &'a Canvas,
}

impl<'a> CanvasView<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        CanvasView { canvas }
    }

    /// Colors shown by the terminal cell at (column, row) relative to the canvas origin
    pub fn cell_colors(&self, column: usize, row: usize) -> (Rgb, Rgb) {
        let top = self.canvas.pixel(column, row * 2).unwrap_or(Rgb::BLACK);
        let bottom = self.canvas.pixel(column, row * 2 + 1).unwrap_or(Rgb::BLACK);
        (top, bottom)
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for column in 0..area.width {
                let (top, bottom) = self.cell_colors(column as usize, row as usize);
                buf.get_mut(area.x + column, area.y + row)
                    .set_symbol(HALF_BLOCK)
                    .set_fg(to_color(top))
                    .set_bg(to_color(bottom));
            }
        }
    }
}
