//! Canvas for rendering plots to PNG.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Converts an RGB888 value (0xRRGGBB) to an opaque color.
fn color(rgb: u32) -> Color {
    Color::from_rgba8(
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
        255,
    )
}

fn paint(rgb: u32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(rgb));
    paint.anti_alias = true;
    paint
}

/// Canvas for rendering.
pub struct Canvas {
    pixmap: Pixmap,
    background_color: u32,
}

impl Canvas {
    /// Creates a new canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("Invalid canvas size {}x{}", width, height))?;

        Ok(Self {
            pixmap,
            background_color: 0xFFFFFF, // White
        })
    }

    /// Returns the canvas dimensions.
    #[cfg(test)]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Sets the background color.
    pub fn set_background(&mut self, rgb: u32) {
        self.background_color = rgb;
    }

    /// Clears the canvas.
    pub fn clear(&mut self) {
        self.pixmap.fill(color(self.background_color));
    }

    /// Draws a filled rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: u32) {
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            self.pixmap
                .fill_rect(rect, &paint(rgb), Transform::identity(), None);
        }
    }

    /// Draws a rectangle outline.
    pub fn draw_rect_outline(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: u32) {
        // Top
        self.fill_rect(x, y, width, 1.0, rgb);
        // Bottom
        self.fill_rect(x, y + height - 1.0, width, 1.0, rgb);
        // Left
        self.fill_rect(x, y, 1.0, height, rgb);
        // Right
        self.fill_rect(x + width - 1.0, y, 1.0, height, rgb);
    }

    /// Draws a connected line through `points`.
    pub fn draw_polyline(&mut self, points: &[(f32, f32)], line_width: f32, rgb: u32) {
        let mut builder = PathBuilder::new();
        let mut iter = points.iter();
        match iter.next() {
            Some(&(x, y)) => builder.move_to(x, y),
            None => return,
        }
        for &(x, y) in iter {
            builder.line_to(x, y);
        }

        if let Some(path) = builder.finish() {
            let stroke = Stroke {
                width: line_width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(rgb), &stroke, Transform::identity(), None);
        }
    }

    /// Returns the RGB value of a pixel.
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            (u32::from(c.red()) << 16) | (u32::from(c.green()) << 8) | u32::from(c.blue())
        })
    }

    /// Writes the canvas to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pixmap
            .save_png(path.as_ref())
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_creation() {
        let canvas = Canvas::new(320, 170).unwrap();
        assert_eq!(canvas.dimensions(), (320, 170));
        assert!(Canvas::new(0, 10).is_err());
    }

    #[test]
    fn test_fill_and_outline() {
        let mut canvas = Canvas::new(20, 20).unwrap();
        canvas.set_background(0x000000);
        canvas.clear();
        assert_eq!(canvas.pixel(5, 5), Some(0x000000));

        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, 0xFF0000);
        assert_eq!(canvas.pixel(5, 5), Some(0xFF0000));
        assert_eq!(canvas.pixel(15, 15), Some(0x000000));

        canvas.draw_rect_outline(0.0, 0.0, 20.0, 20.0, 0x00FF00);
        assert_eq!(canvas.pixel(19, 10), Some(0x00FF00));
        assert_eq!(canvas.pixel(20, 0), None);
    }

    #[test]
    fn test_polyline_marks_pixels() {
        let mut canvas = Canvas::new(20, 20).unwrap();
        canvas.clear();
        canvas.draw_polyline(&[(0.0, 10.0), (20.0, 10.0)], 3.0, 0x0000FF);
        let on_line = canvas.pixel(10, 10).unwrap();
        assert!(on_line & 0xFF > 0xC0);
        assert!(on_line >> 16 < 0x40);
        assert_eq!(canvas.pixel(10, 2), Some(0xFFFFFF));
    }
}
