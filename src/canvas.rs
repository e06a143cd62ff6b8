// Canvas Module - RGB raster the world draws into
use crate::types::{Position, Rgb};

/// Drawing operations the simulation needs from its output surface
pub trait Surface {
    /// Paint translucent black over everything (motion trail effect)
    fn fade(&mut self, alpha: f64);

    /// Filled circle, coordinates and radius in world units
    fn fill_circle(&mut self, center: Position, radius: f64, color: Rgb);
}

/// Row-major RGB raster. One pixel covers `scale` x `scale` world units.
pub struct Canvas {
    width: usize,
    height: usize,
    scale: f64,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, scale: f64) -> Self {
        Canvas {
            width,
            height,
            scale,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    /// Canvas size in world units
    pub fn world_size(&self) -> (f64, f64) {
        (self.width as f64 * self.scale, self.height as f64 * self.scale)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Flat RGB bytes, three per pixel, row-major
    pub fn frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            frame.extend_from_slice(&[px.r, px.g, px.b]);
        }
        frame
    }
}

impl Surface for Canvas {
    fn fade(&mut self, alpha: f64) {
        let keep = (1.0 - alpha).clamp(0.0, 1.0);
        for px in &mut self.pixels {
            *px = px.scaled(keep);
        }
    }

    fn fill_circle(&mut self, center: Position, radius: f64, color: Rgb) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Bounding box in pixel space, clipped to the canvas
        let min_x = ((center.x - radius) / self.scale).floor().max(0.0);
        let min_y = ((center.y - radius) / self.scale).floor().max(0.0);
        let max_x = ((center.x + radius) / self.scale).floor().min(self.width as f64 - 1.0);
        let max_y = ((center.y + radius) / self.scale).floor().min(self.height as f64 - 1.0);

        let mut painted = false;
        if min_x <= max_x && min_y <= max_y {
            for py in min_y as usize..=max_y as usize {
                for px in min_x as usize..=max_x as usize {
                    let pixel_center = Position::new(
                        (px as f64 + 0.5) * self.scale,
                        (py as f64 + 0.5) * self.scale,
                    );
                    if pixel_center.distance(center) <= radius {
                        self.pixels[py * self.width + px] = color;
                        painted = true;
                    }
                }
            }
        }

        // Circles smaller than a pixel still show up as the pixel under their centre
        if !painted && center.x >= 0.0 && center.y >= 0.0 {
            let px = (center.x / self.scale) as usize;
            let py = (center.y / self.scale) as usize;
            if px < self.width && py < self.height {
                self.pixels[py * self.width + px] = color;
            }
        }
    }
}
