//! In-memory RGB drawing surface.
//!
//! Lines use Bresenham's algorithm and circles the midpoint algorithm, both
//! integer only. Everything outside the canvas is clipped pixel by pixel, so
//! callers may pass any coordinates.

use crate::error::ExportError;
use crate::projector::Point;
use crate::render::{Color, DrawingSurface};
use parking_lot::Mutex;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// RGB pixels, row major, three bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Framebuffer {
        Framebuffer {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let i = self.index(x, y)?;
        Some(Color::rgb(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
        ))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.r;
            self.pixels[i + 1] = color.g;
            self.pixels[i + 2] = color.b;
        }
    }

    pub fn fill(&mut self, color: Color) {
        for pixel in self.pixels.chunks_exact_mut(3) {
            pixel.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 3)
    }

    /// Writes the picture as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        writer.write_all(&self.pixels)
    }

    pub fn save_ppm(&self, path: &Path) -> Result<(), ExportError> {
        let file = std::fs::File::create(path).map_err(|e| ExportError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_ppm(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| ExportError::io(path, e))
    }
}

/// Most recently presented picture, shared with the control surface.
#[derive(Clone, Debug, Default)]
pub struct LatestFrame(Arc<Mutex<Option<Arc<Framebuffer>>>>);

impl LatestFrame {
    pub fn get(&self) -> Option<Arc<Framebuffer>> {
        self.0.lock().clone()
    }

    fn publish(&self, frame: Framebuffer) {
        *self.0.lock() = Some(Arc::new(frame));
    }
}

/// Draws into a back buffer and publishes a copy on `present`.
pub struct RasterSurface {
    back: Framebuffer,
    latest: LatestFrame,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> RasterSurface {
        RasterSurface {
            back: Framebuffer::new(width, height),
            latest: LatestFrame::default(),
        }
    }

    pub fn latest(&self) -> LatestFrame {
        self.latest.clone()
    }

    fn plot_octants(&mut self, (cx, cy): Point, x: i32, y: i32, color: Color) {
        for (dx, dy) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            self.back.set_pixel(cx + dx, cy + dy, color);
        }
    }

    fn horizontal_span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        for x in x0..=x1 {
            self.back.set_pixel(x, y, color);
        }
    }
}

impl DrawingSurface for RasterSurface {
    fn clear(&mut self, color: Color) {
        self.back.fill(color);
    }

    fn draw_circle(&mut self, center: Point, radius: u32, color: Color) {
        let mut x = radius as i32;
        let mut y = 0;
        let mut err = 1 - x;
        while x >= y {
            self.plot_octants(center, x, y, color);
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    fn fill_circle(&mut self, (cx, cy): Point, radius: u32, color: Color) {
        let r = radius as i32;
        for dy in -r..=r {
            let half = ((r * r - dy * dy) as f64).sqrt() as i32;
            self.horizontal_span(cy + dy, cx - half, cx + half, color);
        }
    }

    fn draw_line(&mut self, (x0, y0): Point, (x1, y1): Point, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.back.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn present(&mut self) {
        self.latest.publish(self.back.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLACK: Color = Color::rgb(0, 0, 0);

    fn painted(frame: &Framebuffer, color: Color) -> usize {
        let mut n = 0;
        for y in 0..frame.height() as i32 {
            for x in 0..frame.width() as i32 {
                if frame.pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_nothing_published_before_present() {
        let mut surface = RasterSurface::new(4, 4);
        let latest = surface.latest();
        surface.clear(RED);
        assert!(latest.get().is_none());
        surface.present();
        assert_eq!(painted(&latest.get().unwrap(), RED), 16);
    }

    #[test]
    fn test_horizontal_and_diagonal_lines() {
        let mut surface = RasterSurface::new(10, 10);
        surface.draw_line((0, 0), (9, 0), RED);
        surface.draw_line((0, 9), (9, 0), RED);
        surface.present();
        let frame = surface.latest().get().unwrap();
        assert_eq!(painted(&frame, RED), 19);
        assert_eq!(frame.pixel(5, 4), Some(RED));
        assert_eq!(frame.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn test_out_of_canvas_is_clipped() {
        let mut surface = RasterSurface::new(5, 5);
        surface.draw_line((-10, 2), (20, 2), RED);
        surface.fill_circle((100, 100), 3, RED);
        surface.present();
        assert_eq!(painted(&surface.latest().get().unwrap(), RED), 5);
    }

    #[test]
    fn test_circle_outline_and_fill() {
        let mut surface = RasterSurface::new(11, 11);
        surface.draw_circle((5, 5), 3, RED);
        surface.present();
        let frame = surface.latest().get().unwrap();
        for (x, y) in [(8, 5), (2, 5), (5, 8), (5, 2)] {
            assert_eq!(frame.pixel(x, y), Some(RED));
        }
        assert_eq!(frame.pixel(5, 5), Some(BLACK));

        surface.clear(BLACK);
        surface.fill_circle((5, 5), 2, RED);
        surface.present();
        let frame = surface.latest().get().unwrap();
        assert_eq!(frame.pixel(5, 5), Some(RED));
        assert_eq!(frame.pixel(7, 5), Some(RED));
        assert_eq!(frame.pixel(7, 7), Some(BLACK));
        assert_eq!(painted(&frame, RED), 13);
    }

    #[test]
    fn test_ppm_encoding() {
        let mut frame = Framebuffer::new(2, 1);
        frame.set_pixel(1, 0, RED);
        let mut bytes = Vec::new();
        frame.write_ppm(&mut bytes).unwrap();
        assert_eq!(bytes, b"P6\n2 1\n255\n\x00\x00\x00\xff\x00\x00".to_vec());
    }
}
