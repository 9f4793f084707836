// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::io::{self, Write};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Something the visualizer can draw onto.
pub trait Surface {
    /// Resizes the surface. Contents are undefined afterwards.
    fn resize(&mut self, width: u32, height: u32);

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Fills every pixel whose index lies within the rectangle, clipped to
    /// the surface. Fractional edges are widened to whole pixels.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb);

    /// Fills the whole surface.
    fn clear(&mut self, color: Rgb) {
        let (width, height) = (f64::from(self.width()), f64::from(self.height()));
        self.fill_rect(0.0, 0.0, width, height, color);
    }
}

/// An in-memory RGB surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> PixelCanvas {
        PixelCanvas {
            width,
            height,
            pixels: vec![Rgb::default(); width as usize * height as usize],
        }
    }

    /// Gets the pixel at the given coordinates, if it's on the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Writes the canvas as a binary PPM image.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for Rgb(r, g, b) in &self.pixels {
            bytes.extend_from_slice(&[*r, *g, *b]);
        }
        writer.write_all(&bytes)?;
        writer.flush()
    }
}

/// Converts a span along one axis into a clipped range of pixel indices.
fn pixel_range(start: f64, length: f64, limit: u32) -> Option<(usize, usize)> {
    if !start.is_finite() || !length.is_finite() || length <= 0.0 {
        return None;
    }
    let first = start.floor().max(0.0);
    let last = (start + length).ceil().min(f64::from(limit));
    if first >= last {
        return None;
    }
    Some((first as usize, last as usize))
}

impl Surface for PixelCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgb::default(); width as usize * height as usize];
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        let (Some((x0, x1)), Some((y0, y1))) = (
            pixel_range(x, width, self.width),
            pixel_range(y, height, self.height),
        ) else {
            return;
        };

        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const RED: Rgb = Rgb(255, 0, 0);

    #[test]
    fn test_fill_rect() {
        let mut canvas = PixelCanvas::new(4, 3);
        canvas.fill_rect(1.0, 1.0, 2.0, 1.0, RED);

        assert_eq!(Some(Rgb::default()), canvas.pixel(0, 1));
        assert_eq!(Some(RED), canvas.pixel(1, 1));
        assert_eq!(Some(RED), canvas.pixel(2, 1));
        assert_eq!(Some(Rgb::default()), canvas.pixel(3, 1));
        assert_eq!(Some(Rgb::default()), canvas.pixel(1, 0));
        assert_eq!(None, canvas.pixel(4, 0));
    }

    #[test]
    fn test_fill_rect_fractional_and_clipped() {
        let mut canvas = PixelCanvas::new(4, 2);
        canvas.fill_rect(2.5, -5.0, 0.2, 100.0, RED);
        assert_eq!(Some(RED), canvas.pixel(2, 0));
        assert_eq!(Some(RED), canvas.pixel(2, 1));
        assert_eq!(Some(Rgb::default()), canvas.pixel(3, 0));

        canvas.fill_rect(-10.0, 0.0, 5.0, 1.0, RED);
        canvas.fill_rect(f64::NAN, 0.0, 1.0, 1.0, RED);
        canvas.fill_rect(3.0, 0.0, -1.0, 1.0, RED);
        assert_eq!(Some(Rgb::default()), canvas.pixel(0, 0));
        assert_eq!(Some(Rgb::default()), canvas.pixel(3, 0));
    }

    #[test]
    fn test_clear_and_resize() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.clear(RED);
        assert_eq!(Some(RED), canvas.pixel(1, 1));

        canvas.resize(3, 1);
        assert_eq!(3, canvas.width());
        assert_eq!(1, canvas.height());
        assert_eq!(Some(Rgb::default()), canvas.pixel(2, 0));
    }

    #[test]
    fn test_write_ppm() {
        let mut canvas = PixelCanvas::new(2, 1);
        canvas.fill_rect(1.0, 0.0, 1.0, 1.0, Rgb(1, 2, 3));

        let mut bytes = Vec::new();
        canvas.write_ppm(&mut bytes).unwrap();
        assert_eq!(b"P6\n2 1\n255\n\x00\x00\x00\x01\x02\x03".to_vec(), bytes);
    }
}
