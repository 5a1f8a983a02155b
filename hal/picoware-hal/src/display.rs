//! Draw surface abstraction
//!
//! The surface is a framebuffer the application draws into. Drivers without
//! a back buffer draw straight to the panel and treat `swap` as a no-op.

use crate::color::Color;
use crate::geometry::Vector;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus communication with the panel failed
    Communication,
    /// Coordinates outside the framebuffer
    InvalidCoordinates,
    /// Panel not initialized
    NotInitialized,
}

/// Draw surface trait
///
/// Only `size`, `pixel`, `fill_rect`, `text` and `swap` are required. Shapes
/// fall back to pixel and rectangle plotting; drivers override them when the
/// panel has faster paths.
pub trait DrawSurface {
    /// Framebuffer size in pixels
    fn size(&self) -> Vector;

    /// Size of one character cell of the built-in font
    fn char_size(&self) -> Vector {
        Vector::new(6, 10)
    }

    /// Plot a single pixel; out-of-bounds pixels are clipped
    fn pixel(&mut self, at: Vector, color: Color) -> Result<(), DisplayError>;

    /// Fill a rectangle; the rectangle is clipped to the framebuffer
    fn fill_rect(&mut self, at: Vector, size: Vector, color: Color) -> Result<(), DisplayError>;

    /// Draw a single line of text with its top-left corner at `at`
    fn text(&mut self, at: Vector, text: &str, color: Color) -> Result<(), DisplayError>;

    /// Present the framebuffer
    fn swap(&mut self) -> Result<(), DisplayError>;

    /// Fill the whole framebuffer
    fn fill_screen(&mut self, color: Color) -> Result<(), DisplayError> {
        let size = self.size();
        self.fill_rect(Vector::ZERO, size, color)
    }

    /// Blank the framebuffer without presenting it
    fn erase(&mut self) -> Result<(), DisplayError> {
        self.fill_screen(Color::BLACK)
    }

    /// Blank the framebuffer and present it
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.erase()?;
        self.swap()
    }

    /// Draw a line (Bresenham)
    fn line(&mut self, from: Vector, to: Vector, color: Color) -> Result<(), DisplayError> {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        let mut p = from;

        loop {
            self.pixel(p, color)?;
            if p == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                p.x += sx;
            }
            if e2 <= dx {
                err += dx;
                p.y += sy;
            }
        }
        Ok(())
    }

    /// Draw a one-pixel rectangle outline
    fn rect(&mut self, at: Vector, size: Vector, color: Color) -> Result<(), DisplayError> {
        if size.x <= 0 || size.y <= 0 {
            return Ok(());
        }
        self.fill_rect(at, Vector::new(size.x, 1), color)?;
        self.fill_rect(Vector::new(at.x, at.y + size.y - 1), Vector::new(size.x, 1), color)?;
        self.fill_rect(at, Vector::new(1, size.y), color)?;
        self.fill_rect(Vector::new(at.x + size.x - 1, at.y), Vector::new(1, size.y), color)
    }

    /// Draw a circle outline (midpoint algorithm)
    fn circle(&mut self, center: Vector, radius: i32, color: Color) -> Result<(), DisplayError> {
        if radius < 0 {
            return Ok(());
        }
        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            for (ox, oy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.pixel(Vector::new(center.x + ox, center.y + oy), color)?;
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
        Ok(())
    }

    /// Draw a filled circle as horizontal spans
    fn fill_circle(&mut self, center: Vector, radius: i32, color: Color) -> Result<(), DisplayError> {
        if radius < 0 {
            return Ok(());
        }
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let mut half = 0;
            while (half + 1) * (half + 1) + dy * dy <= r2 {
                half += 1;
            }
            self.fill_rect(
                Vector::new(center.x - half, center.y + dy),
                Vector::new(2 * half + 1, 1),
                color,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Minimal surface that records plotted pixels
    struct Pixels {
        plotted: Vec<Vector>,
        rects: Vec<(Vector, Vector)>,
    }

    impl DrawSurface for Pixels {
        fn size(&self) -> Vector {
            Vector::new(16, 16)
        }

        fn pixel(&mut self, at: Vector, _color: Color) -> Result<(), DisplayError> {
            self.plotted.push(at);
            Ok(())
        }

        fn fill_rect(&mut self, at: Vector, size: Vector, _color: Color) -> Result<(), DisplayError> {
            self.rects.push((at, size));
            Ok(())
        }

        fn text(&mut self, _at: Vector, _text: &str, _color: Color) -> Result<(), DisplayError> {
            Ok(())
        }

        fn swap(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    fn surface() -> Pixels {
        Pixels {
            plotted: Vec::new(),
            rects: Vec::new(),
        }
    }

    #[test]
    fn test_line_endpoints() {
        let mut s = surface();
        s.line(Vector::new(0, 0), Vector::new(5, 3), Color::WHITE).unwrap();
        assert_eq!(s.plotted.first(), Some(&Vector::new(0, 0)));
        assert_eq!(s.plotted.last(), Some(&Vector::new(5, 3)));
        assert_eq!(s.plotted.len(), 6);
    }

    #[test]
    fn test_vertical_line() {
        let mut s = surface();
        s.line(Vector::new(2, 4), Vector::new(2, 0), Color::WHITE).unwrap();
        assert_eq!(s.plotted.len(), 5);
        assert!(s.plotted.iter().all(|p| p.x == 2));
    }

    #[test]
    fn test_rect_outline_uses_four_spans() {
        let mut s = surface();
        s.rect(Vector::new(1, 1), Vector::new(4, 3), Color::WHITE).unwrap();
        assert_eq!(s.rects.len(), 4);

        let mut empty = surface();
        empty.rect(Vector::new(1, 1), Vector::new(0, 3), Color::WHITE).unwrap();
        assert!(empty.rects.is_empty());
    }

    #[test]
    fn test_circle_is_symmetric() {
        let mut s = surface();
        s.circle(Vector::new(8, 8), 3, Color::WHITE).unwrap();
        assert!(s.plotted.contains(&Vector::new(11, 8)));
        assert!(s.plotted.contains(&Vector::new(5, 8)));
        assert!(s.plotted.contains(&Vector::new(8, 11)));
        assert!(s.plotted.contains(&Vector::new(8, 5)));
    }

    #[test]
    fn test_fill_circle_spans() {
        let mut s = surface();
        s.fill_circle(Vector::new(8, 8), 2, Color::WHITE).unwrap();
        // One span per row
        assert_eq!(s.rects.len(), 5);
        // Widest span through the centre
        assert!(s.rects.contains(&(Vector::new(6, 8), Vector::new(5, 1))));
    }
}
