//! Fire
//!
//! Heat is seeded along the bottom row and diffuses upward, cooling by a
//! random amount per row.

use alloc::vec;
use alloc::vec::Vec;

use picoware_core::hal::{Color, DisplayError, DrawSurface, System, Vector};

use super::{fill_cell, grid, Effect};

/// Upper bound of the random cooling per row
const COOLING: u32 = 16;

#[derive(Debug, Default)]
pub struct Fire {
    size: Vector,
    /// Row-major heat, 0 (cold) to 255
    heat: Vec<u8>,
}

/// Black through red and yellow to white
pub fn heat_color(heat: u8) -> Color {
    let h = heat as u16 * 3;
    Color::rgb(
        h.min(255) as u8,
        h.saturating_sub(255).min(255) as u8,
        h.saturating_sub(510).min(255) as u8,
    )
}

impl Fire {
    fn at(&self, x: i32, y: i32) -> u32 {
        let w = self.size.x;
        let x = x.rem_euclid(w);
        self.heat[(y * w + x) as usize] as u32
    }

    pub fn heat(&self, cell: Vector) -> Option<u8> {
        if !self.size.contains(cell) {
            return None;
        }
        Some(self.heat[(cell.y * self.size.x + cell.x) as usize])
    }
}

impl Effect for Fire {
    fn reset(&mut self, pixels: Vector, _rng: &mut dyn System) {
        self.size = grid(pixels);
        self.heat = vec![0; self.size.area() as usize];
    }

    fn step(&mut self, _frame: u32, rng: &mut dyn System) {
        let (w, h) = (self.size.x, self.size.y);
        if w == 0 || h == 0 {
            return;
        }

        let bottom = ((h - 1) * w) as usize;
        for cell in &mut self.heat[bottom..] {
            *cell = if rng.random_below(4) == 0 {
                0
            } else {
                255 - rng.random_below(64) as u8
            };
        }

        for y in 0..h - 1 {
            for x in 0..w {
                let below2 = if y + 2 < h { self.at(x, y + 2) } else { self.at(x, y + 1) };
                let sum = self.at(x - 1, y + 1) + self.at(x, y + 1) + self.at(x + 1, y + 1) + below2;
                let cooled = (sum / 4).saturating_sub(rng.random_below(COOLING));
                self.heat[(y * w + x) as usize] = cooled as u8;
            }
        }
    }

    fn draw(&mut self, display: &mut dyn DrawSurface) -> Result<(), DisplayError> {
        for y in 0..self.size.y {
            for x in 0..self.size.x {
                let heat = self.heat[(y * self.size.x + x) as usize];
                fill_cell(display, Vector::new(x, y), heat_color(heat))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picoware_core::testing::{MockDisplay, MockSystem};

    #[test]
    fn test_palette_ends() {
        assert_eq!(heat_color(0), Color::BLACK);
        assert_eq!(heat_color(255), Color::WHITE);
        let (r, g, b) = heat_color(100).channels();
        assert!(r > 200 && g < 100 && b == 0);
    }

    #[test]
    fn test_heat_rises_and_fades() {
        let mut rng = MockSystem::new();
        let mut fire = Fire::default();
        fire.reset(Vector::new(160, 320), &mut rng);
        for frame in 0..60 {
            fire.step(frame, &mut rng);
        }

        let row_heat = |y: i32| -> u32 { (0..20).map(|x| fire.heat(Vector::new(x, y)).unwrap() as u32).sum() };
        assert!(row_heat(38) > 0);
        assert!(row_heat(38) > row_heat(10));
        assert_eq!(row_heat(0), 0);
    }

    #[test]
    fn test_draws_every_cell() {
        let mut rng = MockSystem::new();
        let display = MockDisplay::with_size(Vector::new(64, 32));
        let mut surface = display.clone();
        let mut fire = Fire::default();
        fire.reset(surface.size(), &mut rng);
        fire.step(0, &mut rng);
        fire.draw(&mut surface).unwrap();
        assert_eq!(display.fills(), 8 * 4);
    }

    #[test]
    fn test_empty_screen_is_harmless() {
        let mut rng = MockSystem::new();
        let mut fire = Fire::default();
        fire.reset(Vector::new(4, 4), &mut rng);
        fire.step(0, &mut rng);
        assert_eq!(fire.heat(Vector::ZERO), None);
    }
}
