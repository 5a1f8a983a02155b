//! Plasma
//!
//! Four interfering sine fields, mapped onto the colour wheel.

use libm::{sinf, sqrtf};

use picoware_core::hal::{DisplayError, DrawSurface, System, Vector};

use super::{fill_cell, grid, hue, Effect};

/// Phase advance per frame
const SPEED: f32 = 0.08;

#[derive(Debug, Default)]
pub struct Plasma {
    size: Vector,
    time: f32,
}

/// Field value at a cell, in `[0, 1]`
pub fn field(x: i32, y: i32, t: f32) -> f32 {
    let (fx, fy) = (x as f32, y as f32);
    let v = sinf(fx * 0.25 + t)
        + sinf(fy * 0.3 + t * 0.7)
        + sinf((fx + fy) * 0.2 + t * 1.3)
        + sinf(sqrtf(fx * fx + fy * fy) * 0.25 - t);
    (v + 4.0) / 8.0
}

impl Effect for Plasma {
    fn reset(&mut self, pixels: Vector, _rng: &mut dyn System) {
        self.size = grid(pixels);
        self.time = 0.0;
    }

    fn step(&mut self, frame: u32, _rng: &mut dyn System) {
        self.time = frame as f32 * SPEED;
    }

    fn draw(&mut self, display: &mut dyn DrawSurface) -> Result<(), DisplayError> {
        let drift = self.time * 0.05;
        for y in 0..self.size.y {
            for x in 0..self.size.x {
                let color = hue(field(x, y, self.time) + drift);
                fill_cell(display, Vector::new(x, y), color)?;
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
    fn test_field_range() {
        for t in [0.0, 1.5, 42.0] {
            for y in 0..40 {
                for x in 0..40 {
                    let v = field(x, y, t);
                    assert!((0.0..=1.0).contains(&v), "field({}, {}, {}) = {}", x, y, t, v);
                }
            }
        }
    }

    #[test]
    fn test_animates_over_time() {
        let mut rng = MockSystem::new();
        let mut plasma = Plasma::default();
        plasma.reset(Vector::new(32, 32), &mut rng);

        let display = MockDisplay::with_size(Vector::new(32, 32));
        let mut surface = display.clone();
        plasma.step(0, &mut rng);
        plasma.draw(&mut surface).unwrap();
        let first = display.ops();

        display.clear_log();
        plasma.step(10, &mut rng);
        plasma.draw(&mut surface).unwrap();
        assert_eq!(display.fills(), 16);
        assert_ne!(display.ops(), first);
    }
}
