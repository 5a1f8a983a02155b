//! Starfield
//!
//! Stars fly towards the viewer from a point at the centre of the screen.
//! Nearer stars are drawn larger and brighter.

use alloc::vec::Vec;

use picoware_core::hal::{Color, DisplayError, DrawSurface, System, Vector};

use super::{random_unit, Effect};

const STAR_COUNT: usize = 96;
/// Depth travelled per frame
const SPEED: f32 = 0.015;
const NEAR: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    x: f32,
    y: f32,
    /// 1.0 far, `NEAR` close
    z: f32,
}

impl Star {
    fn spawn(rng: &mut dyn System, z: f32) -> Star {
        Star {
            x: random_unit(rng),
            y: random_unit(rng),
            z,
        }
    }
}

#[derive(Debug, Default)]
pub struct Starfield {
    pixels: Vector,
    stars: Vec<Star>,
}

impl Starfield {
    /// Screen position of a star, if it is on screen
    fn project(&self, star: &Star) -> Option<Vector> {
        let cx = self.pixels.x as f32 / 2.0;
        let cy = self.pixels.y as f32 / 2.0;
        let at = Vector::new((cx + star.x / star.z * cx) as i32, (cy + star.y / star.z * cy) as i32);
        self.pixels.contains(at).then_some(at)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

impl Effect for Starfield {
    fn reset(&mut self, pixels: Vector, rng: &mut dyn System) {
        self.pixels = pixels;
        self.stars.clear();
        for _ in 0..STAR_COUNT {
            // Spread the initial depths so the field starts full
            let z = NEAR + (1.0 - NEAR) * (random_unit(rng) + 1.0) / 2.0;
            self.stars.push(Star::spawn(rng, z));
        }
    }

    fn step(&mut self, _frame: u32, rng: &mut dyn System) {
        for i in 0..self.stars.len() {
            let mut star = self.stars[i];
            star.z -= SPEED;
            if star.z <= NEAR || self.project(&star).is_none() {
                star = Star::spawn(rng, 1.0);
            }
            self.stars[i] = star;
        }
    }

    fn draw(&mut self, display: &mut dyn DrawSurface) -> Result<(), DisplayError> {
        display.fill_screen(Color::BLACK)?;
        for star in &self.stars {
            let Some(at) = self.project(star) else {
                continue;
            };
            let size = if star.z < 0.3 {
                3
            } else if star.z < 0.6 {
                2
            } else {
                1
            };
            let level = ((1.0 - star.z) * 255.0) as u8;
            display.fill_rect(at, Vector::new(size, size), Color::WHITE.dim(level.max(48)))?;
        }
        Ok(())
    }
}
