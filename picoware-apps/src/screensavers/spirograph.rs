//! Spirograph
//!
//! Traces hypotrochoids with random gear ratios, a few segments per frame.
//! When a curve closes the screen is wiped and a new one starts.

use alloc::vec::Vec;
use core::f32::consts::PI;

use libm::{cosf, fminf, sinf};

use picoware_core::hal::{Color, DisplayError, DrawSurface, System, Vector};

use super::{hue, Effect};

/// Segments added per frame
const SEGMENTS: usize = 8;
/// Parameter advance per segment
const DT: f32 = 0.04;

/// Gear geometry: fixed ring, rolling gear, pen offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gears {
    pub ring: u32,
    pub gear: u32,
    pub pen: u32,
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Gears {
    /// Parameter range after which the curve closes
    pub fn period(&self) -> f32 {
        2.0 * PI * (self.gear / gcd(self.ring, self.gear).max(1)) as f32
    }

    /// Farthest distance from the centre the pen reaches
    pub fn reach(&self) -> f32 {
        (self.ring - self.gear + self.pen) as f32
    }

    /// Pen position at parameter `t`, relative to the centre
    pub fn point(&self, t: f32) -> (f32, f32) {
        let rolling = (self.ring - self.gear) as f32;
        let ratio = rolling / self.gear as f32;
        let pen = self.pen as f32;
        (
            rolling * cosf(t) + pen * cosf(ratio * t),
            rolling * sinf(t) - pen * sinf(ratio * t),
        )
    }
}

#[derive(Debug, Default)]
pub struct Spirograph {
    pixels: Vector,
    gears: Option<Gears>,
    t: f32,
    last: Option<Vector>,
    curves: u32,
    pending: Vec<(Vector, Vector, Color)>,
    /// Wipe the screen before the next draw
    fresh: bool,
}

impl Spirograph {
    fn new_curve(&mut self, rng: &mut dyn System) {
        let ring = 40 + rng.random_below(60);
        let gear = 7 + rng.random_below(ring / 2);
        let pen = 5 + rng.random_below(gear);
        self.gears = Some(Gears { ring, gear, pen });
        self.t = 0.0;
        self.last = None;
        self.curves = self.curves.wrapping_add(1);
        self.pending.clear();
        self.fresh = true;
    }

    fn project(&self, gears: &Gears, t: f32) -> Vector {
        let half = Vector::new(self.pixels.x / 2, self.pixels.y / 2);
        let scale = fminf(half.x as f32, half.y as f32) * 0.95 / gears.reach();
        let (x, y) = gears.point(t);
        Vector::new(half.x + (x * scale) as i32, half.y + (y * scale) as i32)
    }

    pub fn gears(&self) -> Option<Gears> {
        self.gears
    }
}

impl Effect for Spirograph {
    fn reset(&mut self, pixels: Vector, rng: &mut dyn System) {
        self.pixels = pixels;
        self.curves = 0;
        self.new_curve(rng);
    }

    fn step(&mut self, _frame: u32, rng: &mut dyn System) {
        let gears = match self.gears {
            Some(gears) if self.t <= gears.period() => gears,
            _ => {
                self.new_curve(rng);
                return;
            }
        };

        for _ in 0..SEGMENTS {
            let at = self.project(&gears, self.t);
            if let Some(from) = self.last {
                let color = hue(self.t / gears.period() + self.curves as f32 * 0.17);
                self.pending.push((from, at, color));
            }
            self.last = Some(at);
            self.t += DT;
        }
    }

    fn draw(&mut self, display: &mut dyn DrawSurface) -> Result<(), DisplayError> {
        if core::mem::take(&mut self.fresh) {
            display.erase()?;
        }
        for (from, to, color) in self.pending.drain(..) {
            display.line(from, to, color)?;
        }
        Ok(())
    }
}
