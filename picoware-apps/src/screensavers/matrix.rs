//! Matrix rain
//!
//! Each text column carries one falling drop: a bright head followed by a
//! green trail that is erased from the tail end.

use alloc::vec::Vec;

use picoware_core::hal::{Color, DisplayError, DrawSurface, System, Vector};

use super::Effect;

const COLUMN_WIDTH: i32 = 8;
const ROW_HEIGHT: i32 = 10;
const GLYPHS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ$+-*/=%#&<>";

const HEAD: Color = Color::rgb(200, 255, 200);
const TRAIL: Color = Color::rgb(0, 180, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Raindrop {
    /// Row of the head; negative while still above the screen
    head: i32,
    /// Frames per row
    speed: u8,
    tick: u8,
    trail: i32,
}

/// One cell change for the next draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Glyph { cell: Vector, glyph: char, color: Color },
    Erase { cell: Vector },
}

#[derive(Debug, Default)]
pub struct MatrixRain {
    /// Columns by rows
    grid: Vector,
    drops: Vec<Raindrop>,
    updates: Vec<Update>,
    fresh: bool,
}

fn glyph(rng: &mut dyn System) -> char {
    GLYPHS[rng.random_below(GLYPHS.len() as u32) as usize] as char
}

impl MatrixRain {
    fn spawn(&self, rng: &mut dyn System) -> Raindrop {
        let rows = self.grid.y.max(1) as u32;
        Raindrop {
            head: -(rng.random_below(rows) as i32),
            speed: 1 + rng.random_below(3) as u8,
            tick: 0,
            trail: 4 + rng.random_below(rows / 2 + 1) as i32,
        }
    }

    fn cell(&self, column: usize, row: i32) -> Option<Vector> {
        (0..self.grid.y).contains(&row).then(|| Vector::new(column as i32, row))
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }
}

impl Effect for MatrixRain {
    fn reset(&mut self, pixels: Vector, rng: &mut dyn System) {
        self.grid = Vector::new((pixels.x / COLUMN_WIDTH).max(0), (pixels.y / ROW_HEIGHT).max(0));
        self.drops.clear();
        for _ in 0..self.grid.x {
            let drop = self.spawn(rng);
            self.drops.push(drop);
        }
        self.updates.clear();
        self.fresh = true;
    }

    fn step(&mut self, _frame: u32, rng: &mut dyn System) {
        for column in 0..self.drops.len() {
            let mut drop = self.drops[column];
            drop.tick += 1;
            if drop.tick < drop.speed {
                self.drops[column] = drop;
                continue;
            }
            drop.tick = 0;

            if let Some(cell) = self.cell(column, drop.head) {
                // The old head fades into the trail
                self.updates.push(Update::Glyph { cell, glyph: glyph(rng), color: TRAIL });
            }
            drop.head += 1;
            if let Some(cell) = self.cell(column, drop.head) {
                self.updates.push(Update::Glyph { cell, glyph: glyph(rng), color: HEAD });
            }
            if let Some(cell) = self.cell(column, drop.head - drop.trail) {
                self.updates.push(Update::Erase { cell });
            }

            if drop.head - drop.trail >= self.grid.y {
                drop = self.spawn(rng);
            }
            self.drops[column] = drop;
        }
    }

    fn draw(&mut self, display: &mut dyn DrawSurface) -> Result<(), DisplayError> {
        if core::mem::take(&mut self.fresh) {
            display.erase()?;
        }
        let cell_size = Vector::new(COLUMN_WIDTH, ROW_HEIGHT);
        let mut buf = [0u8; 4];
        for update in self.updates.drain(..) {
            match update {
                Update::Glyph { cell, glyph, color } => {
                    let at = Vector::new(cell.x * COLUMN_WIDTH, cell.y * ROW_HEIGHT);
                    display.fill_rect(at, cell_size, Color::BLACK)?;
                    display.text(Vector::new(at.x + 1, at.y), glyph.encode_utf8(&mut buf), color)?;
                }
                Update::Erase { cell } => {
                    let at = Vector::new(cell.x * COLUMN_WIDTH, cell.y * ROW_HEIGHT);
                    display.fill_rect(at, cell_size, Color::BLACK)?;
                }
            }
        }
        Ok(())
    }
}
