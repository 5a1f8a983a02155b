//! Screensavers
//!
//! Each effect is a small per-frame kernel. [`Screensaver`] wraps an effect
//! as an app: it sizes the effect from the display, advances and draws it
//! once per frame, and leaves on any key.

pub mod fire;
pub mod matrix;
pub mod plasma;
pub mod spirograph;
pub mod starfield;

use alloc::boxed::Box;

use picoware_core::hal::{Color, DisplayError, DrawSurface, System, Vector};
use picoware_core::{App, AppError, Context};

pub use fire::Fire;
pub use matrix::MatrixRain;
pub use plasma::Plasma;
pub use spirograph::Spirograph;
pub use starfield::Starfield;

/// Edge of one grid cell in pixels
pub const CELL: i32 = 8;

/// A frame-by-frame animation
pub trait Effect: Default {
    /// Rebuild all state for a screen of `pixels`
    fn reset(&mut self, pixels: Vector, rng: &mut dyn System);

    /// Advance to frame number `frame`
    fn step(&mut self, frame: u32, rng: &mut dyn System);

    /// Draw the current frame (without presenting it)
    fn draw(&mut self, display: &mut dyn DrawSurface) -> Result<(), DisplayError>;
}

/// Number of whole cells that fit in `pixels`
pub fn grid(pixels: Vector) -> Vector {
    Vector::new((pixels.x / CELL).max(0), (pixels.y / CELL).max(0))
}

/// Fill one grid cell
pub fn fill_cell(display: &mut dyn DrawSurface, cell: Vector, color: Color) -> Result<(), DisplayError> {
    display.fill_rect(cell.scale(CELL), Vector::new(CELL, CELL), color)
}

/// Fully saturated colour at `h` turns around the colour wheel
pub fn hue(h: f32) -> Color {
    let h = h - libm::floorf(h);
    let x = h * 6.0;
    let sector = (x as u8).min(5);
    let up = ((x - sector as f32) * 255.0) as u8;
    let down = 255 - up;
    match sector {
        0 => Color::rgb(255, up, 0),
        1 => Color::rgb(down, 255, 0),
        2 => Color::rgb(0, 255, up),
        3 => Color::rgb(0, down, 255),
        4 => Color::rgb(up, 0, 255),
        _ => Color::rgb(255, 0, down),
    }
}

/// Uniform value in `[-1, 1]`
pub fn random_unit(rng: &mut dyn System) -> f32 {
    rng.random_below(2001) as f32 / 1000.0 - 1.0
}

/// App wrapper running an [`Effect`] until a key is pressed
#[derive(Default)]
pub struct Screensaver<E: Effect> {
    effect: E,
    frame: u32,
}

impl<E: Effect> App for Screensaver<E> {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        let pixels = ctx.display().size();
        self.effect.reset(pixels, ctx.system());
        self.frame = 0;
        ctx.display().clear()?;
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if ctx.take_button().is_some() {
            ctx.back();
            return Ok(());
        }
        // Every frame is a full redraw
        ctx.take_dirty();

        self.effect.step(self.frame, ctx.system());
        let display = ctx.display();
        self.effect.draw(display)?;
        display.swap()?;
        self.frame = self.frame.wrapping_add(1);
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        self.effect = E::default();
        ctx.system().reclaim();
        Ok(())
    }
}

pub fn fire() -> Box<dyn App> {
    Box::new(Screensaver::<Fire>::default())
}

pub fn plasma() -> Box<dyn App> {
    Box::new(Screensaver::<Plasma>::default())
}

pub fn starfield() -> Box<dyn App> {
    Box::new(Screensaver::<Starfield>::default())
}

pub fn spirograph() -> Box<dyn App> {
    Box::new(Screensaver::<Spirograph>::default())
}

pub fn matrix() -> Box<dyn App> {
    Box::new(Screensaver::<MatrixRain>::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use picoware_core::config::Settings;
    use picoware_core::hal::Button;
    use picoware_core::testing::TestPlatform;
    use picoware_core::{View, ViewManager};

    #[test]
    fn test_hue_wheel() {
        assert_eq!(hue(0.0), Color::RED);
        assert_eq!(hue(1.0 / 3.0), Color::GREEN);
        assert_eq!(hue(2.0 / 3.0), Color::BLUE);
        assert_eq!(hue(1.0), Color::RED);
        assert_eq!(hue(-1.0), Color::RED);
    }

    #[test]
    fn test_grid() {
        assert_eq!(grid(Vector::new(320, 320)), Vector::new(40, 40));
        assert_eq!(grid(Vector::new(7, -3)), Vector::ZERO);
    }

    #[test]
    fn test_random_unit_range() {
        let mut rng = picoware_core::testing::MockSystem::new();
        for _ in 0..1000 {
            let v = random_unit(&mut rng);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_every_saver_animates_and_exits_on_any_key() {
        let builders: [(&'static str, fn() -> Box<dyn App>); 5] = [
            ("fire", fire),
            ("plasma", plasma),
            ("starfield", starfield),
            ("spirograph", spirograph),
            ("matrix", matrix),
        ];

        for (name, build) in builders {
            let platform = TestPlatform::new();
            let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
            vm.add(View::new("root", crate::library::Library::default())).unwrap();
            vm.add(View::from_box(name, build())).unwrap();
            vm.switch_to("root").unwrap();
            vm.switch_to(name).unwrap();

            let swaps = platform.display.swaps();
            for _ in 0..10 {
                platform.system.advance(33);
                vm.tick();
            }
            assert_eq!(platform.display.swaps(), swaps + 10, "{} did not present", name);

            platform.input.press(Button::Char('q'));
            vm.tick();
            assert_eq!(vm.current(), Some("root"), "{} did not exit", name);
            assert_eq!(platform.system.reclaims(), 1);
        }
    }
}
