//! Widgets shared by the apps
//!
//! Widgets hold their own state and draw themselves onto a
//! [`DrawSurface`](picoware_hal::DrawSurface) using the active theme. They
//! never consume input themselves: apps take the latched button from the
//! context and hand it to `handle`.

pub mod alert;
pub mod editor;
pub mod menu;
pub mod text;
pub mod textbox;

pub use alert::Alert;
pub use editor::{EditorEvent, LineEditor};
pub use menu::{Menu, MenuAction};
pub use textbox::{TextBox, TextBoxAction};

use picoware_hal::{DisplayError, DrawSurface, Vector};

use crate::config::Theme;

/// Inner margin around widget content (px)
pub const MARGIN: i32 = 4;

/// Draw a title bar across the top of the screen
///
/// Returns the y coordinate of the first row below the bar.
pub fn draw_title(display: &mut dyn DrawSurface, title: &str, theme: &Theme) -> Result<i32, DisplayError> {
    let size = display.size();
    let ch = display.char_size();
    let height = ch.y + 2 * MARGIN;

    display.fill_rect(Vector::ZERO, Vector::new(size.x, height), theme.accent)?;
    let cols = text::columns(size.x - 2 * MARGIN, ch.x);
    display.text(
        Vector::new(MARGIN, MARGIN),
        text::truncate(title, cols),
        theme.background,
    )?;
    Ok(height + MARGIN)
}
