//! Modal message box

use alloc::string::String;

use picoware_hal::{DisplayError, DrawSurface, Vector};

use super::{text, MARGIN};
use crate::config::Theme;

/// A titled message drawn in a bordered box over the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    title: String,
    message: String,
}

impl Alert {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: String::from(title),
            message: String::from(message),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Draw the box and present it
    pub fn draw(&self, display: &mut dyn DrawSurface, theme: &Theme) -> Result<(), DisplayError> {
        let size = display.size();
        let ch = display.char_size();
        let line_height = ch.y + 2;

        let width = size.x - 8 * MARGIN;
        let cols = text::columns(width - 4 * MARGIN, ch.x);
        let lines = text::wrap(&self.message, cols);
        // Title, message, blank, hint
        let max_lines = ((size.y - 8 * MARGIN) / line_height - 3).max(1) as usize;
        let shown = lines.len().min(max_lines);
        let height = (shown as i32 + 3) * line_height + 4 * MARGIN;

        let at = Vector::new((size.x - width) / 2, (size.y - height) / 2);
        display.fill_rect(at, Vector::new(width, height), theme.background)?;
        display.rect(at, Vector::new(width, height), theme.accent)?;

        let x = at.x + 2 * MARGIN;
        let mut y = at.y + 2 * MARGIN;
        display.text(Vector::new(x, y), text::truncate(&self.title, cols), theme.accent)?;
        y += line_height;

        for line in lines.iter().take(shown) {
            display.text(Vector::new(x, y), line, theme.foreground)?;
            y += line_height;
        }

        y += line_height;
        display.text(Vector::new(x, y), "Press any key", theme.accent)?;

        display.swap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDisplay;

    #[test]
    fn test_draws_title_message_and_hint() {
        let display = MockDisplay::new();
        let mut surface = display.clone();
        Alert::new("WiFi", "WiFi is not available").draw(&mut surface, &Theme::DARK).unwrap();

        assert!(display.contains_text("WiFi is not available"));
        assert!(display.contains_text("Press any key"));
        assert_eq!(display.swaps(), 1);
    }

    #[test]
    fn test_long_message_is_wrapped() {
        let display = MockDisplay::new();
        let mut surface = display.clone();
        let message = "word ".repeat(200);
        Alert::new("Long", &message).draw(&mut surface, &Theme::LIGHT).unwrap();

        // Every drawn line fits the box
        assert!(display.texts().iter().all(|t| t.len() < 53));
    }
}
