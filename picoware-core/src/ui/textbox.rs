//! Scrollable read-only text

use alloc::string::String;
use alloc::vec::Vec;

use picoware_hal::{Button, DisplayError, DrawSurface, Vector};

use super::{draw_title, text, MARGIN};
use crate::config::Theme;

/// Result of feeding a button to a [`TextBox`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextBoxAction {
    Scrolled,
    Back,
    Ignored,
}

/// A titled block of word-wrapped text
#[derive(Debug, Clone, Default)]
pub struct TextBox {
    title: String,
    text: String,
    /// First visible line
    scroll: usize,
    /// Lines produced by the last layout
    line_count: usize,
    /// Rows that fit on screen at the last layout
    rows: usize,
}

impl TextBox {
    pub fn new(title: &str, text: &str) -> Self {
        Self {
            title: String::from(title),
            text: String::from(text),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, keeping the scroll position where possible
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    pub fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn max_scroll(&self) -> usize {
        self.line_count.saturating_sub(self.rows)
    }

    pub fn handle(&mut self, button: Button) -> TextBoxAction {
        match button {
            Button::Up if self.scroll > 0 => {
                self.scroll -= 1;
                TextBoxAction::Scrolled
            }
            Button::Down if self.scroll < self.max_scroll() => {
                self.scroll += 1;
                TextBoxAction::Scrolled
            }
            Button::Back | Button::Left => TextBoxAction::Back,
            _ => TextBoxAction::Ignored,
        }
    }

    /// Draw the visible lines and present them
    pub fn draw(&mut self, display: &mut dyn DrawSurface, theme: &Theme) -> Result<(), DisplayError> {
        display.fill_screen(theme.background)?;
        let top = draw_title(display, &self.title, theme)?;

        let size = display.size();
        let ch = display.char_size();
        let line_height = ch.y + 2;
        let lines: Vec<String> = text::wrap(&self.text, text::columns(size.x - 2 * MARGIN, ch.x));

        self.rows = ((size.y - top) / line_height).max(1) as usize;
        self.line_count = lines.len();
        self.scroll = self.scroll.min(self.max_scroll());

        for (row, line) in lines.iter().skip(self.scroll).take(self.rows).enumerate() {
            let y = top + row as i32 * line_height;
            display.text(Vector::new(MARGIN, y), line, theme.foreground)?;
        }

        display.swap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDisplay;
    use alloc::format;

    #[test]
    fn test_short_text_does_not_scroll() {
        let display = MockDisplay::new();
        let mut surface = display.clone();
        let mut tb = TextBox::new("About", "Hello there");
        tb.draw(&mut surface, &Theme::DARK).unwrap();

        assert_eq!(tb.handle(Button::Down), TextBoxAction::Ignored);
        assert_eq!(tb.handle(Button::Up), TextBoxAction::Ignored);
        assert!(display.contains_text("Hello there"));
    }

    #[test]
    fn test_scrolls_within_bounds() {
        let display = MockDisplay::new();
        let mut surface = display.clone();
        let mut tb = TextBox::new("Log", "");
        for i in 0..60 {
            tb.push_line(&format!("line {}", i));
        }
        tb.draw(&mut surface, &Theme::DARK).unwrap();

        let mut steps = 0;
        while tb.handle(Button::Down) == TextBoxAction::Scrolled {
            steps += 1;
        }
        assert!(steps > 0);
        tb.draw(&mut surface, &Theme::DARK).unwrap();
        assert!(display.contains_text("line 59"));

        assert_eq!(tb.handle(Button::Up), TextBoxAction::Scrolled);
        assert_eq!(tb.scroll(), steps - 1);
    }

    #[test]
    fn test_back() {
        let mut tb = TextBox::new("t", "x");
        assert_eq!(tb.handle(Button::Back), TextBoxAction::Back);
    }
}
