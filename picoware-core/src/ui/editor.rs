//! Single-line text entry

use alloc::string::String;

use picoware_hal::{Button, DisplayError, DrawSurface, Vector};

use super::{draw_title, text, MARGIN};
use crate::config::Theme;

/// Editor capacity in bytes
pub const EDITOR_CAPACITY: usize = 64;

/// Outcome of a key press in a [`LineEditor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Enter was pressed; carries the text
    Submitted(String),
    /// Escape was pressed
    Cancelled,
}

/// A prompt with an editable line of text
///
/// In masked mode the text is drawn as asterisks.
#[derive(Debug, Clone)]
pub struct LineEditor {
    prompt: String,
    buffer: heapless::String<EDITOR_CAPACITY>,
    masked: bool,
}

impl LineEditor {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: String::from(prompt),
            buffer: heapless::String::new(),
            masked: false,
        }
    }

    /// Editor for secrets
    pub fn masked(prompt: &str) -> Self {
        Self {
            masked: true,
            ..Self::new(prompt)
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the text, truncating to capacity
    pub fn set_text(&mut self, value: &str) {
        self.buffer.clear();
        for c in value.chars() {
            if self.buffer.push(c).is_err() {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Feed a key press
    ///
    /// Returns an event when editing is finished. Input past capacity is
    /// dropped.
    pub fn handle(&mut self, button: Button) -> Option<EditorEvent> {
        match button {
            Button::Char(c) => {
                let _ = self.buffer.push(c);
                None
            }
            Button::Backspace | Button::Left => {
                self.buffer.pop();
                None
            }
            Button::Center => Some(EditorEvent::Submitted(String::from(self.buffer.as_str()))),
            Button::Back => Some(EditorEvent::Cancelled),
            _ => None,
        }
    }

    /// Draw the prompt and the edit line, then present
    pub fn draw(&self, display: &mut dyn DrawSurface, theme: &Theme) -> Result<(), DisplayError> {
        display.fill_screen(theme.background)?;
        let top = draw_title(display, &self.prompt, theme)?;

        let size = display.size();
        let ch = display.char_size();
        let cols = text::columns(size.x - 4 * MARGIN, ch.x).saturating_sub(1);
        let box_height = ch.y + 2 * MARGIN;
        display.rect(
            Vector::new(MARGIN, top),
            Vector::new(size.x - 2 * MARGIN, box_height),
            theme.accent,
        )?;

        let mut shown = String::new();
        if self.masked {
            shown.extend(self.buffer.chars().map(|_| '*'));
        } else {
            shown.push_str(&self.buffer);
        }
        // Keep the tail visible when the text is wider than the box
        let len = shown.chars().count();
        let start = shown
            .char_indices()
            .nth(len.saturating_sub(cols))
            .map_or(0, |(idx, _)| idx);
        let mut line = String::from(&shown[start..]);
        line.push('_');
        display.text(Vector::new(2 * MARGIN, top + MARGIN), &line, theme.foreground)?;

        let hint_y = top + box_height + 2 * MARGIN;
        display.text(Vector::new(MARGIN, hint_y), "ENTER save  ESC cancel", theme.accent)?;

        display.swap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDisplay;

    fn type_str(editor: &mut LineEditor, s: &str) {
        for c in s.chars() {
            assert_eq!(editor.handle(Button::Char(c)), None);
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut ed = LineEditor::new("Name");
        type_str(&mut ed, "picox");
        ed.handle(Button::Backspace);
        assert_eq!(ed.text(), "pico");
        assert_eq!(ed.handle(Button::Center), Some(EditorEvent::Submitted("pico".into())));
    }

    #[test]
    fn test_cancel() {
        let mut ed = LineEditor::new("Name");
        type_str(&mut ed, "abc");
        assert_eq!(ed.handle(Button::Back), Some(EditorEvent::Cancelled));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut ed = LineEditor::new("Long");
        for _ in 0..(EDITOR_CAPACITY + 10) {
            ed.handle(Button::Char('a'));
        }
        assert_eq!(ed.text().len(), EDITOR_CAPACITY);

        ed.set_text(&"b".repeat(EDITOR_CAPACITY * 2));
        assert_eq!(ed.text().len(), EDITOR_CAPACITY);
    }

    #[test]
    fn test_masked_draw_hides_text() {
        let display = MockDisplay::new();
        let mut surface = display.clone();
        let mut ed = LineEditor::masked("Password");
        type_str(&mut ed, "secret");
        ed.draw(&mut surface, &Theme::DARK).unwrap();

        assert!(display.contains_text("******_"));
        assert!(!display.contains_text("secret"));
    }

    #[test]
    fn test_backspace_on_empty() {
        let mut ed = LineEditor::new("x");
        assert_eq!(ed.handle(Button::Backspace), None);
        assert_eq!(ed.text(), "");
    }
}
