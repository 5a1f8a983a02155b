//! Scrolling selection list

use alloc::string::String;
use alloc::vec::Vec;

use picoware_hal::{Button, DisplayError, DrawSurface, Vector};

use super::{draw_title, text, MARGIN};
use crate::config::Theme;

/// Result of feeding a button to a [`Menu`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Selection changed; redraw
    Moved,
    /// Item at this index was chosen
    Selected(usize),
    /// The user asked to leave
    Back,
    /// Button has no meaning here
    Ignored,
}

/// A titled list with a highlighted selection
///
/// Navigation wraps at both ends. The list scrolls to keep the selection
/// visible.
#[derive(Debug, Clone)]
pub struct Menu {
    title: String,
    items: Vec<String>,
    selected: usize,
    /// Index of the first visible row
    scroll: usize,
}

impl Menu {
    pub fn new<I, S>(title: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: String::from(title),
            items: items.into_iter().map(Into::into).collect(),
            selected: 0,
            scroll: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title.clear();
        self.title.push_str(title);
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace all items, keeping the selection in range
    pub fn set_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        self.scroll = self.scroll.min(self.selected);
    }

    /// Replace the label of one item
    pub fn set_item(&mut self, index: usize, label: &str) {
        if let Some(item) = self.items.get_mut(index) {
            item.clear();
            item.push_str(label);
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn set_selected(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }

    /// Interpret a button press
    pub fn handle(&mut self, button: Button) -> MenuAction {
        let len = self.items.len();
        match button {
            Button::Up if len > 0 => {
                self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
                MenuAction::Moved
            }
            Button::Down if len > 0 => {
                self.selected = (self.selected + 1) % len;
                MenuAction::Moved
            }
            Button::Center | Button::Right if len > 0 => MenuAction::Selected(self.selected),
            Button::Back | Button::Left => MenuAction::Back,
            _ => MenuAction::Ignored,
        }
    }

    /// Draw the menu and present it
    pub fn draw(&mut self, display: &mut dyn DrawSurface, theme: &Theme) -> Result<(), DisplayError> {
        display.fill_screen(theme.background)?;
        let top = draw_title(display, &self.title, theme)?;

        let size = display.size();
        let ch = display.char_size();
        let row_height = ch.y + MARGIN;
        let rows = ((size.y - top) / row_height).max(1) as usize;
        self.scroll_to_selection(rows);

        let cols = text::columns(size.x - 2 * MARGIN, ch.x);
        let visible = self.items.iter().enumerate().skip(self.scroll).take(rows);
        for (row, (index, item)) in visible.enumerate() {
            let y = top + row as i32 * row_height;
            if index == self.selected {
                display.fill_rect(Vector::new(0, y - MARGIN / 2), Vector::new(size.x, row_height), theme.selected)?;
            }
            display.text(Vector::new(MARGIN, y), text::truncate(item, cols), theme.foreground)?;
        }

        if self.items.len() > rows {
            self.draw_scrollbar(display, top, rows, theme)?;
        }

        display.swap()
    }

    /// Adjust the scroll offset so the selection is within `rows` rows
    fn scroll_to_selection(&mut self, rows: usize) {
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + rows {
            self.scroll = self.selected + 1 - rows;
        }
    }

    fn draw_scrollbar(&self, display: &mut dyn DrawSurface, top: i32, rows: usize, theme: &Theme) -> Result<(), DisplayError> {
        let size = display.size();
        let track = size.y - top;
        let total = self.items.len() as i32;
        let thumb = (track * rows as i32 / total).max(4);
        let offset = track * self.scroll as i32 / total;
        display.fill_rect(Vector::new(size.x - 3, top + offset), Vector::new(2, thumb), theme.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDisplay;

    fn menu() -> Menu {
        Menu::new("Test", ["one", "two", "three"])
    }

    #[test]
    fn test_navigation_wraps() {
        let mut m = menu();
        assert_eq!(m.handle(Button::Up), MenuAction::Moved);
        assert_eq!(m.selected_index(), 2);
        assert_eq!(m.handle(Button::Down), MenuAction::Moved);
        assert_eq!(m.selected_index(), 0);
        m.handle(Button::Down);
        assert_eq!(m.selected_item(), Some("two"));
    }

    #[test]
    fn test_select_and_back() {
        let mut m = menu();
        m.handle(Button::Down);
        assert_eq!(m.handle(Button::Center), MenuAction::Selected(1));
        assert_eq!(m.handle(Button::Back), MenuAction::Back);
        assert_eq!(m.handle(Button::Char('x')), MenuAction::Ignored);
    }

    #[test]
    fn test_empty_menu() {
        let mut m = Menu::new("Empty", Vec::<String>::new());
        assert_eq!(m.handle(Button::Down), MenuAction::Ignored);
        assert_eq!(m.handle(Button::Center), MenuAction::Ignored);
        assert_eq!(m.selected_item(), None);
    }

    #[test]
    fn test_set_items_clamps_selection() {
        let mut m = menu();
        m.set_selected(2);
        m.set_items(["only"]);
        assert_eq!(m.selected_index(), 0);
        m.set_item(0, "renamed");
        assert_eq!(m.selected_item(), Some("renamed"));
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut m = Menu::new("Long", (0..100).map(|i| alloc::format!("item {}", i)));
        let display = MockDisplay::new();
        let mut surface = display.clone();

        m.set_selected(99);
        m.draw(&mut surface, &Theme::DARK).unwrap();
        assert!(display.contains_text("item 99"));
        assert!(!display.contains_text("item 0"));

        display.clear_log();
        m.handle(Button::Down);
        m.draw(&mut surface, &Theme::DARK).unwrap();
        assert!(display.contains_text("item 0"));
        assert!(display.contains_text("Long"));
        assert_eq!(display.swaps(), 2);
    }
}
