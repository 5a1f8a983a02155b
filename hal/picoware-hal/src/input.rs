//! Input abstraction
//!
//! The input manager is a latch: it holds the most recent button press until
//! the application resets it. Apps must reset right after consuming a press
//! or the same press fires again on the next tick.

/// Buttons and keys the shell understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    /// Select / Enter
    Center,
    /// Escape; the universal cancel
    Back,
    Home,
    Backspace,
    Tab,
    /// A printable character from the keyboard
    Char(char),
}

impl Button {
    /// Check if this is one of the four arrow keys
    pub fn is_direction(&self) -> bool {
        matches!(self, Button::Up | Button::Down | Button::Left | Button::Right)
    }

    /// Printable character carried by this key, if any
    pub fn as_char(&self) -> Option<char> {
        match self {
            Button::Char(c) => Some(*c),
            _ => None,
        }
    }
}

/// Input manager trait
pub trait InputManager {
    /// The last pressed button, or `None` if nothing is latched
    fn button(&self) -> Option<Button>;

    /// Clear the latched press
    fn reset(&mut self);
}
