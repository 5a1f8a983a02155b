//! Colour themes

use picoware_hal::Color;

/// Colours shared by every view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Theme {
    pub foreground: Color,
    pub background: Color,
    /// Highlight behind the selected row
    pub selected: Color,
    /// Titles and separators
    pub accent: Color,
}

impl Theme {
    pub const DARK: Theme = Theme {
        foreground: Color::WHITE,
        background: Color::BLACK,
        selected: Color::rgb(0, 96, 160),
        accent: Color::SKY_BLUE,
    };

    pub const LIGHT: Theme = Theme {
        foreground: Color::BLACK,
        background: Color::WHITE,
        selected: Color::LIGHT_GRAY,
        accent: Color::BLUE,
    };

    pub const fn for_mode(dark_mode: bool) -> Theme {
        if dark_mode {
            Theme::DARK
        } else {
            Theme::LIGHT
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::DARK
    }
}
