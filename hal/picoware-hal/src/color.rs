//! RGB565 colour value

/// A 16-bit RGB565 colour, the native format of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(pub u16);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(48, 48, 48);
    pub const LIGHT_GRAY: Color = Color::rgb(200, 200, 200);
    pub const SKY_BLUE: Color = Color::rgb(64, 160, 255);

    /// Build a colour from 8-bit channels (low bits are dropped)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Raw RGB565 value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Channels expanded back to 8 bits
    pub const fn channels(self) -> (u8, u8, u8) {
        let r = ((self.0 >> 11) & 0x1F) as u8;
        let g = ((self.0 >> 5) & 0x3F) as u8;
        let b = (self.0 & 0x1F) as u8;
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }

    /// Scale brightness by `level / 255`
    pub const fn dim(self, level: u8) -> Self {
        let (r, g, b) = self.channels();
        let l = level as u16;
        Color::rgb(
            ((r as u16 * l) / 255) as u8,
            ((g as u16 * l) / 255) as u8,
            ((b as u16 * l) / 255) as u8,
        )
    }

    /// Big-endian byte pair as sent over SPI
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}
