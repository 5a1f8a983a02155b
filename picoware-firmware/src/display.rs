//! ILI9488 panel driver
//!
//! Driver for the 320x320 ILI9488 panel of the PicoCalc over SPI. The panel
//! takes 18-bit pixels (three bytes each). There is no framebuffer in RAM:
//! drawing goes straight to panel memory and `swap` is a no-op.
//!
//! Text is rendered with the embedded-graphics 6x10 mono font.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use picoware_core::hal::{Color, DisplayError, DrawSurface, Vector};

/// Panel dimensions
pub const WIDTH: i32 = 320;
pub const HEIGHT: i32 = 320;

/// Pixels sent per SPI transfer when filling
const CHUNK_PIXELS: usize = 64;

/// ILI9488 commands
#[allow(dead_code)]
mod cmd {
    pub const SOFT_RESET: u8 = 0x01;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const INVERT_ON: u8 = 0x21;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDR: u8 = 0x2A;
    pub const PAGE_ADDR: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MEMORY_ACCESS: u8 = 0x36;
    pub const PIXEL_FORMAT: u8 = 0x3A;
    pub const POWER_CONTROL_1: u8 = 0xC0;
    pub const POWER_CONTROL_2: u8 = 0xC1;
    pub const VCOM_CONTROL: u8 = 0xC5;
}

/// ILI9488 panel on an SPI bus with manual chip select
pub struct Ili9488<SPI, CS, DC, RST> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
}

fn pixel_bytes(color: Color) -> [u8; 3] {
    let (r, g, b) = color.channels();
    [r, g, b]
}

impl<SPI, CS, DC, RST> Ili9488<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST) -> Self {
        Self { spi, cs, dc, rst }
    }

    /// Reset and configure the panel, then blank it
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::Communication)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(|_| DisplayError::Communication)?;
        delay.delay_ms(120);

        self.command(cmd::SOFT_RESET, &[])?;
        delay.delay_ms(120);
        self.command(cmd::SLEEP_OUT, &[])?;
        delay.delay_ms(120);

        self.command(cmd::POWER_CONTROL_1, &[0x17, 0x15])?;
        self.command(cmd::POWER_CONTROL_2, &[0x41])?;
        self.command(cmd::VCOM_CONTROL, &[0x00, 0x12, 0x80])?;
        // BGR order, column address flipped for the PicoCalc mounting
        self.command(cmd::MEMORY_ACCESS, &[0x48])?;
        // 18 bits per pixel over SPI
        self.command(cmd::PIXEL_FORMAT, &[0x66])?;
        self.command(cmd::INVERT_ON, &[])?;
        self.command(cmd::DISPLAY_ON, &[])?;
        delay.delay_ms(20);

        self.fill(Vector::ZERO, Vector::new(WIDTH, HEIGHT), Color::BLACK)
    }

    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        self.dc.set_low().map_err(|_| DisplayError::Communication)?;
        let result = self.spi.write(&[command]).and_then(|_| {
            if params.is_empty() {
                return Ok(());
            }
            let _ = self.dc.set_high();
            self.spi.write(params)
        });
        let flushed = self.spi.flush();
        self.cs.set_high().map_err(|_| DisplayError::Communication)?;
        result.and(flushed).map_err(|_| DisplayError::Communication)
    }

    /// Select the inclusive window `from..=to` and start a memory write
    fn window(&mut self, from: Vector, to: Vector) -> Result<(), DisplayError> {
        let [x0h, x0l] = (from.x as u16).to_be_bytes();
        let [x1h, x1l] = (to.x as u16).to_be_bytes();
        let [y0h, y0l] = (from.y as u16).to_be_bytes();
        let [y1h, y1l] = (to.y as u16).to_be_bytes();
        self.command(cmd::COLUMN_ADDR, &[x0h, x0l, x1h, x1l])?;
        self.command(cmd::PAGE_ADDR, &[y0h, y0l, y1h, y1l])?;
        self.command(cmd::MEMORY_WRITE, &[])
    }

    /// Fill a rectangle, clipped to the panel
    pub fn fill(&mut self, at: Vector, size: Vector, color: Color) -> Result<(), DisplayError> {
        let x0 = at.x.max(0);
        let y0 = at.y.max(0);
        let x1 = (at.x + size.x).min(WIDTH);
        let y1 = (at.y + size.y).min(HEIGHT);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        self.window(Vector::new(x0, y0), Vector::new(x1 - 1, y1 - 1))?;

        let pixel = pixel_bytes(color);
        let mut chunk = [0u8; CHUNK_PIXELS * 3];
        for px in chunk.chunks_exact_mut(3) {
            px.copy_from_slice(&pixel);
        }

        let mut remaining = ((x1 - x0) * (y1 - y0)) as usize;
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        self.dc.set_high().map_err(|_| DisplayError::Communication)?;
        let mut result = Ok(());
        while remaining > 0 && result.is_ok() {
            let n = remaining.min(CHUNK_PIXELS);
            result = self.spi.write(&chunk[..n * 3]);
            remaining -= n;
        }
        let flushed = self.spi.flush();
        self.cs.set_high().map_err(|_| DisplayError::Communication)?;
        result.and(flushed).map_err(|_| DisplayError::Communication)
    }
}

impl<SPI, CS, DC, RST> OriginDimensions for Ili9488<SPI, CS, DC, RST> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<SPI, CS, DC, RST> DrawTarget for Ili9488<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let color = Color(RawU16::from(color).into_inner());
            self.fill(Vector::new(point.x, point.y), Vector::new(1, 1), color)?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let at = Vector::new(area.top_left.x, area.top_left.y);
        let size = Vector::new(area.size.width as i32, area.size.height as i32);
        self.fill(at, size, Color(RawU16::from(color).into_inner()))
    }
}

impl<SPI, CS, DC, RST> DrawSurface for Ili9488<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    fn size(&self) -> Vector {
        Vector::new(WIDTH, HEIGHT)
    }

    fn char_size(&self) -> Vector {
        let size = FONT_6X10.character_size;
        Vector::new(size.width as i32, size.height as i32)
    }

    fn pixel(&mut self, at: Vector, color: Color) -> Result<(), DisplayError> {
        self.fill(at, Vector::new(1, 1), color)
    }

    fn fill_rect(&mut self, at: Vector, size: Vector, color: Color) -> Result<(), DisplayError> {
        self.fill(at, size, color)
    }

    fn text(&mut self, at: Vector, text: &str, color: Color) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_6X10, Rgb565::from(RawU16::new(color.raw())));
        Text::with_baseline(text, Point::new(at.x, at.y), style, Baseline::Top).draw(self)?;
        Ok(())
    }

    fn swap(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}
