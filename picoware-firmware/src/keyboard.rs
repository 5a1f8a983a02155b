//! PicoCalc keyboard
//!
//! The keyboard controller sits on I2C at 0x1F and queues key events in a
//! FIFO. Reading the FIFO register returns a `(state, key)` pair; an empty
//! FIFO reads as state 0. Only presses are latched.

use core::cell::{Cell, RefCell};

use defmt::*;
use embedded_hal::i2c::I2c;

use picoware_core::hal::{Button, InputManager};

/// Keyboard controller address
pub const KEYBOARD_ADDR: u8 = 0x1F;

/// FIFO read register
const REG_FIFO: u8 = 0x09;

/// Key states reported with each FIFO entry
const STATE_PRESSED: u8 = 1;

/// Key codes
mod key {
    pub const BACKSPACE: u8 = 0x08;
    pub const TAB: u8 = 0x09;
    pub const ENTER: u8 = 0x0A;
    pub const ESC: u8 = 0xB1;
    pub const LEFT: u8 = 0xB4;
    pub const UP: u8 = 0xB5;
    pub const DOWN: u8 = 0xB6;
    pub const RIGHT: u8 = 0xB7;
    pub const HOME: u8 = 0xD2;
}

/// Map a key code to a button
pub fn decode(code: u8) -> Option<Button> {
    match code {
        key::BACKSPACE => Some(Button::Backspace),
        key::TAB => Some(Button::Tab),
        key::ENTER => Some(Button::Center),
        key::ESC => Some(Button::Back),
        key::LEFT => Some(Button::Left),
        key::UP => Some(Button::Up),
        key::DOWN => Some(Button::Down),
        key::RIGHT => Some(Button::Right),
        key::HOME => Some(Button::Home),
        0x20..=0x7E => Some(Button::Char(code as char)),
        _ => None,
    }
}

/// Latching keyboard reader
///
/// The FIFO is polled whenever nothing is latched, so a press is picked up
/// the first time an app asks for input.
pub struct Keyboard<I2C> {
    i2c: RefCell<I2C>,
    latched: Cell<Option<Button>>,
}

impl<I2C: I2c> Keyboard<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c: RefCell::new(i2c),
            latched: Cell::new(None),
        }
    }

    /// Read one FIFO entry, returning the press it carries
    fn poll(&self) -> Option<Button> {
        let mut entry = [0u8; 2];
        let result = self.i2c.borrow_mut().write_read(KEYBOARD_ADDR, &[REG_FIFO], &mut entry);
        if result.is_err() {
            trace!("Keyboard read failed");
            return None;
        }
        let [state, code] = entry;
        if state != STATE_PRESSED {
            return None;
        }
        let button = decode(code);
        if button.is_none() {
            debug!("Unmapped key code {:#x}", code);
        }
        button
    }
}

impl<I2C: I2c> InputManager for Keyboard<I2C> {
    fn button(&self) -> Option<Button> {
        if self.latched.get().is_none() {
            self.latched.set(self.poll());
        }
        self.latched.get()
    }

    fn reset(&mut self) {
        self.latched.set(None);
    }
}
