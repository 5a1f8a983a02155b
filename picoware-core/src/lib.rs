//! Board-agnostic view shell for Picoware
//!
//! This crate contains everything between the hardware capabilities and the
//! leaf apps:
//!
//! - View lifecycle (`start`/`run`/`stop` with error isolation)
//! - ViewManager navigation stack and frame dispatch
//! - Shared context handed to every app
//! - Settings persistence and theming
//! - Indexed file tree for boards that only offer a key-value store
//! - UI widgets (menu, text box, line editor, alert)

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "defmt")]
    pub use defmt;
}

pub mod config;
pub mod context;
pub mod error;
pub mod store;
pub mod ui;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use context::{Context, Diagnostics, Platform};
pub use error::{AppError, Capability, NavError};
pub use view::{App, View, ViewManager, ViewState};

pub use picoware_hal as hal;
