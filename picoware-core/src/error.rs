//! Error taxonomy
//!
//! `AppError` is what app callbacks return; the View adapter turns any `Err`
//! into an on-screen alert. `NavError` is what navigation operations on the
//! manager return.

use core::fmt;

use picoware_hal::{DisplayError, StorageError, WifiError};

use crate::config::SettingsError;

/// Hardware capabilities an app may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability {
    Wifi,
    Storage,
    Keyboard,
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Wifi => "WiFi",
            Capability::Storage => "SD card",
            Capability::Keyboard => "Keyboard",
        }
    }
}

/// Errors returned by app callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    /// Required hardware is missing or not ready
    Unavailable(Capability),
    /// Drawing failed
    Display(DisplayError),
    /// Storage I/O failed
    Storage(StorageError),
    /// Radio request failed
    Wifi(WifiError),
    /// Settings could not be saved
    Settings(SettingsError),
    /// App-specific invariant violated
    Invalid(&'static str),
}

impl From<DisplayError> for AppError {
    fn from(e: DisplayError) -> Self {
        AppError::Display(e)
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Storage(e)
    }
}

impl From<WifiError> for AppError {
    fn from(e: WifiError) -> Self {
        AppError::Wifi(e)
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::Settings(e)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unavailable(cap) => write!(f, "{} is not available", cap.label()),
            AppError::Display(e) => write!(f, "Display error: {:?}", e),
            AppError::Storage(e) => write!(f, "Storage error: {:?}", e),
            AppError::Wifi(e) => write!(f, "WiFi error: {:?}", e),
            AppError::Settings(e) => write!(f, "Settings error: {:?}", e),
            AppError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Errors from navigation operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavError {
    /// No view registered under that name
    UnknownView,
    /// A view with that name is already registered
    DuplicateView,
    /// The view is already on the navigation stack below the top
    AlreadyOnStack,
    /// The view is on the navigation stack and cannot be removed
    InUse,
    /// The view's start callback failed or declined
    StartFailed,
    /// Back was requested with only the root view on the stack
    AtRoot,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NavError::UnknownView => "unknown view",
            NavError::DuplicateView => "view already registered",
            NavError::AlreadyOnStack => "view already on stack",
            NavError::InUse => "view is on the stack",
            NavError::StartFailed => "view failed to start",
            NavError::AtRoot => "already at root view",
        };
        f.write_str(msg)
    }
}
