//! WiFi radio abstraction
//!
//! Radio operations are requests: `scan` and `connect` return as soon as the
//! request is accepted and the outcome arrives later as a [`WifiEvent`].
//! Events are edge-triggered; `take_event` hands each one out exactly once.

use alloc::string::String;
use alloc::vec::Vec;

/// Radio connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiStatus {
    Disconnected,
    Scanning,
    Connecting,
    Connected,
}

/// Errors reported by the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiError {
    /// Another request is still pending
    Busy,
    /// Access point rejected the credentials
    AuthFailed,
    /// Requested SSID is not in range
    NetworkNotFound,
    /// No answer within the driver's deadline
    Timeout,
    /// Radio hardware fault
    Hardware,
}

/// A network found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub ssid: String,
    /// Signal strength in dBm
    pub rssi: i16,
    /// Whether the network requires a password
    pub secured: bool,
}

/// Completion of a radio request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiEvent {
    /// Scan finished with the networks in range
    ScanComplete(Vec<Network>),
    /// Association succeeded
    Connected,
    /// Association failed
    ConnectFailed(WifiError),
    /// Link dropped
    Disconnected,
}

/// WiFi driver trait
pub trait WifiDriver {
    /// Current status
    fn status(&self) -> WifiStatus;

    /// Start a scan; completes with [`WifiEvent::ScanComplete`]
    fn scan(&mut self) -> Result<(), WifiError>;

    /// Start connecting; completes with `Connected` or `ConnectFailed`
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError>;

    /// Drop the current association
    fn disconnect(&mut self) -> Result<(), WifiError>;

    /// Abandon any pending request and discard undelivered events
    fn cancel(&mut self);

    /// Take the next completion event, if one has arrived
    fn take_event(&mut self) -> Option<WifiEvent>;

    /// SSID of the current association
    fn connected_ssid(&self) -> Option<String>;

    /// Check if the radio is associated
    fn is_connected(&self) -> bool {
        self.status() == WifiStatus::Connected
    }
}
