//! Persisted settings
//!
//! Settings live as JSON on storage:
//!
//! ```text
//! picoware/settings.json        {"dark_mode": true, "frame_interval_ms": 33}
//! picoware/wifi/settings.json   {"ssid": "...", "password": "..."}
//! ```

use alloc::string::String;

use picoware_hal::storage;
use picoware_hal::{Storage, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::theme::Theme;

/// Location of the system settings document
pub const SETTINGS_PATH: &str = "picoware/settings.json";

/// Location of the saved WiFi credentials
pub const WIFI_SETTINGS_PATH: &str = "picoware/wifi/settings.json";

/// Frame interval bounds (ms)
pub const MIN_FRAME_INTERVAL_MS: u32 = 10;
pub const MAX_FRAME_INTERVAL_MS: u32 = 1000;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Storage operation failed
    Storage(StorageError),
    /// Document is not valid JSON for the expected type
    Parse,
    /// Document could not be encoded
    Serialize,
}

impl From<StorageError> for SettingsError {
    fn from(e: StorageError) -> Self {
        SettingsError::Storage(e)
    }
}

/// Read and decode a JSON document
pub fn load_json<T: DeserializeOwned>(store: &mut dyn Storage, path: &str) -> Result<T, SettingsError> {
    let bytes = store.read(path)?;
    serde_json::from_slice(&bytes).map_err(|_| SettingsError::Parse)
}

/// Encode and write a JSON document, creating its directory first
pub fn save_json<T: Serialize>(store: &mut dyn Storage, path: &str, value: &T) -> Result<(), SettingsError> {
    let bytes = serde_json::to_vec(value).map_err(|_| SettingsError::Serialize)?;
    let dir = storage::parent(path);
    if !dir.is_empty() && !store.exists(dir) {
        store.mkdir(dir)?;
    }
    store.write(path, &bytes)?;
    Ok(())
}

/// System settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dark theme enabled
    pub dark_mode: bool,
    /// Delay between frames of the main loop
    pub frame_interval_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            frame_interval_ms: 33,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults on any error
    pub fn load(store: &mut dyn Storage) -> Settings {
        if !store.is_mounted() {
            debug!("Storage not mounted, using default settings");
            return Settings::default();
        }

        match load_json::<Settings>(store, SETTINGS_PATH) {
            Ok(settings) => {
                info!("Settings loaded");
                settings.sanitized()
            }
            Err(SettingsError::Storage(StorageError::NotFound)) => {
                debug!("No settings file, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!("Failed to load settings: {:?}, using defaults", e);
                Settings::default()
            }
        }
    }

    /// Persist settings
    pub fn save(&self, store: &mut dyn Storage) -> Result<(), SettingsError> {
        save_json(store, SETTINGS_PATH, self)
    }

    /// Theme derived from these settings
    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.dark_mode)
    }

    /// Clamp values a hand-edited file may have pushed out of range
    pub fn sanitized(mut self) -> Self {
        self.frame_interval_ms = self
            .frame_interval_ms
            .clamp(MIN_FRAME_INTERVAL_MS, MAX_FRAME_INTERVAL_MS);
        self
    }
}

/// Saved WiFi network credentials
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    /// Load saved credentials; `None` if absent, corrupt or empty
    pub fn load(store: &mut dyn Storage) -> Option<WifiCredentials> {
        if !store.is_mounted() {
            return None;
        }

        match load_json::<WifiCredentials>(store, WIFI_SETTINGS_PATH) {
            Ok(creds) if !creds.ssid.is_empty() => Some(creds),
            Ok(_) => None,
            Err(SettingsError::Storage(StorageError::NotFound)) => None,
            Err(e) => {
                warn!("Failed to load WiFi credentials: {:?}", e);
                None
            }
        }
    }

    /// Persist credentials
    pub fn save(&self, store: &mut dyn Storage) -> Result<(), SettingsError> {
        save_json(store, WIFI_SETTINGS_PATH, self)
    }
}
