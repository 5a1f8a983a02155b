//! Configuration
//!
//! Settings are small JSON documents on storage. Loading never fails: a
//! missing or corrupt file yields the defaults.

pub mod settings;
pub mod theme;

pub use settings::{
    load_json, save_json, Settings, SettingsError, WifiCredentials, SETTINGS_PATH,
    WIFI_SETTINGS_PATH,
};
pub use theme::Theme;
