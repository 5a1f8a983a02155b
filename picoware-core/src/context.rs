//! Shared context handed to every app callback
//!
//! The context owns the platform capabilities and the state shared between
//! views (settings, theme, open alert). Navigation requested from inside a
//! callback is queued here and applied by the manager once the callback has
//! returned.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use picoware_hal::{Button, DrawSurface, InputManager, Storage, System, WifiDriver};

use crate::config::{Settings, Theme};
use crate::error::{AppError, Capability};
use crate::ui::Alert;
use crate::view::View;

/// Hardware capabilities provided by the board
pub struct Platform {
    pub display: Box<dyn DrawSurface>,
    pub input: Box<dyn InputManager>,
    pub storage: Box<dyn Storage>,
    /// `None` on boards without a radio
    pub wifi: Option<Box<dyn WifiDriver>>,
    pub system: Box<dyn System>,
}

/// Navigation requested by an app
pub enum Navigation {
    /// Pop the current view
    Back,
    /// Push and start a registered view
    SwitchTo(&'static str),
    /// Register a view
    Add(View),
}

/// Counters kept for the system info screen and for tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Alerts shown since boot
    pub alerts: u32,
    /// Deferred `switch_to` requests that failed
    pub navigation_failures: u32,
    /// Message of the most recent alert
    pub last_alert: Option<String>,
}

/// Shared context
pub struct Context {
    platform: Platform,
    settings: Settings,
    theme: Theme,
    alert: Option<Alert>,
    diagnostics: Diagnostics,
    requests: Vec<Navigation>,
    /// The screen no longer shows the current view
    dirty: bool,
}

impl Context {
    /// Create a context from board capabilities and loaded settings
    pub fn new(platform: Platform, settings: Settings) -> Self {
        let theme = settings.theme();
        Self {
            platform,
            settings,
            theme,
            alert: None,
            diagnostics: Diagnostics::default(),
            requests: Vec::new(),
            dirty: true,
        }
    }

    // Capabilities

    pub fn display(&mut self) -> &mut dyn DrawSurface {
        self.platform.display.as_mut()
    }

    pub fn input(&mut self) -> &mut dyn InputManager {
        self.platform.input.as_mut()
    }

    pub fn storage(&mut self) -> &mut dyn Storage {
        self.platform.storage.as_mut()
    }

    pub fn system(&mut self) -> &mut dyn System {
        self.platform.system.as_mut()
    }

    /// The radio, if the board has one
    pub fn wifi(&mut self) -> Option<&mut (dyn WifiDriver + 'static)> {
        self.platform.wifi.as_deref_mut()
    }

    pub fn has_wifi(&self) -> bool {
        self.platform.wifi.is_some()
    }

    /// The radio, or `Unavailable(Wifi)`
    pub fn require_wifi(&mut self) -> Result<&mut (dyn WifiDriver + 'static), AppError> {
        self.platform
            .wifi
            .as_deref_mut()
            .ok_or(AppError::Unavailable(Capability::Wifi))
    }

    /// Fail with `Unavailable(Storage)` when no medium is mounted
    pub fn require_storage(&mut self) -> Result<&mut dyn Storage, AppError> {
        if !self.platform.storage.is_mounted() {
            return Err(AppError::Unavailable(Capability::Storage));
        }
        let storage: &mut dyn Storage = self.platform.storage.as_mut();
        Ok(storage)
    }

    /// Milliseconds since boot
    pub fn millis(&self) -> u64 {
        self.platform.system.millis()
    }

    // Input

    /// The latched button without consuming it
    pub fn button(&self) -> Option<Button> {
        self.platform.input.button()
    }

    /// Consume the latched button, resetting the input latch
    pub fn take_button(&mut self) -> Option<Button> {
        let button = self.platform.input.button()?;
        self.platform.input.reset();
        Some(button)
    }

    // Settings and theme

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Replace the settings, apply the theme and persist them
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), AppError> {
        self.theme = settings.theme();
        self.settings = settings;
        self.settings.save(self.platform.storage.as_mut())?;
        info!("Settings saved");
        Ok(())
    }

    // Navigation (applied by the manager after the callback returns)

    /// Pop the current view
    pub fn back(&mut self) {
        self.requests.push(Navigation::Back);
    }

    /// Push and start the view registered as `name`
    pub fn switch_to(&mut self, name: &'static str) {
        self.requests.push(Navigation::SwitchTo(name));
    }

    /// Register a view; ignored if the name is already taken
    pub fn add_view(&mut self, view: View) {
        self.requests.push(Navigation::Add(view));
    }

    pub(crate) fn take_requests(&mut self) -> Vec<Navigation> {
        core::mem::take(&mut self.requests)
    }

    pub(crate) fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    // Redraw

    /// Ask the current view to redraw everything on its next frame
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check and clear the redraw request
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    // Alerts

    /// Draw an alert immediately and keep it open until a button dismisses it
    pub fn alert(&mut self, title: &str, message: &str) {
        let alert = Alert::new(title, message);
        let theme = self.theme;
        if let Err(e) = alert.draw(self.platform.display.as_mut(), &theme) {
            error!("Failed to draw alert: {:?}", e);
        }
        warn!("Alert: {}", message);
        self.diagnostics.alerts += 1;
        self.diagnostics.last_alert = Some(String::from(message));
        self.alert = Some(alert);
    }

    /// Check if an alert is waiting to be dismissed
    pub fn alert_open(&self) -> bool {
        self.alert.is_some()
    }

    pub(crate) fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn record_navigation_failure(&mut self) {
        self.diagnostics.navigation_failures += 1;
    }
}
