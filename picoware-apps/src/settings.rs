//! System settings
//!
//! Toggles are applied immediately and persisted to storage. A failed save
//! keeps the new value for this session and tells the user.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use picoware_core::config::Settings;
use picoware_core::ui::{Menu, MenuAction};
use picoware_core::{App, AppError, Context};

use crate::registry;

/// Frame interval presets offered by the menu (ms)
const FRAME_PRESETS: [u32; 4] = [16, 33, 50, 100];

const ITEM_DARK_MODE: usize = 0;
const ITEM_FRAME: usize = 1;
const ITEM_WIFI: usize = 2;
const ITEM_SYSTEM_INFO: usize = 3;

pub struct SettingsApp {
    menu: Menu,
}

impl Default for SettingsApp {
    fn default() -> Self {
        Self {
            menu: Menu::new("Settings", Vec::<String>::new()),
        }
    }
}

fn items(settings: &Settings) -> [String; 4] {
    [
        format!("Dark mode: {}", if settings.dark_mode { "On" } else { "Off" }),
        format!("Frame time: {} ms", settings.frame_interval_ms),
        String::from("WiFi"),
        String::from("System Info"),
    ]
}

/// Preset following `current`, wrapping around
fn next_frame_interval(current: u32) -> u32 {
    FRAME_PRESETS
        .iter()
        .copied()
        .find(|preset| *preset > current)
        .unwrap_or(FRAME_PRESETS[0])
}

impl SettingsApp {
    fn apply(&mut self, ctx: &mut Context, settings: Settings) {
        if let Err(e) = ctx.update_settings(settings) {
            warn!("Settings not saved: {:?}", e);
            ctx.alert("Settings", "Could not save settings");
        }
        self.menu.set_items(items(ctx.settings()));
    }
}

impl App for SettingsApp {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        self.menu.set_items(items(ctx.settings()));
        self.menu.set_selected(0);
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let mut dirty = ctx.take_dirty();

        if let Some(button) = ctx.take_button() {
            match self.menu.handle(button) {
                MenuAction::Moved => dirty = true,
                MenuAction::Selected(ITEM_DARK_MODE) => {
                    let mut settings = ctx.settings().clone();
                    settings.dark_mode = !settings.dark_mode;
                    self.apply(ctx, settings);
                    dirty = true;
                }
                MenuAction::Selected(ITEM_FRAME) => {
                    let mut settings = ctx.settings().clone();
                    settings.frame_interval_ms = next_frame_interval(settings.frame_interval_ms);
                    self.apply(ctx, settings);
                    dirty = true;
                }
                MenuAction::Selected(ITEM_WIFI) => registry::launch(ctx, "wifi")?,
                MenuAction::Selected(ITEM_SYSTEM_INFO) => registry::launch(ctx, "system_info")?,
                MenuAction::Selected(_) | MenuAction::Ignored => {}
                MenuAction::Back => ctx.back(),
            }
        }

        // An alert raised above owns the screen until dismissed
        if dirty && !ctx.alert_open() {
            let theme = ctx.theme();
            self.menu.draw(ctx.display(), &theme)?;
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        ctx.system().reclaim();
        Ok(())
    }
}
