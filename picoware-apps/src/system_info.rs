//! System information screen, refreshed once a second

use alloc::format;
use alloc::string::String;

use picoware_core::hal::WifiStatus;
use picoware_core::ui::{TextBox, TextBoxAction};
use picoware_core::{App, AppError, Context};

const REFRESH_MS: u64 = 1000;

pub struct SystemInfo {
    text: TextBox,
    refreshed_at: u64,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            text: TextBox::new("System Info", ""),
            refreshed_at: 0,
        }
    }
}

/// `h:mm:ss` since boot
fn format_uptime(millis: u64) -> String {
    let secs = millis / 1000;
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

fn wifi_line(ctx: &mut Context) -> String {
    let Some(wifi) = ctx.wifi() else {
        return String::from("not present");
    };
    match wifi.status() {
        WifiStatus::Connected => match wifi.connected_ssid() {
            Some(ssid) => format!("connected to {}", ssid),
            None => String::from("connected"),
        },
        WifiStatus::Connecting => String::from("connecting"),
        WifiStatus::Scanning => String::from("scanning"),
        WifiStatus::Disconnected => String::from("disconnected"),
    }
}

impl SystemInfo {
    fn refresh(&mut self, ctx: &mut Context) {
        let now = ctx.millis();
        let free_heap = ctx.system().free_heap();
        let size = ctx.display().size();
        let mounted = ctx.storage().is_mounted();
        let wifi = wifi_line(ctx);
        let diagnostics = ctx.diagnostics();

        let mut body = String::new();
        body.push_str(&format!("Free heap: {} bytes\n", free_heap));
        body.push_str(&format!("Uptime: {}\n", format_uptime(now)));
        body.push_str(&format!("Screen: {}x{}\n", size.x, size.y));
        body.push_str(&format!("Theme: {}\n", if ctx.settings().dark_mode { "dark" } else { "light" }));
        body.push_str(&format!("Storage: {}\n", if mounted { "mounted" } else { "not mounted" }));
        body.push_str(&format!("WiFi: {}\n", wifi));
        body.push_str(&format!("Alerts shown: {}", diagnostics.alerts));

        self.text.set_text(&body);
        self.refreshed_at = now;
        ctx.mark_dirty();
    }
}

impl App for SystemInfo {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        self.refresh(ctx);
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if ctx.millis().saturating_sub(self.refreshed_at) >= REFRESH_MS {
            self.refresh(ctx);
        }

        if let Some(button) = ctx.take_button() {
            match self.text.handle(button) {
                TextBoxAction::Scrolled => ctx.mark_dirty(),
                TextBoxAction::Back => ctx.back(),
                TextBoxAction::Ignored => {}
            }
        }

        if ctx.take_dirty() {
            let theme = ctx.theme();
            self.text.draw(ctx.display(), &theme)?;
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        self.text.set_text("");
        ctx.system().reclaim();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picoware_core::config::Settings;
    use picoware_core::hal::Button;
    use picoware_core::testing::TestPlatform;
    use picoware_core::{View, ViewManager};

    fn open(platform: &TestPlatform) -> ViewManager {
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        vm.add(View::new("root", crate::library::Library::default())).unwrap();
        vm.add(View::new("info", SystemInfo::default())).unwrap();
        vm.switch_to("root").unwrap();
        vm.switch_to("info").unwrap();
        vm.tick();
        vm
    }

    #[test]
    fn test_uptime_format() {
        assert_eq!(format_uptime(0), "0:00:00");
        assert_eq!(format_uptime(3_723_000), "1:02:03");
    }

    #[test]
    fn test_shows_platform_facts() {
        let platform = TestPlatform::new();
        platform.system.set_free_heap(4096);
        let _vm = open(&platform);

        assert!(platform.display.contains_text("Free heap: 4096 bytes"));
        assert!(platform.display.contains_text("Screen: 320x320"));
        assert!(platform.display.contains_text("WiFi: disconnected"));
    }

    #[test]
    fn test_without_radio() {
        let platform = TestPlatform::without_wifi();
        let _vm = open(&platform);
        assert!(platform.display.contains_text("WiFi: not present"));
    }

    #[test]
    fn test_refreshes_every_second() {
        let platform = TestPlatform::new();
        let mut vm = open(&platform);

        platform.system.advance(500);
        platform.display.clear_log();
        vm.tick();
        assert!(platform.display.texts().is_empty());

        platform.system.advance(600);
        vm.tick();
        assert!(platform.display.contains_text("Uptime: 0:00:01"));
    }

    #[test]
    fn test_back_leaves_and_reclaims() {
        let platform = TestPlatform::new();
        let mut vm = open(&platform);
        platform.input.press(Button::Back);
        vm.tick();
        assert_eq!(vm.current(), Some("root"));
        assert_eq!(platform.system.reclaims(), 1);
    }
}
