//! WiFi setup wizard
//!
//! ```text
//! Status ──scan──▶ Scanning ──results──▶ Networks ──pick──▶ Password
//!   ▲                 │ESC                 │ESC               │ENTER
//!   ├─────────────────┘                    │                  ▼
//!   ├──────────────────────────────────────┘             Connecting
//!   └────────────────────── connected / failed / ESC ─────────┘
//! ```
//!
//! Radio requests are non-blocking. Each frame polls the driver for the
//! completion event of the request in flight.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use picoware_core::config::WifiCredentials;
use picoware_core::hal::{Button, Network, WifiEvent};
use picoware_core::ui::{EditorEvent, LineEditor, Menu, MenuAction, TextBox};
use picoware_core::{App, AppError, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Status,
    Scanning,
    Networks,
    Password,
    Connecting,
}

/// Entries of the status menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Scan,
    ConnectSaved,
    Disconnect,
}

pub struct WifiApp {
    stage: Stage,
    menu: Menu,
    actions: Vec<Action>,
    networks: Vec<Network>,
    editor: LineEditor,
    progress: TextBox,
    saved: Option<WifiCredentials>,
    /// Network being joined
    target: Option<WifiCredentials>,
}

impl Default for WifiApp {
    fn default() -> Self {
        Self {
            stage: Stage::Status,
            menu: Menu::new("WiFi", Vec::<String>::new()),
            actions: Vec::new(),
            networks: Vec::new(),
            editor: LineEditor::masked("Password"),
            progress: TextBox::new("WiFi", ""),
            saved: None,
            target: None,
        }
    }
}

/// Strongest signal first, one entry per SSID, hidden networks dropped
fn prepare_networks(mut networks: Vec<Network>) -> Vec<Network> {
    networks.retain(|n| !n.ssid.is_empty());
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    let mut unique: Vec<Network> = Vec::with_capacity(networks.len());
    for network in networks {
        if !unique.iter().any(|n| n.ssid == network.ssid) {
            unique.push(network);
        }
    }
    unique
}

impl WifiApp {
    fn show_status(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let wifi = ctx.require_wifi()?;
        let title = match wifi.connected_ssid() {
            Some(ssid) => format!("WiFi: {}", ssid),
            None => String::from("WiFi: not connected"),
        };
        let connected = wifi.is_connected();

        self.actions.clear();
        self.actions.push(Action::Scan);
        if self.saved.is_some() && !connected {
            self.actions.push(Action::ConnectSaved);
        }
        if connected {
            self.actions.push(Action::Disconnect);
        }

        let saved_ssid = self.saved.as_ref().map(|c| c.ssid.as_str()).unwrap_or("");
        let labels: Vec<String> = self
            .actions
            .iter()
            .map(|action| match action {
                Action::Scan => String::from("Scan networks"),
                Action::ConnectSaved => format!("Connect to {}", saved_ssid),
                Action::Disconnect => String::from("Disconnect"),
            })
            .collect();

        self.menu.set_title(&title);
        self.menu.set_items(labels);
        self.menu.set_selected(0);
        self.stage = Stage::Status;
        ctx.mark_dirty();
        Ok(())
    }

    fn show_progress(&mut self, ctx: &mut Context, stage: Stage, message: &str) {
        self.progress.set_text(message);
        self.progress.push_line("");
        self.progress.push_line("ESC to cancel");
        self.stage = stage;
        ctx.mark_dirty();
    }

    fn begin_scan(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        ctx.require_wifi()?.scan()?;
        info!("WiFi scan started");
        self.show_progress(ctx, Stage::Scanning, "Scanning...");
        Ok(())
    }

    fn begin_connect(&mut self, ctx: &mut Context, creds: WifiCredentials) -> Result<(), AppError> {
        ctx.require_wifi()?.connect(&creds.ssid, &creds.password)?;
        info!("Connecting to {}", creds.ssid.as_str());
        let message = format!("Connecting to {}...", creds.ssid);
        self.target = Some(creds);
        self.show_progress(ctx, Stage::Connecting, &message);
        Ok(())
    }

    /// Save the credentials, then connect with them
    fn submit_password(&mut self, ctx: &mut Context, password: String) -> Result<(), AppError> {
        let Some(ssid) = self.target.take().map(|t| t.ssid) else {
            return self.show_status(ctx);
        };
        let creds = WifiCredentials { ssid, password };

        match creds.save(ctx.storage()) {
            Ok(()) => self.saved = Some(creds.clone()),
            Err(e) => {
                warn!("Credentials not saved: {:?}", e);
                ctx.alert("WiFi", "Could not save credentials");
            }
        }
        self.begin_connect(ctx, creds)
    }

    fn cancel_request(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        ctx.require_wifi()?.cancel();
        debug!("WiFi request cancelled");
        self.target = None;
        self.show_status(ctx)
    }

    fn on_event(&mut self, ctx: &mut Context, event: WifiEvent) -> Result<(), AppError> {
        match (self.stage, event) {
            (Stage::Scanning, WifiEvent::ScanComplete(found)) => {
                self.networks = prepare_networks(found);
                info!("Scan found {} networks", self.networks.len());
                if self.networks.is_empty() {
                    self.show_status(ctx)?;
                    ctx.alert("WiFi", "No networks found");
                    return Ok(());
                }
                let labels: Vec<String> = self
                    .networks
                    .iter()
                    .map(|n| format!("{} ({} dBm){}", n.ssid, n.rssi, if n.secured { " *" } else { "" }))
                    .collect();
                self.menu.set_title("Networks");
                self.menu.set_items(labels);
                self.menu.set_selected(0);
                self.stage = Stage::Networks;
                ctx.mark_dirty();
            }
            (Stage::Connecting, WifiEvent::Connected) => {
                self.target = None;
                self.show_status(ctx)?;
            }
            (Stage::Connecting, WifiEvent::ConnectFailed(e)) => {
                self.target = None;
                self.show_status(ctx)?;
                let message = AppError::from(e).to_string();
                ctx.alert("Connection failed", &message);
            }
            (Stage::Status, _) => self.show_status(ctx)?,
            (_, _) => debug!("Ignoring stale WiFi event"),
        }
        Ok(())
    }

    fn on_button(&mut self, ctx: &mut Context, button: Button) -> Result<(), AppError> {
        match self.stage {
            Stage::Status => match self.menu.handle(button) {
                MenuAction::Moved => ctx.mark_dirty(),
                MenuAction::Selected(index) => match self.actions.get(index).copied() {
                    Some(Action::Scan) => self.begin_scan(ctx)?,
                    Some(Action::ConnectSaved) => {
                        if let Some(creds) = self.saved.clone() {
                            self.begin_connect(ctx, creds)?;
                        }
                    }
                    Some(Action::Disconnect) => {
                        ctx.require_wifi()?.disconnect()?;
                        self.show_status(ctx)?;
                    }
                    None => {}
                },
                MenuAction::Back => ctx.back(),
                MenuAction::Ignored => {}
            },
            Stage::Scanning | Stage::Connecting => {
                if button == Button::Back {
                    self.cancel_request(ctx)?;
                }
            }
            Stage::Networks => match self.menu.handle(button) {
                MenuAction::Moved => ctx.mark_dirty(),
                MenuAction::Selected(index) => {
                    let picked = self.networks.get(index).map(|n| (n.ssid.clone(), n.secured));
                    match picked {
                        Some((ssid, true)) => {
                            self.editor.clear();
                            if let Some(saved) = self.saved.as_ref().filter(|s| s.ssid == ssid) {
                                self.editor.set_text(&saved.password);
                            }
                            self.target = Some(WifiCredentials {
                                ssid,
                                password: String::new(),
                            });
                            self.stage = Stage::Password;
                            ctx.mark_dirty();
                        }
                        Some((ssid, false)) => {
                            let creds = WifiCredentials {
                                ssid,
                                password: String::new(),
                            };
                            self.begin_connect(ctx, creds)?;
                        }
                        None => {}
                    }
                }
                MenuAction::Back => self.show_status(ctx)?,
                MenuAction::Ignored => {}
            },
            Stage::Password => match self.editor.handle(button) {
                Some(EditorEvent::Submitted(password)) => self.submit_password(ctx, password)?,
                Some(EditorEvent::Cancelled) => {
                    self.target = None;
                    self.stage = Stage::Networks;
                    ctx.mark_dirty();
                }
                None => ctx.mark_dirty(),
            },
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let theme = ctx.theme();
        let display = ctx.display();
        match self.stage {
            Stage::Status | Stage::Networks => self.menu.draw(display, &theme)?,
            Stage::Scanning | Stage::Connecting => self.progress.draw(display, &theme)?,
            Stage::Password => self.editor.draw(display, &theme)?,
        }
        Ok(())
    }
}

impl App for WifiApp {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        ctx.require_wifi()?;
        self.networks.clear();
        self.target = None;
        self.editor.clear();
        self.saved = WifiCredentials::load(ctx.storage());
        self.show_status(ctx)?;
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if let Some(event) = ctx.require_wifi()?.take_event() {
            self.on_event(ctx, event)?;
        }

        if let Some(button) = ctx.take_button() {
            self.on_button(ctx, button)?;
        }

        if ctx.take_dirty() && !ctx.alert_open() {
            self.draw(ctx)?;
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if matches!(self.stage, Stage::Scanning | Stage::Connecting) {
            if let Some(wifi) = ctx.wifi() {
                wifi.cancel();
            }
        }
        self.stage = Stage::Status;
        self.networks.clear();
        self.target = None;
        self.editor.clear();
        ctx.system().reclaim();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picoware_core::config::{Settings, WIFI_SETTINGS_PATH};
    use picoware_core::hal::{Button, WifiError};
    use picoware_core::testing::TestPlatform;
    use picoware_core::{NavError, View, ViewManager};

    fn manager(platform: &TestPlatform) -> ViewManager {
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        vm.add(View::new("wifi", WifiApp::default())).unwrap();
        vm
    }

    fn open(platform: &TestPlatform) -> ViewManager {
        let mut vm = manager(platform);
        vm.switch_to("wifi").unwrap();
        vm.tick();
        vm
    }

    fn press(vm: &mut ViewManager, platform: &TestPlatform, button: Button) {
        platform.input.press(button);
        vm.tick();
    }

    #[test]
    fn test_start_fails_without_radio() {
        let platform = TestPlatform::without_wifi();
        let mut vm = manager(&platform);

        assert_eq!(vm.switch_to("wifi"), Err(NavError::StartFailed));
        assert_eq!(vm.depth(), 0);
        assert!(platform.display.contains_text("WiFi is not available"));
    }

    #[test]
    fn test_scan_pick_password_connect() {
        let platform = TestPlatform::new();
        let wifi = platform.wifi();
        wifi.set_networks(&[("cafe", -70, false), ("home", -40, true), ("home", -80, true)]);
        let mut vm = open(&platform);
        assert!(platform.display.contains_text("WiFi: not connected"));

        press(&mut vm, &platform, Button::Center);
        assert_eq!(wifi.scans(), 1);
        assert!(platform.display.contains_text("Scanning..."));

        wifi.complete_pending();
        vm.tick();
        assert!(platform.display.contains_text("home (-40 dBm) *"));

        // Strongest first, so "home" is selected
        press(&mut vm, &platform, Button::Center);
        platform.input.type_text("hunter22");
        for _ in 0..8 {
            vm.tick();
        }
        press(&mut vm, &platform, Button::Center);

        assert_eq!(wifi.connects(), [(String::from("home"), String::from("hunter22"))]);
        let saved = platform.storage.file(WIFI_SETTINGS_PATH).unwrap();
        assert!(core::str::from_utf8(&saved).unwrap().contains("hunter22"));

        wifi.complete_pending();
        vm.tick();
        assert!(platform.display.contains_text("WiFi: home"));
        assert!(platform.display.contains_text("Disconnect"));
    }

    #[test]
    fn test_open_network_connects_without_password() {
        let platform = TestPlatform::new();
        let wifi = platform.wifi();
        wifi.set_networks(&[("cafe", -70, false)]);
        let mut vm = open(&platform);

        press(&mut vm, &platform, Button::Center);
        wifi.complete_pending();
        vm.tick();
        press(&mut vm, &platform, Button::Center);

        assert_eq!(wifi.connects(), [(String::from("cafe"), String::new())]);
    }

    #[test]
    fn test_back_cancels_scan() {
        let platform = TestPlatform::new();
        let wifi = platform.wifi();
        let mut vm = open(&platform);

        press(&mut vm, &platform, Button::Center);
        assert!(wifi.has_pending());

        press(&mut vm, &platform, Button::Back);
        assert!(!wifi.has_pending());
        assert_eq!(wifi.cancels(), 1);
        assert_eq!(vm.current(), Some("wifi"));
    }

    #[test]
    fn test_connect_failure_alerts() {
        let platform = TestPlatform::new();
        let wifi = platform.wifi();
        platform
            .storage
            .insert(WIFI_SETTINGS_PATH, br#"{"ssid": "home", "password": "wrong"}"#);
        wifi.set_connect_result(Err(WifiError::AuthFailed));
        let mut vm = open(&platform);
        assert!(platform.display.contains_text("Connect to home"));

        press(&mut vm, &platform, Button::Down);
        press(&mut vm, &platform, Button::Center);
        assert_eq!(wifi.connects().len(), 1);

        wifi.complete_pending();
        vm.tick();
        assert!(vm.context().alert_open());
        assert!(platform.display.contains_text("AuthFailed"));
        assert_eq!(vm.current(), Some("wifi"));
    }

    #[test]
    fn test_empty_scan_returns_to_status() {
        let platform = TestPlatform::new();
        let wifi = platform.wifi();
        let mut vm = open(&platform);

        press(&mut vm, &platform, Button::Center);
        wifi.complete_pending();
        vm.tick();

        assert!(vm.context().alert_open());
        assert!(platform.display.contains_text("No networks found"));
    }

    #[test]
    fn test_stop_cancels_pending_request() {
        let platform = TestPlatform::new();
        let wifi = platform.wifi();
        let mut vm = manager(&platform);
        vm.add(View::new("root", crate::library::Library::default())).unwrap();
        vm.switch_to("root").unwrap();
        vm.switch_to("wifi").unwrap();
        vm.tick();

        press(&mut vm, &platform, Button::Center);
        assert!(wifi.has_pending());

        vm.back().unwrap();
        assert!(!wifi.has_pending());
        assert_eq!(wifi.cancels(), 1);
    }

    #[test]
    fn test_prepare_networks() {
        let net = |ssid: &str, rssi| Network {
            ssid: String::from(ssid),
            rssi,
            secured: true,
        };
        let out = prepare_networks(alloc::vec![net("a", -80), net("", -10), net("b", -50), net("a", -30)]);
        let names: Vec<(&str, i16)> = out.iter().map(|n| (n.ssid.as_str(), n.rssi)).collect();
        assert_eq!(names, [("a", -30), ("b", -50)]);
    }
}
