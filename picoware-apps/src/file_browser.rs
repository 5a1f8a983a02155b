//! File browser
//!
//! Walks the storage tree. Directories open in place, files open in a
//! read-only text viewer. BACK goes up one level, or leaves at the root.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use picoware_core::hal::storage::{self, DirEntry};
use picoware_core::hal::StorageError;
use picoware_core::ui::{text, Menu, MenuAction, TextBox, TextBoxAction};
use picoware_core::{App, AppError, Context};

/// Characters shown from a file; the rest is cut
const MAX_VIEW_CHARS: usize = 8 * 1024;

#[derive(Default)]
pub struct FileBrowser {
    /// Current directory, normalized
    dir: String,
    entries: Vec<DirEntry>,
    menu: Option<Menu>,
    viewer: Option<TextBox>,
}

fn label(entry: &DirEntry) -> String {
    if entry.is_dir {
        format!("{}/", entry.name)
    } else {
        format!("{} ({} B)", entry.name, entry.size)
    }
}

impl FileBrowser {
    /// List `dir` and select the entry named `select`, if present
    fn open_dir(&mut self, ctx: &mut Context, dir: String, select: Option<&str>) -> Result<(), AppError> {
        let entries = ctx.require_storage()?.list(&dir)?;
        debug!("Listed {} ({} entries)", dir.as_str(), entries.len());

        let title = format!("/{}", dir);
        let mut menu = if entries.is_empty() {
            Menu::new(&title, ["(empty)"])
        } else {
            Menu::new(&title, entries.iter().map(label))
        };
        if let Some(index) = select.and_then(|name| entries.iter().position(|e| e.name == name)) {
            menu.set_selected(index);
        }

        self.dir = dir;
        self.entries = entries;
        self.menu = Some(menu);
        ctx.mark_dirty();
        Ok(())
    }

    fn open_file(&mut self, ctx: &mut Context, name: &str) -> Result<(), AppError> {
        let path = storage::join(&self.dir, name);
        let body = match ctx.require_storage()?.read_to_string(&path) {
            Ok(body) => String::from(text::truncate(&body, MAX_VIEW_CHARS)),
            Err(StorageError::Corrupted) => String::from("<binary file>"),
            Err(e) => return Err(e.into()),
        };
        self.viewer = Some(TextBox::new(name, &body));
        ctx.mark_dirty();
        Ok(())
    }

    fn go_up(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if self.dir.is_empty() {
            ctx.back();
            return Ok(());
        }
        let child = String::from(storage::file_name(&self.dir));
        let parent = String::from(storage::parent(&self.dir));
        self.open_dir(ctx, parent, Some(&child))
    }

    /// Keep browsing after a failed storage operation
    ///
    /// Only a missing card leaves the app. Anything else is shown as an
    /// alert, and a vanished entry refreshes the listing.
    fn recover(&mut self, ctx: &mut Context, err: AppError) -> Result<(), AppError> {
        let failure = match err {
            AppError::Storage(e) if e != StorageError::NotMounted => e,
            other => return Err(other),
        };
        warn!("File browser: {:?} in /{}", failure, self.dir.as_str());
        ctx.alert("File Browser", &err.to_string());

        if failure == StorageError::NotFound {
            let dir = self.dir.clone();
            if self.open_dir(ctx, dir, None).is_err() {
                self.open_dir(ctx, String::new(), None)?;
            }
        }
        Ok(())
    }
}

impl App for FileBrowser {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        self.viewer = None;
        self.entries.clear();
        self.dir.clear();
        self.menu = Some(Menu::new("/", ["Loading..."]));
        self.open_dir(ctx, String::new(), None)?;
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if let Some(button) = ctx.take_button() {
            if let Some(viewer) = self.viewer.as_mut() {
                match viewer.handle(button) {
                    TextBoxAction::Scrolled => ctx.mark_dirty(),
                    TextBoxAction::Back => {
                        self.viewer = None;
                        ctx.mark_dirty();
                    }
                    TextBoxAction::Ignored => {}
                }
            } else if let Some(menu) = self.menu.as_mut() {
                match menu.handle(button) {
                    MenuAction::Moved => ctx.mark_dirty(),
                    MenuAction::Selected(index) => {
                        if let Some(entry) = self.entries.get(index).cloned() {
                            let opened = if entry.is_dir {
                                let dir = storage::join(&self.dir, &entry.name);
                                self.open_dir(ctx, dir, None)
                            } else {
                                self.open_file(ctx, &entry.name)
                            };
                            if let Err(e) = opened {
                                self.recover(ctx, e)?;
                            }
                        }
                    }
                    MenuAction::Back => {
                        if let Err(e) = self.go_up(ctx) {
                            self.recover(ctx, e)?;
                        }
                    }
                    MenuAction::Ignored => {}
                }
            }
        }

        // An open alert keeps the frame until it is dismissed
        if !ctx.alert_open() && ctx.take_dirty() {
            let theme = ctx.theme();
            if let Some(viewer) = self.viewer.as_mut() {
                viewer.draw(ctx.display(), &theme)?;
            } else if let Some(menu) = self.menu.as_mut() {
                menu.draw(ctx.display(), &theme)?;
            }
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        self.entries.clear();
        self.menu = None;
        self.viewer = None;
        self.dir.clear();
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
    use picoware_core::{NavError, View, ViewManager};

    fn platform() -> TestPlatform {
        let platform = TestPlatform::new();
        platform.storage.insert("notes/todo.txt", b"buy milk");
        platform.storage.insert("notes/deep/a.txt", b"a");
        platform.storage.insert("readme.txt", b"hello picoware");
        platform.storage.insert("blob.bin", &[0xFF, 0xFE, 0x00]);
        platform
    }

    fn open(platform: &TestPlatform) -> ViewManager {
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        vm.add(View::new("root", crate::library::Library::default())).unwrap();
        vm.add(View::new("files", FileBrowser::default())).unwrap();
        vm.switch_to("root").unwrap();
        vm.switch_to("files").unwrap();
        vm.tick();
        vm
    }

    fn press(vm: &mut ViewManager, platform: &TestPlatform, button: Button) {
        platform.input.press(button);
        vm.tick();
    }

    #[test]
    fn test_lists_root_dirs_first() {
        let platform = platform();
        let _vm = open(&platform);
        let texts = platform.display.texts();
        let notes = texts.iter().position(|t| t == "notes/").unwrap();
        let blob = texts.iter().position(|t| t.starts_with("blob.bin")).unwrap();
        assert!(notes < blob);
        assert!(platform.display.contains_text("readme.txt (14 B)"));
    }

    #[test]
    fn test_enter_dir_and_go_up() {
        let platform = platform();
        let mut vm = open(&platform);

        press(&mut vm, &platform, Button::Center);
        assert!(platform.display.contains_text("/notes"));
        assert!(platform.display.contains_text("deep/"));

        platform.display.clear_log();
        press(&mut vm, &platform, Button::Back);
        assert!(platform.display.contains_text("notes/"));
        assert_eq!(vm.current(), Some("files"));

        press(&mut vm, &platform, Button::Back);
        assert_eq!(vm.current(), Some("root"));
    }

    #[test]
    fn test_view_text_file() {
        let platform = platform();
        let mut vm = open(&platform);

        // notes/, blob.bin, readme.txt
        press(&mut vm, &platform, Button::Up);
        press(&mut vm, &platform, Button::Center);
        assert!(platform.display.contains_text("hello picoware"));

        press(&mut vm, &platform, Button::Back);
        assert_eq!(vm.current(), Some("files"));
    }

    #[test]
    fn test_binary_file_placeholder() {
        let platform = platform();
        let mut vm = open(&platform);

        press(&mut vm, &platform, Button::Down);
        press(&mut vm, &platform, Button::Center);
        assert!(platform.display.contains_text("<binary file>"));
    }

    #[test]
    fn test_requires_mounted_storage() {
        let platform = platform();
        platform.storage.set_mounted(false);
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        vm.add(View::new("files", FileBrowser::default())).unwrap();

        assert_eq!(vm.switch_to("files"), Err(NavError::StartFailed));
        assert!(platform.display.contains_text("SD card is not available"));
    }

    #[test]
    fn test_vanished_file_refreshes_listing() {
        let platform = platform();
        let mut vm = open(&platform);
        platform.storage.forget("readme.txt");

        // Listing still shows readme.txt
        press(&mut vm, &platform, Button::Up);
        press(&mut vm, &platform, Button::Center);
        assert_eq!(vm.current(), Some("files"));
        assert!(vm.context().alert_open());
        assert!(platform.display.contains_text("Storage error: NotFound"));

        platform.display.clear_log();
        press(&mut vm, &platform, Button::Center);
        vm.tick();
        assert_eq!(vm.current(), Some("files"));
        assert!(platform.display.contains_text("notes/"));
        assert!(!platform.display.contains_text("readme.txt (14 B)"));
    }

    #[test]
    fn test_read_error_keeps_browsing() {
        let platform = platform();
        let mut vm = open(&platform);
        platform.storage.set_failure(Some(StorageError::Io));

        press(&mut vm, &platform, Button::Center);
        assert_eq!(vm.current(), Some("files"));
        assert!(platform.display.contains_text("Storage error: Io"));

        platform.storage.set_failure(None);
        press(&mut vm, &platform, Button::Center);
        platform.display.clear_log();
        press(&mut vm, &platform, Button::Center);
        assert!(platform.display.contains_text("/notes"));
    }

    #[test]
    fn test_card_removed_leaves_browser() {
        let platform = platform();
        let mut vm = open(&platform);
        platform.storage.set_mounted(false);

        press(&mut vm, &platform, Button::Center);
        assert_eq!(vm.current(), Some("root"));
        assert!(platform.display.contains_text("SD card is not available"));
    }

    #[test]
    fn test_failed_listing_releases_start_state() {
        let platform = platform();
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        vm.add(View::new("files", FileBrowser::default())).unwrap();
        platform.storage.set_failure(Some(StorageError::Io));

        assert_eq!(vm.switch_to("files"), Err(NavError::StartFailed));
        assert_eq!(platform.system.reclaims(), 1);
        assert_eq!(vm.get_view("files").unwrap().state(), picoware_core::ViewState::Inactive);

        platform.storage.set_failure(None);
        press(&mut vm, &platform, Button::Back);
        platform.display.clear_log();
        assert_eq!(vm.switch_to("files"), Ok(()));
        vm.tick();
        assert!(platform.display.contains_text("readme.txt (14 B)"));
    }

    #[test]
    fn test_empty_directory() {
        let platform = TestPlatform::new();
        let _vm = open(&platform);
        assert!(platform.display.contains_text("(empty)"));
    }
}
