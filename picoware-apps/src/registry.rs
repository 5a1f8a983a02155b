//! Static app table
//!
//! Each entry maps a stable id to a constructor, so the launcher never holds
//! app instances it has not opened.

use alloc::boxed::Box;

use picoware_core::{App, AppError, Context, View};

use crate::file_browser::FileBrowser;
use crate::games::snake::Snake;
use crate::screensavers;
use crate::settings::SettingsApp;
use crate::system_info::SystemInfo;
use crate::text_editor::TextEditor;
use crate::wifi::WifiApp;

/// Launcher grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    System,
    Games,
    Screensavers,
}

impl Category {
    /// Launcher order
    pub const ALL: [Category; 3] = [Category::System, Category::Games, Category::Screensavers];

    pub fn label(&self) -> &'static str {
        match self {
            Category::System => "System",
            Category::Games => "Games",
            Category::Screensavers => "Screensavers",
        }
    }
}

/// One launchable app
pub struct AppEntry {
    /// View name; unique across the table
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub build: fn() -> Box<dyn App>,
}

impl AppEntry {
    /// A fresh, inactive view for this app
    pub fn view(&self) -> View {
        View::from_box(self.id, (self.build)())
    }
}

fn boxed<A: App + Default + 'static>() -> Box<dyn App> {
    Box::new(A::default())
}

pub static APPS: &[AppEntry] = &[
    AppEntry {
        id: "settings",
        title: "Settings",
        category: Category::System,
        build: boxed::<SettingsApp>,
    },
    AppEntry {
        id: "wifi",
        title: "WiFi",
        category: Category::System,
        build: boxed::<WifiApp>,
    },
    AppEntry {
        id: "file_browser",
        title: "File Browser",
        category: Category::System,
        build: boxed::<FileBrowser>,
    },
    AppEntry {
        id: "text_editor",
        title: "Text Editor",
        category: Category::System,
        build: boxed::<TextEditor>,
    },
    AppEntry {
        id: "system_info",
        title: "System Info",
        category: Category::System,
        build: boxed::<SystemInfo>,
    },
    AppEntry {
        id: "snake",
        title: "Snake",
        category: Category::Games,
        build: boxed::<Snake>,
    },
    AppEntry {
        id: "fire",
        title: "Fire",
        category: Category::Screensavers,
        build: screensavers::fire,
    },
    AppEntry {
        id: "plasma",
        title: "Plasma",
        category: Category::Screensavers,
        build: screensavers::plasma,
    },
    AppEntry {
        id: "starfield",
        title: "Starfield",
        category: Category::Screensavers,
        build: screensavers::starfield,
    },
    AppEntry {
        id: "spirograph",
        title: "Spirograph",
        category: Category::Screensavers,
        build: screensavers::spirograph,
    },
    AppEntry {
        id: "matrix",
        title: "Matrix Rain",
        category: Category::Screensavers,
        build: screensavers::matrix,
    },
];

/// Look up an app by id
pub fn find(id: &str) -> Option<&'static AppEntry> {
    APPS.iter().find(|entry| entry.id == id)
}

/// Apps of one category, in table order
pub fn in_category(category: Category) -> impl Iterator<Item = &'static AppEntry> {
    APPS.iter().filter(move |entry| entry.category == category)
}

/// Open an app from inside another app's callback
///
/// The manager ignores a second registration under the same id, so the view
/// created on first use is the one every later launch returns to.
pub fn launch(ctx: &mut Context, id: &str) -> Result<(), AppError> {
    let entry = find(id).ok_or(AppError::Invalid("Unknown app"))?;
    debug!("Launching {}", entry.id);
    ctx.add_view(entry.view());
    ctx.switch_to(entry.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = APPS.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), APPS.len());
    }

    #[test]
    fn test_every_category_has_apps() {
        for category in Category::ALL {
            assert!(in_category(category).next().is_some(), "{:?} is empty", category);
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("snake").map(|e| e.title), Some("Snake"));
        assert_eq!(find("text_editor").map(|e| e.category), Some(Category::System));
        assert!(find("terminal").is_none());
    }

    #[test]
    fn test_view_uses_entry_id() {
        let entry = find("plasma").unwrap();
        let view = entry.view();
        assert_eq!(view.name(), "plasma");
        assert!(!view.is_active());
    }
}
