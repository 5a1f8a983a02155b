//! Launcher
//!
//! Two levels: the category list, then the apps of one category. Selecting
//! an app launches it through the registry.

use alloc::vec::Vec;

use picoware_core::ui::{Menu, MenuAction};
use picoware_core::{App, AppError, Context};

use crate::registry::{self, AppEntry, Category};

const TITLE: &str = "Picoware";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Categories,
    Apps(Category),
}

pub struct Library {
    menu: Menu,
    level: Level,
    /// Apps listed at the `Apps` level, in menu order
    entries: Vec<&'static AppEntry>,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            menu: Menu::new(TITLE, Category::ALL.iter().map(|c| c.label())),
            level: Level::Categories,
            entries: Vec::new(),
        }
    }
}

impl Library {
    fn show_categories(&mut self, selected: usize) {
        self.level = Level::Categories;
        self.entries.clear();
        self.menu.set_title(TITLE);
        self.menu.set_items(Category::ALL.iter().map(|c| c.label()));
        self.menu.set_selected(selected);
    }

    fn show_category(&mut self, category: Category) {
        self.level = Level::Apps(category);
        self.entries = registry::in_category(category).collect();
        self.menu.set_title(category.label());
        self.menu.set_items(self.entries.iter().map(|e| e.title));
        self.menu.set_selected(0);
    }
}

impl App for Library {
    fn start(&mut self, _ctx: &mut Context) -> Result<bool, AppError> {
        self.show_categories(0);
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let mut dirty = ctx.take_dirty();

        if let Some(button) = ctx.take_button() {
            match (self.menu.handle(button), self.level) {
                (MenuAction::Moved, _) => dirty = true,
                (MenuAction::Selected(index), Level::Categories) => {
                    if let Some(category) = Category::ALL.get(index) {
                        self.show_category(*category);
                        dirty = true;
                    }
                }
                (MenuAction::Selected(index), Level::Apps(_)) => {
                    if let Some(entry) = self.entries.get(index) {
                        registry::launch(ctx, entry.id)?;
                    }
                }
                (MenuAction::Back, Level::Apps(category)) => {
                    let index = Category::ALL.iter().position(|c| *c == category).unwrap_or(0);
                    self.show_categories(index);
                    dirty = true;
                }
                (MenuAction::Back, Level::Categories) | (MenuAction::Ignored, _) => {}
            }
        }

        if dirty {
            let theme = ctx.theme();
            self.menu.draw(ctx.display(), &theme)?;
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        self.entries.clear();
        ctx.system().reclaim();
        Ok(())
    }
}
