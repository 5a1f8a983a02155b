//! Picoware apps
//!
//! Every app implements [`picoware_core::App`] and is listed in the static
//! [`registry::APPS`] table. The [`library::Library`] launcher is the root
//! view; it registers an app's view the first time the app is opened.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

// Logging macros
#[macro_use]
extern crate picoware_core;

pub mod file_browser;
pub mod games;
pub mod library;
pub mod registry;
pub mod screensavers;
pub mod settings;
pub mod system_info;
pub mod text_editor;
pub mod wifi;

pub use registry::{AppEntry, Category, APPS};

use picoware_core::{NavError, View, ViewManager};

/// Name of the launcher view at the bottom of the stack
pub const ROOT_VIEW: &str = "library";

/// Register the launcher and make it the root view
pub fn install(manager: &mut ViewManager) -> Result<(), NavError> {
    manager.add(View::new(ROOT_VIEW, library::Library::default()))?;
    manager.switch_to(ROOT_VIEW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use picoware_core::config::Settings;
    use picoware_core::testing::TestPlatform;

    #[test]
    fn test_install_makes_library_root() {
        let platform = TestPlatform::new();
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        install(&mut vm).unwrap();

        assert_eq!(vm.current(), Some(ROOT_VIEW));
        assert_eq!(vm.depth(), 1);
        assert_eq!(install(&mut vm), Err(NavError::DuplicateView));
    }

    #[test]
    fn test_core_logging_macros_borrow_arguments() {
        let name = alloc::string::String::from("library");
        let depth = 1usize;
        trace!("{} {}", name.as_str(), depth);
        debug!("{}", name.as_str());
        info!("ready");
        warn!("{}", depth);
        error!("{} {}", name.as_str(), depth,);
        assert_eq!(name, "library");
    }
}
