//! View lifecycle and navigation
//!
//! A [`View`] wraps an [`App`] (the `start`/`run`/`stop` triple) with
//! uniform error isolation. The [`ViewManager`] owns the registered views,
//! the navigation stack and the frame dispatch.

pub mod lifecycle;
pub mod manager;

pub use lifecycle::{App, View, ViewState};
pub use manager::ViewManager;
