//! Picoware Hardware Abstraction Layer
//!
//! This crate defines the capabilities the application layer consumes. The
//! board firmware implements them with real drivers; tests implement them
//! with recording doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Apps (picoware-apps)                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  View shell (picoware-core)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picoware-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   picoware-   │       │ test doubles  │
//! │   firmware    │       │ (core/testing)│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`display::DrawSurface`] - Framebuffer drawing primitives
//! - [`input::InputManager`] - Button/keyboard latch
//! - [`storage::Storage`] - Path-addressed persistent files
//! - [`wifi::WifiDriver`] - Radio with edge-triggered completion events
//! - [`system::System`] - Clock, RNG and heap services

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod color;
pub mod display;
pub mod geometry;
pub mod input;
pub mod storage;
pub mod system;
pub mod wifi;

// Re-export key types at crate root for convenience
pub use color::Color;
pub use display::{DisplayError, DrawSurface};
pub use geometry::Vector;
pub use input::{Button, InputManager};
pub use storage::{DirEntry, Storage, StorageError};
pub use system::System;
pub use wifi::{Network, WifiDriver, WifiError, WifiEvent, WifiStatus};
