//! Build script for picoware-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates the default settings.json at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Must match the bounds enforced by picoware-core
const MIN_FRAME_INTERVAL_MS: u64 = 10;
const MAX_FRAME_INTERVAL_MS: u64 = 1000;

fn main() {
    setup_linker();
    validate_settings();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate the settings document that is written on first boot
fn validate_settings() {
    println!("cargo:rerun-if-changed=settings.json");

    let path = Path::new("settings.json");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => panic!("\n  ERROR: failed to read settings.json: {}\n", e),
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("\n  ERROR: invalid JSON in settings.json: {}\n", e),
    };

    let mut errors = Vec::new();

    match value.get("dark_mode") {
        Some(v) if v.is_boolean() => {}
        Some(_) => errors.push("dark_mode must be true or false".to_string()),
        None => errors.push("missing dark_mode".to_string()),
    }

    match value.get("frame_interval_ms").and_then(|v| v.as_u64()) {
        Some(ms) if (MIN_FRAME_INTERVAL_MS..=MAX_FRAME_INTERVAL_MS).contains(&ms) => {}
        Some(ms) => errors.push(format!(
            "frame_interval_ms = {} is outside {}..={}",
            ms, MIN_FRAME_INTERVAL_MS, MAX_FRAME_INTERVAL_MS
        )),
        None => errors.push("frame_interval_ms must be a positive integer".to_string()),
    }

    if !errors.is_empty() {
        panic!(
            "\n  ERROR: settings.json failed validation:\n{}\n",
            errors
                .iter()
                .map(|e| format!("    - {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=settings.json validated successfully");
}
