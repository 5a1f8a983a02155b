//! Picoware - PicoCalc handheld firmware
//!
//! Boots the RP2040, brings up the panel, keyboard and flash store, installs
//! the app library and runs the view manager one frame at a time.

#![no_std]
#![no_main]

extern crate alloc;

use alloc::boxed::Box;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Timer};
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use picoware_core::config::SETTINGS_PATH;
use picoware_core::hal::Storage;
use picoware_core::{Platform, ViewManager};

use crate::display::Ili9488;
use crate::keyboard::Keyboard;
use crate::storage::FlashStore;
use crate::system::Rp2040System;

mod display;
mod keyboard;
mod storage;
mod system;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 160KB, the rest of RAM is stack and statics
const HEAP_SIZE: usize = 160 * 1024;

/// Settings written on first boot (validated by build.rs)
const DEFAULT_SETTINGS: &str = include_str!("../settings.json");

/// Panel SPI clock
const SPI_FREQUENCY: u32 = 40_000_000;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Picoware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Panel on SPI1: SCK GP10, MOSI GP11, MISO GP12, CS GP13, DC GP14, RST GP15
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY;
    let spi = Spi::new_blocking(p.SPI1, p.PIN_10, p.PIN_11, p.PIN_12, spi_config);
    let cs = Output::new(p.PIN_13, Level::High);
    let dc = Output::new(p.PIN_14, Level::Low);
    let rst = Output::new(p.PIN_15, Level::High);
    let mut panel = Ili9488::new(spi, cs, dc, rst);
    match panel.init(&mut Delay) {
        Ok(()) => info!("Display initialized"),
        Err(e) => error!("Display init failed: {:?}", e),
    }

    // Keyboard on I2C1: SDA GP6, SCL GP7
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_7, p.PIN_6, i2c::Config::default());
    let keyboard = Keyboard::new(i2c);
    info!("Keyboard initialized");

    let mut store = storage::open(p.FLASH, p.DMA_CH0);
    seed_settings(&mut store);

    let platform = Platform {
        display: Box::new(panel),
        input: Box::new(keyboard),
        storage: Box::new(store),
        // No radio driver on this board
        wifi: None,
        system: Box::new(Rp2040System::new(&HEAP)),
    };

    let mut manager = ViewManager::new(platform);
    if let Err(e) = picoware_apps::install(&mut manager) {
        error!("Failed to install apps: {:?}", e);
    }
    info!("Picoware ready ({} bytes heap free)", HEAP.free());

    loop {
        manager.tick();
        let interval = manager.context().settings().frame_interval_ms;
        Timer::after_millis(u64::from(interval)).await;
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Write the default settings document if none exists yet
fn seed_settings(store: &mut FlashStore<'_>) {
    if store.exists(SETTINGS_PATH) {
        return;
    }
    match store.write(SETTINGS_PATH, DEFAULT_SETTINGS.as_bytes()) {
        Ok(()) => info!("Default settings written"),
        Err(e) => warn!("Failed to write default settings: {:?}", e),
    }
}
