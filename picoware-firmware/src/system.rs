//! System services for the RP2040

use embassy_time::Instant;
use embedded_alloc::LlffHeap as Heap;

use picoware_core::hal::System;

/// Clock, entropy and heap services
pub struct Rp2040System {
    heap: &'static Heap,
    /// xorshift32 state, never zero
    seed: u32,
}

impl Rp2040System {
    pub fn new(heap: &'static Heap) -> Self {
        // Boot time varies with flash and panel init, which is enough to
        // keep screensavers from repeating
        let ticks = Instant::now().as_ticks() as u32;
        Self {
            heap,
            seed: (ticks ^ 0x9E37_79B9).max(1),
        }
    }
}

impl System for Rp2040System {
    fn millis(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn random(&mut self) -> u32 {
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.seed = x;
        x
    }

    fn free_heap(&self) -> usize {
        self.heap.free()
    }

    fn reclaim(&mut self) {
        // The allocator coalesces on free; just report where we are
        defmt::debug!("Heap after reclaim: {} bytes free", self.heap.free());
    }
}
