//! System services: clock, entropy and heap

/// System services trait
pub trait System {
    /// Milliseconds since boot
    fn millis(&self) -> u64;

    /// Next pseudo-random value
    fn random(&mut self) -> u32;

    /// Free heap in bytes
    fn free_heap(&self) -> usize;

    /// Memory-reclaim hook, called by apps when they release their state
    fn reclaim(&mut self);

    /// Random value in `0..bound` (`bound` of 0 yields 0)
    fn random_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.random() % bound
        }
    }
}
