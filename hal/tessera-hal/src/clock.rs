//! Monotonic time source
//!
//! Every hardware wait in the display core is bounded by a deadline taken
//! from a [`Clock`]. Tests inject clocks that step on each read (or never
//! move) to drive the timeout paths deterministically.

/// Monotonic microsecond clock
pub trait Clock {
    /// Current time in microseconds since an arbitrary epoch
    ///
    /// Must never go backwards.
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `start`
    fn elapsed_since(&self, start: u64) -> u64 {
        self.now_us().saturating_sub(start)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
