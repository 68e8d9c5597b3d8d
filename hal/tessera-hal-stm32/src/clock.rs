//! Embassy time base
//!
//! The blit engine's deadlines and the touch reset delays both run off the
//! embassy time driver configured at chip init.

use embassy_time::Instant;
use tessera_hal::Clock;

pub use embassy_time::Delay;

/// [`Clock`] backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}
