//! Display configuration types
//!
//! Values arrive here already validated by the settings layer; the core
//! only range-checks what it would otherwise turn into a bad register value.

use crate::color;
use crate::error::Error;
use crate::rotation::Rotation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Blit engine timing budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlitConfig {
    /// Longest wait for the next vertical blank edge (µs)
    pub vblank_timeout_us: u32,
    /// Longest wait for transfer complete (µs)
    pub transfer_timeout_us: u32,
    /// Hard cap on status polls per wait, independent of the clock
    pub max_polls: u32,
}

impl Default for BlitConfig {
    fn default() -> Self {
        Self {
            // Two frames at the slowest supported refresh (~30 Hz)
            vblank_timeout_us: 70_000,
            transfer_timeout_us: 100_000,
            max_polls: 2_000_000,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Rotation applied at init
    pub rotation: Rotation,
    /// Background color (RGB565), used for clear at init and glyph cells
    pub background: u16,
    /// Backlight level at init (0-100 %)
    pub backlight_percent: u8,
    /// Whether to bring up the touch controller
    pub touch_enabled: bool,
    /// Blit engine timing
    pub blit: BlitConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: Rotation::Deg0,
            background: color::WHITE,
            backlight_percent: 100,
            touch_enabled: true,
            blit: BlitConfig::default(),
        }
    }
}

impl DisplayConfig {
    /// Range-check values that end up in hardware
    pub fn validate(&self) -> Result<(), Error> {
        if self.backlight_percent > 100 {
            return Err(Error::InvalidParameter);
        }
        if self.blit.max_polls == 0 {
            return Err(Error::InvalidParameter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DisplayConfig::default().validate().is_ok());
    }

    #[test]
    fn test_backlight_range() {
        let config = DisplayConfig {
            backlight_percent: 101,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidParameter));
    }

    #[test]
    fn test_zero_poll_budget_rejected() {
        let mut config = DisplayConfig::default();
        config.blit.max_polls = 0;
        assert_eq!(config.validate(), Err(Error::InvalidParameter));
    }
}
