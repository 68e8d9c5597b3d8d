//! Capacitive touch controllers
//!
//! Drivers report points in the display's logical coordinate space: raw
//! sensor coordinates are in the panel's native orientation and are mapped
//! back through the display rotation before they reach the caller.

pub mod gt9xx;

pub use gt9xx::{Gt9xx, Gt9xxConfig};

use embedded_hal::digital::ErrorKind as PinErrorKind;

/// Most contacts reported per scan
pub const MAX_TOUCH_POINTS: usize = 5;

/// A single contact in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
    /// Contact size as reported by the sensor
    pub size: u16,
}

/// Touch driver errors
///
/// `E` is the bus error type, passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchError<E> {
    /// Controller type has no driver
    Unsupported,
    /// Zero or too many points requested, or storage too short
    InvalidParameter,
    /// Scan attempted before a successful init
    NotInitialized,
    /// Product id read back did not match the expected controller
    IdentityMismatch([u8; 4]),
    /// Bus transfer failed (typically no acknowledge)
    Bus(E),
    /// Reset line could not be driven
    Reset(PinErrorKind),
}
