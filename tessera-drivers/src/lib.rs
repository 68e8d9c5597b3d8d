//! Device drivers for the Tessera display subsystem
//!
//! Built on the traits in `tessera-hal` and the display core:
//!
//! - GT9xx capacitive touch controller over I2C
//! - PWM backlight and panel supply sequencing
//! - [`LcdDevice`], the composed display + power + touch device

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod backlight;
pub mod device;
pub mod touch;

#[cfg(test)]
mod mock;

pub use backlight::{Backlight, PanelPower, PowerError};
pub use device::{DeviceError, DeviceInfo, DeviceParts, LcdDevice};
pub use touch::{Gt9xx, Gt9xxConfig, TouchError, TouchPoint, MAX_TOUCH_POINTS};
