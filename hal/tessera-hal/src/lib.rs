//! Tessera Hardware Abstraction Layer
//!
//! This crate defines the narrow hardware-access traits the display core
//! is written against. Each trait is implemented once for real silicon
//! (see `tessera-hal-stm32`) and once by the test doubles in the core and
//! driver crates, so the blit, timing and touch algorithms run unchanged
//! on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tessera-drivers (touch, backlight,     │
//! │  composed LcdDevice)                    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tessera-core (transform, blit engine,  │
//! │  timing, graphics primitives)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tessera-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ tessera-hal-  │
//!             │    stm32      │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`lcd::LcdController`] - Synchronous RGB timing controller
//! - [`accel::Accelerator`] - DMA-based 2D fill/copy engine
//! - [`clock::Clock`] - Monotonic time source for bounded waits
//! - [`i2c::RegisterBus`] - 16-bit register addressing over I2C
//! - [`gpio::read_strap`] - Hardware identity strap pins

#![no_std]
#![deny(unsafe_code)]

pub mod accel;
pub mod clock;
pub mod gpio;
pub mod i2c;
pub mod lcd;

// Re-export key traits at crate root for convenience
pub use accel::{Accelerator, BlitOp, BlitWindow};
pub use clock::Clock;
pub use gpio::read_strap;
pub use i2c::RegisterBus;
pub use lcd::{LayerBinding, LcdController, PixelFormat, Polarity, SignalPolarity, TimingRegisters};
