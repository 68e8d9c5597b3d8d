//! STM32F7 back-end for the Tessera display subsystem
//!
//! Implements the `tessera-hal` traits on the STM32F7's LCD-TFT
//! controller and Chrom-ART accelerator:
//!
//! - [`Ltdc`] - [`tessera_hal::LcdController`] on LTDC layer 1
//! - [`Dma2d`] - [`tessera_hal::Accelerator`] for RGB565 fills and copies
//! - [`EmbassyClock`] - [`tessera_hal::Clock`] on the embassy time driver
//!
//! # Features
//!
//! - `stm32f746ng` - STM32F746NG (Discovery board, 4.3" 480x272 panel)
//! - `stm32f769ni` - STM32F769NI
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Board init owns the parts outside this crate: SDRAM for the
//! framebuffer, PLLSAI for the pixel clock and the RGB pin mux. The touch
//! controller uses embassy's blocking I2C directly, which implements
//! `embedded_hal::i2c::I2c`, and the backlight a `SimplePwm` channel.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod dma2d;
pub mod ltdc;
pub mod mmio;

pub use clock::{Delay, EmbassyClock};
pub use dma2d::Dma2d;
pub use ltdc::Ltdc;
pub use mmio::{Mmio, Registers};
