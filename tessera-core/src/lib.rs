//! Board-agnostic display core
//!
//! Everything between the hardware traits and the application:
//!
//! - Logical/physical coordinate transform for the four rotations
//! - Panel descriptor table and timing register derivation
//! - Blit engine: accelerated fills and copies synced to vertical blank
//! - Framebuffer, graphics primitives and text rendering
//! - Display lifecycle and configuration types
//!
//! No code here touches registers; the `sim` feature provides host-side
//! stand-ins for the controller, accelerator and clock.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod blit;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod graphics;
pub mod panel;
pub mod rotation;
pub mod state;
pub mod timing;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use blit::{BlitEngine, BlitStatus, Region};
pub use config::{BlitConfig, DisplayConfig};
pub use display::{Display, DisplayInfo};
pub use error::{Error, Status};
pub use font::{FontSet, GlyphSource, RawFont};
pub use framebuffer::Framebuffer;
pub use graphics::NumberMode;
pub use panel::{PanelDescriptor, TouchKind};
pub use rotation::Rotation;
pub use state::{DeviceState, TouchState};
