//! Coordinate transform between logical and physical space
//!
//! Logical coordinates are what drawing and touch callers see in the
//! currently selected rotation. Physical coordinates index the framebuffer
//! in the panel's native orientation. The touch sensor always reports in
//! physical space.
//!
//! Neither direction checks bounds: callers validate against the logical
//! (or physical) size first. These run once per pixel, so they are plain
//! `const fn`s with no allocation.

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Display rotation, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rotation {
    /// Native panel orientation
    #[default]
    Deg0,
    /// Rotated 90 degrees
    Deg90,
    /// Rotated 180 degrees
    Deg180,
    /// Rotated 270 degrees
    Deg270,
}

impl Rotation {
    /// All four rotations
    pub const ALL: [Rotation; 4] = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270];

    /// Parse from degrees (0, 90, 180, 270)
    pub fn from_degrees(degrees: u16) -> Result<Self, Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(Error::InvalidParameter),
        }
    }

    /// Parse from a settings index (0-3)
    pub fn from_index(index: u8) -> Result<Self, Error> {
        Self::ALL.get(index as usize).copied().ok_or(Error::InvalidParameter)
    }

    /// Rotation in degrees
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether logical width and height are swapped relative to the panel
    pub const fn is_swapped(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Logical (width, height) for a panel of the given physical size
    pub const fn logical_size(self, panel_w: u16, panel_h: u16) -> (u16, u16) {
        if self.is_swapped() {
            (panel_h, panel_w)
        } else {
            (panel_w, panel_h)
        }
    }

    /// Map a logical point to physical framebuffer coordinates
    #[inline]
    pub const fn to_physical(self, x: u16, y: u16, panel_w: u16, panel_h: u16) -> (u16, u16) {
        match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (panel_w - y - 1, x),
            Rotation::Deg180 => (panel_w - x - 1, panel_h - y - 1),
            Rotation::Deg270 => (y, panel_h - x - 1),
        }
    }

    /// Map a physical point (e.g. a raw touch report) to logical coordinates
    #[inline]
    pub const fn to_logical(self, x: u16, y: u16, panel_w: u16, panel_h: u16) -> (u16, u16) {
        match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (y, panel_w - x - 1),
            Rotation::Deg180 => (panel_w - x - 1, panel_h - y - 1),
            Rotation::Deg270 => (panel_h - y - 1, x),
        }
    }

    /// Signed variant of [`Rotation::to_physical`] for region corners that
    /// may lie outside the panel before clamping
    #[inline]
    pub const fn to_physical_signed(self, x: i32, y: i32, panel_w: i32, panel_h: i32) -> (i32, i32) {
        match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (panel_w - y - 1, x),
            Rotation::Deg180 => (panel_w - x - 1, panel_h - y - 1),
            Rotation::Deg270 => (y, panel_h - x - 1),
        }
    }
}
