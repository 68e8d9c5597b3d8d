//! RGB565 color constants
//!
//! The framebuffer holds one fixed 16-bit 5:6:5 format; colors travel
//! through the API as raw `u16` values.

pub const WHITE: u16 = 0xFFFF;
pub const BLACK: u16 = 0x0000;
pub const RED: u16 = 0xF800;
pub const GREEN: u16 = 0x07E0;
pub const BLUE: u16 = 0x001F;
pub const MAGENTA: u16 = 0xF81F;
pub const YELLOW: u16 = 0xFFE0;
pub const CYAN: u16 = 0x07FF;
pub const GRAY: u16 = 0x8430;
pub const BROWN: u16 = 0xBC40;

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}
