//! Panel descriptors
//!
//! Every supported RGB panel is described by a static [`PanelDescriptor`].
//! The fitted panel is identified once at boot from a 3-bit strap pattern
//! on its connector; an unknown pattern is a hard initialization error.

use tessera_hal::SignalPolarity;

use crate::error::Error;

/// Number of strap pins carrying the panel identity
pub const STRAP_BITS: usize = 3;

/// Capacitive touch controller fitted to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchKind {
    /// Goodix GT9147
    Gt9147,
    /// Goodix GT911
    Gt911,
    /// FocalTech FT5206
    Ft5206,
}

/// Static description of an RGB panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelDescriptor {
    /// Strap code that selects this panel
    pub strap: u8,
    /// Product identifier (e.g. 0x4342 for the 4.3" 480x272 module)
    pub product_id: u16,
    /// Active width in pixels
    pub width: u16,
    /// Active height in pixels
    pub height: u16,
    /// Pixel clock in Hz
    pub pixel_clock_hz: u32,
    /// Horizontal sync width
    pub hsync: u16,
    /// Vertical sync height
    pub vsync: u16,
    /// Horizontal back porch
    pub hbp: u16,
    /// Vertical back porch
    pub vbp: u16,
    /// Horizontal front porch
    pub hfp: u16,
    /// Vertical front porch
    pub vfp: u16,
    /// Control signal polarities
    pub polarity: SignalPolarity,
    /// Touch controller fitted to this module
    pub touch: TouchKind,
}

impl PanelDescriptor {
    /// Number of pixels in the framebuffer
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Framebuffer size in bytes (16 bits per pixel)
    pub const fn framebuffer_bytes(&self) -> usize {
        self.pixel_count() * 2
    }
}

#[allow(clippy::too_many_arguments)]
const fn panel(
    strap: u8,
    product_id: u16,
    size: (u16, u16),
    pixel_clock_hz: u32,
    sync: (u16, u16),
    back_porch: (u16, u16),
    front_porch: (u16, u16),
    touch: TouchKind,
) -> PanelDescriptor {
    PanelDescriptor {
        strap,
        product_id,
        width: size.0,
        height: size.1,
        pixel_clock_hz,
        hsync: sync.0,
        vsync: sync.1,
        hbp: back_porch.0,
        vbp: back_porch.1,
        hfp: front_porch.0,
        vfp: front_porch.1,
        polarity: SignalPolarity {
            hsync: tessera_hal::Polarity::ActiveLow,
            vsync: tessera_hal::Polarity::ActiveLow,
            data_enable: tessera_hal::Polarity::ActiveLow,
            pixel_clock: tessera_hal::Polarity::ActiveLow,
        },
        touch,
    }
}

/// Known panels, indexed by strap code
pub static PANELS: [PanelDescriptor; 6] = [
    // 4.3" 480x272
    panel(0, 0x4342, (480, 272), 9_000_000, (1, 1), (40, 8), (5, 8), TouchKind::Gt9147),
    // 7" 800x480
    panel(1, 0x7084, (800, 480), 33_000_000, (1, 1), (46, 23), (210, 22), TouchKind::Ft5206),
    // 7" 1024x600
    panel(2, 0x7016, (1024, 600), 45_000_000, (20, 3), (140, 20), (160, 12), TouchKind::Gt911),
    // 7" 1280x800
    panel(3, 0x7018, (1280, 800), 50_000_000, (1, 1), (140, 10), (10, 10), TouchKind::Gt911),
    // 4.3" 800x480
    panel(4, 0x4384, (800, 480), 33_000_000, (48, 3), (88, 32), (40, 13), TouchKind::Gt9147),
    // 10.1" 1280x800
    panel(5, 0x1018, (1280, 800), 45_000_000, (10, 3), (140, 10), (10, 10), TouchKind::Gt911),
];

/// Look up the descriptor for a strap code
pub fn lookup(strap: u8) -> Result<&'static PanelDescriptor, Error> {
    PANELS
        .iter()
        .find(|p| p.strap == strap)
        .ok_or(Error::UnknownPanel(strap))
}
