//! Synchronous RGB panel timing controller
//!
//! Models an LTDC-style controller: a timing generator programmed with
//! accumulated sync/porch/active/total values, plus one display layer that
//! scans out a framebuffer in memory.

/// Signal polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Signal asserted low
    ActiveLow,
    /// Signal asserted high
    ActiveHigh,
}

/// Polarities of the four panel control signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalPolarity {
    /// Horizontal sync
    pub hsync: Polarity,
    /// Vertical sync
    pub vsync: Polarity,
    /// Data enable
    pub data_enable: Polarity,
    /// Pixel clock (ActiveHigh = data latched on the rising edge)
    pub pixel_clock: Polarity,
}

impl Default for SignalPolarity {
    fn default() -> Self {
        Self {
            hsync: Polarity::ActiveLow,
            vsync: Polarity::ActiveLow,
            data_enable: Polarity::ActiveLow,
            pixel_clock: Polarity::ActiveLow,
        }
    }
}

/// Timing generator register values
///
/// Each field pair is the running sum of all preceding timing fields minus
/// one, which is how the timing generator expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingRegisters {
    /// Horizontal sync width - 1
    pub hsync: u16,
    /// Vertical sync height - 1
    pub vsync: u16,
    /// Accumulated horizontal back porch
    pub accumulated_hbp: u16,
    /// Accumulated vertical back porch
    pub accumulated_vbp: u16,
    /// Accumulated active width
    pub accumulated_active_w: u16,
    /// Accumulated active height
    pub accumulated_active_h: u16,
    /// Total width
    pub total_w: u16,
    /// Total height
    pub total_h: u16,
}

/// Layer pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 16-bit 5:6:5
    #[default]
    Rgb565,
}

impl PixelFormat {
    /// Bytes per pixel
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb565 => 2,
        }
    }
}

/// Binding of the single display layer to a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerBinding {
    /// Framebuffer base address
    pub address: usize,
    /// Layer width in pixels
    pub width: u16,
    /// Layer height in pixels
    pub height: u16,
    /// Pixel format
    pub format: PixelFormat,
}

/// Synchronous RGB timing controller
pub trait LcdController {
    /// Program the timing generator and signal polarities
    ///
    /// Called once at init, before the layer is bound.
    fn configure(&mut self, timing: &TimingRegisters, polarity: SignalPolarity, pixel_clock_hz: u32);

    /// Bind the display layer to a framebuffer and enable it
    fn bind_layer(&mut self, layer: &LayerBinding);

    /// Enable or disable scan-out
    fn set_enabled(&mut self, enabled: bool);

    /// Check whether the controller is currently in vertical blank
    fn in_vertical_blank(&mut self) -> bool;
}
