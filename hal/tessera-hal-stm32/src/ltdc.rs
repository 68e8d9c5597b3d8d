//! LCD-TFT display controller (LTDC)
//!
//! Drives the timing generator and layer 1. Layer 2 is left disabled; the
//! panel shows layer 1 over a black background.

use embassy_stm32::{peripherals, rcc};
use tessera_hal::{LayerBinding, LcdController, PixelFormat, Polarity, SignalPolarity, TimingRegisters};

use crate::mmio::{self, Mmio, Registers};

/// LTDC register offsets
pub mod reg {
    /// Synchronization size
    pub const SSCR: usize = 0x08;
    /// Back porch
    pub const BPCR: usize = 0x0C;
    /// Active width
    pub const AWCR: usize = 0x10;
    /// Total width
    pub const TWCR: usize = 0x14;
    /// Global control
    pub const GCR: usize = 0x18;
    /// Shadow reload
    pub const SRCR: usize = 0x24;
    /// Background color
    pub const BCCR: usize = 0x2C;
    /// Interrupt enable
    pub const IER: usize = 0x34;
    /// Current display status
    pub const CDSR: usize = 0x48;
    /// Layer 1 control
    pub const L1CR: usize = 0x84;
    /// Layer 1 window horizontal position
    pub const L1WHPCR: usize = 0x88;
    /// Layer 1 window vertical position
    pub const L1WVPCR: usize = 0x8C;
    /// Layer 1 pixel format
    pub const L1PFCR: usize = 0x94;
    /// Layer 1 constant alpha
    pub const L1CACR: usize = 0x98;
    /// Layer 1 default color
    pub const L1DCCR: usize = 0x9C;
    /// Layer 1 blending factors
    pub const L1BFCR: usize = 0xA0;
    /// Layer 1 framebuffer address
    pub const L1CFBAR: usize = 0xAC;
    /// Layer 1 framebuffer line length and pitch
    pub const L1CFBLR: usize = 0xB0;
    /// Layer 1 framebuffer line count
    pub const L1CFBLNR: usize = 0xB4;
}

const GCR_LTDCEN: u32 = 1 << 0;
const GCR_PCPOL: u32 = 1 << 28;
const GCR_DEPOL: u32 = 1 << 29;
const GCR_VSPOL: u32 = 1 << 30;
const GCR_HSPOL: u32 = 1 << 31;
const GCR_POLARITY_MASK: u32 = GCR_HSPOL | GCR_VSPOL | GCR_DEPOL | GCR_PCPOL;

const SRCR_IMR: u32 = 1 << 0;
const CDSR_VDES: u32 = 1 << 0;
const LCR_LEN: u32 = 1 << 0;

/// Constant alpha x pixel alpha, both factors
const BFCR_CA_PA: u32 = (0b110 << 8) | 0b111;

/// Pack two 16-bit fields into one register word, `high` in bits 31:16
pub const fn pack(high: u16, low: u16) -> u32 {
    ((high as u32) << 16) | low as u32
}

/// GCR polarity bits for the panel's control signals
pub fn polarity_bits(polarity: SignalPolarity) -> u32 {
    let bit = |p: Polarity, mask: u32| if p == Polarity::ActiveHigh { mask } else { 0 };
    bit(polarity.hsync, GCR_HSPOL)
        | bit(polarity.vsync, GCR_VSPOL)
        | bit(polarity.data_enable, GCR_DEPOL)
        | bit(polarity.pixel_clock, GCR_PCPOL)
}

/// Layer window start/stop, placed just after the back porches
pub fn window_position(timing: &TimingRegisters, width: u16, height: u16) -> (u32, u32) {
    let h_start = timing.accumulated_hbp.saturating_add(1);
    let v_start = timing.accumulated_vbp.saturating_add(1);
    (
        pack(timing.accumulated_hbp.saturating_add(width), h_start),
        pack(timing.accumulated_vbp.saturating_add(height), v_start),
    )
}

/// CFBLR value: pitch in bits 28:16, line length + 3 in bits 12:0
pub fn line_length(width: u16, format: PixelFormat) -> u32 {
    let bytes = width as u32 * format.bytes_per_pixel();
    (bytes << 16) | (bytes + 3)
}

/// PFCR encoding of a pixel format
pub const fn pixel_format_code(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Rgb565 => 0b010,
    }
}

/// LTDC with layer 1 as the only scan-out layer
pub struct Ltdc<R = Mmio> {
    regs: R,
    timing: TimingRegisters,
    pixel_clock_hz: u32,
}

impl Ltdc<Mmio> {
    /// Enable and reset the LTDC clock and take its register block
    ///
    /// The pixel clock (PLLSAI) and the RGB pin mux belong to board init.
    pub fn new() -> Self {
        rcc::enable_and_reset::<peripherals::LTDC>();
        Self::with_registers(mmio::LTDC)
    }
}

impl Default for Ltdc<Mmio> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registers> Ltdc<R> {
    pub fn with_registers(regs: R) -> Self {
        Self {
            regs,
            timing: TimingRegisters::default(),
            pixel_clock_hz: 0,
        }
    }

    /// Pixel clock the panel was configured for
    pub fn pixel_clock_hz(&self) -> u32 {
        self.pixel_clock_hz
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    fn reload(&mut self) {
        self.regs.write(reg::SRCR, SRCR_IMR);
    }
}

impl<R: Registers> LcdController for Ltdc<R> {
    fn configure(&mut self, timing: &TimingRegisters, polarity: SignalPolarity, pixel_clock_hz: u32) {
        self.regs.write(reg::SSCR, pack(timing.hsync, timing.vsync));
        self.regs.write(reg::BPCR, pack(timing.accumulated_hbp, timing.accumulated_vbp));
        self.regs.write(reg::AWCR, pack(timing.accumulated_active_w, timing.accumulated_active_h));
        self.regs.write(reg::TWCR, pack(timing.total_w, timing.total_h));

        let bits = polarity_bits(polarity);
        self.regs.modify(reg::GCR, |gcr| (gcr & !GCR_POLARITY_MASK) | bits);
        self.regs.write(reg::BCCR, 0);
        self.regs.write(reg::IER, 0);

        self.timing = *timing;
        self.pixel_clock_hz = pixel_clock_hz;
        debug!("LTDC timing programmed, pixel clock {} Hz", pixel_clock_hz);
    }

    fn bind_layer(&mut self, layer: &LayerBinding) {
        let (whpcr, wvpcr) = window_position(&self.timing, layer.width, layer.height);
        self.regs.write(reg::L1WHPCR, whpcr);
        self.regs.write(reg::L1WVPCR, wvpcr);
        self.regs.write(reg::L1PFCR, pixel_format_code(layer.format));
        self.regs.write(reg::L1CACR, 0xFF);
        self.regs.write(reg::L1DCCR, 0);
        self.regs.write(reg::L1BFCR, BFCR_CA_PA);
        self.regs.write(reg::L1CFBAR, layer.address as u32);
        self.regs.write(reg::L1CFBLR, line_length(layer.width, layer.format));
        self.regs.write(reg::L1CFBLNR, layer.height as u32);
        self.regs.modify(reg::L1CR, |cr| cr | LCR_LEN);
        self.reload();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.regs.modify(reg::GCR, |gcr| {
            if enabled {
                gcr | GCR_LTDCEN
            } else {
                gcr & !GCR_LTDCEN
            }
        });
    }

    fn in_vertical_blank(&mut self) -> bool {
        self.regs.read(reg::CDSR) & CDSR_VDES == 0
    }
}
