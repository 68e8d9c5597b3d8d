//! Timing controller setup
//!
//! The LCD timing generator takes sync/porch/active parameters as running
//! sums with one subtracted, starting from the sync width. The derivation
//! is kept separate from the register writes so it can be checked against
//! a panel table without hardware.

use tessera_hal::{LayerBinding, LcdController, PixelFormat, TimingRegisters};

use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::panel::PanelDescriptor;

/// Derive the accumulated timing register values for a panel
pub fn timing_registers(panel: &PanelDescriptor) -> TimingRegisters {
    let h_back = panel.hsync + panel.hbp;
    let v_back = panel.vsync + panel.vbp;
    let h_active = h_back + panel.width;
    let v_active = v_back + panel.height;

    TimingRegisters {
        hsync: panel.hsync.saturating_sub(1),
        vsync: panel.vsync.saturating_sub(1),
        accumulated_hbp: h_back.saturating_sub(1),
        accumulated_vbp: v_back.saturating_sub(1),
        accumulated_active_w: h_active.saturating_sub(1),
        accumulated_active_h: v_active.saturating_sub(1),
        total_w: (h_active + panel.hfp).saturating_sub(1),
        total_h: (v_active + panel.vfp).saturating_sub(1),
    }
}

/// Program the timing generator and bind the framebuffer as the single
/// full-screen RGB565 layer, then enable scan-out.
///
/// The framebuffer must be at least `width * height` pixels.
pub fn configure<L: LcdController>(
    lcd: &mut L,
    panel: &PanelDescriptor,
    framebuffer: &Framebuffer<'_>,
) -> Result<(), Error> {
    if framebuffer.width() != panel.width
        || framebuffer.height() != panel.height
        || framebuffer.len() < panel.pixel_count()
    {
        return Err(Error::FramebufferTooSmall);
    }

    let timing = timing_registers(panel);
    debug!(
        "LTDC timing: sync {}x{} bp {}x{} active {}x{} total {}x{}",
        timing.hsync,
        timing.vsync,
        timing.accumulated_hbp,
        timing.accumulated_vbp,
        timing.accumulated_active_w,
        timing.accumulated_active_h,
        timing.total_w,
        timing.total_h
    );

    lcd.set_enabled(false);
    lcd.configure(&timing, panel.polarity, panel.pixel_clock_hz);
    lcd.bind_layer(&LayerBinding {
        address: framebuffer.address(),
        width: panel.width,
        height: panel.height,
        format: PixelFormat::Rgb565,
    });
    lcd.set_enabled(true);

    info!(
        "Panel {=u16:x} configured: {}x{} @ {} Hz",
        panel.product_id,
        panel.width,
        panel.height,
        panel.pixel_clock_hz
    );
    Ok(())
}
