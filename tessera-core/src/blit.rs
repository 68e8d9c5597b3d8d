//! Blit engine
//!
//! Turns logical rectangle fills and buffer copies into accelerator
//! windows, then runs each transfer in three steps:
//!
//! 1. program the accelerator (mode, window, color)
//! 2. wait for the next vertical blank edge so the write does not tear
//! 3. start, and poll for completion under a deadline
//!
//! Both waits are bounded by [`BlitConfig`]. A vertical-blank timeout is
//! logged and the transfer proceeds anyway; a completion timeout aborts the
//! transfer and is reported as [`BlitStatus::TimedOut`].
//!
//! Copy sources are packed row-major in the panel's native orientation,
//! one row per physical line of the region before clamping.

use tessera_hal::{Accelerator, BlitOp, BlitWindow, Clock, LcdController};

use crate::config::BlitConfig;
use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::rotation::Rotation;

/// Widest line offset the accelerator offset registers can hold
pub const MAX_LINE_OFFSET: u32 = 0x3FFF;

/// Inclusive rectangle in logical coordinates
///
/// Corners may be given in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Region {
    pub const fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Same rectangle with `x0 <= x1` and `y0 <= y1`
    pub fn normalized(self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x0.abs_diff(self.x1) as u32 + 1
    }

    pub fn height(&self) -> u32 {
        self.y0.abs_diff(self.y1) as u32 + 1
    }
}

/// Outcome of a blit that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlitStatus {
    /// Transfer finished and the completion flag was cleared
    Complete,
    /// Completion was not observed before the deadline
    TimedOut,
    /// Region lies entirely outside the panel; nothing was started
    Skipped,
}

impl BlitStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, BlitStatus::Complete)
    }
}

/// Inclusive physical rectangle, possibly outside the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Span {
    fn width(&self) -> u32 {
        (self.x1 - self.x0 + 1) as u32
    }

    fn height(&self) -> u32 {
        (self.y1 - self.y0 + 1) as u32
    }

    fn clamp(&self, panel_w: u16, panel_h: u16) -> Option<Span> {
        let (max_x, max_y) = (panel_w as i32 - 1, panel_h as i32 - 1);
        if self.x1 < 0 || self.y1 < 0 || self.x0 > max_x || self.y0 > max_y {
            return None;
        }
        Some(Span {
            x0: self.x0.max(0),
            y0: self.y0.max(0),
            x1: self.x1.min(max_x),
            y1: self.y1.min(max_y),
        })
    }
}

fn physical_span(region: Region, rotation: Rotation, panel_w: u16, panel_h: u16) -> Span {
    let r = region.normalized();
    let (w, h) = (panel_w as i32, panel_h as i32);
    let (ax, ay) = rotation.to_physical_signed(r.x0 as i32, r.y0 as i32, w, h);
    let (bx, by) = rotation.to_physical_signed(r.x1 as i32, r.y1 as i32, w, h);
    Span {
        x0: ax.min(bx),
        y0: ay.min(by),
        x1: ax.max(bx),
        y1: ay.max(by),
    }
}

/// Accelerator window for a constant-color fill, or `None` if the region
/// is entirely off-panel
pub fn fill_window(region: Region, rotation: Rotation, panel_w: u16, panel_h: u16) -> Option<BlitWindow> {
    let span = physical_span(region, rotation, panel_w, panel_h).clamp(panel_w, panel_h)?;
    let width = span.width() as u16;
    Some(BlitWindow {
        dst_offset: span.y0 as u32 * panel_w as u32 + span.x0 as u32,
        width,
        height: span.height() as u16,
        output_offset: panel_w - width,
        src_offset: 0,
        source_line_offset: 0,
    })
}

/// Accelerator window for a buffer copy
///
/// `source_len` must cover the whole region before clamping. Returns
/// `Ok(None)` if the region is entirely off-panel.
pub fn copy_window(
    region: Region,
    rotation: Rotation,
    panel_w: u16,
    panel_h: u16,
    source_len: usize,
) -> Result<Option<BlitWindow>, Error> {
    let full = physical_span(region, rotation, panel_w, panel_h);
    let stride = full.width();
    if (source_len as u64) < stride as u64 * full.height() as u64 {
        return Err(Error::InvalidParameter);
    }

    let Some(span) = full.clamp(panel_w, panel_h) else {
        return Ok(None);
    };
    let width = span.width();
    let skip = stride - width;
    if skip > MAX_LINE_OFFSET {
        return Err(Error::InvalidParameter);
    }

    Ok(Some(BlitWindow {
        dst_offset: span.y0 as u32 * panel_w as u32 + span.x0 as u32,
        width: width as u16,
        height: span.height() as u16,
        output_offset: panel_w - width as u16,
        src_offset: (span.y0 - full.y0) as u32 * stride + (span.x0 - full.x0) as u32,
        source_line_offset: skip as u16,
    }))
}

/// Bounded poll budget: wall-clock timeout plus a hard poll cap
struct Deadline {
    start: u64,
    timeout_us: u64,
    polls: u32,
    max_polls: u32,
}

impl Deadline {
    fn start<C: Clock>(clock: &C, timeout_us: u32, max_polls: u32) -> Self {
        Self {
            start: clock.now_us(),
            timeout_us: timeout_us as u64,
            polls: 0,
            max_polls,
        }
    }

    fn expired<C: Clock>(&mut self, clock: &C) -> bool {
        self.polls = self.polls.saturating_add(1);
        self.polls >= self.max_polls || clock.elapsed_since(self.start) >= self.timeout_us
    }
}

/// Serializes fills and copies through one accelerator
///
/// The engine owns the accelerator and every call returns only after
/// completion or timeout. A timed-out transfer is aborted before the call
/// returns; if the accelerator refuses to stop, later transfers are
/// rejected until an abort succeeds.
pub struct BlitEngine<A, C> {
    accel: A,
    clock: C,
    config: BlitConfig,
    stalled: bool,
}

impl<A: Accelerator, C: Clock> BlitEngine<A, C> {
    pub fn new(accel: A, clock: C, config: BlitConfig) -> Self {
        Self {
            accel,
            clock,
            config,
            stalled: false,
        }
    }

    pub fn config(&self) -> &BlitConfig {
        &self.config
    }

    pub fn accelerator(&self) -> &A {
        &self.accel
    }

    pub fn accelerator_mut(&mut self) -> &mut A {
        &mut self.accel
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Fill a logical region with a constant color
    ///
    /// `scanout` is the timing controller to synchronize with; pass `None`
    /// while scan-out is disabled and there is no blanking to wait for.
    pub fn fill<L: LcdController>(
        &mut self,
        scanout: Option<&mut L>,
        fb: &mut Framebuffer<'_>,
        rotation: Rotation,
        region: Region,
        color: u16,
    ) -> Result<BlitStatus, Error> {
        let Some(window) = fill_window(region, rotation, fb.width(), fb.height()) else {
            trace!("fill outside panel, skipped");
            return Ok(BlitStatus::Skipped);
        };
        Ok(self.run(scanout, fb, &window, BlitOp::Fill(color), &[]))
    }

    /// Copy a packed RGB565 buffer into a logical region
    pub fn copy<L: LcdController>(
        &mut self,
        scanout: Option<&mut L>,
        fb: &mut Framebuffer<'_>,
        rotation: Rotation,
        region: Region,
        source: &[u16],
    ) -> Result<BlitStatus, Error> {
        let window = copy_window(region, rotation, fb.width(), fb.height(), source.len())?;
        let Some(window) = window else {
            trace!("copy outside panel, skipped");
            return Ok(BlitStatus::Skipped);
        };
        Ok(self.run(scanout, fb, &window, BlitOp::Copy, source))
    }

    fn run<L: LcdController>(
        &mut self,
        scanout: Option<&mut L>,
        fb: &mut Framebuffer<'_>,
        window: &BlitWindow,
        op: BlitOp,
        source: &[u16],
    ) -> BlitStatus {
        if self.stalled {
            if !self.accel.abort() {
                error!("accelerator still busy, blit {}x{} refused", window.width, window.height);
                return BlitStatus::TimedOut;
            }
            self.stalled = false;
        }

        self.accel.program(window, op);

        if let Some(lcd) = scanout {
            if !self.wait_vertical_blank(lcd) {
                warn!("vertical blank not seen, starting transfer anyway");
            }
        }

        self.accel.start(fb.pixels_mut(), source);

        let mut deadline = Deadline::start(&self.clock, self.config.transfer_timeout_us, self.config.max_polls);
        loop {
            if self.accel.transfer_complete() {
                self.accel.clear_complete();
                return BlitStatus::Complete;
            }
            if deadline.expired(&self.clock) {
                warn!(
                    "blit {}x{} timed out after {} polls",
                    window.width,
                    window.height,
                    deadline.polls
                );
                if !self.accel.abort() {
                    error!("accelerator did not stop after abort");
                    self.stalled = true;
                }
                return BlitStatus::TimedOut;
            }
        }
    }

    /// Wait for the next entry into vertical blank
    ///
    /// If the controller is already blanking, waits for that interval to
    /// end first so the transfer gets a whole blanking period.
    fn wait_vertical_blank<L: LcdController>(&mut self, lcd: &mut L) -> bool {
        let mut deadline = Deadline::start(&self.clock, self.config.vblank_timeout_us, self.config.max_polls);
        while lcd.in_vertical_blank() {
            if deadline.expired(&self.clock) {
                return false;
            }
        }
        while !lcd.in_vertical_blank() {
            if deadline.expired(&self.clock) {
                return false;
            }
        }
        true
    }
}
