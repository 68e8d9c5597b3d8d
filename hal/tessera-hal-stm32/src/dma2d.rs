//! Chrom-ART accelerator (DMA2D)
//!
//! Register-to-memory fills and memory-to-memory copies, both RGB565 with
//! line offsets counted in pixels. Completion is polled through the
//! transfer-complete flag; interrupts stay masked.

use embassy_stm32::{peripherals, rcc};
use tessera_hal::{Accelerator, BlitOp, BlitWindow};

use crate::mmio::{self, Mmio, Registers};

/// DMA2D register offsets
pub mod reg {
    /// Control
    pub const CR: usize = 0x00;
    /// Interrupt status
    pub const ISR: usize = 0x04;
    /// Interrupt flag clear
    pub const IFCR: usize = 0x08;
    /// Foreground memory address
    pub const FGMAR: usize = 0x0C;
    /// Foreground line offset
    pub const FGOR: usize = 0x10;
    /// Foreground pixel format converter control
    pub const FGPFCCR: usize = 0x1C;
    /// Output pixel format converter control
    pub const OPFCCR: usize = 0x34;
    /// Output color
    pub const OCOLR: usize = 0x38;
    /// Output memory address
    pub const OMAR: usize = 0x3C;
    /// Output line offset
    pub const OOR: usize = 0x40;
    /// Number of lines
    pub const NLR: usize = 0x44;
}

const CR_START: u32 = 1 << 0;
const CR_ABORT: u32 = 1 << 2;
const CR_MODE_SHIFT: u32 = 16;
const MODE_M2M: u32 = 0b00;
const MODE_R2M: u32 = 0b11;

const ISR_TCIF: u32 = 1 << 1;
const IFCR_CTCIF: u32 = 1 << 1;

const CM_RGB565: u32 = 0b010;

/// CR reads spent waiting for an aborted transfer to stop
pub const ABORT_POLLS: u32 = 10_000;

/// Line offsets are 14-bit
pub const MAX_LINE_OFFSET: u16 = 0x3FFF;

/// CR value for a transfer kind, START clear
pub const fn control_word(op: BlitOp) -> u32 {
    let mode = match op {
        BlitOp::Fill(_) => MODE_R2M,
        BlitOp::Copy => MODE_M2M,
    };
    mode << CR_MODE_SHIFT
}

/// NLR value: pixels per line in bits 29:16, lines in bits 15:0
pub const fn lines_word(window: &BlitWindow) -> u32 {
    ((window.width as u32) << 16) | window.height as u32
}

/// Pixels spanned by a window of `width` pixels per line with `skip`
/// pixels between lines, starting `offset` pixels in
pub const fn span(offset: u32, width: u16, height: u16, skip: u16) -> usize {
    if width == 0 || height == 0 {
        return offset as usize;
    }
    let pitch = width as usize + skip as usize;
    offset as usize + (height as usize - 1) * pitch + width as usize
}

/// Check that a transfer stays inside its buffers
pub fn window_fits(window: &BlitWindow, op: BlitOp, target_len: usize, source_len: usize) -> bool {
    if window.output_offset > MAX_LINE_OFFSET || window.source_line_offset > MAX_LINE_OFFSET {
        return false;
    }
    let target = span(window.dst_offset, window.width, window.height, window.output_offset);
    let source = match op {
        BlitOp::Fill(_) => 0,
        BlitOp::Copy => span(window.src_offset, window.width, window.height, window.source_line_offset),
    };
    target <= target_len && source <= source_len
}

fn address_of(buffer: &[u16], offset: u32) -> u32 {
    (buffer.as_ptr() as usize as u32).wrapping_add(offset * 2)
}

fn barrier() {
    #[cfg(target_arch = "arm")]
    cortex_m::asm::dsb();
    #[cfg(not(target_arch = "arm"))]
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}

/// DMA2D driving one transfer at a time
pub struct Dma2d<R = Mmio> {
    regs: R,
    programmed: Option<(BlitWindow, BlitOp)>,
}

impl Dma2d<Mmio> {
    /// Enable and reset the DMA2D clock and take its register block
    pub fn new() -> Self {
        rcc::enable_and_reset::<peripherals::DMA2D>();
        Self::with_registers(mmio::DMA2D)
    }
}

impl Default for Dma2d<Mmio> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registers> Dma2d<R> {
    pub fn with_registers(regs: R) -> Self {
        Self { regs, programmed: None }
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }
}

impl<R: Registers> Accelerator for Dma2d<R> {
    fn program(&mut self, window: &BlitWindow, op: BlitOp) {
        self.regs.write(reg::CR, control_word(op));
        self.regs.write(reg::OPFCCR, CM_RGB565);
        self.regs.write(reg::OOR, window.output_offset as u32);
        self.regs.write(reg::NLR, lines_word(window));
        match op {
            BlitOp::Fill(color) => self.regs.write(reg::OCOLR, color as u32),
            BlitOp::Copy => {
                self.regs.write(reg::FGPFCCR, CM_RGB565);
                self.regs.write(reg::FGOR, window.source_line_offset as u32);
            }
        }
        self.programmed = Some((*window, op));
    }

    fn start(&mut self, target: &mut [u16], source: &[u16]) {
        let Some((window, op)) = self.programmed.take() else {
            warn!("DMA2D start without a programmed transfer");
            return;
        };
        if !window_fits(&window, op, target.len(), source.len()) {
            error!("DMA2D window outside its buffers, transfer dropped");
            return;
        }

        self.regs.write(reg::OMAR, address_of(target, window.dst_offset));
        if op == BlitOp::Copy {
            self.regs.write(reg::FGMAR, address_of(source, window.src_offset));
        }
        // CPU writes to either buffer must land before the engine reads them
        barrier();
        self.regs.modify(reg::CR, |cr| cr | CR_START);
    }

    fn transfer_complete(&mut self) -> bool {
        self.regs.read(reg::ISR) & ISR_TCIF != 0
    }

    fn clear_complete(&mut self) {
        self.regs.write(reg::IFCR, IFCR_CTCIF);
    }

    fn abort(&mut self) -> bool {
        self.programmed = None;
        if self.regs.read(reg::CR) & CR_START == 0 {
            return true;
        }
        self.regs.modify(reg::CR, |cr| cr | CR_ABORT);
        for _ in 0..ABORT_POLLS {
            if self.regs.read(reg::CR) & CR_START == 0 {
                self.clear_complete();
                return true;
            }
        }
        error!("DMA2D still busy after abort");
        false
    }
}
