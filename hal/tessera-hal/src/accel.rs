//! 2D accelerator abstraction
//!
//! Models a DMA2D-style engine that either fills a window of the
//! framebuffer from a constant color register (register-to-memory) or
//! copies a packed pixel buffer into it (memory-to-memory).
//!
//! The engine is split into `program` and `start` so the caller can wait
//! for vertical blank between them. A transfer that misses its deadline
//! must be stopped with [`Accelerator::abort`] before the next `program`,
//! since the engine may still hold the source and target addresses.

/// Destination window of a transfer, in framebuffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlitWindow {
    /// Pixels from the start of the framebuffer to the first written pixel
    pub dst_offset: u32,
    /// Pixels per line
    pub width: u16,
    /// Number of lines
    pub height: u16,
    /// Pixels skipped in the destination after each line
    pub output_offset: u16,
    /// Pixels skipped at the start of the source buffer (copies only)
    pub src_offset: u32,
    /// Pixels skipped in the source after each line (copies only)
    pub source_line_offset: u16,
}

impl BlitWindow {
    /// Number of pixels written by the transfer
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }
}

/// Transfer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlitOp {
    /// Register-to-memory fill with a 16-bit color
    Fill(u16),
    /// Memory-to-memory copy from the source passed to `start`
    Copy,
}

/// DMA-capable 2D accelerator
pub trait Accelerator {
    /// Program mode, window and color registers without starting
    fn program(&mut self, window: &BlitWindow, op: BlitOp);

    /// Load the memory addresses and start the programmed transfer
    ///
    /// `source` is empty for fills.
    fn start(&mut self, target: &mut [u16], source: &[u16]);

    /// Check the transfer-complete flag
    fn transfer_complete(&mut self) -> bool;

    /// Acknowledge the transfer-complete flag
    fn clear_complete(&mut self);

    /// Stop the running transfer, if any
    ///
    /// Returns `true` once the engine is idle. `false` means the engine
    /// did not stop within its bounded wait and must not be reprogrammed.
    fn abort(&mut self) -> bool;
}
