//! Memory-mapped register access
//!
//! The peripheral drivers talk to a [`Registers`] block addressed by byte
//! offset. On silicon that is [`Mmio`], a volatile window at a fixed base;
//! tests substitute a plain word array.
#![allow(unsafe_code)]

/// 32-bit register block addressed by byte offset
pub trait Registers {
    fn read(&mut self, offset: usize) -> u32;

    fn write(&mut self, offset: usize, value: u32);

    fn modify(&mut self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let value = self.read(offset);
        self.write(offset, f(value));
    }
}

/// Volatile register block of an on-chip peripheral
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    base: usize,
}

/// LTDC register block (APB2 on STM32F7)
pub(crate) const LTDC: Mmio = Mmio { base: 0x4001_6800 };

/// DMA2D register block (AHB1 on STM32F7)
pub(crate) const DMA2D: Mmio = Mmio { base: 0x4002_B000 };

impl Registers for Mmio {
    fn read(&mut self, offset: usize) -> u32 {
        // SAFETY: `base` is one of the peripheral blocks above and every
        // caller passes a word-aligned offset inside that block.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: as for `read`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}
