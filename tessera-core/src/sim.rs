//! Simulated display hardware
//!
//! Host-side stand-ins for the timing controller, the 2D accelerator and
//! the clock. The accelerator performs transfers against the framebuffer
//! slice with the same window arithmetic as the hardware, so fills and
//! copies can be checked pixel by pixel.

use core::cell::Cell;

use tessera_hal::{Accelerator, BlitOp, BlitWindow, Clock, LayerBinding, LcdController, SignalPolarity, TimingRegisters};

/// Status reads per simulated frame
const FRAME_TICKS: u32 = 10;
/// Of which the first ones are active scan-out
const ACTIVE_TICKS: u32 = 7;

/// Simulated timing controller
///
/// Each vertical-blank query advances a tick counter; the last few ticks
/// of every frame read as blanking.
#[derive(Debug, Default)]
pub struct SimLcd {
    pub enabled: bool,
    pub timing: Option<TimingRegisters>,
    pub polarity: Option<SignalPolarity>,
    pub pixel_clock_hz: u32,
    pub layer: Option<LayerBinding>,
    /// Value returned by the most recent vertical-blank query
    pub last_blank: bool,
    pub blank_queries: u32,
    stuck: Option<bool>,
}

impl SimLcd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller whose blanking status never changes
    pub fn stuck(blank: bool) -> Self {
        Self {
            stuck: Some(blank),
            ..Self::default()
        }
    }
}

impl LcdController for SimLcd {
    fn configure(&mut self, timing: &TimingRegisters, polarity: SignalPolarity, pixel_clock_hz: u32) {
        self.timing = Some(*timing);
        self.polarity = Some(polarity);
        self.pixel_clock_hz = pixel_clock_hz;
    }

    fn bind_layer(&mut self, layer: &LayerBinding) {
        self.layer = Some(*layer);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn in_vertical_blank(&mut self) -> bool {
        let tick = self.blank_queries % FRAME_TICKS;
        self.blank_queries = self.blank_queries.wrapping_add(1);
        self.last_blank = self.stuck.unwrap_or(tick >= ACTIVE_TICKS);
        self.last_blank
    }
}

/// When the simulated accelerator raises its completion flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// After this many unsuccessful status reads
    AfterPolls(u32),
    /// Never; the transfer also writes nothing until aborted
    Never,
    /// Never, and aborts are ignored as well
    Wedged,
}

/// Simulated 2D accelerator
#[derive(Debug)]
pub struct SimAccelerator {
    completion: Completion,
    window: BlitWindow,
    op: Option<BlitOp>,
    pending: Option<u32>,
    complete: bool,
    in_flight: bool,
    pub programs: u32,
    pub starts: u32,
    pub status_reads: u32,
    pub aborts: u32,
    /// `program` calls that arrived while a transfer was still running
    pub programmed_while_busy: u32,
    /// `start` calls that arrived while a transfer was still running
    pub started_while_busy: u32,
}

impl SimAccelerator {
    pub fn new(completion: Completion) -> Self {
        Self {
            completion,
            window: BlitWindow::default(),
            op: None,
            pending: None,
            complete: false,
            in_flight: false,
            programs: 0,
            starts: 0,
            status_reads: 0,
            aborts: 0,
            programmed_while_busy: 0,
            started_while_busy: 0,
        }
    }

    /// Raw completion flag, without counting as a status read
    pub fn complete_flag(&self) -> bool {
        self.complete
    }

    /// A started transfer has neither completed nor been aborted
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Last programmed window
    pub fn window(&self) -> BlitWindow {
        self.window
    }

    fn transfer(&self, target: &mut [u16], source: &[u16]) {
        let w = self.window;
        let dst_pitch = w.width as usize + w.output_offset as usize;
        let src_pitch = w.width as usize + w.source_line_offset as usize;

        for line in 0..w.height as usize {
            for col in 0..w.width as usize {
                let value = match self.op {
                    Some(BlitOp::Fill(color)) => Some(color),
                    Some(BlitOp::Copy) => source.get(w.src_offset as usize + line * src_pitch + col).copied(),
                    None => None,
                };
                let dst = w.dst_offset as usize + line * dst_pitch + col;
                if let (Some(value), Some(pixel)) = (value, target.get_mut(dst)) {
                    *pixel = value;
                }
            }
        }
    }
}

impl Accelerator for SimAccelerator {
    fn program(&mut self, window: &BlitWindow, op: BlitOp) {
        if self.in_flight {
            self.programmed_while_busy += 1;
        }
        self.window = *window;
        self.op = Some(op);
        self.programs += 1;
    }

    fn start(&mut self, target: &mut [u16], source: &[u16]) {
        if self.in_flight {
            self.started_while_busy += 1;
        }
        self.starts += 1;
        self.complete = false;
        self.in_flight = true;
        self.pending = match self.completion {
            Completion::AfterPolls(n) => {
                self.transfer(target, source);
                Some(n)
            }
            Completion::Never | Completion::Wedged => None,
        };
    }

    fn transfer_complete(&mut self) -> bool {
        self.status_reads += 1;
        if let Some(remaining) = self.pending {
            if remaining == 0 {
                self.complete = true;
                self.in_flight = false;
                self.pending = None;
            } else {
                self.pending = Some(remaining - 1);
            }
        }
        self.complete
    }

    fn clear_complete(&mut self) {
        self.complete = false;
    }

    fn abort(&mut self) -> bool {
        self.aborts += 1;
        if self.completion == Completion::Wedged {
            return !self.in_flight;
        }
        self.in_flight = false;
        self.pending = None;
        self.complete = false;
        true
    }
}

/// Clock that advances a fixed step on every read
#[derive(Debug, Default)]
pub struct StepClock {
    now: Cell<u64>,
    step: u64,
}

impl StepClock {
    /// A zero step gives a clock that never moves
    pub fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }
}

impl Clock for StepClock {
    fn now_us(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}
