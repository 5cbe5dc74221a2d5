//! In-memory BCM2711 GPIO block for host testing.
//!
//! Models the register semantics the driver depends on:
//!
//! - `GPSET`/`GPCLR` act on an output latch and read as zero.
//! - `GPLEV` is read-only and reflects the resolved pad level.
//! - `GPEDS` is write-1-to-clear.
//! - Edge detection compares against the previous pad level; level
//!   detection latches on every hardware evaluation while the level holds.
//!
//! The block is evaluated after every write that can change a pad or a
//! detect enable, after [`drive`](SimGpio::drive)/[`jumper`](SimGpio::jumper)
//! and on [`sample`](SimGpio::sample). Clearing status never re-evaluates.
//!
//! The block is also its own interrupt line. The line is asserted while an
//! enabled status bit is latched; delivery to the connected controller is
//! synchronous, deferred while the line is masked and never re-entered.

use std::collections::VecDeque;

use bcmgpio_lib::IrqLine;
use spin::{Mutex, Once};

use super::Controller;
use super::mmio::RegisterBlock;
use super::regs::{
    FSEL_MASK, FSEL_OUTPUT, GPAFEN0, GPAREN0, GPCLR0, GPEDS0, GPFEN0, GPHEN0, GPIO_REGION_SIZE,
    GPLEN0, GPLEV0, GPREN0, GPSET0, PULL_DOWN, PULL_MASK, PULL_UP, Register, fsel_shift,
    fsel_word, pull_shift, pull_word,
};

const WORDS: usize = GPIO_REGION_SIZE / 4;
const LOG_CAPACITY: usize = 1024;

type Handler = Box<dyn Fn() + Send + Sync>;

struct SimState {
    regs: [u32; WORDS],
    pin_count: u32,
    valid: u64,
    latch: u64,
    pad: u64,
    drive_mask: u64,
    drive_level: u64,
    outputs: u64,
    pull_up: u64,
    pull_down: u64,
    jumpers: Vec<(u32, u32)>,
    writes: u64,
    log: VecDeque<(usize, u32)>,
}

#[derive(Default)]
struct LineState {
    depth: u32,
    pending: bool,
    in_service: bool,
}

pub struct SimGpio {
    state: Mutex<SimState>,
    line: Mutex<LineState>,
    handler: Once<Handler>,
}

/// Bank addressed by `offset` if it falls inside the two-word group at `base`.
fn bank_at(offset: usize, base: usize) -> Option<u32> {
    if (base..base + 8).contains(&offset) {
        Some(((offset - base) / 4) as u32)
    } else {
        None
    }
}

fn in_group(offset: usize, reg: Register) -> bool {
    (reg.base()..reg.base() + reg.words() * 4).contains(&offset)
}

impl SimState {
    fn new(pin_count: u32) -> Self {
        let valid = if pin_count >= 64 {
            u64::MAX
        } else {
            (1u64 << pin_count) - 1
        };
        Self {
            regs: [0; WORDS],
            pin_count,
            valid,
            latch: 0,
            pad: 0,
            drive_mask: 0,
            drive_level: 0,
            outputs: 0,
            pull_up: 0,
            pull_down: 0,
            jumpers: Vec::new(),
            writes: 0,
            log: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    fn word64(&self, base: usize) -> u64 {
        self.regs[base / 4] as u64 | (self.regs[base / 4 + 1] as u64) << 32
    }

    fn set_word64(&mut self, base: usize, value: u64) {
        self.regs[base / 4] = value as u32;
        self.regs[base / 4 + 1] = (value >> 32) as u32;
    }

    fn refresh_pin_modes(&mut self) {
        self.outputs = 0;
        self.pull_up = 0;
        self.pull_down = 0;
        for pin in 0..self.pin_count {
            let fsel = (self.regs[fsel_word(pin)] >> fsel_shift(pin)) & FSEL_MASK;
            if fsel == FSEL_OUTPUT {
                self.outputs |= 1 << pin;
            }
            let pull_base = Register::PullControl.base() / 4;
            match (self.regs[pull_base + pull_word(pin)] >> pull_shift(pin)) & PULL_MASK {
                PULL_UP => self.pull_up |= 1 << pin,
                PULL_DOWN => self.pull_down |= 1 << pin,
                _ => {}
            }
        }
    }

    fn resolve_pad(&self) -> u64 {
        let inputs = !self.outputs;
        let free = inputs & !self.drive_mask;
        let floating = free & !self.pull_up & !self.pull_down;

        let mut pad = (self.latch & self.outputs)
            | (self.drive_level & self.drive_mask & inputs)
            | (free & self.pull_up)
            | (self.pad & floating);

        for &(src, dst) in &self.jumpers {
            let dst_bit = 1u64 << dst;
            if free & dst_bit != 0 && self.outputs & (1 << src) != 0 {
                if pad & (1 << src) != 0 {
                    pad |= dst_bit;
                } else {
                    pad &= !dst_bit;
                }
            }
        }
        pad & self.valid
    }

    /// Resolve the pads and latch detected events into the status register.
    fn evaluate(&mut self) {
        let old = self.pad;
        let new = self.resolve_pad();
        self.pad = new;

        let rising = self.word64(GPREN0) | self.word64(GPAREN0);
        let falling = self.word64(GPFEN0) | self.word64(GPAFEN0);
        let events = (rising & !old & new)
            | (falling & old & !new)
            | (self.word64(GPHEN0) & new)
            | (self.word64(GPLEN0) & !new);

        let status = self.word64(GPEDS0) | (events & self.valid);
        self.set_word64(GPEDS0, status);
    }

    fn asserted(&self) -> bool {
        let enabled = self.word64(GPREN0)
            | self.word64(GPFEN0)
            | self.word64(GPHEN0)
            | self.word64(GPLEN0)
            | self.word64(GPAREN0)
            | self.word64(GPAFEN0);
        self.word64(GPEDS0) & enabled != 0
    }

    fn read(&self, offset: usize) -> u32 {
        if let Some(bank) = bank_at(offset, GPLEV0) {
            (self.pad >> (bank * 32)) as u32
        } else if bank_at(offset, GPSET0).is_some() || bank_at(offset, GPCLR0).is_some() {
            0
        } else {
            self.regs[offset / 4]
        }
    }

    /// Apply a bus write. Returns whether the block must be re-evaluated.
    fn write(&mut self, offset: usize, value: u32) -> bool {
        self.writes += 1;
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back((offset, value));

        if let Some(bank) = bank_at(offset, GPSET0) {
            self.latch |= (value as u64) << (bank * 32);
        } else if let Some(bank) = bank_at(offset, GPCLR0) {
            self.latch &= !((value as u64) << (bank * 32));
        } else if bank_at(offset, GPLEV0).is_some() {
            return false;
        } else if bank_at(offset, GPEDS0).is_some() {
            self.regs[offset / 4] &= !value;
            return false;
        } else {
            self.regs[offset / 4] = value;
            if in_group(offset, Register::FunctionSelect)
                || in_group(offset, Register::PullControl)
            {
                self.refresh_pin_modes();
            }
        }
        true
    }
}

impl SimGpio {
    pub fn new(pin_count: u32) -> Self {
        Self {
            state: Mutex::new(SimState::new(pin_count)),
            line: Mutex::new(LineState::default()),
            handler: Once::new(),
        }
    }

    pub fn leak(pin_count: u32) -> &'static Self {
        Box::leak(Box::new(Self::new(pin_count)))
    }

    /// Deliver this block's interrupt to `controller`.
    pub fn connect<R>(&self, controller: &'static Controller<R>)
    where
        R: RegisterBlock + 'static,
    {
        self.handler.call_once(|| -> Handler {
            Box::new(move || {
                controller.handle_interrupt();
            })
        });
    }

    /// Drive input `pin` externally, or release it with `None`.
    pub fn drive(&self, pin: u32, level: Option<bool>) {
        self.update(|state| {
            let bit = 1u64 << pin;
            match level {
                Some(high) => {
                    state.drive_mask |= bit;
                    if high {
                        state.drive_level |= bit;
                    } else {
                        state.drive_level &= !bit;
                    }
                }
                None => {
                    state.drive_mask &= !bit;
                    state.drive_level &= !bit;
                }
            }
        });
    }

    /// Wire `output` to `input`. While `output` drives, the input follows it
    /// unless driven externally; otherwise the input's pull decides.
    pub fn jumper(&self, output: u32, input: u32) {
        self.update(|state| state.jumpers.push((output, input)));
    }

    /// Run one hardware evaluation with no bus traffic, re-latching any
    /// level condition that still holds.
    pub fn sample(&self) {
        self.update(|_| {});
    }

    /// Register value as the driver would read it.
    pub fn peek(&self, offset: usize) -> u32 {
        self.state.lock().read(offset)
    }

    /// Store a raw register value without running the detectors.
    pub fn poke(&self, offset: usize, value: u32) {
        let mut state = self.state.lock();
        state.regs[offset / 4] = value;
        state.refresh_pin_modes();
    }

    pub fn pad_level(&self, pin: u32) -> bool {
        self.state.lock().pad & (1 << pin) != 0
    }

    /// Total bus writes since creation.
    pub fn write_count(&self) -> u64 {
        self.state.lock().writes
    }

    /// Most recent bus writes, oldest first.
    pub fn write_log(&self) -> Vec<(usize, u32)> {
        self.state.lock().log.iter().copied().collect()
    }

    pub fn irq_depth(&self) -> u32 {
        self.line.lock().depth
    }

    fn update(&self, f: impl FnOnce(&mut SimState)) {
        let asserted = {
            let mut state = self.state.lock();
            f(&mut state);
            state.evaluate();
            state.asserted()
        };
        if asserted {
            self.raise();
        }
    }

    fn raise(&self) {
        self.line.lock().pending = true;
        self.service();
    }

    fn service(&self) {
        loop {
            {
                let mut line = self.line.lock();
                if line.depth > 0 || line.in_service || !line.pending {
                    return;
                }
                line.pending = false;
                line.in_service = true;
            }

            // The line may have dropped while delivery was deferred.
            let asserted = self.state.lock().asserted();
            if asserted {
                if let Some(handler) = self.handler.get() {
                    handler();
                }
            }

            self.line.lock().in_service = false;
        }
    }
}

impl RegisterBlock for SimGpio {
    fn read32(&self, offset: usize) -> u32 {
        self.peek(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        let asserted = {
            let mut state = self.state.lock();
            if !state.write(offset, value) {
                return;
            }
            state.evaluate();
            state.asserted()
        };
        if asserted {
            self.raise();
        }
    }
}

impl IrqLine for SimGpio {
    fn disable(&self) {
        self.line.lock().depth += 1;
    }

    fn enable(&self) {
        let unmasked = {
            let mut line = self.line.lock();
            line.depth = line.depth.saturating_sub(1);
            line.depth == 0
        };
        if unmasked {
            self.service();
        }
    }
}
