//! Interrupt detection programming, decode and dispatch.
//!
//! Dispatch is split in two. The latch step runs under the controller guard
//! (taken with [`IrqMutex::lock_from_isr`](bcmgpio_lib::IrqMutex::lock_from_isr)):
//! it reads the event status, re-derives which pins still qualify and clears
//! every status bit it observed. Handlers are then looked up and run with no
//! lock held, so a slow callback never delays configuration of other pins.

use core::sync::atomic::{AtomicU64, Ordering};

use bcmgpio_lib::{klog_debug, klog_trace};

use super::callback::{CallbackHandle, GpioCallback};
use super::flags::{InterruptFlags, InterruptMode, PinMask};
use super::mmio::RegisterBlock;
use super::regs::{DETECT_ENABLES, Register, bank_of, bit_of};
use super::{Controller, GpioResult};

/// Pins that fired in one bank during one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSnapshot {
    pub bank: usize,
    /// Bank-relative bitmask.
    pub fired: u32,
}

impl EventSnapshot {
    #[inline]
    pub fn pins(&self) -> PinMask {
        PinMask::from_bank(self.bank, self.fired)
    }

    #[inline]
    pub fn contains(&self, pin: u32) -> bool {
        bank_of(pin) == self.bank && self.fired & bit_of(pin) != 0
    }
}

/// Dispatch counters, updated from the service routine.
pub struct InterruptStats {
    dispatches: AtomicU64,
    callbacks: AtomicU64,
    spurious: AtomicU64,
}

impl InterruptStats {
    pub(crate) const fn new() -> Self {
        Self {
            dispatches: AtomicU64::new(0),
            callbacks: AtomicU64::new(0),
            spurious: AtomicU64::new(0),
        }
    }

    /// Passes in which at least one pin qualified.
    pub fn dispatches(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    /// Handler invocations.
    pub fn callbacks(&self) -> u64 {
        self.callbacks.load(Ordering::Relaxed)
    }

    /// Passes that found status latched but no pin still qualifying.
    pub fn spurious(&self) -> u64 {
        self.spurious.load(Ordering::Relaxed)
    }
}

impl<R: RegisterBlock> Controller<R> {
    /// Switch `pin` to `mode`.
    ///
    /// Every detect enable for the pin is cleared and its stale status bit
    /// acknowledged before the new enables are set, so a latched event from
    /// the previous mode cannot fire under the new one.
    pub fn interrupt_configure(&self, pin: u32, mode: InterruptMode) -> GpioResult {
        self.check_pin(pin)?;

        let _guard = self.guard.lock();
        self.program_mode(bank_of(pin), bit_of(pin), mode);
        Ok(())
    }

    pub fn interrupt_configure_flags(&self, pin: u32, flags: InterruptFlags) -> GpioResult {
        self.interrupt_configure(pin, InterruptMode::from_flags(flags)?)
    }

    /// Apply `mode` to every pin of a single-bank mask in one critical
    /// section.
    pub fn interrupt_configure_mask(&self, mask: PinMask, mode: InterruptMode) -> GpioResult {
        let (bank, bits) = self.check_mask(mask)?;

        let _guard = self.guard.lock();
        self.program_mode(bank, bits, mode);
        Ok(())
    }

    /// Mode currently programmed for `pin`, decoded from the enables.
    pub fn interrupt_mode(&self, pin: u32) -> GpioResult<InterruptMode> {
        self.check_pin(pin)?;
        let bank = bank_of(pin);
        let bit = bit_of(pin);

        let _guard = self.guard.lock();
        let enabled = |reg: Register| self.regs.read_word(reg, bank) & bit != 0;
        let rising = enabled(Register::RisingEnable) || enabled(Register::AsyncRisingEnable);
        let falling = enabled(Register::FallingEnable) || enabled(Register::AsyncFallingEnable);

        let mode = if enabled(Register::HighEnable) {
            InterruptMode::LevelHigh
        } else if enabled(Register::LowEnable) {
            InterruptMode::LevelLow
        } else {
            match (rising, falling) {
                (true, true) => InterruptMode::EdgeBoth,
                (true, false) => InterruptMode::EdgeRising,
                (false, true) => InterruptMode::EdgeFalling,
                (false, false) => InterruptMode::Disabled,
            }
        };
        Ok(mode)
    }

    /// Register `handler` for events on `mask`, which must lie in one bank.
    pub fn register_callback(
        &self,
        mask: PinMask,
        handler: &'static dyn GpioCallback,
    ) -> GpioResult<CallbackHandle> {
        let (bank, bits) = self.check_mask(mask)?;
        let handle = self.callbacks.lock().add(bank, bits, handler)?;
        klog_debug!(
            "GPIO: callback slot {} registered for bank {} mask {:#010x}",
            handle.slot(),
            bank,
            bits
        );
        Ok(handle)
    }

    pub fn unregister_callback(&self, handle: CallbackHandle) -> GpioResult {
        self.callbacks.lock().remove(handle)?;
        klog_debug!("GPIO: callback slot {} removed", handle.slot());
        Ok(())
    }

    /// Service routine entry: services every bank and returns the number of
    /// handler invocations.
    ///
    /// Must run with the controller's interrupt line masked.
    pub fn handle_interrupt(&self) -> usize {
        (0..self.bank_count())
            .map(|bank| self.handle_bank_interrupt(bank))
            .sum()
    }

    /// Service one bank. See [`handle_interrupt`](Self::handle_interrupt).
    pub fn handle_bank_interrupt(&self, bank: usize) -> usize {
        if self.check_bank(bank).is_err() {
            return 0;
        }

        let fired = self.latch_events(bank);
        if fired == 0 {
            return 0;
        }

        let event = EventSnapshot { bank, fired };
        let handlers = self.callbacks.lock_from_isr().collect(&event);
        for handler in handlers.iter() {
            handler.on_event(&event);
        }

        self.stats.dispatches.fetch_add(1, Ordering::Relaxed);
        self.stats
            .callbacks
            .fetch_add(handlers.len() as u64, Ordering::Relaxed);
        handlers.len()
    }

    /// Read, qualify and acknowledge the event status of `bank`.
    ///
    /// A level status bit only counts if the pad is still at the configured
    /// level; a glitch that latched and went away is acknowledged silently.
    fn latch_events(&self, bank: usize) -> u32 {
        let _guard = self.guard.lock_from_isr();

        let status = self.regs.read_word(Register::EventStatus, bank);
        if status == 0 {
            return 0;
        }

        let edge = self.regs.read_word(Register::RisingEnable, bank)
            | self.regs.read_word(Register::FallingEnable, bank)
            | self.regs.read_word(Register::AsyncRisingEnable, bank)
            | self.regs.read_word(Register::AsyncFallingEnable, bank);
        let high = self.regs.read_word(Register::HighEnable, bank);
        let low = self.regs.read_word(Register::LowEnable, bank);
        let level = self.regs.read_word(Register::Level, bank);

        let fired = status & (edge | (high & level) | (low & !level));
        self.regs.write_word(Register::EventStatus, bank, status);

        if fired == 0 {
            self.stats.spurious.fetch_add(1, Ordering::Relaxed);
            klog_trace!("GPIO: bank {} status {:#010x} no longer qualifies", bank, status);
        }
        fired
    }

    fn program_mode(&self, bank: usize, bits: u32, mode: InterruptMode) {
        for reg in DETECT_ENABLES {
            self.regs.modify_word(reg, bank, bits, 0);
        }
        self.regs.write_word(Register::EventStatus, bank, bits);

        let enables: &[Register] = match mode {
            InterruptMode::Disabled => &[],
            InterruptMode::EdgeRising => &[Register::RisingEnable],
            InterruptMode::EdgeFalling => &[Register::FallingEnable],
            InterruptMode::EdgeBoth => &[Register::RisingEnable, Register::FallingEnable],
            InterruptMode::LevelHigh => &[Register::HighEnable],
            InterruptMode::LevelLow => &[Register::LowEnable],
        };
        for &reg in enables {
            self.regs.modify_word(reg, bank, 0, bits);
        }
    }
}
