//! BCM2711 GPIO controller.
//!
//! One [`Controller`] per GPIO block. All read-modify-write sequences on
//! shared register words run under the controller guard, an [`IrqMutex`]
//! that masks the block's interrupt line when taken from thread context and
//! only spins when taken from the service routine. The callback registry has
//! its own lock so handlers can be looked up without holding the guard.

pub mod callback;
pub mod error;
pub mod flags;
pub mod irq;
pub mod mmio;
mod pin;
pub mod regs;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

use bcmgpio_lib::{IrqLine, IrqMutex, klog_info};

use self::callback::CallbackRegistry;
use self::mmio::RegisterFile;
use self::regs::{MAX_PINS, PINS_PER_BANK};

pub use self::callback::{CallbackHandle, GPIO_CALLBACK_SLOTS, GpioCallback};
pub use self::error::{GpioError, GpioResult};
pub use self::flags::{
    Direction, GpioFlags, InterruptFlags, InterruptMode, PinConfig, PinFunction, PinMask,
    PinState, Pull,
};
pub use self::irq::{EventSnapshot, InterruptStats};
pub use self::mmio::{MmioRegion, RegisterBlock};

/// Physical base of the GPIO block on BCM2711 (low-peripheral mode).
pub const BCM2711_GPIO_BASE: u64 = 0xFE20_0000;

/// GPIO lines wired out on BCM2711 (GPIO0..GPIO57).
pub const BCM2711_PIN_COUNT: u32 = 58;

pub struct Controller<R: RegisterBlock> {
    regs: RegisterFile<R>,
    pin_count: u32,
    guard: IrqMutex<()>,
    callbacks: IrqMutex<CallbackRegistry>,
    stats: InterruptStats,
}

impl<R: RegisterBlock> Controller<R> {
    /// Bind a controller to its register window and interrupt line.
    ///
    /// Does not touch the hardware: pins keep whatever configuration the
    /// firmware left behind until they are configured.
    pub fn new(regs: R, line: &'static dyn IrqLine, pin_count: u32) -> GpioResult<Self> {
        if pin_count == 0 || pin_count > MAX_PINS {
            return Err(GpioError::InvalidPinCount { count: pin_count });
        }

        let controller = Self {
            regs: RegisterFile::new(regs),
            pin_count,
            guard: IrqMutex::new(line, ()),
            callbacks: IrqMutex::new(line, CallbackRegistry::new()),
            stats: InterruptStats::new(),
        };
        klog_info!(
            "GPIO: controller ready, {} pins in {} banks",
            pin_count,
            controller.bank_count()
        );
        Ok(controller)
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn bank_count(&self) -> usize {
        self.pin_count.div_ceil(PINS_PER_BANK) as usize
    }

    /// Handle for a validated pin index.
    pub fn pin(&self, index: u32) -> GpioResult<PinSpec<'_, R>> {
        self.check_pin(index)?;
        Ok(PinSpec {
            controller: self,
            index,
        })
    }

    #[inline]
    pub fn stats(&self) -> &InterruptStats {
        &self.stats
    }

    /// Underlying register window.
    #[inline]
    pub fn registers(&self) -> &R {
        self.regs.block()
    }

    #[inline]
    fn check_pin(&self, pin: u32) -> GpioResult {
        if pin < self.pin_count {
            Ok(())
        } else {
            Err(GpioError::InvalidPin { pin })
        }
    }

    /// Bank and bank-relative bits of a non-empty, single-bank mask of
    /// existing pins.
    fn check_mask(&self, mask: PinMask) -> GpioResult<(usize, u32)> {
        if let Some(highest) = mask.highest() {
            self.check_pin(highest)?;
        }
        mask.split_bank()
    }

    #[inline]
    fn check_bank(&self, bank: usize) -> GpioResult {
        if bank < self.bank_count() {
            Ok(())
        } else {
            Err(GpioError::InvalidPin {
                pin: bank as u32 * PINS_PER_BANK,
            })
        }
    }
}

/// A pin index already checked against its controller.
pub struct PinSpec<'a, R: RegisterBlock> {
    controller: &'a Controller<R>,
    index: u32,
}

impl<R: RegisterBlock> Clone for PinSpec<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: RegisterBlock> Copy for PinSpec<'_, R> {}

impl<'a, R: RegisterBlock> PinSpec<'a, R> {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn bank(&self) -> usize {
        regs::bank_of(self.index)
    }

    #[inline]
    pub fn mask(&self) -> PinMask {
        PinMask::pin(self.index)
    }

    #[inline]
    pub fn controller(&self) -> &'a Controller<R> {
        self.controller
    }

    pub fn configure(&self, config: PinConfig) -> GpioResult {
        self.controller.configure(self.index, config)
    }

    pub fn configure_flags(&self, flags: GpioFlags) -> GpioResult {
        self.controller.configure_flags(self.index, flags)
    }

    pub fn read_level(&self) -> GpioResult<bool> {
        self.controller.read_level(self.index)
    }

    pub fn set_level(&self, high: bool) -> GpioResult {
        self.controller.set_level(self.index, high)
    }

    pub fn toggle_level(&self) -> GpioResult {
        self.controller.toggle_level(self.index)
    }

    pub fn read_config(&self) -> GpioResult<PinState> {
        self.controller.read_config(self.index)
    }

    pub fn interrupt_configure(&self, mode: InterruptMode) -> GpioResult {
        self.controller.interrupt_configure(self.index, mode)
    }

    pub fn interrupt_configure_flags(&self, flags: InterruptFlags) -> GpioResult {
        self.controller.interrupt_configure_flags(self.index, flags)
    }

    pub fn interrupt_mode(&self) -> GpioResult<InterruptMode> {
        self.controller.interrupt_mode(self.index)
    }
}
