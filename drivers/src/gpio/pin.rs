//! Pin configuration and level access.

use super::flags::{Direction, GpioFlags, PinConfig, PinFunction, PinMask, PinState, Pull};
use super::mmio::RegisterBlock;
use super::regs::{
    FSEL_INPUT, FSEL_MASK, FSEL_OUTPUT, PULL_DOWN, PULL_MASK, PULL_NONE, PULL_UP, Register,
    bank_of, bit_of, fsel_shift, fsel_word, pull_shift, pull_word,
};
use super::{Controller, GpioResult};

fn pull_bits(pull: Pull) -> u32 {
    match pull {
        Pull::None => PULL_NONE,
        Pull::Up => PULL_UP,
        Pull::Down => PULL_DOWN,
    }
}

fn decode_pull(raw: u32) -> Pull {
    match raw {
        PULL_UP => Pull::Up,
        PULL_DOWN => Pull::Down,
        // 0b11 is reserved and reads back as no pull.
        _ => Pull::None,
    }
}

impl<R: RegisterBlock> Controller<R> {
    /// Apply `config` to `pin` in one guarded critical section.
    ///
    /// Outputs get their initial level latched before the function select
    /// flips to output, so the pin never drives a stale level.
    pub fn configure(&self, pin: u32, config: PinConfig) -> GpioResult {
        self.check_pin(pin)?;

        let _guard = self.guard.lock();
        match config.direction {
            Direction::Output => {
                self.write_output_latch(pin, config.initial_high);
                self.write_pull(pin, config.pull);
                self.write_function(pin, FSEL_OUTPUT);
            }
            Direction::Input => {
                self.write_function(pin, FSEL_INPUT);
                self.write_pull(pin, config.pull);
            }
        }
        Ok(())
    }

    pub fn configure_flags(&self, pin: u32, flags: GpioFlags) -> GpioResult {
        self.configure(pin, PinConfig::from_flags(flags)?)
    }

    /// Sampled pad level. Unlocked: the level register is read-only.
    pub fn read_level(&self, pin: u32) -> GpioResult<bool> {
        self.check_pin(pin)?;
        Ok(self.regs.read_word(Register::Level, bank_of(pin)) & bit_of(pin) != 0)
    }

    /// Drive an output pin. Unlocked: set/clear are write-1 registers.
    pub fn set_level(&self, pin: u32, high: bool) -> GpioResult {
        self.check_pin(pin)?;
        self.write_output_latch(pin, high);
        Ok(())
    }

    pub fn toggle_level(&self, pin: u32) -> GpioResult {
        self.check_pin(pin)?;
        self.port_toggle_bits(PinMask::pin(pin))
    }

    /// Raw level word of `bank`.
    pub fn port_get_raw(&self, bank: usize) -> GpioResult<u32> {
        self.check_bank(bank)?;
        Ok(self.regs.read_word(Register::Level, bank))
    }

    pub fn port_set_bits(&self, mask: PinMask) -> GpioResult {
        let (bank, bits) = self.check_mask(mask)?;
        self.regs.write_word(Register::OutputSet, bank, bits);
        Ok(())
    }

    pub fn port_clear_bits(&self, mask: PinMask) -> GpioResult {
        let (bank, bits) = self.check_mask(mask)?;
        self.regs.write_word(Register::OutputClear, bank, bits);
        Ok(())
    }

    /// Drive every pin of `mask` to the matching bit of `value`
    /// (bank-relative).
    pub fn port_set_masked(&self, mask: PinMask, value: u32) -> GpioResult {
        let (bank, bits) = self.check_mask(mask)?;
        let high = bits & value;
        let low = bits & !value;
        if high != 0 {
            self.regs.write_word(Register::OutputSet, bank, high);
        }
        if low != 0 {
            self.regs.write_word(Register::OutputClear, bank, low);
        }
        Ok(())
    }

    pub fn port_toggle_bits(&self, mask: PinMask) -> GpioResult {
        let (bank, bits) = self.check_mask(mask)?;

        let _guard = self.guard.lock();
        let level = self.regs.read_word(Register::Level, bank);
        let rising = bits & !level;
        let falling = bits & level;
        if falling != 0 {
            self.regs.write_word(Register::OutputClear, bank, falling);
        }
        if rising != 0 {
            self.regs.write_word(Register::OutputSet, bank, rising);
        }
        Ok(())
    }

    /// Function, pull and level of `pin` as currently programmed.
    pub fn read_config(&self, pin: u32) -> GpioResult<PinState> {
        self.check_pin(pin)?;

        let _guard = self.guard.lock();
        let fsel = (self.regs.read_word(Register::FunctionSelect, fsel_word(pin))
            >> fsel_shift(pin))
            & FSEL_MASK;
        let pull =
            (self.regs.read_word(Register::PullControl, pull_word(pin)) >> pull_shift(pin)) & PULL_MASK;
        let level = self.regs.read_word(Register::Level, bank_of(pin)) & bit_of(pin) != 0;

        let function = match fsel {
            FSEL_INPUT => PinFunction::Input,
            FSEL_OUTPUT => PinFunction::Output,
            alt => PinFunction::Alternate(alt as u8),
        };
        Ok(PinState {
            function,
            pull: decode_pull(pull),
            level,
        })
    }

    fn write_output_latch(&self, pin: u32, high: bool) {
        let reg = if high {
            Register::OutputSet
        } else {
            Register::OutputClear
        };
        self.regs.write_word(reg, bank_of(pin), bit_of(pin));
    }

    fn write_function(&self, pin: u32, function: u32) {
        let shift = fsel_shift(pin);
        self.regs.modify_word(
            Register::FunctionSelect,
            fsel_word(pin),
            FSEL_MASK << shift,
            function << shift,
        );
    }

    fn write_pull(&self, pin: u32, pull: Pull) {
        let shift = pull_shift(pin);
        self.regs.modify_word(
            Register::PullControl,
            pull_word(pin),
            PULL_MASK << shift,
            pull_bits(pull) << shift,
        );
    }
}
