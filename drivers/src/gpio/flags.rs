//! Pin and interrupt configuration types.

use bitflags::bitflags;

use super::error::{GpioError, GpioResult};
use super::regs::{MAX_BANKS, PINS_PER_BANK, bank_of};

bitflags! {
    /// Request flags accepted by [`PinConfig::from_flags`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GpioFlags: u32 {
        const INPUT = 1 << 0;
        const OUTPUT = 1 << 1;
        const OUTPUT_INIT_LOW = 1 << 2;
        const OUTPUT_INIT_HIGH = 1 << 3;
        const PULL_UP = 1 << 4;
        const PULL_DOWN = 1 << 5;
        const OPEN_DRAIN = 1 << 6;
        const OPEN_SOURCE = 1 << 7;

        const OUTPUT_LOW = Self::OUTPUT.bits() | Self::OUTPUT_INIT_LOW.bits();
        const OUTPUT_HIGH = Self::OUTPUT.bits() | Self::OUTPUT_INIT_HIGH.bits();
    }
}

impl GpioFlags {
    /// Input with no pull.
    pub const DISCONNECTED: Self = Self::empty();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Electrical configuration applied by `configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    pub direction: Direction,
    /// Level driven once the pin becomes an output. Ignored for inputs.
    pub initial_high: bool,
    pub pull: Pull,
}

impl PinConfig {
    pub const fn input() -> Self {
        Self::input_pull(Pull::None)
    }

    pub const fn input_pull(pull: Pull) -> Self {
        Self {
            direction: Direction::Input,
            initial_high: false,
            pull,
        }
    }

    pub const fn output(initial_high: bool) -> Self {
        Self {
            direction: Direction::Output,
            initial_high,
            pull: Pull::None,
        }
    }

    pub const fn disconnected() -> Self {
        Self::input()
    }

    pub const fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }

    pub fn from_flags(flags: GpioFlags) -> GpioResult<Self> {
        if flags.intersects(GpioFlags::OPEN_DRAIN | GpioFlags::OPEN_SOURCE)
            || flags.contains(GpioFlags::PULL_UP | GpioFlags::PULL_DOWN)
            || flags.contains(GpioFlags::INPUT | GpioFlags::OUTPUT)
            || flags.contains(GpioFlags::OUTPUT_INIT_LOW | GpioFlags::OUTPUT_INIT_HIGH)
        {
            return Err(GpioError::UnsupportedFlagCombination);
        }

        let pull = if flags.contains(GpioFlags::PULL_UP) {
            Pull::Up
        } else if flags.contains(GpioFlags::PULL_DOWN) {
            Pull::Down
        } else {
            Pull::None
        };

        let config = if flags.contains(GpioFlags::OUTPUT) {
            Self::output(flags.contains(GpioFlags::OUTPUT_INIT_HIGH))
        } else {
            Self::input()
        };
        Ok(config.with_pull(pull))
    }
}

/// Per-pin detection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    Disabled,
    EdgeRising,
    EdgeFalling,
    EdgeBoth,
    LevelHigh,
    LevelLow,
}

impl InterruptMode {
    #[inline]
    pub fn is_level(self) -> bool {
        matches!(self, Self::LevelHigh | Self::LevelLow)
    }

    pub fn from_flags(flags: InterruptFlags) -> GpioResult<Self> {
        let edge = flags.contains(InterruptFlags::MODE_EDGE);
        let level = flags.contains(InterruptFlags::MODE_LEVEL);
        let high = flags.contains(InterruptFlags::TRIG_HIGH);
        let low = flags.contains(InterruptFlags::TRIG_LOW);

        match (edge, level, high, low) {
            (true, true, _, _) => Err(GpioError::UnsupportedFlagCombination),
            (false, false, _, _) => Ok(Self::Disabled),
            (true, false, true, true) => Ok(Self::EdgeBoth),
            (true, false, true, false) => Ok(Self::EdgeRising),
            (true, false, false, true) => Ok(Self::EdgeFalling),
            (false, true, true, false) => Ok(Self::LevelHigh),
            (false, true, false, true) => Ok(Self::LevelLow),
            _ => Err(GpioError::UnsupportedFlagCombination),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptFlags: u32 {
        const MODE_EDGE = 1 << 0;
        const MODE_LEVEL = 1 << 1;
        const TRIG_LOW = 1 << 2;
        const TRIG_HIGH = 1 << 3;
        const TRIG_BOTH = Self::TRIG_LOW.bits() | Self::TRIG_HIGH.bits();

        const EDGE_RISING = Self::MODE_EDGE.bits() | Self::TRIG_HIGH.bits();
        const EDGE_FALLING = Self::MODE_EDGE.bits() | Self::TRIG_LOW.bits();
        const EDGE_BOTH = Self::MODE_EDGE.bits() | Self::TRIG_BOTH.bits();
        const LEVEL_HIGH = Self::MODE_LEVEL.bits() | Self::TRIG_HIGH.bits();
        const LEVEL_LOW = Self::MODE_LEVEL.bits() | Self::TRIG_LOW.bits();
    }
}

/// Flat set of logical pins, `bit n` = pin `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinMask(u64);

impl PinMask {
    pub const EMPTY: Self = Self(0);

    /// Mask of one pin; pins past 63 give an empty mask.
    #[inline]
    pub const fn pin(pin: u32) -> Self {
        match 1u64.checked_shl(pin) {
            Some(bit) => Self(bit),
            None => Self::EMPTY,
        }
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Mask covering `bits` of `bank`.
    #[inline]
    pub const fn from_bank(bank: usize, bits: u32) -> Self {
        Self((bits as u64) << (bank as u32 * PINS_PER_BANK))
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, pin: u32) -> bool {
        pin < 64 && self.0 & (1 << pin) != 0
    }

    /// Highest pin in the mask.
    #[inline]
    pub const fn highest(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(63 - self.0.leading_zeros())
        }
    }

    /// Bank index and bank-relative bits. Fails if the mask is empty or
    /// reaches into a second bank.
    pub fn split_bank(self) -> GpioResult<(usize, u32)> {
        let lowest = self.0.trailing_zeros();
        let Some(highest) = self.highest() else {
            return Err(GpioError::EmptyMask);
        };
        let bank = bank_of(lowest);
        if bank_of(highest) != bank || bank >= MAX_BANKS {
            return Err(GpioError::BankMismatch);
        }
        Ok((bank, (self.0 >> (bank as u32 * PINS_PER_BANK)) as u32))
    }

    pub fn iter(self) -> impl Iterator<Item = u32> {
        (0..64u32).filter(move |&pin| self.contains(pin))
    }
}

impl core::ops::BitOr for PinMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for PinMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Function-select field as read back from the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinFunction {
    Input,
    Output,
    Alternate(u8),
}

/// Snapshot of a pin's programmed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    pub function: PinFunction,
    pub pull: Pull,
    pub level: bool,
}

impl PinState {
    /// Whether this readback reflects `config` as last written. The level
    /// only has to match for outputs.
    pub fn matches(&self, config: &PinConfig) -> bool {
        match config.direction {
            Direction::Input => self.function == PinFunction::Input && self.pull == config.pull,
            Direction::Output => {
                self.function == PinFunction::Output
                    && self.pull == config.pull
                    && self.level == config.initial_high
            }
        }
    }
}
