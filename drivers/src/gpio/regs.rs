//! BCM2711 GPIO register map.
//!
//! Offsets are relative to the start of the GPIO block. Every group except
//! function-select and pull-control holds one bit per pin and one word per
//! bank.

// =============================================================================
// Geometry
// =============================================================================

pub const PINS_PER_BANK: u32 = 32;

/// Banks addressable by the driver (flat pin indices 0..64).
pub const MAX_BANKS: usize = 2;

pub const MAX_PINS: u32 = PINS_PER_BANK * MAX_BANKS as u32;

/// Size of the register window that must be mapped.
pub const GPIO_REGION_SIZE: usize = 0xF4;

// =============================================================================
// Register Offsets
// =============================================================================

pub const GPFSEL0: usize = 0x00;
pub const GPSET0: usize = 0x1C;
pub const GPCLR0: usize = 0x28;
pub const GPLEV0: usize = 0x34;
pub const GPEDS0: usize = 0x40;
pub const GPREN0: usize = 0x4C;
pub const GPFEN0: usize = 0x58;
pub const GPHEN0: usize = 0x64;
pub const GPLEN0: usize = 0x70;
pub const GPAREN0: usize = 0x7C;
pub const GPAFEN0: usize = 0x88;
pub const GPIO_PUP_PDN_CNTRL_REG0: usize = 0xE4;

// =============================================================================
// Function select (bits [3n+2:3n], 10 pins per word)
// =============================================================================

pub const FSEL_BITS: u32 = 3;
pub const FSEL_PINS_PER_WORD: u32 = 10;
pub const FSEL_MASK: u32 = 0b111;
pub const FSEL_INPUT: u32 = 0b000;
pub const FSEL_OUTPUT: u32 = 0b001;

// =============================================================================
// Pull control (bits [2n+1:2n], 16 pins per word)
// =============================================================================

pub const PULL_BITS: u32 = 2;
pub const PULL_PINS_PER_WORD: u32 = 16;
pub const PULL_MASK: u32 = 0b11;
pub const PULL_NONE: u32 = 0b00;
pub const PULL_UP: u32 = 0b01;
pub const PULL_DOWN: u32 = 0b10;

/// A 32-bit register group of the GPIO block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    FunctionSelect,
    OutputSet,
    OutputClear,
    Level,
    EventStatus,
    RisingEnable,
    FallingEnable,
    HighEnable,
    LowEnable,
    AsyncRisingEnable,
    AsyncFallingEnable,
    PullControl,
}

/// Every detect-enable group; cleared together when a pin changes mode.
pub const DETECT_ENABLES: [Register; 6] = [
    Register::RisingEnable,
    Register::FallingEnable,
    Register::HighEnable,
    Register::LowEnable,
    Register::AsyncRisingEnable,
    Register::AsyncFallingEnable,
];

impl Register {
    #[inline]
    pub const fn base(self) -> usize {
        match self {
            Self::FunctionSelect => GPFSEL0,
            Self::OutputSet => GPSET0,
            Self::OutputClear => GPCLR0,
            Self::Level => GPLEV0,
            Self::EventStatus => GPEDS0,
            Self::RisingEnable => GPREN0,
            Self::FallingEnable => GPFEN0,
            Self::HighEnable => GPHEN0,
            Self::LowEnable => GPLEN0,
            Self::AsyncRisingEnable => GPAREN0,
            Self::AsyncFallingEnable => GPAFEN0,
            Self::PullControl => GPIO_PUP_PDN_CNTRL_REG0,
        }
    }

    /// Number of consecutive 32-bit words in the group.
    #[inline]
    pub const fn words(self) -> usize {
        match self {
            // 58 pins / 10 per word, rounded up over both banks.
            Self::FunctionSelect => 7,
            Self::PullControl => 4,
            _ => MAX_BANKS,
        }
    }

    /// Byte offset of `word` within the block.
    ///
    /// Panics if `word` is outside the group: callers only ever pass indices
    /// derived from a validated pin.
    #[inline]
    pub fn offset(self, word: usize) -> usize {
        assert!(
            word < self.words(),
            "GPIO: register {:?} has no word {}",
            self,
            word
        );
        self.base() + word * 4
    }
}

#[inline]
pub const fn bank_of(pin: u32) -> usize {
    (pin / PINS_PER_BANK) as usize
}

#[inline]
pub const fn bit_of(pin: u32) -> u32 {
    1 << (pin % PINS_PER_BANK)
}

#[inline]
pub const fn fsel_word(pin: u32) -> usize {
    (pin / FSEL_PINS_PER_WORD) as usize
}

#[inline]
pub const fn fsel_shift(pin: u32) -> u32 {
    (pin % FSEL_PINS_PER_WORD) * FSEL_BITS
}

#[inline]
pub const fn pull_word(pin: u32) -> usize {
    (pin / PULL_PINS_PER_WORD) as usize
}

#[inline]
pub const fn pull_shift(pin: u32) -> u32 {
    (pin % PULL_PINS_PER_WORD) * PULL_BITS
}
