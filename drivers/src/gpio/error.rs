//! Errors returned by the pin, interrupt and callback layers.
//!
//! The register access layer never produces these: a bad register word is a
//! driver bug and panics instead.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Pin index is not below the controller's pin count.
    InvalidPin { pin: u32 },
    /// The hardware cannot express the requested flags.
    UnsupportedFlagCombination,
    /// A mask selects pins in more than one bank.
    BankMismatch,
    /// Reserved for exclusive multi-controller operations.
    Busy,
    EmptyMask,
    RegistryFull,
    NotRegistered,
    InvalidPinCount { count: u32 },
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin { pin } => write!(f, "pin {} out of range", pin),
            Self::UnsupportedFlagCombination => {
                write!(f, "flag combination not supported by hardware")
            }
            Self::BankMismatch => write!(f, "pin mask spans more than one bank"),
            Self::Busy => write!(f, "controller busy"),
            Self::EmptyMask => write!(f, "pin mask selects no pins"),
            Self::RegistryFull => write!(f, "no free callback slot"),
            Self::NotRegistered => write!(f, "callback handle is not registered"),
            Self::InvalidPinCount { count } => {
                write!(f, "controller cannot expose {} pins", count)
            }
        }
    }
}

/// Convenience result type for GPIO operations.
pub type GpioResult<T = ()> = Result<T, GpioError>;
