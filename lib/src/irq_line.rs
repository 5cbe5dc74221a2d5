//! Nesting interrupt-line mask backed by platform hooks.
//!
//! A controller's interrupt line is shared by every thread that configures
//! it, so masking cannot be a plain flag: two overlapping critical sections
//! would let the first one to finish unmask the line under the second.
//! `NestedIrqLine` keeps a depth count and only calls the platform hooks on
//! the 0 -> 1 and 1 -> 0 transitions. The count and the hook call are
//! updated under one spinlock so a concurrent mask/unmask pair cannot reach
//! the interrupt controller out of order.

use spin::Mutex;

use crate::spinlock::IrqLine;

/// Platform hook that masks or unmasks interrupt number `irq`.
pub type IrqMaskFn = fn(u32);

pub struct NestedIrqLine {
    irq: u32,
    depth: Mutex<u32>,
    mask: Option<IrqMaskFn>,
    unmask: Option<IrqMaskFn>,
}

impl NestedIrqLine {
    pub const fn new(irq: u32, mask: IrqMaskFn, unmask: IrqMaskFn) -> Self {
        Self {
            irq,
            depth: Mutex::new(0),
            mask: Some(mask),
            unmask: Some(unmask),
        }
    }

    /// A line with no interrupt controller behind it (polled operation).
    pub const fn detached(irq: u32) -> Self {
        Self {
            irq,
            depth: Mutex::new(0),
            mask: None,
            unmask: None,
        }
    }

    #[inline]
    pub fn irq(&self) -> u32 {
        self.irq
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        *self.depth.lock()
    }

    #[inline]
    pub fn is_masked(&self) -> bool {
        self.depth() != 0
    }
}

impl IrqLine for NestedIrqLine {
    fn disable(&self) {
        let mut depth = self.depth.lock();
        if *depth == 0 {
            if let Some(mask) = self.mask {
                mask(self.irq);
            }
        }
        *depth += 1;
    }

    fn enable(&self) {
        let mut depth = self.depth.lock();
        debug_assert!(*depth > 0, "unbalanced enable on irq {}", self.irq);
        *depth = depth.saturating_sub(1);
        if *depth == 0 {
            if let Some(unmask) = self.unmask {
                unmask(self.irq);
            }
        }
    }
}
