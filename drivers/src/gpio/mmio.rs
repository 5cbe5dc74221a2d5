use core::ptr::{read_volatile, write_volatile};

use super::regs::{GPIO_REGION_SIZE, Register};

/// A window of 32-bit device registers.
///
/// This is the only seam through which the driver touches hardware. The
/// real implementation is [`MmioRegion`]; the simulator implements it over
/// an in-memory register model.
pub trait RegisterBlock: Sync {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Volatile access to an already-mapped register window.
#[derive(Debug, Clone, Copy)]
pub struct MmioRegion {
    virt_base: usize,
    size: usize,
}

// SAFETY: the region is plain device memory; every access is a single
// volatile 32-bit load or store.
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}

impl MmioRegion {
    /// Wrap the mapping at `virt_base`.
    ///
    /// # Safety
    ///
    /// `virt_base..virt_base + size` must be mapped as device memory for the
    /// lifetime of the returned value and must not be aliased by any other
    /// driver.
    pub unsafe fn from_raw(virt_base: usize, size: usize) -> Option<Self> {
        if virt_base == 0 || size == 0 || virt_base % 4 != 0 {
            return None;
        }
        virt_base.checked_add(size)?;
        Some(Self { virt_base, size })
    }

    /// Wrap a mapping of the full GPIO block.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw).
    pub unsafe fn gpio(virt_base: usize) -> Option<Self> {
        unsafe { Self::from_raw(virt_base, GPIO_REGION_SIZE) }
    }

    #[inline]
    pub fn virt_base(&self) -> usize {
        self.virt_base
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl RegisterBlock for MmioRegion {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        debug_assert!(
            offset + 4 <= self.size,
            "MMIO read out of bounds: offset={}, region_size={}",
            offset,
            self.size
        );
        debug_assert!(offset % 4 == 0, "MMIO read misaligned: offset={}", offset);

        let ptr = (self.virt_base + offset) as *const u32;
        unsafe { read_volatile(ptr) }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        debug_assert!(
            offset + 4 <= self.size,
            "MMIO write out of bounds: offset={}, region_size={}",
            offset,
            self.size
        );
        debug_assert!(offset % 4 == 0, "MMIO write misaligned: offset={}", offset);

        let ptr = (self.virt_base + offset) as *mut u32;
        unsafe { write_volatile(ptr, value) }
    }
}

/// Register-group view over a [`RegisterBlock`].
///
/// Performs no locking. Read-modify-write sequences must run under the
/// controller guard; the write-1 registers can be used without it.
pub(crate) struct RegisterFile<R> {
    block: R,
}

impl<R: RegisterBlock> RegisterFile<R> {
    pub(crate) const fn new(block: R) -> Self {
        Self { block }
    }

    pub(crate) fn block(&self) -> &R {
        &self.block
    }

    #[inline]
    pub(crate) fn read_word(&self, reg: Register, word: usize) -> u32 {
        self.block.read32(reg.offset(word))
    }

    #[inline]
    pub(crate) fn write_word(&self, reg: Register, word: usize, value: u32) {
        self.block.write32(reg.offset(word), value)
    }

    /// Replace the bits in `clear` with those in `set`, leaving the rest of
    /// the word untouched.
    #[inline]
    pub(crate) fn modify_word(&self, reg: Register, word: usize, clear: u32, set: u32) {
        let offset = reg.offset(word);
        let value = self.block.read32(offset);
        self.block.write32(offset, (value & !clear) | set);
    }
}
