use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// An interrupt source that a lock can hold off for the length of a
/// critical section.
///
/// `disable`/`enable` calls nest: the source is only re-enabled once every
/// `disable` has been matched. Implementations must be callable from any
/// thread and must never block.
pub trait IrqLine: Sync {
    fn disable(&self);
    fn enable(&self);
}

/// Mutex that masks its interrupt line while held from thread context.
///
/// Shared between ordinary call context and the interrupt service routine
/// of the device that owns the line:
///
/// - [`lock`](Self::lock) masks the line first and then spins, so the ISR
///   can never preempt a thread that is halfway through a read-modify-write.
/// - [`lock_from_isr`](Self::lock_from_isr) only spins. The vector entry has
///   already masked the line, so the only possible holder is a thread on
///   another CPU, which finishes in bounded time.
///
/// Acquisition never sleeps.
pub struct IrqMutex<T> {
    lock: AtomicBool,
    line: &'static dyn IrqLine,
    data: UnsafeCell<T>,
}

// SAFETY: IrqMutex provides exclusive access through atomic locking with the
// owning interrupt line masked, making it safe to share across contexts.
unsafe impl<T: Send> Send for IrqMutex<T> {}
unsafe impl<T: Send> Sync for IrqMutex<T> {}

pub struct IrqMutexGuard<'a, T> {
    mutex: &'a IrqMutex<T>,
    masked: bool,
}

impl<T> IrqMutex<T> {
    #[inline]
    pub const fn new(line: &'static dyn IrqLine, data: T) -> Self {
        Self {
            lock: AtomicBool::new(false),
            line,
            data: UnsafeCell::new(data),
        }
    }

    /// Check if the lock is currently held.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }

    #[inline]
    fn acquire(&self) {
        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            spin_loop();
        }
    }

    #[inline]
    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        self.line.disable();
        self.acquire();

        IrqMutexGuard {
            mutex: self,
            masked: true,
        }
    }

    /// Acquire from the interrupt service routine of the line's owner.
    ///
    /// Must only be called while the line is already masked by the vector
    /// entry; calling it from thread context gives up the ISR exclusion.
    #[inline]
    pub fn lock_from_isr(&self) -> IrqMutexGuard<'_, T> {
        self.acquire();

        IrqMutexGuard {
            mutex: self,
            masked: false,
        }
    }
}

impl<'a, T> Deref for IrqMutexGuard<'a, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
    }
}

impl<'a, T> DerefMut for IrqMutexGuard<'a, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<'a, T> Drop for IrqMutexGuard<'a, T> {
    #[inline]
    fn drop(&mut self) {
        self.mutex.lock.store(false, Ordering::Release);
        // The lock is released before the line is unmasked: a pending
        // interrupt delivered on unmask must be able to take the lock.
        if self.masked {
            self.mutex.line.enable();
        }
    }
}
