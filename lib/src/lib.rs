#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod irq_line;
pub mod klog;
pub mod spinlock;
pub mod testing;

#[doc(hidden)]
pub use paste;

pub use clock::{ClockSource, clock_register_source, elapsed_ticks, now_ticks, ticks_to_ns};
pub use irq_line::{IrqMaskFn, NestedIrqLine};
pub use klog::{
    KlogLevel, klog_get_level, klog_init, klog_is_enabled, klog_register_backend, klog_set_level,
};
pub use spinlock::{IrqLine, IrqMutex, IrqMutexGuard};
