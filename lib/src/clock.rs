//! Monotonic tick source.
//!
//! The GPIO core never reads time itself. Latency measurement and the test
//! harness need a counter, so the platform installs one during bring-up
//! (the ARM generic timer on target, `Instant` under the host test runner).
//! Before a source is registered every accessor returns `0` and tick
//! conversion is the identity.

use spin::Once;

#[derive(Clone, Copy)]
pub struct ClockSource {
    /// Current value of a free-running monotonic counter.
    pub now: fn() -> u64,
    /// Converts a tick delta into nanoseconds.
    pub ticks_to_ns: fn(u64) -> u64,
}

static SOURCE: Once<ClockSource> = Once::new();

/// Install the platform tick source. Only the first call takes effect;
/// returns `false` if a source was already registered.
pub fn clock_register_source(source: ClockSource) -> bool {
    let mut installed = false;
    SOURCE.call_once(|| {
        installed = true;
        source
    });
    installed
}

#[inline]
pub fn clock_is_registered() -> bool {
    SOURCE.is_completed()
}

#[inline]
pub fn now_ticks() -> u64 {
    match SOURCE.get() {
        Some(source) => (source.now)(),
        None => 0,
    }
}

#[inline]
pub fn ticks_to_ns(ticks: u64) -> u64 {
    match SOURCE.get() {
        Some(source) => (source.ticks_to_ns)(ticks),
        None => ticks,
    }
}

/// Tick delta between two readings, or `None` if the counter did not advance.
#[inline]
pub fn elapsed_ticks(start: u64, end: u64) -> Option<u64> {
    if end > start { Some(end - start) } else { None }
}
