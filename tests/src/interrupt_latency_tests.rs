//! Rising-edge latency from a GPIO23 write to the GPIO24 callback.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bcmgpio_drivers::gpio::{
    EventSnapshot, GpioCallback, GpioFlags, InterruptFlags, InterruptMode, PinConfig, PinMask,
};
use bcmgpio_lib::testing::{TestConfig, TestResult};
use bcmgpio_lib::{
    assert_ok, assert_test, define_test_suite, elapsed_ticks, klog_info, now_ticks, pass,
    ticks_to_ns,
};

use crate::fixtures::{self, LOOPBACK_INPUT, LOOPBACK_OUTPUT};

/// Give up on a sample after this long.
const SAMPLE_TIMEOUT_NS: u64 = 100_000_000;

struct EdgeStamp {
    ts_end: AtomicU64,
    seen: AtomicBool,
}

impl GpioCallback for EdgeStamp {
    fn on_event(&self, event: &EventSnapshot) {
        if event.contains(LOOPBACK_INPUT) {
            self.ts_end.store(now_ticks(), Ordering::Release);
            self.seen.store(true, Ordering::Release);
        }
    }
}

impl EdgeStamp {
    fn wait(&self, start: u64) -> bool {
        while !self.seen.load(Ordering::Acquire) {
            if ticks_to_ns(now_ticks().saturating_sub(start)) > SAMPLE_TIMEOUT_NS {
                return false;
            }
            core::hint::spin_loop();
        }
        true
    }
}

pub fn test_rising_edge_latency(config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    let stamp: &'static EdgeStamp = Box::leak(Box::new(EdgeStamp {
        ts_end: AtomicU64::new(0),
        seen: AtomicBool::new(false),
    }));

    assert_ok!(gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT_LOW));
    assert_ok!(gpio.configure_flags(LOOPBACK_INPUT, GpioFlags::INPUT));
    let handle = assert_ok!(gpio.register_callback(PinMask::pin(LOOPBACK_INPUT), stamp));
    assert_ok!(gpio.interrupt_configure_flags(LOOPBACK_INPUT, InterruptFlags::EDGE_RISING));

    let samples = config.latency_samples;
    let mut total_ns = 0u64;
    let mut valid = 0u32;

    for _ in 0..samples {
        stamp.seen.store(false, Ordering::Release);

        let ts_start = now_ticks();
        assert_ok!(gpio.set_level(LOOPBACK_OUTPUT, true));
        if stamp.wait(ts_start) {
            if let Some(ticks) = elapsed_ticks(ts_start, stamp.ts_end.load(Ordering::Acquire)) {
                total_ns += ticks_to_ns(ticks);
                valid += 1;
            }
        }

        assert_ok!(gpio.set_level(LOOPBACK_OUTPUT, false));
    }

    let _ = gpio.unregister_callback(handle);
    let _ = gpio.interrupt_configure(LOOPBACK_INPUT, InterruptMode::Disabled);
    let _ = gpio.configure(LOOPBACK_OUTPUT, PinConfig::disconnected());
    let _ = gpio.configure(LOOPBACK_INPUT, PinConfig::disconnected());

    assert_test!(
        valid > samples / 2,
        "only {} of {} samples completed",
        valid,
        samples
    );

    klog_info!(
        "GPIO latency: {} samples, average {} ns",
        valid,
        total_ns / valid as u64
    );
    pass!()
}

define_test_suite!(interrupt_latency, [test_rising_edge_latency]);
