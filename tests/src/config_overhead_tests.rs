//! Cost of pin and interrupt configuration calls on GPIO22.

use bcmgpio_drivers::gpio::{
    GpioFlags, GpioResult, InterruptFlags, InterruptMode, PinConfig, PinFunction,
};
use bcmgpio_lib::testing::{TestConfig, TestResult};
use bcmgpio_lib::{
    assert_eq_test, assert_ok, assert_test, define_test_suite, klog_info, now_ticks, pass,
    ticks_to_ns,
};

use crate::fixtures::{self, BENCH_PIN};

const PIN_CONFIGS: [(&str, GpioFlags); 5] = [
    ("INPUT", GpioFlags::INPUT),
    ("OUTPUT_LOW", GpioFlags::OUTPUT_LOW),
    ("OUTPUT_HIGH", GpioFlags::OUTPUT_HIGH),
    ("INPUT|PULL_UP", GpioFlags::INPUT.union(GpioFlags::PULL_UP)),
    ("INPUT|PULL_DOWN", GpioFlags::INPUT.union(GpioFlags::PULL_DOWN)),
];

const IRQ_CONFIGS: [(&str, InterruptFlags); 6] = [
    ("DISABLE", InterruptFlags::empty()),
    ("EDGE_RISING", InterruptFlags::EDGE_RISING),
    ("EDGE_FALLING", InterruptFlags::EDGE_FALLING),
    ("EDGE_BOTH", InterruptFlags::EDGE_BOTH),
    ("LEVEL_HIGH", InterruptFlags::LEVEL_HIGH),
    ("LEVEL_LOW", InterruptFlags::LEVEL_LOW),
];

/// Average nanoseconds per call of `op` over `samples` calls.
fn time_calls(samples: u32, mut op: impl FnMut() -> GpioResult) -> GpioResult<u64> {
    let mut total_ns = 0u64;
    for _ in 0..samples {
        let start = now_ticks();
        op()?;
        total_ns += ticks_to_ns(now_ticks().saturating_sub(start));
    }
    Ok(total_ns / samples.max(1) as u64)
}

pub fn test_pin_configure_cost(config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    for (name, flags) in PIN_CONFIGS {
        let avg = assert_ok!(
            time_calls(config.bench_samples, || gpio.configure_flags(BENCH_PIN, flags)),
            name
        );
        klog_info!("GPIO configure {}: {} ns", name, avg);
    }

    assert_ok!(gpio.configure(BENCH_PIN, PinConfig::disconnected()));
    let state = assert_ok!(gpio.read_config(BENCH_PIN));
    assert_eq_test!(state.function, PinFunction::Input);
    pass!()
}

pub fn test_interrupt_configure_cost(config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    assert_ok!(gpio.configure_flags(BENCH_PIN, GpioFlags::INPUT));
    for (name, flags) in IRQ_CONFIGS {
        let configure = || gpio.interrupt_configure_flags(BENCH_PIN, flags);
        let avg = assert_ok!(time_calls(config.bench_samples, configure), name);
        klog_info!("GPIO interrupt configure {}: {} ns", name, avg);
    }

    assert_ok!(gpio.interrupt_configure(BENCH_PIN, InterruptMode::Disabled));
    assert_ok!(gpio.configure(BENCH_PIN, PinConfig::disconnected()));
    assert_eq_test!(assert_ok!(gpio.interrupt_mode(BENCH_PIN)), InterruptMode::Disabled);
    assert_test!(bench.sim.irq_depth() == 0, "interrupt line left masked");
    pass!()
}

define_test_suite!(
    config_overhead,
    [test_pin_configure_cost, test_interrupt_configure_cost]
);
