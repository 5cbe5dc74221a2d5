//! Output drive, loopback input and pull resistors on GPIO23/GPIO24.

use bcmgpio_drivers::gpio::{GpioError, GpioFlags, PinConfig, PinFunction, Pull};
use bcmgpio_lib::testing::{TestConfig, TestResult};
use bcmgpio_lib::{
    assert_eq_test, assert_err_test, assert_ok, assert_test, define_test_suite, pass,
};

use crate::fixtures::{self, Bench, LOOPBACK_INPUT, LOOPBACK_OUTPUT};

/// Not wired to anything on the bench.
const FLOATING_PIN: u32 = 25;

fn disconnect(bench: &Bench) {
    let _ = bench.gpio.configure(LOOPBACK_OUTPUT, PinConfig::disconnected());
    let _ = bench.gpio.configure(LOOPBACK_INPUT, PinConfig::disconnected());
}

/// The output latch follows set/clear and reads back on its own pad.
pub fn test_output_drive(_config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    assert_ok!(gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT_HIGH));
    assert_test!(assert_ok!(gpio.read_level(LOOPBACK_OUTPUT)), "initial high");

    assert_ok!(gpio.set_level(LOOPBACK_OUTPUT, false));
    assert_test!(!assert_ok!(gpio.read_level(LOOPBACK_OUTPUT)), "cleared");

    assert_ok!(gpio.set_level(LOOPBACK_OUTPUT, true));
    assert_test!(assert_ok!(gpio.read_level(LOOPBACK_OUTPUT)), "set");

    disconnect(&bench);
    pass!()
}

/// GPIO24 sees whatever GPIO23 drives through the jumper.
pub fn test_loopback_input(_config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    assert_ok!(gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT_LOW));
    assert_ok!(gpio.configure_flags(LOOPBACK_INPUT, GpioFlags::INPUT));

    assert_ok!(gpio.set_level(LOOPBACK_OUTPUT, false));
    assert_eq_test!(assert_ok!(gpio.read_level(LOOPBACK_INPUT)), false, "loopback low");

    assert_ok!(gpio.set_level(LOOPBACK_OUTPUT, true));
    assert_eq_test!(assert_ok!(gpio.read_level(LOOPBACK_INPUT)), true, "loopback high");

    disconnect(&bench);
    pass!()
}

/// A pulled input follows a driving output and falls back to its pull
/// once nothing drives it.
pub fn test_pull_resistors(_config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    assert_ok!(gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT_HIGH));
    assert_ok!(gpio.configure_flags(LOOPBACK_INPUT, GpioFlags::INPUT | GpioFlags::PULL_UP));
    assert_eq_test!(assert_ok!(gpio.read_level(LOOPBACK_INPUT)), true, "pull-up, driven high");

    assert_ok!(gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT_LOW));
    assert_ok!(gpio.configure_flags(LOOPBACK_INPUT, GpioFlags::INPUT | GpioFlags::PULL_DOWN));
    assert_eq_test!(assert_ok!(gpio.read_level(LOOPBACK_INPUT)), false, "pull-down, driven low");

    // With the jumper released by a disconnected output, the pull wins.
    assert_ok!(gpio.configure(LOOPBACK_OUTPUT, PinConfig::disconnected()));
    assert_ok!(gpio.configure(LOOPBACK_INPUT, PinConfig::input_pull(Pull::Up)));
    assert_eq_test!(assert_ok!(gpio.read_level(LOOPBACK_INPUT)), true, "floating, pulled up");

    // An undriven pad last seen high reads low once pulled down.
    bench.sim.drive(FLOATING_PIN, Some(true));
    bench.sim.drive(FLOATING_PIN, None);
    assert_ok!(gpio.configure(FLOATING_PIN, PinConfig::input()));
    assert_eq_test!(assert_ok!(gpio.read_level(FLOATING_PIN)), true, "floating, left high");
    assert_ok!(gpio.configure(FLOATING_PIN, PinConfig::input_pull(Pull::Down)));
    assert_eq_test!(assert_ok!(gpio.read_level(FLOATING_PIN)), false, "floating, pulled down");

    let _ = gpio.configure(FLOATING_PIN, PinConfig::disconnected());
    disconnect(&bench);
    pass!()
}

/// Read-back reports function and pull as programmed.
pub fn test_config_readback(_config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;

    let wanted = PinConfig::input_pull(Pull::Down);
    assert_ok!(gpio.configure(LOOPBACK_INPUT, wanted));
    let state = assert_ok!(gpio.read_config(LOOPBACK_INPUT));
    assert_eq_test!(state.function, PinFunction::Input);
    assert_eq_test!(state.pull, Pull::Down);
    assert_test!(state.matches(&wanted), "input pull-down read-back");

    let wanted = PinConfig::output(true);
    assert_ok!(gpio.configure(LOOPBACK_OUTPUT, wanted));
    let state = assert_ok!(gpio.read_config(LOOPBACK_OUTPUT));
    assert_test!(state.matches(&wanted), "output high read-back");

    disconnect(&bench);
    let state = assert_ok!(gpio.read_config(LOOPBACK_OUTPUT));
    assert_test!(state.matches(&PinConfig::disconnected()), "cleanup left pin connected");
    pass!()
}

/// Bad pins and contradictory flags are rejected before any register write.
pub fn test_invalid_requests(_config: &TestConfig) -> TestResult {
    let bench = assert_ok!(fixtures::bcm2711());
    let gpio = bench.gpio;
    let writes = bench.sim.write_count();

    assert_err_test!(
        gpio.configure_flags(58, GpioFlags::INPUT),
        GpioError::InvalidPin { pin: 58 }
    );
    assert_err_test!(gpio.read_level(63), GpioError::InvalidPin { pin: 63 });
    assert_err_test!(
        gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT_LOW | GpioFlags::OUTPUT_INIT_HIGH),
        GpioError::UnsupportedFlagCombination
    );
    assert_err_test!(
        gpio.configure_flags(LOOPBACK_OUTPUT, GpioFlags::OUTPUT | GpioFlags::OPEN_DRAIN),
        GpioError::UnsupportedFlagCombination
    );
    assert_eq_test!(bench.sim.write_count(), writes, "rejected request touched registers");
    pass!()
}

define_test_suite!(
    basic_validation,
    [
        test_output_drive,
        test_loopback_input,
        test_pull_resistors,
        test_config_readback,
        test_invalid_requests,
    ]
);
