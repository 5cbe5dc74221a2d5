use bcmgpio_tests::basic_validation_tests::BASIC_VALIDATION_SUITE_DESC;
use bcmgpio_tests::config_overhead_tests::CONFIG_OVERHEAD_SUITE_DESC;
use bcmgpio_tests::interrupt_latency_tests::INTERRUPT_LATENCY_SUITE_DESC;
use bcmgpio_tests::interrupt_validation_tests::INTERRUPT_VALIDATION_SUITE_DESC;
use bcmgpio_tests::io_throughput_tests::IO_THROUGHPUT_SUITE_DESC;
use bcmgpio_tests::race_condition_tests::RACE_CONDITION_STRESS_SUITE_DESC;
use bcmgpio_tests::{TestSuiteDesc, fixtures, tests_run_all};

fn run(desc: &'static TestSuiteDesc) {
    let config = fixtures::config();
    fixtures::init_host(&config);

    let summary = tests_run_all(&config, &[desc]);
    for res in summary.results() {
        assert!(
            res.all_passed(),
            "{}: {}/{} passed (timed out: {})",
            res.name,
            res.passed,
            res.total,
            res.timed_out
        );
    }
}

#[test]
fn basic_validation() {
    run(&BASIC_VALIDATION_SUITE_DESC);
}

#[test]
fn interrupt_validation() {
    run(&INTERRUPT_VALIDATION_SUITE_DESC);
}

#[test]
fn interrupt_latency() {
    run(&INTERRUPT_LATENCY_SUITE_DESC);
}

#[test]
fn race_condition_stress() {
    run(&RACE_CONDITION_STRESS_SUITE_DESC);
}

#[test]
fn io_throughput() {
    run(&IO_THROUGHPUT_SUITE_DESC);
}

#[test]
fn config_overhead() {
    run(&CONFIG_OVERHEAD_SUITE_DESC);
}
