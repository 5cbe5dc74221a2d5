//! GPIO validation, stress and benchmark suites.
//!
//! Suites run against the simulated BCM2711 block with the same pin
//! assignments as the board-level tests (GPIO23 jumpered to GPIO24, GPIO22 as
//! the benchmark pin). Each test builds its own controller so suites can run
//! concurrently under `cargo test`.

use bcmgpio_lib::klog_info;
pub use bcmgpio_lib::testing::{
    HARNESS_MAX_SUITES, TestConfig, TestRunSummary, TestSuiteDesc, TestSuiteResult, Verbosity,
    measure_elapsed_ms,
};

pub mod basic_validation_tests;
pub mod config_overhead_tests;
pub mod interrupt_latency_tests;

pub const TESTS_MAX_SUITES: usize = HARNESS_MAX_SUITES;

/// Every suite, in run order.
pub fn all_suites() -> [&'static TestSuiteDesc; 6] {
    [
        &basic_validation_tests::BASIC_VALIDATION_SUITE_DESC,
        &interrupt_validation_tests::INTERRUPT_VALIDATION_SUITE_DESC,
        &interrupt_latency_tests::INTERRUPT_LATENCY_SUITE_DESC,
        &race_condition_tests::RACE_CONDITION_STRESS_SUITE_DESC,
        &io_throughput_tests::IO_THROUGHPUT_SUITE_DESC,
        &config_overhead_tests::CONFIG_OVERHEAD_SUITE_DESC,
    ]
}

pub fn tests_run_all(config: &TestConfig, suites: &[&TestSuiteDesc]) -> TestRunSummary {
    let mut summary = TestRunSummary::default();

    if !config.enabled {
        klog_info!("TESTS: Harness disabled");
        return summary;
    }

    klog_info!("TESTS: Starting test suites");

    let start = bcmgpio_lib::now_ticks();
    for (idx, desc) in suites.iter().enumerate().take(TESTS_MAX_SUITES) {
        let suite_start = bcmgpio_lib::now_ticks();
        let mut res = TestSuiteResult::new(desc.name);

        (desc.run)(config, &mut res);

        if config.timeout_ms != 0 {
            let elapsed = measure_elapsed_ms(suite_start, bcmgpio_lib::now_ticks());
            if elapsed > config.timeout_ms {
                res.timed_out = true;
                res.failed = res.failed.saturating_add(1);
                klog_info!(
                    "TESTS: suite {} exceeded {}ms timeout ({}ms)",
                    desc.name,
                    config.timeout_ms,
                    elapsed
                );
            }
        }

        klog_info!(
            "SUITE{} {} total={} pass={} fail={} elapsed={}ms",
            idx as u32,
            res.name,
            res.total,
            res.passed,
            res.failed,
            res.elapsed_ms,
        );
        summary.add_suite_result(&res);
    }

    let overall_ms = measure_elapsed_ms(start, bcmgpio_lib::now_ticks());
    if overall_ms > summary.elapsed_ms {
        summary.elapsed_ms = overall_ms;
    }

    klog_info!(
        "TESTS SUMMARY: total={} passed={} failed={} elapsed_ms={}",
        summary.total_tests,
        summary.passed,
        summary.failed,
        summary.elapsed_ms,
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcmgpio_lib::testing::TestResult;
    use bcmgpio_lib::{define_test_suite, fail, pass};

    fn always_passes(_config: &TestConfig) -> TestResult {
        pass!()
    }

    fn always_fails(_config: &TestConfig) -> TestResult {
        fail!("deliberate")
    }

    fn skipped(_config: &TestConfig) -> TestResult {
        TestResult::Skipped
    }

    define_test_suite!(harness_selftest, [always_passes, always_fails, skipped]);

    #[test]
    fn runner_accounts_failures_and_skips() {
        let config = fixtures::config_from(Some("gpiotests.verbosity=quiet"));
        fixtures::init_host(&config);

        let summary = tests_run_all(&config, &[&HARNESS_SELFTEST_SUITE_DESC]);
        assert_eq!(summary.suite_count, 1);
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results()[0].name, "harness_selftest");
        assert!(!summary.all_passed());
    }

    #[test]
    fn disabled_harness_runs_nothing() {
        let config = fixtures::config_from(Some("gpiotests=off"));
        let summary = tests_run_all(&config, &all_suites());
        assert_eq!(summary.suite_count, 0);
        assert!(summary.all_passed());
    }
}
