use super::{TestConfig, TestResult, Verbosity};

/// Run a single test, logging its outcome according to the configured
/// verbosity. Failures are always reported.
pub fn run_single_test(
    name: &str,
    config: &TestConfig,
    test_fn: fn(&TestConfig) -> TestResult,
) -> TestResult {
    let result = test_fn(config);

    if result.is_failure() || config.verbosity == Verbosity::Verbose {
        crate::klog_info!("TEST {}: {}", result.as_str(), name);
    }

    result
}
