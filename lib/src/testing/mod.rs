pub mod config;
pub mod harness;
mod runner;

mod assertions;
pub use config::{TestConfig, Verbosity, config_from_cmdline};
pub use harness::{
    HARNESS_MAX_SUITES, SuiteRunnerFn, TestRunSummary, TestSuiteDesc, TestSuiteResult,
    measure_elapsed_ms,
};
pub use runner::run_single_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    Skipped,
}

impl TestResult {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

#[macro_export]
macro_rules! pass {
    () => {
        $crate::testing::TestResult::Pass
    };
}

#[macro_export]
macro_rules! fail {
    () => {
        $crate::testing::TestResult::Fail
    };
    ($msg:expr) => {{
        $crate::klog_info!("TEST FAIL: {}", $msg);
        $crate::testing::TestResult::Fail
    }};
    ($fmt:expr, $($arg:tt)*) => {{
        $crate::klog_info!(concat!("TEST FAIL: ", $fmt), $($arg)*);
        $crate::testing::TestResult::Fail
    }};
}

/// Run one test and account for it. A skipped test counts as passed: it
/// did not find a defect.
#[macro_export]
macro_rules! run_test {
    ($passed:expr, $total:expr, $config:expr, $test_fn:path) => {{
        $total += 1;
        let result = $crate::testing::run_single_test(stringify!($test_fn), $config, $test_fn);
        if !result.is_failure() {
            $passed += 1;
        }
        result
    }};

    ($config:expr, $test_fn:path) => {{ $crate::testing::run_single_test(stringify!($test_fn), $config, $test_fn) }};
}

/// Define a suite of `fn(&TestConfig) -> TestResult` tests.
///
/// Generates `run_<suite>_suite` and a `<SUITE>_SUITE_DESC` descriptor that
/// the runner in the tests crate consumes.
#[macro_export]
macro_rules! define_test_suite {
    ($suite_name:ident, [$($test_fn:path),* $(,)?]) => {
        $crate::paste::paste! {
            fn [<run_ $suite_name _suite>](
                config: &$crate::testing::TestConfig,
                out: &mut $crate::testing::TestSuiteResult,
            ) -> i32 {
                let start = $crate::clock::now_ticks();
                let mut passed = 0u32;
                let mut total = 0u32;

                $(
                    $crate::run_test!(passed, total, config, $test_fn);
                )*

                let elapsed = $crate::testing::measure_elapsed_ms(start, $crate::clock::now_ticks());

                out.name = stringify!($suite_name);
                out.fill(passed, total, elapsed);

                if passed == total { 0 } else { -1 }
            }

            pub static [<$suite_name:upper _SUITE_DESC>]: $crate::testing::TestSuiteDesc = $crate::testing::TestSuiteDesc {
                name: stringify!($suite_name),
                run: [<run_ $suite_name _suite>],
            };
        }
    };
}
