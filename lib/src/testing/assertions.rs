//! Assertions for harness tests. Each logs what went wrong and returns
//! `TestResult::Fail` from the enclosing test instead of panicking.

#[macro_export]
macro_rules! assert_test {
    ($cond:expr) => {
        $crate::assert_test!($cond, "{}", stringify!($cond))
    };
    ($cond:expr, $msg:expr) => {
        $crate::assert_test!($cond, "{}", $msg)
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::klog_info!(concat!("ASSERT: ", $fmt), $($arg)*);
            return $crate::testing::TestResult::Fail;
        }
    };
}

#[macro_export]
macro_rules! assert_eq_test {
    ($actual:expr, $expected:expr) => {
        $crate::assert_eq_test!($actual, $expected, stringify!($actual))
    };
    ($actual:expr, $expected:expr, $what:expr) => {
        match (&$actual, &$expected) {
            (actual, expected) => {
                if actual != expected {
                    $crate::klog_info!(
                        "ASSERT_EQ: {}: expected {:?}, got {:?}",
                        $what,
                        expected,
                        actual
                    );
                    return $crate::testing::TestResult::Fail;
                }
            }
        }
    };
}

/// Unwrap an `Ok` value, failing the test on `Err`.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        $crate::assert_ok!($result, stringify!($result))
    };
    ($result:expr, $what:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::klog_info!("ASSERT_OK: {}: got Err({:?})", $what, err);
                return $crate::testing::TestResult::Fail;
            }
        }
    };
}

/// Require `Err(expected)`.
#[macro_export]
macro_rules! assert_err_test {
    ($result:expr, $expected:expr) => {
        match $result {
            Err(err) if err == $expected => {}
            Err(err) => {
                $crate::klog_info!(
                    "ASSERT_ERR: {}: expected Err({:?}), got Err({:?})",
                    stringify!($result),
                    $expected,
                    err
                );
                return $crate::testing::TestResult::Fail;
            }
            Ok(_) => {
                $crate::klog_info!(
                    "ASSERT_ERR: {}: expected Err({:?}), got Ok",
                    stringify!($result),
                    $expected
                );
                return $crate::testing::TestResult::Fail;
            }
        }
    };
}
