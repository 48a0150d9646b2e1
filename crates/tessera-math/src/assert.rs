//! Soft assertions: contract checks that log instead of aborting.
//!
//! A failed soft assertion is reported at `error` level in debug builds and at
//! `debug` level in release builds. The caller always continues with a safe
//! value, so a misused API degrades to an empty result rather than a crash.

/// Check a condition and log if it does not hold. Evaluates to the condition.
///
/// ```
/// use tessera_math::soft_assert;
/// let ok = soft_assert!(1 + 1 == 2, "arithmetic is broken");
/// assert!(ok);
/// ```
#[macro_export]
macro_rules! soft_assert {
    ($cond:expr $(,)?) => {
        $crate::soft_assert!($cond, "{}", stringify!($cond))
    };
    ($cond:expr, $($arg:tt)+) => {{
        let ok: bool = $cond;
        if !ok {
            if cfg!(debug_assertions) {
                $crate::__tracing::error!(
                    target: "tessera::soft_assert",
                    "assertion failed at {}:{}: {}",
                    file!(),
                    line!(),
                    format_args!($($arg)+)
                );
            } else {
                $crate::__tracing::debug!(
                    target: "tessera::soft_assert",
                    "assertion failed at {}:{}: {}",
                    file!(),
                    line!(),
                    format_args!($($arg)+)
                );
            }
        }
        ok
    }};
}

/// Check a condition; on failure log and `return` the given value.
///
/// ```
/// use tessera_math::soft_assert_or_return;
/// fn half(n: i32) -> i32 {
///     soft_assert_or_return!(n % 2 == 0, 0);
///     n / 2
/// }
/// assert_eq!(half(4), 2);
/// assert_eq!(half(3), 0);
/// ```
#[macro_export]
macro_rules! soft_assert_or_return {
    ($cond:expr, $ret:expr $(,)?) => {
        if !$crate::soft_assert!($cond) {
            return $ret;
        }
    };
    ($cond:expr, $ret:expr, $($arg:tt)+) => {
        if !$crate::soft_assert!($cond, $($arg)+) {
            return $ret;
        }
    };
}

#[cfg(test)]
mod tests {
    fn checked_div(a: i32, b: i32) -> i32 {
        soft_assert_or_return!(b != 0, 0, "division by zero: {a}/{b}");
        a / b
    }

    #[test]
    fn test_soft_assert_returns_condition() {
        assert!(soft_assert!(true));
        assert!(!soft_assert!(false, "expected failure {}", 42));
    }

    #[test]
    fn test_soft_assert_or_return_short_circuits() {
        assert_eq!(checked_div(9, 3), 3);
        assert_eq!(checked_div(9, 0), 0);
    }
}
