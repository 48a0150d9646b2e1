//! Floating point comparison and clamping helpers.

/// Default tolerance used by [`equiv`].
pub const EPSILON: f64 = 1e-6;

/// Returns true if `a` and `b` differ by less than [`EPSILON`].
#[inline]
#[must_use]
pub fn equiv(a: f64, b: f64) -> bool {
    equiv_eps(a, b, EPSILON)
}

/// Returns true if `a` and `b` differ by less than `epsilon`.
#[inline]
#[must_use]
pub fn equiv_eps(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Clamp `value` into `[lo, hi]`.
///
/// Unlike [`f64::clamp`] this never panics when `lo > hi`; `lo` wins.
#[inline]
#[must_use]
pub fn clamp<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}
