//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a millisecond delta to seconds while allowing precision loss in a single location.
#[must_use]
pub fn millis_to_seconds(millis: i64) -> f64 {
    cast::<i64, f64>(millis).unwrap_or(0.0) / crate::constants::MILLIS_PER_SECOND
}

/// Floor a f64 and clamp it to the u64 range, returning 0 for NaN and negative values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    if !value.is_finite() {
        return u64::MAX;
    }
    cast::<f64, u64>(value.floor()).unwrap_or(u64::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(f64::MAX)
}

/// Replace NaN, infinities and negatives with zero.
#[must_use]
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Largest magnitude below which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The integer an f64 holds exactly, if it is whole and within the safe range.
#[must_use]
pub fn exact_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        cast::<f64, i64>(value)
    } else {
        None
    }
}
