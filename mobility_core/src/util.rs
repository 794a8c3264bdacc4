//! Small numeric helpers shared by the decoder, session and scoring.

const TWO_POW_52: f64 = 4_503_599_627_370_496.0;

/// Round to one decimal place, ties away from zero.
/// Non-finite inputs are returned unchanged.
#[inline]
pub fn round_tenth(x: f64) -> f64 {
    // At and above 2^52 every f64 is already an integer; x * 10 could overflow.
    if !x.is_finite() || x.abs() >= TWO_POW_52 {
        return x;
    }
    (x * 10.0).round() / 10.0
}

/// Round every element in place to one decimal place.
#[inline]
pub fn round_tenths(values: &mut [f64]) {
    for v in values {
        *v = round_tenth(*v);
    }
}
