//! Statistics used by the overrepresentation analysis
//!
//! - [`hypergeom`]: upper tail of the hypergeometric distribution
//! - [`correction`]: Benjamini–Hochberg false discovery rate
//!
//! All probabilities are returned as `f64` within `[0, 1]`.

pub mod correction;
pub mod hypergeom;

pub use correction::benjamini_hochberg;
pub use hypergeom::Hypergeometric;

/// Rounds `value` to `digits` decimal digits
///
/// Halfway cases are rounded away from zero.
///
/// # Examples
///
/// ```
/// use overrep::stats::round_to;
///
/// assert_eq!(round_to(0.261904761, 5), 0.2619);
/// assert_eq!(round_to(0.976190476, 5), 0.97619);
/// assert_eq!(round_to(1.0, 5), 1.0);
/// ```
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rounding() {
        assert!((round_to(0.123_456, 5) - 0.123_46).abs() < f64::EPSILON);
        assert!((round_to(0.000_004, 5)).abs() < f64::EPSILON);
        assert!((round_to(0.000_006, 5) - 0.000_01).abs() < f64::EPSILON);
        assert!((round_to(0.5, 0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rounding_keeps_bounds() {
        assert!((round_to(0.999_999_9, 5) - 1.0).abs() < f64::EPSILON);
        assert!(round_to(0.0, 5).abs() < f64::EPSILON);
    }
}
