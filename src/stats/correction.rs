//! Multiple testing correction
use crate::{f64_from_usize, OraError, OraResult};

/// Benjamini–Hochberg adjusted p-values (false discovery rate)
///
/// The adjusted values are returned in the same order as `p_values`.
/// Each p-value is scaled by `n / rank`, monotonicity is enforced from the
/// largest p-value downwards and the result is capped at `1.0`.
///
/// # Errors
///
/// [`OraError::InvalidInput`] if any p-value is outside of `[0, 1]` or `NaN`
///
/// # Examples
///
/// ```
/// use overrep::stats::benjamini_hochberg;
///
/// let fdr = benjamini_hochberg(&[0.01, 0.04, 0.03, 0.005]).unwrap();
/// assert!((fdr[0] - 0.02).abs() < 1e-12);
/// assert!((fdr[1] - 0.04).abs() < 1e-12);
/// assert!((fdr[2] - 0.04).abs() < 1e-12);
/// assert!((fdr[3] - 0.02).abs() < 1e-12);
/// ```
pub fn benjamini_hochberg(p_values: &[f64]) -> OraResult<Vec<f64>> {
    if let Some((idx, p)) = p_values
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(OraError::InvalidInput(format!(
            "p-value at index {idx} is out of range [0, 1]: {p}"
        )));
    }

    let n = p_values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| p_values[*a].total_cmp(&p_values[*b]));

    let total = f64_from_usize(n);
    let mut adjusted = vec![0.0; n];
    let mut previous = 1.0f64;
    for (rank, idx) in order.iter().enumerate().rev() {
        let value = (p_values[*idx] * total / f64_from_usize(rank + 1)).min(previous);
        adjusted[*idx] = value;
        previous = value;
    }
    Ok(adjusted)
}
