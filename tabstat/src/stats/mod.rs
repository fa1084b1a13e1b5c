//! Shared numeric kernels used across the analyzers.
//!
//! All functions take non-missing value slices. Statistics whose divisor
//! degenerates (empty input, zero variance, zero mean) return `None`
//! rather than `NaN`; callers surface those as absent values.

pub mod inference;
pub mod normality;

/// Arithmetic mean. `None` on empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (ddof = 1). `None` when fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// Sample standard deviation (ddof = 1). `None` when fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Quantile by linear interpolation at rank `q * (n - 1)` over the sorted
/// values. `q` is clamped to `[0, 1]`. `None` on empty input.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median over sorted values.
pub fn median(sorted: &[f64]) -> Option<f64> {
    quantile(sorted, 0.5)
}

/// Bias-corrected Fisher-Pearson skewness (G1).
///
/// `None` when fewer than three values or at zero variance.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let m2: f64 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3: f64 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 <= 0.0 {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    let correction = (nf * (nf - 1.0)).sqrt() / (nf - 2.0);
    Some(correction * g1)
}

/// Excess kurtosis `m4 / m2^2 - 3` (normal = 0).
///
/// `None` on empty input or at zero variance.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = mean(values)?;
    let nf = values.len() as f64;
    let m2: f64 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m4: f64 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / nf;
    if m2 <= 0.0 {
        return None;
    }
    Some(m4 / (m2 * m2) - 3.0)
}

/// Average ranks (1-based). Tied values all receive the mean of the rank
/// positions they occupy.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Shannon entropy (natural log) over category counts. Zero when the
/// distribution collapses to at most one category.
pub fn shannon_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let mut entropy = 0.0;
    for &count in counts {
        if count == 0 {
            continue;
        }
        let p = count as f64 / total;
        entropy -= p * p.ln();
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn sample_variance_matches_hand_calc() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, ss 32, ddof=1 variance 32/7
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_close(sample_variance(&v).unwrap(), 32.0 / 7.0, 1e-12);
    }

    #[test]
    fn variance_needs_two_values() {
        assert!(sample_variance(&[1.0]).is_none());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_close(quantile(&sorted, 0.25).unwrap(), 1.75, 1e-12);
        assert_close(quantile(&sorted, 0.5).unwrap(), 2.5, 1e-12);
        assert_close(quantile(&sorted, 0.75).unwrap(), 3.25, 1e-12);
        assert_close(quantile(&sorted, 0.0).unwrap(), 1.0, 1e-12);
        assert_close(quantile(&sorted, 1.0).unwrap(), 4.0, 1e-12);
    }

    #[test]
    fn skewness_is_zero_for_symmetric_data() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_close(skewness(&v).unwrap(), 0.0, 1e-12);
    }

    #[test]
    fn skewness_none_at_zero_variance() {
        assert!(skewness(&[3.0, 3.0, 3.0, 3.0]).is_none());
    }

    #[test]
    fn kurtosis_of_uniform_five_points() {
        // m2 = 2, m4 = 6.8 for [1..5], so g2 = 6.8/4 - 3 = -1.3
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_close(excess_kurtosis(&v).unwrap(), -1.3, 1e-12);
    }

    #[test]
    fn ranks_average_ties() {
        let ranks = average_ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn entropy_of_single_category_is_zero() {
        assert_eq!(shannon_entropy(&[5]), 0.0);
        assert_eq!(shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn entropy_of_uniform_pair_is_ln_two() {
        assert_close(shannon_entropy(&[3, 3]), std::f64::consts::LN_2, 1e-12);
    }
}
