//! Inferential statistics: t-tests, the Mann-Whitney U test, and simple
//! linear regression against an index.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use super::{average_ranks, mean, sample_variance};

/// Statistic and two-sided p-value of a location test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// Slope inference for a least-squares fit against a 0-based index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
}

fn students_t_two_sided(t: f64, df: f64) -> Option<f64> {
    if df <= 0.0 {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// One-sample t-test of `H0: mean == mu0`, df = n - 1.
///
/// `None` when fewer than two values or at zero variance.
pub fn one_sample_t(values: &[f64], mu0: f64) -> Option<LocationTest> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = sample_variance(values)?;
    if var <= 0.0 {
        return None;
    }
    let se = (var / n as f64).sqrt();
    let t = (m - mu0) / se;
    Some(LocationTest {
        statistic: t,
        p_value: students_t_two_sided(t, (n - 1) as f64)?,
    })
}

/// Independent two-sample t-test with pooled variance, df = n1 + n2 - 2.
///
/// `None` when either sample has fewer than two values or the pooled
/// variance is zero.
pub fn two_sample_t(a: &[f64], b: &[f64]) -> Option<LocationTest> {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return None;
    }
    let (m1, m2) = (mean(a)?, mean(b)?);
    let (v1, v2) = (sample_variance(a)?, sample_variance(b)?);
    let df = (n1 + n2 - 2) as f64;
    let pooled = ((n1 - 1) as f64 * v1 + (n2 - 1) as f64 * v2) / df;
    if pooled <= 0.0 {
        return None;
    }
    let se = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    let t = (m1 - m2) / se;
    Some(LocationTest {
        statistic: t,
        p_value: students_t_two_sided(t, df)?,
    })
}

/// Two-sided Mann-Whitney U test via the tie-corrected normal
/// approximation with continuity correction. Returns U for the first
/// sample.
///
/// `None` on an empty sample or when every value is tied.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Option<LocationTest> {
    let (n1, n2) = (a.len(), b.len());
    if n1 == 0 || n2 == 0 {
        return None;
    }

    let mut combined: Vec<f64> = Vec::with_capacity(n1 + n2);
    combined.extend_from_slice(a);
    combined.extend_from_slice(b);
    let ranks = average_ranks(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let nf = n1f + n2f;
    let mu = n1f * n2f / 2.0;

    // Tie correction over rank groups.
    let mut sorted = combined.clone();
    sorted.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    let mut tie_sum = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        let t = (j - i + 1) as f64;
        tie_sum += t * t * t - t;
        i = j + 1;
    }

    let sigma_sq = n1f * n2f / 12.0 * (nf + 1.0 - tie_sum / (nf * (nf - 1.0)));
    if sigma_sq <= 0.0 {
        return None;
    }
    let sigma = sigma_sq.sqrt();

    let diff = u1 - mu;
    // Continuity correction shrinks the deviation by 0.5 toward zero.
    let corrected = if diff == 0.0 {
        0.0
    } else {
        diff - 0.5 * diff.signum()
    };
    let z = corrected / sigma;
    let normal = Normal::new(0.0, 1.0).ok()?;
    let p = (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0);

    Some(LocationTest {
        statistic: u1,
        p_value: p,
    })
}

/// Ordinary least squares of `values` against their 0-based index.
///
/// A flat series (zero y-variance) fits exactly: slope 0, r-squared 0,
/// p-value 1. `None` when fewer than three points.
pub fn index_trend(values: &[f64]) -> Option<TrendFit> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(values)?;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if syy <= 0.0 {
        return Some(TrendFit {
            slope: 0.0,
            intercept: y_mean,
            r_squared: 0.0,
            p_value: 1.0,
        });
    }

    let slope = sxy / sxx;
    let r = sxy / (sxx * syy).sqrt();
    let r_squared = r * r;
    let df = nf - 2.0;

    let p_value = if (1.0 - r_squared).abs() < 1e-15 {
        0.0
    } else {
        let t = r * (df / (1.0 - r_squared)).sqrt();
        students_t_two_sided(t, df)?
    };

    Some(TrendFit {
        slope,
        intercept: y_mean - slope * x_mean,
        r_squared,
        p_value,
    })
}
