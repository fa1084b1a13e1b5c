//! Normality tests: Shapiro-Wilk (Royston's AS R94 approximation) and a
//! one-sample Kolmogorov-Smirnov test against a fitted normal.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::{mean, sample_std};

/// Statistic and p-value of one normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    pub statistic: f64,
    pub p_value: f64,
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Shapiro-Wilk W test per Royston (1995), valid for 4 <= n <= 5000.
///
/// `None` outside that range or at zero variance.
pub fn shapiro_wilk(values: &[f64]) -> Option<NormalityTest> {
    let n = values.len();
    if !(4..=5000).contains(&n) {
        return None;
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let m = mean(&x)?;
    let ssq: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    if ssq <= 0.0 {
        return None;
    }

    let normal = standard_normal()?;
    let nf = n as f64;

    // Expected normal order statistics via Blom's approximation.
    let mi: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let mm: f64 = mi.iter().map(|v| v * v).sum();
    let rsn = mm.sqrt();

    let u = 1.0 / nf.sqrt();
    let c_n = mi[n - 1] / rsn;
    let a_n = -2.706056 * u.powi(5) + 4.434685 * u.powi(4) - 2.071190 * u.powi(3)
        - 0.147981 * u.powi(2)
        + 0.221157 * u
        + c_n;

    let mut a = vec![0.0; n];
    if n > 5 {
        let c_n1 = mi[n - 2] / rsn;
        let a_n1 = -3.582633 * u.powi(5) + 5.682633 * u.powi(4) - 1.752461 * u.powi(3)
            - 0.293762 * u.powi(2)
            + 0.042981 * u
            + c_n1;
        let phi = (mm - 2.0 * mi[n - 1].powi(2) - 2.0 * mi[n - 2].powi(2))
            / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
        if phi <= 0.0 {
            return None;
        }
        let scale = phi.sqrt();
        for (i, coeff) in a.iter_mut().enumerate().take(n - 2).skip(2) {
            *coeff = mi[i] / scale;
        }
        a[n - 1] = a_n;
        a[n - 2] = a_n1;
        a[0] = -a_n;
        a[1] = -a_n1;
    } else {
        let phi = (mm - 2.0 * mi[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
        if phi <= 0.0 {
            return None;
        }
        let scale = phi.sqrt();
        for (i, coeff) in a.iter_mut().enumerate().take(n - 1).skip(1) {
            *coeff = mi[i] / scale;
        }
        a[n - 1] = a_n;
        a[0] = -a_n;
    }

    let numer: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum::<f64>().powi(2);
    let w = (numer / ssq).clamp(0.0, 1.0);

    // Royston's normalizing transform of W to a standard-normal z.
    let z = if n <= 11 {
        let g = -2.273 + 0.459 * nf;
        let mu = 0.5440 - 0.39978 * nf + 0.025054 * nf * nf - 0.0006714 * nf.powi(3);
        let sigma = (1.3822 - 0.77857 * nf + 0.062767 * nf * nf - 0.0020322 * nf.powi(3)).exp();
        let arg = g - (1.0 - w).ln();
        if arg <= 0.0 {
            return None;
        }
        (-arg.ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = -1.5861 - 0.31082 * ln_n - 0.083751 * ln_n * ln_n + 0.0038915 * ln_n.powi(3);
        let sigma = (-0.4803 - 0.082676 * ln_n + 0.0030302 * ln_n * ln_n).exp();
        ((1.0 - w).ln() - mu) / sigma
    };

    let p_value = (1.0 - normal.cdf(z)).clamp(0.0, 1.0);
    Some(NormalityTest {
        statistic: w,
        p_value,
    })
}

/// One-sample Kolmogorov-Smirnov test against a normal fitted to the
/// sample mean and sample standard deviation.
///
/// `None` on fewer than two values or at zero variance.
pub fn kolmogorov_smirnov(values: &[f64]) -> Option<NormalityTest> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let s = sample_std(values)?;
    if s <= 0.0 {
        return None;
    }
    let fitted = Normal::new(m, s).ok()?;

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let nf = n as f64;
    let mut d: f64 = 0.0;
    for (i, xi) in x.iter().enumerate() {
        let cdf = fitted.cdf(*xi);
        let upper = (i + 1) as f64 / nf - cdf;
        let lower = cdf - i as f64 / nf;
        d = d.max(upper).max(lower);
    }

    Some(NormalityTest {
        statistic: d,
        p_value: kolmogorov_tail(nf, d),
    })
}

/// Asymptotic Kolmogorov distribution tail Q(lambda) with the
/// finite-sample effective-n correction.
fn kolmogorov_tail(n: f64, d: f64) -> f64 {
    let sqrt_n = n.sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let jf = j as f64;
        let term = (-2.0 * jf * jf * lambda * lambda).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}
