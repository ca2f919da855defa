//! Ensemble statistics over independent sample paths.
//!
//! The samplers under test are zero-mean and stationary, so the
//! estimators below assume a known zero mean and average over both
//! realizations and positions.

/// Arithmetic mean.
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// `E[x[i] * x[i + lag]]` averaged over every path and every `i`.
pub fn ensemble_autocovariance(paths: &[Vec<f64>], lag: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for p in paths {
        for i in 0..p.len().saturating_sub(lag) {
            sum += p[i] * p[i + lag];
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Normalized cross-correlation `sum(x y) / sqrt(sum(x^2) sum(y^2))` over
/// paired paths.
pub fn ensemble_cross_correlation(xs: &[Vec<f64>], ys: &[Vec<f64>]) -> f64 {
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        for (a, b) in x.iter().zip(y) {
            sxy += a * b;
            sxx += a * a;
            syy += b * b;
        }
    }
    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }
    sxy / (sxx * syy).sqrt()
}

/// Relative error `|got - expected| / |expected|`.
pub fn relative_error(got: f64, expected: f64) -> f64 {
    (got - expected).abs() / expected.abs()
}
