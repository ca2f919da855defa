//! Brownian motion and Brownian bridge on `[0, T]`.

use rand::Rng;
use spdekit_core::error::require_positive;
use spdekit_core::{fill_standard_normal, linspace, ConfigError};

/// A sampled path: values `values[i]` at times `t[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplePath {
    /// Sample times, `linspace(0, T, N + 1)`.
    pub t: Vec<f64>,
    /// Path values.
    pub values: Vec<f64>,
}

fn check(horizon: f64, steps: usize) -> Result<(), ConfigError> {
    require_positive("T", horizon)?;
    if steps == 0 {
        return Err(ConfigError::InvalidResolution {
            name: "N",
            value: 0,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// Standard Brownian motion with `W(0) = 0` on `N` equal steps.
///
/// Consumes `N` normals; `W[i] = W[i-1] + sqrt(t[i] - t[i-1]) * xi[i-1]`.
pub fn brownian_motion<R: Rng + ?Sized>(
    horizon: f64,
    steps: usize,
    rng: &mut R,
) -> Result<SamplePath, ConfigError> {
    check(horizon, steps)?;
    let t = linspace(0.0, horizon, steps + 1);
    let mut xi = vec![0.0; steps];
    fill_standard_normal(rng, &mut xi);
    let mut values = vec![0.0; steps + 1];
    for i in 1..=steps {
        values[i] = values[i - 1] + (t[i] - t[i - 1]).sqrt() * xi[i - 1];
    }
    Ok(SamplePath { t, values })
}

/// Brownian bridge pinned to zero at both ends, built from a Brownian
/// motion as `B = W - W(T) * t / T`.
pub fn brownian_bridge<R: Rng + ?Sized>(
    horizon: f64,
    steps: usize,
    rng: &mut R,
) -> Result<SamplePath, ConfigError> {
    let SamplePath { t, values: w } = brownian_motion(horizon, steps, rng)?;
    let (t0, t_end) = (t[0], t[steps]);
    let w_end = w[steps];
    let values = t
        .iter()
        .zip(&w)
        .map(|(&ti, &wi)| wi - w_end * (ti - t0) / (t_end - t0))
        .collect();
    Ok(SamplePath { t, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdekit_core::sim_rng;

    #[test]
    fn motion_starts_at_zero() {
        let p = brownian_motion(2.0, 50, &mut sim_rng(Some(5))).unwrap();
        assert_eq!(p.values[0], 0.0);
        assert_eq!(p.t.len(), 51);
        assert_eq!(p.t[50], 2.0);
    }

    #[test]
    fn bridge_is_pinned_at_both_ends() {
        let b = brownian_bridge(1.0, 100, &mut sim_rng(Some(11))).unwrap();
        assert_eq!(b.values[0], 0.0);
        assert!(b.values[100].abs() < 1e-14);
    }

    #[test]
    fn bridge_shares_increments_with_motion() {
        let w = brownian_motion(1.0, 10, &mut sim_rng(Some(4))).unwrap();
        let b = brownian_bridge(1.0, 10, &mut sim_rng(Some(4))).unwrap();
        let drift = w.values[10];
        for i in 0..=10 {
            assert!((b.values[i] - (w.values[i] - drift * w.t[i])).abs() < 1e-14);
        }
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let mut rng = sim_rng(Some(0));
        assert!(brownian_motion(0.0, 10, &mut rng).is_err());
        assert!(brownian_motion(1.0, 0, &mut rng).is_err());
    }

    #[test]
    fn terminal_variance_is_horizon() {
        let mut rng = sim_rng(Some(77));
        let samples = 4000;
        let mut sum_sq = 0.0;
        for _ in 0..samples {
            let p = brownian_motion(2.0, 8, &mut rng).unwrap();
            sum_sq += p.values[8] * p.values[8];
        }
        let var = sum_sq / samples as f64;
        assert!((var - 2.0).abs() < 0.2, "variance {var}");
    }
}
