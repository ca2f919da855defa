//! Integration test: statistical properties of the circulant samplers.
//!
//! The samplers are checked against their analytic covariance by
//! ensemble averages over many seeded draws. Tolerances are several
//! standard errors wide, so the seeds are not load-bearing.

use spdekit_core::{sim_rng, Grid1D};
use spdekit_field::{
    circulant_exponential, reduced_covariance, rho_d_minus, BccbEmbedding, CirculantEmbedding,
    Covariance1D, Exponential, Gaussian, SeparableExponential,
};
use spdekit_test_utils::fixtures::exponential_column;
use spdekit_test_utils::stats::{
    ensemble_autocovariance, ensemble_cross_correlation, relative_error,
};

// ── embedding validity ───────────────────────────────────────────────

#[test]
fn exponential_on_unit_window_embeds_exactly() {
    let c = exponential_column(64, 5.0, 1.0);
    let rho = rho_d_minus(&c).unwrap();
    assert!(rho < 1e-10, "rho_minus = {rho:e}");
}

// ── 1D sampler ───────────────────────────────────────────────────────

#[test]
fn exponential_autocovariance_matches_analytic() {
    spdekit_test_utils::init_tracing();
    let grid = Grid1D::new(5.0, 63).unwrap();
    let cov = Exponential { ell: 1.0 };
    let c = cov.sample_on(&grid);
    let mut emb = CirculantEmbedding::minimal(&c).unwrap();
    let mut rng = sim_rng(Some(2024));

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for _ in 0..5_000 {
        let pair = emb.sample(&mut rng);
        xs.push(pair.x);
        ys.push(pair.y);
    }
    let paths: Vec<Vec<f64>> = xs.iter().chain(&ys).cloned().collect();
    assert_eq!(paths.len(), 10_000);

    let lag0 = ensemble_autocovariance(&paths, 0);
    let lag1 = ensemble_autocovariance(&paths, 1);
    assert!(relative_error(lag0, c[0]) < 0.05, "lag 0: {lag0} vs {}", c[0]);
    assert!(relative_error(lag1, c[1]) < 0.05, "lag 1: {lag1} vs {}", c[1]);

    let rho = ensemble_cross_correlation(&xs, &ys);
    assert!(rho.abs() < 0.1, "cross-correlation {rho}");
}

#[test]
fn convenience_sampler_uses_grid_length() {
    let grid = Grid1D::new(2.0, 40).unwrap();
    let pair = circulant_exponential(&grid, 0.5, &mut sim_rng(Some(3))).unwrap();
    assert_eq!(pair.x.len(), 41);
    assert_eq!(pair.y.len(), 41);
}

#[test]
fn defective_embedding_samples_the_clamped_covariance() {
    spdekit_test_utils::init_tracing();
    let t: Vec<f64> = (0..50).map(|k| k as f64 * 0.02).collect();
    let c = Gaussian { ell: 1.0 }.sample_lags(&t);
    let mut emb = CirculantEmbedding::minimal(&c).unwrap();
    assert!(emb.diagnostic().negative_modes > 0);

    // Dropping negative modes adds their mass back to the diagonal.
    let clamped: f64 = emb.eigenvalues().iter().map(|&d| d.max(0.0)).sum::<f64>()
        / emb.embedded_len() as f64;
    assert!(clamped > c[0] + 0.05, "clamped variance {clamped}");

    let mut rng = sim_rng(Some(404));
    let mut paths = Vec::new();
    for _ in 0..20_000 {
        let pair = emb.sample(&mut rng);
        for path in [pair.x, pair.y] {
            assert_eq!(path.len(), 50);
            assert!(path.iter().all(|v| v.is_finite()));
            paths.push(path);
        }
    }
    let lag0 = ensemble_autocovariance(&paths, 0);
    assert!(
        relative_error(lag0, clamped) < 0.03,
        "lag 0: {lag0} vs clamped {clamped}"
    );
}

// ── 2D sampler ───────────────────────────────────────────────────────

#[test]
fn separable_exponential_field_has_axis_lags() {
    let cov = SeparableExponential {
        ell1: 0.1,
        ell2: 0.3,
    };
    let (n1, n2) = (8, 8);
    let c_red = reduced_covariance(n1, n2, 0.1, 0.1, &cov).unwrap();
    let mut emb = BccbEmbedding::minimal(&c_red, n1, n2).unwrap();
    assert!(emb.rho_minus() < 1e-10);

    let mut rng = sim_rng(Some(99));
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for _ in 0..4_000 {
        let pair = emb.sample(&mut rng);
        for field in [pair.x, pair.y] {
            for r in 0..n1 {
                rows.push(field.row(r).to_vec());
            }
            for c in 0..n2 {
                cols.push((0..n1).map(|r| field.get(r, c)).collect::<Vec<_>>());
            }
        }
    }
    let var = ensemble_autocovariance(&rows, 0);
    assert!(relative_error(var, 1.0) < 0.05, "variance {var}");

    // Rows step along axis 1 (ell2), columns along axis 0 (ell1).
    let lag_axis1 = ensemble_autocovariance(&rows, 1);
    let want1 = (-1.0f64 / 3.0).exp();
    assert!(
        relative_error(lag_axis1, want1) < 0.08,
        "axis-1 lag: {lag_axis1} vs {want1}"
    );
    let lag_axis0 = ensemble_autocovariance(&cols, 1);
    let want0 = (-1.0f64).exp();
    assert!(
        relative_error(lag_axis0, want0) < 0.08,
        "axis-0 lag: {lag_axis0} vs {want0}"
    );
}
