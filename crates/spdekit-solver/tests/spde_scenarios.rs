//! Integration tests: end-to-end runs of the spectral integrators.
//!
//! Covers the periodic closure of every recorded snapshot, seeded
//! reproducibility of the full coefficients -> increments -> integrator
//! pipeline, degeneration to the deterministic integrator at zero noise,
//! and the Allen–Cahn reference scenario on `[0, 1]`.

use spdekit_core::{AllenCahn, Array2, Linear};
use spdekit_solver::{Run, SpectralPde1D, SpectralPde2D, SpectralSpde1D, SpectralSpde2D};
use spdekit_test_utils::fixtures::{allen_cahn_initial, sine_initial, sine_plane};
use spdekit_test_utils::{init_tracing, max_abs_diff};

fn noisy_1d(seed: u64) -> SpectralSpde1D {
    SpectralSpde1D::builder()
        .domain(2.0)
        .horizon(0.5)
        .steps(60)
        .substeps(3)
        .reference_resolution(64)
        .resolution(32)
        .epsilon(0.05)
        .sigma(0.3)
        .regularity(1.0)
        .realizations(4)
        .reaction(AllenCahn)
        .diffusion(Linear(1.0))
        .initial(sine_initial(2.0, 64, 0.5))
        .seed(seed)
        .build()
        .unwrap()
}

/// Max over realizations and points of `|u|` in snapshot `step`.
fn amplitude(run: &Run, step: usize) -> f64 {
    run.trajectory
        .snapshot(step)
        .unwrap()
        .iter()
        .fold(0.0, |m, v| m.max(v.abs()))
}

fn assert_closed_1d(run: &Run) {
    let [m, width] = run.trajectory.shape() else {
        panic!("expected a 1D trajectory");
    };
    for step in 0..run.trajectory.len() {
        for r in 0..*m {
            let row = run.trajectory.realization(step, r).unwrap();
            assert_eq!(
                row[0].to_bits(),
                row[width - 1].to_bits(),
                "step {step}, realization {r}"
            );
        }
    }
}

// ── periodicity ─────────────────────────────────────────────────────

#[test]
fn every_snapshot_is_periodic_1d() {
    init_tracing();
    let run = noisy_1d(1).run().unwrap();
    assert_eq!(run.trajectory.len(), 21);
    assert_closed_1d(&run);
}

// ── reproducibility ─────────────────────────────────────────────────

#[test]
fn seeded_runs_are_bit_identical() {
    let a = noisy_1d(42).run().unwrap();
    let b = noisy_1d(42).run().unwrap();
    assert_eq!(a, b);
    let c = noisy_1d(43).run().unwrap();
    assert_ne!(a.trajectory, c.trajectory);
}

#[test]
fn seeded_2d_runs_are_bit_identical() {
    let build = || {
        SpectralSpde2D::builder()
            .domain(1.0, 1.0)
            .horizon(0.1)
            .steps(8)
            .substeps(2)
            .resolution(8, 8)
            .epsilon(0.02)
            .sigma(0.2)
            .alpha(0.05)
            .realizations(3)
            .reaction(AllenCahn)
            .initial(Array2::from_vec(9, 9, sine_plane(9, 9, 0.2)).unwrap())
            .seed(77)
            .build()
            .unwrap()
    };
    assert_eq!(build().run().unwrap(), build().run().unwrap());
}

// ── zero noise ──────────────────────────────────────────────────────

#[test]
fn zero_noise_matches_deterministic_1d() {
    let u0 = sine_initial(1.0, 32, 0.4);
    let spde = SpectralSpde1D::builder()
        .domain(1.0)
        .horizon(0.3)
        .steps(30)
        .reference_resolution(32)
        .epsilon(0.02)
        .sigma(0.0)
        .realizations(2)
        .reaction(AllenCahn)
        .initial(u0.clone())
        .seed(5)
        .build()
        .unwrap()
        .run()
        .unwrap();
    let pde = SpectralPde1D::builder()
        .domain(1.0)
        .horizon(0.3)
        .steps(30)
        .resolution(32)
        .epsilon(0.02)
        .reaction(AllenCahn)
        .initial(u0)
        .build()
        .unwrap()
        .run()
        .unwrap();

    for step in 0..=30 {
        let want = pde.trajectory.realization(step, 0).unwrap();
        for r in 0..2 {
            let got = spde.trajectory.realization(step, r).unwrap();
            assert!(max_abs_diff(got, want) < 1e-12, "step {step}");
        }
    }
}

#[test]
fn zero_noise_matches_deterministic_2d() {
    let u0 = Array2::from_vec(9, 17, sine_plane(9, 17, 0.3)).unwrap();
    let spde = SpectralSpde2D::builder()
        .domain(1.0, 1.0)
        .horizon(0.2)
        .steps(10)
        .resolution(8, 16)
        .epsilon(0.01)
        .sigma(0.0)
        .reaction(AllenCahn)
        .initial(u0.clone())
        .seed(8)
        .build()
        .unwrap()
        .run()
        .unwrap();
    let pde = SpectralPde2D::builder()
        .domain(1.0, 1.0)
        .horizon(0.2)
        .steps(10)
        .resolution(8, 16)
        .epsilon(0.01)
        .reaction(AllenCahn)
        .initial(u0)
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert!(max_abs_diff(spde.final_state(), pde.final_state()) < 1e-12);
}

// ── Allen–Cahn reference scenario ───────────────────────────────────

fn allen_cahn(epsilon: f64) -> Run {
    SpectralSpde1D::builder()
        .domain(1.0)
        .horizon(1.0)
        .steps(100)
        .reference_resolution(64)
        .epsilon(epsilon)
        .sigma(0.0)
        .reaction(AllenCahn)
        .initial(allen_cahn_initial(64))
        .seed(0)
        .build()
        .unwrap()
        .run()
        .unwrap()
}

#[test]
fn allen_cahn_reference_scenario() {
    // At eps = 0.01 the sin(2 pi x) mode has linear rate
    // 1 - eps (2 pi)^2 ~ 0.6 > 0: it grows slowly and stays far from the
    // saturated states +-1.
    let run = allen_cahn(0.01);
    assert_eq!(run.trajectory.len(), 101);
    assert_closed_1d(&run);
    let end = amplitude(&run, 100);
    assert!(end > 0.16 && end < 0.19, "amplitude {end}");
    assert_eq!(run.diagnostics.imag_warnings, 0);
}

#[test]
fn allen_cahn_decays_when_diffusion_dominates() {
    // eps (2 pi)^2 ~ 2 > 1: diffusion wins and the amplitude decays.
    let run = allen_cahn(0.05);
    assert_closed_1d(&run);
    let early: f64 = (0..=50).map(|k| amplitude(&run, k)).sum::<f64>() / 51.0;
    let late: f64 = (50..=100).map(|k| amplitude(&run, k)).sum::<f64>() / 51.0;
    assert!(late < early);
    assert!(amplitude(&run, 100) < 0.05);
}
