//! Run outputs: trajectories and per-run diagnostics.
//!
//! Every integrator returns a [`Run`]. The trajectory holds one snapshot
//! per coarse step (including the initial state), each snapshot laid out
//! realization-major with the periodic boundary point already closed.

use smallvec::SmallVec;
use spdekit_core::SolverError;
use spdekit_field::EmbeddingDiagnostic;

// ── Trajectory ──────────────────────────────────────────────────────

/// Snapshots of a solution over time.
///
/// Snapshot `k` is taken at `times()[k]` and has shape
/// [`shape()`](Self::shape), e.g. `[M, J + 1]` in 1D or
/// `[M, J1 + 1, J2 + 1]` in 2D, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    shape: SmallVec<[usize; 4]>,
    snapshot_len: usize,
    data: Vec<f64>,
}

impl Trajectory {
    /// An empty trajectory for snapshots of `shape`, reserving room for
    /// `capacity` snapshots.
    pub fn new(shape: &[usize], capacity: usize) -> Self {
        let snapshot_len = shape.iter().product();
        Self {
            times: Vec::with_capacity(capacity),
            shape: SmallVec::from_slice(shape),
            snapshot_len,
            data: Vec::with_capacity(capacity * snapshot_len),
        }
    }

    /// Append a snapshot taken at time `t`.
    ///
    /// # Panics
    ///
    /// Panics if `snapshot` does not have exactly
    /// [`snapshot_len()`](Self::snapshot_len) values.
    pub fn push(&mut self, t: f64, snapshot: &[f64]) {
        assert_eq!(
            snapshot.len(),
            self.snapshot_len,
            "snapshot length does not match trajectory shape"
        );
        self.times.push(t);
        self.data.extend_from_slice(snapshot);
    }

    /// Shape of one snapshot; the leading axis is the realization.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Values per snapshot.
    pub fn snapshot_len(&self) -> usize {
        self.snapshot_len
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Times of the recorded snapshots.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Snapshot `step`, or `None` if it was never recorded.
    pub fn snapshot(&self, step: usize) -> Option<&[f64]> {
        let start = step.checked_mul(self.snapshot_len)?;
        self.data.get(start..start + self.snapshot_len)
    }

    /// Realization `r` of snapshot `step`.
    pub fn realization(&self, step: usize, r: usize) -> Option<&[f64]> {
        let count = self.shape.first().copied().unwrap_or(1);
        if r >= count {
            return None;
        }
        let per = self.snapshot_len / count.max(1);
        self.snapshot(step)
            .map(|s| &s[r * per..(r + 1) * per])
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&[f64]> {
        self.len().checked_sub(1).and_then(|k| self.snapshot(k))
    }

    /// All snapshots, contiguous in time order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────

/// Non-fatal numeric observations collected during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunDiagnostics {
    /// Coarse steps taken.
    pub steps: usize,
    /// Inverse transforms whose imaginary residue exceeded the tolerance.
    pub imag_warnings: usize,
    /// Largest imaginary residue seen.
    pub worst_imag: f64,
    /// Defect of the noise embedding, for integrators that use one.
    pub embedding: Option<EmbeddingDiagnostic>,
}

/// The output of an integrator run.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    /// Grid points along the first spatial axis.
    pub x: Vec<f64>,
    /// Grid points along the second spatial axis, for 2D runs.
    pub y: Option<Vec<f64>>,
    /// Recorded snapshots.
    pub trajectory: Trajectory,
    /// What was observed along the way.
    pub diagnostics: RunDiagnostics,
}

impl Run {
    /// The state at the final time, all realizations.
    pub fn final_state(&self) -> &[f64] {
        self.trajectory.last().unwrap_or(&[])
    }
}

// ── helpers shared by the integrators ───────────────────────────────

/// Fail with [`SolverError::NonFinite`] if any value of `state` is NaN
/// or infinite.
pub(crate) fn check_finite(step: usize, state: &[f64]) -> Result<(), SolverError> {
    match state.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SolverError::NonFinite { step, index }),
        None => Ok(()),
    }
}

/// Rows of `j` periodic values into rows of `j + 1`, repeating each row's
/// first value at the end.
pub(crate) fn close_periodic_1d(u: &[f64], j: usize, out: &mut [f64]) {
    for (row, closed) in u.chunks_exact(j).zip(out.chunks_exact_mut(j + 1)) {
        closed[..j].copy_from_slice(row);
        closed[j] = row[0];
    }
}

/// Planes of `j1 x j2` periodic values into planes of
/// `(j1 + 1) x (j2 + 1)`, repeating the first row and column.
pub(crate) fn close_periodic_2d(u: &[f64], (j1, j2): (usize, usize), out: &mut [f64]) {
    let closed_len = (j1 + 1) * (j2 + 1);
    for (plane, closed) in u
        .chunks_exact(j1 * j2)
        .zip(out.chunks_exact_mut(closed_len))
    {
        for r in 0..=j1 {
            let src = &plane[(r % j1) * j2..(r % j1 + 1) * j2];
            let dst = &mut closed[r * (j2 + 1)..(r + 1) * (j2 + 1)];
            dst[..j2].copy_from_slice(src);
            dst[j2] = src[0];
        }
    }
}
