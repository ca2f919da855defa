//! Tridiagonal and cyclic tridiagonal linear systems.
//!
//! The implicit finite-difference step solves the same matrix every step,
//! so the matrix is factorized once and only the substitution sweeps run
//! per step.

use spdekit_core::{ConfigError, SolverError};

/// A tridiagonal matrix stored by diagonals.
///
/// Row `i` reads `sub[i] x[i-1] + diag[i] x[i] + sup[i] x[i+1]`;
/// `sub[0]` and `sup[n-1]` are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct Tridiagonal {
    sub: Vec<f64>,
    diag: Vec<f64>,
    sup: Vec<f64>,
}

impl Tridiagonal {
    /// A matrix from its three diagonals, all of length `n >= 1`.
    pub fn new(sub: Vec<f64>, diag: Vec<f64>, sup: Vec<f64>) -> Result<Self, ConfigError> {
        if diag.is_empty() {
            return Err(ConfigError::InvalidResolution {
                name: "n",
                value: 0,
                reason: "matrix must have at least one row",
            });
        }
        spdekit_core::error::require_len("sub-diagonal", diag.len(), sub.len())?;
        spdekit_core::error::require_len("super-diagonal", diag.len(), sup.len())?;
        Ok(Self { sub, diag, sup })
    }

    /// `diag` on the diagonal, `off` on both neighbours.
    pub fn constant(n: usize, diag: f64, off: f64) -> Result<Self, ConfigError> {
        Self::new(vec![off; n], vec![diag; n], vec![off; n])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Mutable access to entry `(i, i-1)`.
    pub fn sub_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.sub[i]
    }

    /// Mutable access to entry `(i, i+1)`.
    pub fn sup_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.sup[i]
    }

    /// `y = A x`.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let n = self.len();
        (0..n)
            .map(|i| {
                let mut v = self.diag[i] * x[i];
                if i > 0 {
                    v += self.sub[i] * x[i - 1];
                }
                if i + 1 < n {
                    v += self.sup[i] * x[i + 1];
                }
                v
            })
            .collect()
    }

    /// Thomas elimination without pivoting.
    ///
    /// Fails with [`SolverError::SingularMatrix`] on a zero or non-finite
    /// pivot.
    pub fn factor(&self) -> Result<TridiagonalLu, SolverError> {
        let n = self.len();
        let mut pivot = vec![0.0; n];
        let mut upper = vec![0.0; n];
        for i in 0..n {
            let p = if i == 0 {
                self.diag[0]
            } else {
                self.diag[i] - self.sub[i] * upper[i - 1]
            };
            if p == 0.0 || !p.is_finite() {
                return Err(SolverError::SingularMatrix { index: i, pivot: p });
            }
            pivot[i] = p;
            if i + 1 < n {
                upper[i] = self.sup[i] / p;
            }
        }
        Ok(TridiagonalLu {
            sub: self.sub.clone(),
            pivot,
            upper,
        })
    }
}

/// A factorized [`Tridiagonal`].
#[derive(Clone, Debug, PartialEq)]
pub struct TridiagonalLu {
    sub: Vec<f64>,
    pivot: Vec<f64>,
    upper: Vec<f64>,
}

impl TridiagonalLu {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.pivot.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.pivot.is_empty()
    }

    /// Overwrite `rhs` with the solution of `A x = rhs`.
    pub fn solve(&self, rhs: &mut [f64]) {
        let n = self.len();
        debug_assert_eq!(rhs.len(), n);
        rhs[0] /= self.pivot[0];
        for i in 1..n {
            rhs[i] = (rhs[i] - self.sub[i] * rhs[i - 1]) / self.pivot[i];
        }
        for i in (0..n - 1).rev() {
            rhs[i] -= self.upper[i] * rhs[i + 1];
        }
    }
}

/// A factorized cyclic tridiagonal matrix: a [`Tridiagonal`] plus the
/// corner entries `A[0][n-1]` and `A[n-1][0]`.
///
/// Solved by the Sherman–Morrison formula around a modified tridiagonal
/// factorization.
#[derive(Clone, Debug, PartialEq)]
pub struct CyclicTridiagonal {
    lu: TridiagonalLu,
    z: Vec<f64>,
    gamma: f64,
    top_right: f64,
    denom: f64,
}

impl CyclicTridiagonal {
    /// Factorize `system` with corners `top_right = A[0][n-1]` and
    /// `bottom_left = A[n-1][0]`. Requires `n >= 3`.
    pub fn factor(
        system: &Tridiagonal,
        top_right: f64,
        bottom_left: f64,
    ) -> Result<Self, SolverError> {
        let n = system.len();
        if n < 3 {
            return Err(ConfigError::InvalidResolution {
                name: "n",
                value: n,
                reason: "cyclic system needs at least 3 rows",
            }
            .into());
        }
        let gamma = -system.diag[0];
        if gamma == 0.0 {
            return Err(SolverError::SingularMatrix {
                index: 0,
                pivot: 0.0,
            });
        }
        let mut modified = system.clone();
        modified.diag[0] -= gamma;
        modified.diag[n - 1] -= bottom_left * top_right / gamma;
        let lu = modified.factor()?;

        let mut z = vec![0.0; n];
        z[0] = gamma;
        z[n - 1] = bottom_left;
        lu.solve(&mut z);

        let denom = 1.0 + z[0] + top_right * z[n - 1] / gamma;
        if denom == 0.0 || !denom.is_finite() {
            return Err(SolverError::SingularMatrix {
                index: n - 1,
                pivot: denom,
            });
        }
        Ok(Self {
            lu,
            z,
            gamma,
            top_right,
            denom,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lu.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.lu.is_empty()
    }

    /// Overwrite `rhs` with the solution of the cyclic system.
    pub fn solve(&self, rhs: &mut [f64]) {
        let n = self.len();
        self.lu.solve(rhs);
        let fact = (rhs[0] + self.top_right * rhs[n - 1] / self.gamma) / self.denom;
        for (x, z) in rhs.iter_mut().zip(&self.z) {
            *x -= fact * z;
        }
    }
}
