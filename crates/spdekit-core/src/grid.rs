//! Uniform grids over 1D intervals and 2D rectangles.
//!
//! Grids are immutable once constructed. A grid with `n` intervals over
//! `[0, a]` has `n + 1` points including both endpoints, matching the
//! `linspace(0, a, n + 1)` convention used for time axes and periodic
//! spatial axes alike.

use crate::error::{require_positive, ConfigError};

/// `count` evenly spaced points from `start` to `end` inclusive.
///
/// Interior points are computed as `start + i * step`; the last point is
/// pinned to `end` exactly so that periodic wrap-around comparisons are
/// not disturbed by accumulated rounding.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut out: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            out[count - 1] = end;
            out
        }
    }
}

/// A uniform grid over `[0, a]`.
///
/// # Examples
///
/// ```
/// use spdekit_core::Grid1D;
///
/// let g = Grid1D::new(2.0, 4).unwrap();
/// assert_eq!(g.points(), &[0.0, 0.5, 1.0, 1.5, 2.0]);
/// assert_eq!(g.dx(), 0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid1D {
    a: f64,
    intervals: usize,
    points: Vec<f64>,
}

impl Grid1D {
    /// Build a grid of `intervals` equal sub-intervals over `[0, a]`.
    ///
    /// Returns `Err(ConfigError::EmptyDomain)` if `a <= 0` and
    /// `Err(ConfigError::InvalidResolution)` if `intervals == 0`.
    pub fn new(a: f64, intervals: usize) -> Result<Self, ConfigError> {
        require_positive("a", a)?;
        if intervals == 0 {
            return Err(ConfigError::InvalidResolution {
                name: "intervals",
                value: 0,
                reason: "must be at least 1",
            });
        }
        Ok(Self {
            a,
            intervals,
            points: linspace(0.0, a, intervals + 1),
        })
    }

    /// Domain length.
    pub fn length(&self) -> f64 {
        self.a
    }

    /// Number of sub-intervals.
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    /// Spacing between consecutive points.
    pub fn dx(&self) -> f64 {
        self.a / self.intervals as f64
    }

    /// All `intervals + 1` coordinates.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of points (`intervals + 1`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; construction rejects zero intervals.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A tensor-product uniform grid over `[0, a1] x [0, a2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2D {
    x: Grid1D,
    y: Grid1D,
}

impl Grid2D {
    /// Build a grid with `intervals.0 x intervals.1` cells.
    pub fn new(a: (f64, f64), intervals: (usize, usize)) -> Result<Self, ConfigError> {
        Ok(Self {
            x: Grid1D::new(a.0, intervals.0)?,
            y: Grid1D::new(a.1, intervals.1)?,
        })
    }

    /// First-axis grid.
    pub fn x(&self) -> &Grid1D {
        &self.x
    }

    /// Second-axis grid.
    pub fn y(&self) -> &Grid1D {
        &self.y
    }

    /// Spacings `(dx1, dx2)`.
    pub fn spacing(&self) -> (f64, f64) {
        (self.x.dx(), self.y.dx())
    }

    /// Point counts `(intervals.0 + 1, intervals.1 + 1)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }
}
