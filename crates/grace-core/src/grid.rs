//! Grid — the dense 2D scalar array every field layer is built on.
//!
//! Stored row-major in a single `Vec<f64>`. Field layers always own square
//! grids; externally supplied grids may have any non-empty shape and are
//! resampled before use.

use crate::error::{GraceError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A fixed-shape, row-major 2D array of `f64`.
///
/// Both dimensions are non-zero and `data.len() == rows * cols`. Every
/// constructor, deserialization included, upholds this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Unchecked wire form of [`Grid`].
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GraceError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        Self::from_vec(raw.rows, raw.cols, raw.data)
    }
}

fn assert_non_empty(rows: usize, cols: usize) {
    assert!(
        rows > 0 && cols > 0,
        "grid dimensions must be non-zero, got {}x{}",
        rows,
        cols
    );
}

impl Grid {
    /// All-zero grid of the given shape.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Use [`Grid::from_vec`] for
    /// untrusted shapes.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// All-zero `size × size` grid.
    pub fn square(size: usize) -> Self {
        Self::zeros(size, size)
    }

    /// Grid with every cell set to `value`. Panics on a zero dimension.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        assert_non_empty(rows, cols);
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every cell. Panics on a
    /// zero dimension.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        assert_non_empty(rows, cols);
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Wrap a flat row-major buffer.
    ///
    /// Fails with `InvalidInputShape` when either dimension is zero or the
    /// buffer length does not equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GraceError::invalid_shape(format!(
                "grid dimensions must be non-zero, got {}x{}",
                rows, cols
            )));
        }
        if data.len() != rows * cols {
            return Err(GraceError::invalid_shape(format!(
                "expected {} values for a {}x{} grid, got {}",
                rows * cols,
                rows,
                cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a grid from nested rows. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(GraceError::invalid_shape(format!(
                "ragged rows: row {} has {} values, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_vec(rows.len(), cols, data)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Cell value, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Copy out as nested rows (for display collaborators).
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(|r| r.to_vec()).collect()
    }

    /// Arithmetic mean of all cells (0.0 for an empty grid).
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Fraction of cells strictly above `threshold`.
    pub fn fraction_above(&self, threshold: f64) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let count = self.data.iter().filter(|&&v| v > threshold).count();
        count as f64 / self.data.len() as f64
    }

    /// Clamp every cell into `[lo, hi]`.
    pub fn clamp(&mut self, lo: f64, hi: f64) {
        for v in &mut self.data {
            *v = v.clamp(lo, hi);
        }
    }

    /// Whether every cell is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Check an externally supplied grid before it touches field state.
    ///
    /// Rejects an empty shape, a buffer that disagrees with the shape, and
    /// NaN or infinite cells, all as `InvalidInputShape`.
    pub fn ensure_valid(&self, what: &str) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.data.len() != self.rows * self.cols {
            return Err(GraceError::invalid_shape(format!(
                "{} is a {}x{} grid holding {} values",
                what,
                self.rows,
                self.cols,
                self.data.len()
            )));
        }
        self.ensure_finite(what)
    }

    /// Reject grids carrying NaN or infinite values.
    pub fn ensure_finite(&self, what: &str) -> Result<()> {
        match self.data.iter().position(|v| !v.is_finite()) {
            None => Ok(()),
            Some(i) => Err(GraceError::invalid_shape(format!(
                "{} has a non-finite value at ({}, {})",
                what,
                i / self.cols,
                i % self.cols
            ))),
        }
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "grid index out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "grid index out of bounds");
        &mut self.data[row * self.cols + col]
    }
}
