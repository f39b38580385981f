//! Bilinear resampling between grid shapes.
//!
//! Corners are aligned: output index `i` reads input coordinate
//! `i·(in−1)/(out−1)`. A length-1 axis always reads coordinate 0.

use crate::grid::Grid;
use std::borrow::Cow;

fn source_coord(i: usize, out_len: usize, in_len: usize) -> f64 {
    if out_len <= 1 || in_len <= 1 {
        0.0
    } else {
        i as f64 * (in_len - 1) as f64 / (out_len - 1) as f64
    }
}

/// Resample `grid` to `rows × cols` with bilinear interpolation.
///
/// `grid` is never empty, so every source index is in range. Panics if a
/// target dimension is zero.
pub fn resample(grid: &Grid, rows: usize, cols: usize) -> Grid {
    let (in_rows, in_cols) = grid.shape();
    Grid::from_fn(rows, cols, |r, c| {
        let y = source_coord(r, rows, in_rows);
        let x = source_coord(c, cols, in_cols);
        let r0 = (y.floor() as usize).min(in_rows - 1);
        let c0 = (x.floor() as usize).min(in_cols - 1);
        let r1 = (r0 + 1).min(in_rows - 1);
        let c1 = (c0 + 1).min(in_cols - 1);
        let fy = y - r0 as f64;
        let fx = x - c0 as f64;
        let top = grid[(r0, c0)] * (1.0 - fx) + grid[(r0, c1)] * fx;
        let bottom = grid[(r1, c0)] * (1.0 - fx) + grid[(r1, c1)] * fx;
        top * (1.0 - fy) + bottom * fy
    })
}

/// Borrow `grid` unchanged when it already has the target shape,
/// otherwise resample it.
pub fn match_shape(grid: &Grid, rows: usize, cols: usize) -> Cow<'_, Grid> {
    if grid.shape() == (rows, cols) {
        Cow::Borrowed(grid)
    } else {
        Cow::Owned(resample(grid, rows, cols))
    }
}
