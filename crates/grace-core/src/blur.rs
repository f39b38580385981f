//! Separable Gaussian blur used as the diffusion operator.
//!
//! Kernel radius is `floor(4·sigma + 0.5)` taps, weights are normalised to
//! sum to 1, and samples outside the grid replicate the nearest edge cell.

use crate::grid::Grid;

/// Number of standard deviations the kernel extends to.
const TRUNCATE: f64 = 4.0;

/// Normalised 1D Gaussian kernel of length `2·radius + 1`.
///
/// Returns `[1.0]` for a non-positive sigma.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma.is_nan() || sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let total: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= total;
    }
    kernel
}

/// Blurred copy of `grid` with standard deviation `sigma` (in cells).
pub fn gaussian_blur(grid: &Grid, sigma: f64) -> Grid {
    let kernel = gaussian_kernel(sigma);
    if kernel.len() == 1 {
        return grid.clone();
    }
    let radius = (kernel.len() / 2) as isize;
    let (rows, cols) = grid.shape();
    let src = grid.as_slice();

    // Horizontal pass.
    let mut tmp = vec![0.0; rows * cols];
    for r in 0..rows {
        let row = &src[r * cols..(r + 1) * cols];
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let cc = (c as isize + k as isize - radius).clamp(0, cols as isize - 1);
                acc += w * row[cc as usize];
            }
            tmp[r * cols + c] = acc;
        }
    }

    // Vertical pass.
    Grid::from_fn(rows, cols, |r, c| {
        let mut acc = 0.0;
        for (k, w) in kernel.iter().enumerate() {
            let rr = (r as isize + k as isize - radius).clamp(0, rows as isize - 1);
            acc += w * tmp[rr as usize * cols + c];
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(1.0);
        assert_eq!(k.len(), 9);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn tiny_sigma_is_identity() {
        let g = Grid::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
        assert_eq!(gaussian_blur(&g, 0.0), g);
        assert_eq!(gaussian_blur(&g, 0.1), g);
    }

    #[test]
    fn constant_grid_is_preserved() {
        let g = Grid::filled(6, 6, 0.25);
        let b = gaussian_blur(&g, 1.5);
        for v in b.as_slice() {
            assert!((v - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn spreads_a_point_source() {
        let mut g = Grid::square(9);
        g[(4, 4)] = 1.0;
        let b = gaussian_blur(&g, 1.0);
        assert!(b[(4, 4)] < 1.0);
        assert!(b[(4, 5)] > 0.0);
        assert!((b[(4, 5)] - b[(5, 4)]).abs() < 1e-15);
        // Interior point source: mass is conserved.
        assert!((b.as_slice().iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
