//! # Grace Core
//!
//! Numeric building blocks shared by the Grace field simulations:
//!
//! - [`grid::Grid`] — dense row-major 2D array of `f64`
//! - [`blur`] — separable Gaussian blur (the diffusion operator)
//! - [`resample`] — bilinear resampling between grid shapes
//! - [`rng::FieldRng`] — seeded per-instance random stream
//! - [`history::History`] — append-until-full snapshot buffer
//! - [`layer::Layer`] — read interface of every grid component
//!
//! ## Quick Start
//!
//! ```rust
//! use grace_core::prelude::*;
//!
//! let mut grid = Grid::square(8);
//! grid[(4, 4)] = 1.0;
//! let blurred = gaussian_blur(&grid, 1.0);
//! let coarse = resample(&blurred, 4, 4);
//! assert_eq!(coarse.shape(), (4, 4));
//! ```

pub mod blur;
pub mod error;
pub mod grid;
pub mod history;
pub mod layer;
pub mod prelude;
pub mod resample;
pub mod rng;
pub mod types;
