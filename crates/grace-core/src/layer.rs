//! Layer — the read interface every grid component exposes.
//!
//! Layers never read each other's internals. A driver passes the grid
//! returned by [`Layer::grid`] into the next layer's push-style call.

use crate::grid::Grid;
use crate::history::History;
use crate::types::Tick;

/// Read-only view of a stepped grid component.
pub trait Layer {
    /// Current state grid.
    fn grid(&self) -> &Grid;

    /// Captured snapshots (append until cap, then frozen).
    fn history(&self) -> &History<Grid>;

    /// Number of ticks applied so far.
    fn tick(&self) -> Tick;

    /// Side length of the square grid.
    fn size(&self) -> usize {
        self.grid().rows()
    }

    /// Mean of the current grid.
    fn mean(&self) -> f64 {
        self.grid().mean()
    }
}
