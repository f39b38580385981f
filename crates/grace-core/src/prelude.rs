//! Grace Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use grace_core::prelude::*;
//! ```

pub use crate::grid::Grid;
pub use crate::history::History;
pub use crate::layer::Layer;
pub use crate::rng::FieldRng;
pub use crate::types::{ManifestationEvent, MeshSample, Tick};

pub use crate::blur::gaussian_blur;
pub use crate::resample::{match_shape, resample};

pub use crate::error::{GraceError, Result};
