//! Grace Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use grace_runtime::prelude::*;
//! ```

pub use crate::accumulation::{AccumulationConfig, AccumulationField};
pub use crate::ecosystem::{Ecosystem, EcosystemConfig, EcosystemRecord, EcosystemSnapshot};
pub use crate::matter::{MatterConfig, MatterField};
pub use crate::mesh::{MeshConfig, OscillatorMesh};
pub use crate::substrate::{SubstrateConfig, SubstrateField};

pub use grace_core::prelude::*;
