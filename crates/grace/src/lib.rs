//! # Grace
//!
//! Layered scalar-field simulations on discrete 2D grids, plus a coupled
//! phase-oscillator mesh.
//!
//! ## Quick Start
//!
//! ```rust
//! use grace::prelude::*;
//!
//! let mut substrate = SubstrateField::new(SubstrateConfig { size: 32, ..Default::default() })?;
//! let mut matter = MatterField::new(MatterConfig { size: 32, ..Default::default() })?;
//! let mut accumulation = AccumulationField::new(AccumulationConfig { size: 32, ..Default::default() })?;
//!
//! for tick in 0..100 {
//!     substrate.step(None)?;
//!     matter.update_from_substrate(substrate.grid())?;
//!     if tick % 10 == 0 {
//!         accumulation.accumulate_from_matter(matter.grid())?;
//!     }
//!     accumulation.step();
//! }
//!
//! println!("listening: {:.3}", substrate.global_listening_quality());
//! println!("extra order: {:.3}", matter.global_extra_order());
//! println!("manifestations: {}", accumulation.manifestation_count());
//!
//! let mut mesh = OscillatorMesh::new(MeshConfig::default())?;
//! let samples = mesh.run(200, 50)?;
//! assert_eq!(samples.len(), 4);
//! # Ok::<(), GraceError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`grace_core`] - Grid, blur, resampling, random stream, history, errors
//! - [`grace_runtime`] - The layers, the oscillator mesh and the ecosystem loop
//!
//! ## Layers
//!
//! | Layer | Reads | Produces |
//! |-------|-------|----------|
//! | Substrate | optional external coherence | slowly diffusing presence |
//! | Matter | substrate grid | order in [0, 1] |
//! | Accumulation | matter grid | pooled overflow, manifestation events |
//!
//! No layer reads another's internals. The driver passes grids between them.

pub use grace_core;
pub use grace_runtime;

pub mod prelude {
    //! Everything needed to build and drive a simulation.
    pub use grace_runtime::prelude::*;
}
