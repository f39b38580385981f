//! # Grace Runtime
//!
//! The stepping components and the loop that composes them.
//!
//! Three grid layers, each a self-contained state machine over a square grid:
//! the substrate diffuses and decays, matter gains order where the substrate
//! is high, and the accumulation pools matter overflow until it manifests.
//! A separate oscillator mesh relaxes coupled phases toward a shared target.

pub mod accumulation;
pub mod ecosystem;
pub mod matter;
pub mod mesh;
pub mod prelude;
pub mod substrate;
