//! CLI command implementations.

pub mod ecosystem;
pub mod init;
pub mod mesh;
