//! Quantized-mesh terrain from RGBA elevation tiles.
//!
//! This crate re-exports the [`relief_map`] pipeline and adds file-based [`Config`] loading.

mod config;

pub use config::*;

// Re-exports.
pub use relief_map::*;
