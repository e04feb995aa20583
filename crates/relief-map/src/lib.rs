//! Terrain geometry synthesized from elevation rasters.
//!
//! # Rasters
//!
//! Elevation arrives as square RGBA tiles in a Web Mercator pyramid. The red, green and blue channels of each pixel pack a
//! signed 24-bit integer that is scaled to meters; transparent pixels and a configurable sentinel value mean "no data."
//!
//! # Seams
//!
//! Each tile is assembled together with the first row and column of its east, south and south-east neighbors into a
//! [`RasterTile`] one pixel wider than a fetched tile. Adjacent tiles therefore sample identical border elevations.
//!
//! # Missing Tiles
//!
//! When a tile is missing, a [`FallbackSearch`] walks up the pyramid until it finds an ancestor, then crops and blows up the
//! part of the ancestor covering the tile. The raster remembers how coarse it is (its resolution unit), and such rasters are
//! bilinearly interpolated instead of decimated when resampled into a [`HeightGrid`].
//!
//! # Meshes
//!
//! A [`MeshQuantizer`] turns the grid into a [`QuantizedMesh`] with bounding volumes, a horizon occlusion point, skirts and
//! oct-encoded normals, or leaves it as a plain heightmap. [`TerrainService`] ties the pipeline together behind a bounded
//! [`TileCache`].

mod cache;
mod composite;
mod config;
mod decode;
mod encode;
mod error;
mod indices;
mod key;
mod quantize;
mod raster;
mod sampling;
mod search;
mod service;
mod source;
mod stats;

pub use cache::*;
pub use composite::*;
pub use config::*;
pub use decode::*;
pub use encode::*;
pub use error::*;
pub use indices::*;
pub use key::*;
pub use quantize::*;
pub use raster::*;
pub use sampling::*;
pub use search::*;
pub use service::*;
pub use source::*;
pub use stats::*;

pub use relief_core as core;
