use crate::core::Ellipsoid;
use crate::decode::{PixelDecoder, DEFAULT_INVALID_VALUE};
use crate::error::ConfigError;
use crate::raster::MAX_TILE_WIDTH;
use crate::sampling::MAX_HEIGHTMAP_WIDTH;
use crate::search::SearchStrategy;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Elevation raster URL with `{x}`, `{y}` and `{z}` placeholders.
    pub tile_url: String,
    /// Raster URL of the correction layer (e.g. geoid heights) added to the primary elevations.
    pub auxiliary_url: String,
    pub use_auxiliary_layer: bool,
    pub auxiliary_scale: f64,
    pub primary_scale: f64,
    /// Side length of fetched rasters in pixels.
    pub tile_width: u32,
    /// Side length of the output grid; at most 256.
    pub heightmap_width: u32,
    pub maximum_level: u8,
    /// Raw value that decodes to zero elevation.
    pub invalid_value_sentinel: i32,
    /// Produce quantized meshes with normals rather than plain heightmaps.
    pub use_vertex_normals: bool,
    /// Tiles wider than this many radians are empty.
    pub max_angular_width_limit: Option<f64>,
    pub cache_capacity: usize,
    /// Coarsest level searched for missing primary tiles.
    pub primary_floor_search_level: u8,
    /// The only level searched for missing auxiliary tiles finer than it.
    pub auxiliary_floor_search_level: u8,
    /// When disabled, the primary layer is only fetched at the requested level.
    pub use_fallback_search: bool,
    pub ellipsoid: Ellipsoid,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_url: "https://tiles.gsj.jp/tiles/elev/land/{z}/{y}/{x}.png".into(),
            auxiliary_url: "https://tiles.gsj.jp/tiles/elev/gsigeoid/{z}/{y}/{x}.png".into(),
            use_auxiliary_layer: false,
            auxiliary_scale: 0.0001,
            primary_scale: 0.01,
            tile_width: 256,
            heightmap_width: 65,
            maximum_level: 14,
            invalid_value_sentinel: DEFAULT_INVALID_VALUE,
            use_vertex_normals: false,
            max_angular_width_limit: None,
            cache_capacity: 100,
            primary_floor_search_level: 14,
            auxiliary_floor_search_level: 8,
            use_fallback_search: true,
            ellipsoid: Ellipsoid::WGS84,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heightmap_width > MAX_HEIGHTMAP_WIDTH {
            return Err(ConfigError::HeightmapWidthTooLarge {
                width: self.heightmap_width,
            });
        }
        if self.heightmap_width < 2 {
            return Err(ConfigError::HeightmapWidthTooSmall {
                width: self.heightmap_width,
            });
        }
        if self.tile_width == 0 {
            return Err(ConfigError::ZeroTileWidth);
        }
        if self.tile_width > MAX_TILE_WIDTH {
            return Err(ConfigError::TileWidthTooLarge {
                width: self.tile_width,
            });
        }
        Ok(())
    }

    pub fn primary_decoder(&self) -> PixelDecoder {
        PixelDecoder::new(self.primary_scale, self.invalid_value_sentinel)
    }

    pub fn auxiliary_decoder(&self) -> PixelDecoder {
        PixelDecoder::new(self.auxiliary_scale, self.invalid_value_sentinel)
    }

    pub fn primary_search(&self) -> SearchStrategy {
        if self.use_fallback_search {
            SearchStrategy::Iterative {
                floor: self.primary_floor_search_level,
            }
        } else {
            SearchStrategy::Direct
        }
    }

    pub fn auxiliary_search(&self) -> SearchStrategy {
        SearchStrategy::SingleStep {
            floor: self.auxiliary_floor_search_level,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
