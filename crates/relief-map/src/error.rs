use crate::raster::MAX_TILE_WIDTH;
use crate::sampling::MAX_HEIGHTMAP_WIDTH;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    #[error("heightmap width {width} exceeds the maximum of {}", MAX_HEIGHTMAP_WIDTH)]
    HeightmapWidthTooLarge { width: u32 },
    #[error("heightmap width {width} is too small; a grid needs at least 2 samples per side")]
    HeightmapWidthTooSmall { width: u32 },
    #[error("tile width must be nonzero")]
    ZeroTileWidth,
    #[error("tile width {width} exceeds the maximum of {}", MAX_TILE_WIDTH)]
    TileWidthTooLarge { width: u32 },
}
