use crate::key::TileKey;
use crate::raster::RasterTile;
use crate::source::RasterSource;

use serde::{Deserialize, Serialize};

/// How to find a raster when the requested tile is missing.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SearchStrategy {
    /// Only the requested level.
    Direct,
    /// Walk from the requested level toward `floor`, one level at a time, until an ancestor is found.
    Iterative { floor: u8 },
    /// A single attempt at `min(requested, floor)`.
    SingleStep { floor: u8 },
}

impl SearchStrategy {
    /// Levels to try for a request at `requested`, finest first.
    ///
    /// A floor finer than the request behaves like the request itself, so the search never overshoots in either direction.
    pub fn levels(&self, requested: u8) -> impl Iterator<Item = u8> {
        let (first, last) = match *self {
            Self::Direct => (requested, requested),
            Self::Iterative { floor } => (requested, floor.min(requested)),
            Self::SingleStep { floor } => {
                let level = floor.min(requested);
                (level, level)
            }
        };
        (last..=first).rev()
    }
}

/// Fetches the raster for a tile, falling back to crops of coarser ancestors.
#[derive(Clone, Copy, Debug)]
pub struct FallbackSearch {
    pub strategy: SearchStrategy,
    pub tile_width: u32,
}

impl FallbackSearch {
    pub fn new(strategy: SearchStrategy, tile_width: u32) -> Self {
        Self {
            strategy,
            tile_width,
        }
    }

    /// A raster covering `key` at `tile_width` resolution, or `None` if no level in the search range has data.
    pub async fn fetch<S: RasterSource + ?Sized>(
        &self,
        source: &S,
        url_template: &str,
        key: TileKey,
    ) -> Option<RasterTile> {
        for level in self.strategy.levels(key.level) {
            let ancestor = key.ancestor(level);
            log::trace!("Fetching {} for {}", ancestor, key);
            if let Some(raster) = source.fetch(ancestor, url_template).await {
                if level == key.level {
                    return Some(raster);
                }
                log::debug!("Recovered {} from ancestor {}", key, ancestor);
                return Some(self.recover_from_ancestor(&raster, key, level));
            }
        }
        None
    }

    /// Crops the part of `ancestor` (a tile at `level`) that covers `key` and blows it up to `tile_width` pixels.
    pub fn recover_from_ancestor(&self, ancestor: &RasterTile, key: TileKey, level: u8) -> RasterTile {
        let depth = u32::from(key.level - level);
        let tw = self.tile_width as u64;
        let origin = |c: u32| ((c as u64 * tw).checked_shr(depth).unwrap_or(0) % tw) as u32;
        let crop_size = self.tile_width.checked_shr(depth).unwrap_or(0).max(1);
        let resolution_unit = 1u32
            .checked_shl(depth)
            .map_or(self.tile_width, |blocks| blocks.min(self.tile_width));

        ancestor
            .crop([origin(key.x), origin(key.y)], crop_size)
            .expand_nearest(self.tile_width, resolution_unit)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
