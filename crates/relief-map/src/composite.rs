use crate::key::TileKey;
use crate::raster::RasterTile;
use crate::search::FallbackSearch;
use crate::source::RasterSource;

use futures_lite::future;

/// Tile offsets of the origin, east, south and south-east rasters, in that order.
pub const NEIGHBOR_OFFSETS: [[u32; 2]; 4] = [[0, 0], [1, 0], [0, 1], [1, 1]];

/// Assembles a tile together with the first row and column of its south and east neighbors, so adjacent tiles share their
/// border samples.
#[derive(Clone, Copy, Debug)]
pub struct NeighborCompositor {
    pub search: FallbackSearch,
}

impl NeighborCompositor {
    pub fn new(search: FallbackSearch) -> Self {
        Self { search }
    }

    #[inline]
    pub fn tile_width(&self) -> u32 {
        self.search.tile_width
    }

    /// A `(tile_width + 1)²` raster for `key`, or `None` if the tile itself has no data.
    pub async fn composite<S: RasterSource + ?Sized>(
        &self,
        source: &S,
        url_template: &str,
        key: TileKey,
    ) -> Option<RasterTile> {
        let [origin, east, south, south_east] = NEIGHBOR_OFFSETS.map(|[dx, dy]| key.neighbor(dx, dy));
        let fetch = move |neighbor: Option<TileKey>| async move {
            match neighbor {
                Some(neighbor) => self.search.fetch(source, url_template, neighbor).await,
                None => None,
            }
        };
        let ((origin, east), (south, south_east)) = future::zip(
            future::zip(fetch(origin), fetch(east)),
            future::zip(fetch(south), fetch(south_east)),
        )
        .await;

        let composite = self.assemble([origin, east, south, south_east]);
        if composite.is_some() {
            log::debug!("Composited {}", key);
        }
        composite
    }

    /// Blits the rasters fetched for [`NEIGHBOR_OFFSETS`] into one raster. Missing neighbors stay blank.
    pub fn assemble(&self, rasters: [Option<RasterTile>; 4]) -> Option<RasterTile> {
        let tile_width = self.tile_width();
        let resolution_unit = rasters[0].as_ref()?.resolution_unit;
        let mut composite = RasterTile::blank(tile_width + 1, resolution_unit);
        for (raster, [dx, dy]) in rasters.iter().zip(NEIGHBOR_OFFSETS) {
            if let Some(raster) = raster {
                composite.blit(raster, [dx * tile_width, dy * tile_width]);
            }
        }
        Some(composite)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
