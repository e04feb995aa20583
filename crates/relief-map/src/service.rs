use crate::cache::TileCache;
use crate::composite::NeighborCompositor;
use crate::config::TerrainConfig;
use crate::core::WebMercatorTilingScheme;
use crate::decode::PixelDecoder;
use crate::error::ConfigError;
use crate::key::TileKey;
use crate::quantize::{MeshArtifact, MeshQuantizer};
use crate::raster::RasterTile;
use crate::sampling::{resample, HeightGrid};
use crate::search::FallbackSearch;
use crate::source::RasterSource;
use crate::stats::BuildStats;

use futures_lite::future;
use parking_lot::Mutex;
use std::time::Instant;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayerKind {
    /// Terrain elevation. Missing tiles are searched for at every coarser level down to a floor.
    Primary,
    /// A sparser correction added to the primary elevation, searched for at one level only.
    Auxiliary,
}

/// One source of elevation rasters and the way its pixels become heights.
#[derive(Clone, Debug)]
pub struct Layer {
    pub kind: LayerKind,
    pub url_template: String,
    pub decoder: PixelDecoder,
    pub compositor: NeighborCompositor,
}

impl Layer {
    pub fn from_config(kind: LayerKind, config: &TerrainConfig) -> Self {
        let (url_template, decoder, strategy) = match kind {
            LayerKind::Primary => (&config.tile_url, config.primary_decoder(), config.primary_search()),
            LayerKind::Auxiliary => (
                &config.auxiliary_url,
                config.auxiliary_decoder(),
                config.auxiliary_search(),
            ),
        };
        Self {
            kind,
            url_template: url_template.clone(),
            decoder,
            compositor: NeighborCompositor::new(FallbackSearch::new(strategy, config.tile_width)),
        }
    }

    pub async fn composite<S: RasterSource + ?Sized>(&self, source: &S, key: TileKey) -> Option<RasterTile> {
        let raster = self.compositor.composite(source, &self.url_template, key).await;
        if raster.is_none() {
            log::debug!("No {:?} raster for {}", self.kind, key);
        }
        raster
    }

    pub fn resample(&self, raster: &RasterTile, heightmap_width: u32) -> HeightGrid {
        resample(raster, &self.decoder, heightmap_width)
    }
}

/// Serves terrain geometry for Web Mercator tiles, built from elevation rasters fetched through `S`.
///
/// Safe to share between threads. Finished tiles are cached; the cache lock is never held while waiting on a fetch.
pub struct TerrainService<S> {
    config: TerrainConfig,
    source: S,
    primary: Layer,
    auxiliary: Option<Layer>,
    quantizer: MeshQuantizer,
    cache: Mutex<TileCache>,
    stats: Mutex<BuildStats>,
}

impl<S: RasterSource> TerrainService<S> {
    pub fn new(config: TerrainConfig, source: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let primary = Layer::from_config(LayerKind::Primary, &config);
        let auxiliary = config
            .use_auxiliary_layer
            .then(|| Layer::from_config(LayerKind::Auxiliary, &config));
        let quantizer = MeshQuantizer::new(
            WebMercatorTilingScheme::new(config.ellipsoid),
            config.heightmap_width,
            config.use_vertex_normals,
            config.max_angular_width_limit,
        );
        let cache = Mutex::new(TileCache::new(config.cache_capacity));

        Ok(Self {
            config,
            source,
            primary,
            auxiliary,
            quantizer,
            cache,
            stats: Mutex::new(BuildStats::default()),
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn tiling_scheme(&self) -> &WebMercatorTilingScheme {
        &self.quantizer.tiling_scheme
    }

    pub fn tile_data_available(&self, key: TileKey) -> bool {
        key.is_in_pyramid() && key.level <= self.config.maximum_level
    }

    pub fn level_maximum_geometric_error(&self, level: u8) -> f64 {
        self.quantizer.level_maximum_geometric_error(level)
    }

    pub fn stats(&self) -> BuildStats {
        *self.stats.lock()
    }

    pub fn cached_tile_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// The geometry for `key`. Tiles without any data resolve to [`MeshArtifact::Empty`], never to an error.
    ///
    /// Keys outside the tile pyramid are also `Empty`; they are neither fetched nor cached.
    pub async fn request_tile_geometry(&self, key: TileKey) -> MeshArtifact {
        if !key.is_in_pyramid() {
            log::warn!("Tile {} lies outside the pyramid", key);
            return MeshArtifact::Empty;
        }

        let cached = self.cache.lock().get(key);
        if let Some(artifact) = cached {
            log::debug!("Cache hit {}", key);
            self.stats.lock().record_hit();
            return artifact;
        }
        log::debug!("Cache miss {}", key);

        let auxiliary = async {
            match &self.auxiliary {
                Some(layer) => layer.composite(&self.source, key).await.map(|r| (layer, r)),
                None => None,
            }
        };
        let (primary, auxiliary) = future::zip(
            async {
                self.primary
                    .composite(&self.source, key)
                    .await
                    .map(|r| (&self.primary, r))
            },
            auxiliary,
        )
        .await;

        let start = Instant::now();
        let artifact = self.build(key, [primary, auxiliary]);
        self.stats
            .lock()
            .complete_tile(start.elapsed(), artifact.is_empty());

        self.cache.lock().put(key, artifact.clone());
        artifact
    }

    fn build(&self, key: TileKey, rasters: [Option<(&Layer, RasterTile)>; 2]) -> MeshArtifact {
        let heightmap_width = self.config.heightmap_width;
        let grid = rasters
            .into_iter()
            .flatten()
            .map(|(layer, raster)| layer.resample(&raster, heightmap_width))
            .reduce(|sum, grid| sum + &grid);
        match grid {
            Some(grid) => self.quantizer.quantize(grid, key),
            None => {
                log::warn!("No elevation data for {} at any searched level", key);
                MeshArtifact::Empty
            }
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_elevation;
    use crate::key::MAX_TILE_LEVEL;
    use crate::source::FetchFuture;

    use futures_lite::future::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GRAY: [u8; 4] = [128, 128, 128, 255];

    /// Serves a uniform raster for every template in `templates` at levels up to `max_level`.
    struct StubSource {
        pixels: Vec<(&'static str, [u8; 4])>,
        max_level: u8,
        width: u32,
        fetches: AtomicUsize,
    }

    impl StubSource {
        fn new(width: u32, pixels: &[(&'static str, [u8; 4])]) -> Self {
            Self {
                pixels: pixels.to_vec(),
                max_level: u8::MAX,
                width,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl RasterSource for StubSource {
        fn fetch<'a>(&'a self, key: TileKey, url_template: &'a str) -> FetchFuture<'a> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let raster = self
                .pixels
                .iter()
                .find(|(template, _)| *template == url_template)
                .filter(|_| key.level <= self.max_level)
                .map(|&(_, rgba)| RasterTile::uniform(self.width, rgba));
            Box::pin(async move { raster })
        }
    }

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            tile_url: "primary".into(),
            auxiliary_url: "aux".into(),
            tile_width: 2,
            heightmap_width: 2,
            ..Default::default()
        }
    }

    fn grid_of(artifact: &MeshArtifact) -> HeightGrid {
        match artifact {
            MeshArtifact::Heightmap(grid) => grid.clone(),
            other => panic!("expected a heightmap, got {:?}", other),
        }
    }

    #[test]
    fn uniform_gray_root_tile_is_flat_heightmap() {
        let source = StubSource::new(2, &[("primary", GRAY)]);
        let service = TerrainService::new(small_config(), source).unwrap();
        let artifact = block_on(service.request_tile_geometry(TileKey::new(0, 0, 0)));

        let expected = decode_elevation(GRAY, 0.01, -8388608);
        assert_eq!(grid_of(&artifact).heights(), &[expected; 4]);
    }

    #[test]
    fn absent_rasters_give_empty_tiles() {
        let service = TerrainService::new(small_config(), StubSource::new(2, &[])).unwrap();
        for key in [TileKey::new(0, 0, 0), TileKey::new(5, 17, 3), TileKey::new(14, 9000, 4000)] {
            assert_eq!(block_on(service.request_tile_geometry(key)), MeshArtifact::Empty);
        }
        let stats = service.stats();
        assert_eq!(stats.tiles_built, 3);
        assert_eq!(stats.empty_tiles, 3);
    }

    #[test]
    fn keys_outside_pyramid_are_empty_without_fetching() {
        let service = TerrainService::new(small_config(), StubSource::new(2, &[("primary", GRAY)])).unwrap();
        for key in [TileKey::new(64, 0, 0), TileKey::new(u8::MAX, 0, 0), TileKey::new(3, 0, 8), TileKey::new(3, 8, 0)] {
            assert_eq!(block_on(service.request_tile_geometry(key)), MeshArtifact::Empty);
            assert!(!service.tile_data_available(key));
        }
        assert_eq!(service.source().fetch_count(), 0);
        assert_eq!(service.cached_tile_count(), 0);
    }

    #[test]
    fn deepest_level_last_row_builds() {
        let key = TileKey::new(MAX_TILE_LEVEL, 0, u32::MAX);

        let service = TerrainService::new(small_config(), StubSource::new(2, &[])).unwrap();
        assert_eq!(block_on(service.request_tile_geometry(key)), MeshArtifact::Empty);

        let service = TerrainService::new(small_config(), StubSource::new(2, &[("primary", GRAY)])).unwrap();
        let artifact = block_on(service.request_tile_geometry(key));
        // The south neighbors are not representable, so the bottom row stays blank.
        let expected = decode_elevation(GRAY, 0.01, -8388608);
        assert_eq!(grid_of(&artifact).heights(), &[expected, expected, 0.0, 0.0]);
        // Origin and east only.
        assert_eq!(service.source().fetch_count(), 2);
    }

    #[test]
    fn second_request_is_served_from_cache() {
        let service = TerrainService::new(small_config(), StubSource::new(2, &[("primary", GRAY)])).unwrap();
        let key = TileKey::new(3, 2, 1);
        let first = block_on(service.request_tile_geometry(key));
        let fetches = service.source().fetch_count();
        assert_eq!(fetches, 4);

        let second = block_on(service.request_tile_geometry(key));
        assert_eq!(first, second);
        assert_eq!(service.source().fetch_count(), fetches);
        assert_eq!(service.stats().cache_hits, 1);
        assert_eq!(service.cached_tile_count(), 1);
    }

    #[test]
    fn auxiliary_layer_is_added() {
        let aux_pixel = [0, 0x27, 0x10, 255];
        let source = StubSource::new(2, &[("primary", GRAY), ("aux", aux_pixel)]);
        let config = TerrainConfig {
            use_auxiliary_layer: true,
            ..small_config()
        };
        let service = TerrainService::new(config, source).unwrap();
        let artifact = block_on(service.request_tile_geometry(TileKey::new(10, 900, 400)));

        let expected = decode_elevation(GRAY, 0.01, -8388608) + decode_elevation(aux_pixel, 0.0001, -8388608);
        assert_eq!(grid_of(&artifact).heights(), &[expected; 4]);
    }

    #[test]
    fn auxiliary_alone_still_builds() {
        let aux_pixel = [0, 0x27, 0x10, 255];
        let config = TerrainConfig {
            use_auxiliary_layer: true,
            ..small_config()
        };
        let service = TerrainService::new(config, StubSource::new(2, &[("aux", aux_pixel)])).unwrap();
        let artifact = block_on(service.request_tile_geometry(TileKey::new(2, 1, 1)));
        assert_eq!(grid_of(&artifact).heights(), &[1.0; 4]);
    }

    #[test]
    fn coarse_data_is_found_by_fallback() {
        let mut source = StubSource::new(2, &[("primary", GRAY)]);
        source.max_level = 2;
        let config = TerrainConfig {
            primary_floor_search_level: 0,
            ..small_config()
        };
        let service = TerrainService::new(config.clone(), source).unwrap();
        let artifact = block_on(service.request_tile_geometry(TileKey::new(5, 10, 10)));
        let expected = decode_elevation(GRAY, 0.01, -8388608);
        assert_eq!(grid_of(&artifact).heights(), &[expected; 4]);

        let mut source = StubSource::new(2, &[("primary", GRAY)]);
        source.max_level = 2;
        let config = TerrainConfig {
            use_fallback_search: false,
            ..config
        };
        let service = TerrainService::new(config, source).unwrap();
        assert!(block_on(service.request_tile_geometry(TileKey::new(5, 10, 10))).is_empty());
    }

    #[test]
    fn normals_produce_quantized_mesh() {
        let config = TerrainConfig {
            use_vertex_normals: true,
            ..small_config()
        };
        let service = TerrainService::new(config, StubSource::new(2, &[("primary", GRAY)])).unwrap();
        match block_on(service.request_tile_geometry(TileKey::new(6, 3, 3))) {
            MeshArtifact::Quantized(mesh) => {
                assert_eq!(mesh.vertex_count(), 4);
                assert_eq!(mesh.encoded_normals.len(), 8);
            }
            other => panic!("expected a quantized mesh, got {:?}", other),
        }
    }

    #[test]
    fn invalid_config_fails_construction() {
        let config = TerrainConfig {
            heightmap_width: 300,
            ..Default::default()
        };
        assert_eq!(
            TerrainService::new(config, StubSource::new(2, &[])).err(),
            Some(ConfigError::HeightmapWidthTooLarge { width: 300 })
        );
    }

    #[test]
    fn availability_and_error_by_level() {
        let service = TerrainService::new(TerrainConfig::default(), StubSource::new(256, &[])).unwrap();
        assert!(service.tile_data_available(TileKey::new(14, 0, 0)));
        assert!(!service.tile_data_available(TileKey::new(15, 0, 0)));
        assert_eq!(
            service.level_maximum_geometric_error(1),
            service.level_maximum_geometric_error(0) / 2.0
        );
    }

    #[test]
    fn concurrent_requests_share_cache() {
        let config = TerrainConfig {
            cache_capacity: 5,
            ..small_config()
        };
        let service = TerrainService::new(config, StubSource::new(2, &[("primary", GRAY)])).unwrap();
        crossbeam::scope(|s| {
            for t in 0..4 {
                let service = &service;
                s.spawn(move |_| {
                    for x in 0..20 {
                        let artifact = block_on(service.request_tile_geometry(TileKey::new(6, x, t)));
                        assert!(!artifact.is_empty());
                    }
                });
            }
        })
        .unwrap();
        assert_eq!(service.cached_tile_count(), 5);
        let stats = service.stats();
        assert_eq!(stats.tiles_built + stats.cache_hits, 80);
    }
}
