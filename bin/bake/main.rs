use anyhow::{bail, Context, Result};
use clap::Parser;
use futures_lite::future::block_on;
use log::{info, warn};
use relief::{
    encode_heightmap, encode_quantized_mesh, fill_template, Config, FetchFuture, MeshArtifact, RasterSource,
    RasterTile, TerrainService, TileKey,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug)]
#[command(name = "relief-bake", version)]
struct Args {
    /// RON configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that the configured URL templates are resolved against.
    #[arg(long, default_value = ".")]
    raster_root: PathBuf,

    #[arg(long, default_value = "out")]
    output_dir: PathBuf,

    /// Tile to bake, as `z/x/y`. May be repeated.
    #[arg(long = "tile", value_parser = parse_tile_key)]
    tiles: Vec<TileKey>,

    /// Bake every tile of this level.
    #[arg(long)]
    level: Option<u8>,
}

fn parse_tile_key(s: &str) -> Result<TileKey, String> {
    let parts: Vec<&str> = s.split('/').collect();
    let [z, x, y] = parts[..] else {
        return Err(format!("expected z/x/y, got {:?}", s));
    };
    let parse = |v: &str| v.parse::<u32>().map_err(|e| format!("{:?}: {}", v, e));
    let level = u8::try_from(parse(z)?).map_err(|e| e.to_string())?;
    Ok(TileKey::new(level, parse(x)?, parse(y)?))
}

/// Reads PNG rasters from disk. The URL template is interpreted as a path relative to `root`.
struct FileRasterSource {
    root: PathBuf,
    tile_width: u32,
}

impl FileRasterSource {
    fn load(path: &Path, tile_width: u32) -> Option<RasterTile> {
        let image = match image::open(path) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                log::trace!("No raster at {}: {}", path.display(), e);
                return None;
            }
        };
        if image.width() != tile_width || image.height() != tile_width {
            warn!(
                "Ignoring {}: expected {}x{} pixels, found {}x{}",
                path.display(),
                tile_width,
                tile_width,
                image.width(),
                image.height()
            );
            return None;
        }
        RasterTile::from_rgba_bytes(tile_width, image.as_raw())
    }
}

impl RasterSource for FileRasterSource {
    fn fetch<'a>(&'a self, key: TileKey, url_template: &'a str) -> FetchFuture<'a> {
        let path = self.root.join(fill_template(url_template, key));
        let tile_width = self.tile_width;
        Box::pin(async move { Self::load(&path, tile_width) })
    }
}

fn write_artifact(output_dir: &Path, key: TileKey, artifact: &MeshArtifact) -> Result<PathBuf> {
    let (extension, bytes) = match artifact {
        MeshArtifact::Quantized(mesh) => ("terrain", encode_quantized_mesh(mesh)),
        other => (
            "f32",
            other.height_grid().map(|grid| encode_heightmap(&grid)).unwrap_or_default(),
        ),
    };
    let dir = output_dir.join(key.level.to_string()).join(key.x.to_string());
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{}.{}", key.y, extension));
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::read_file(path).with_context(|| format!("reading {}", path.display()))?,
        None => Config::default(),
    };

    let mut keys = args.tiles.clone();
    if let Some(level) = args.level {
        if level > 16 {
            bail!("refusing to bake all {} tiles of level {}", 1u64 << (2 * level as u32), level);
        }
        let n = 1u32 << level;
        keys.extend((0..n).flat_map(|y| (0..n).map(move |x| TileKey::new(level, x, y))));
    }
    if keys.is_empty() {
        bail!("nothing to bake; pass --tile or --level");
    }

    let source = FileRasterSource {
        root: args.raster_root.clone(),
        tile_width: config.terrain.tile_width,
    };
    let service = TerrainService::new(config.terrain, source).context("invalid terrain config")?;

    info!("Baking {} tiles...", keys.len());
    for key in keys {
        if !service.tile_data_available(key) {
            warn!("Skipping {}: beyond the maximum level", key);
            continue;
        }
        let artifact = block_on(service.request_tile_geometry(key));
        let path = write_artifact(&args.output_dir, key, &artifact)?;
        info!("Wrote {}", path.display());
    }

    let stats = service.stats();
    info!(
        "Built {} tiles ({} empty), average build time {} us",
        stats.tiles_built,
        stats.empty_tiles,
        stats.average_build_time_us()
    );

    Ok(())
}
