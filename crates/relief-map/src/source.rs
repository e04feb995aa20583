use crate::key::TileKey;
use crate::raster::RasterTile;

use std::future::Future;
use std::pin::Pin;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Option<RasterTile>> + Send + 'a>>;

/// Fetches and decodes elevation rasters.
///
/// Every failure (missing tile, transport error, undecodable image) resolves to `None`. Implementations are responsible for
/// their own timeouts.
pub trait RasterSource: Send + Sync {
    fn fetch<'a>(&'a self, key: TileKey, url_template: &'a str) -> FetchFuture<'a>;
}

impl<S: RasterSource + ?Sized> RasterSource for &S {
    fn fetch<'a>(&'a self, key: TileKey, url_template: &'a str) -> FetchFuture<'a> {
        (**self).fetch(key, url_template)
    }
}

impl<S: RasterSource + ?Sized> RasterSource for Box<S> {
    fn fetch<'a>(&'a self, key: TileKey, url_template: &'a str) -> FetchFuture<'a> {
        (**self).fetch(key, url_template)
    }
}

/// Substitutes the `{x}`, `{y}` and `{z}` placeholders of `template`.
pub fn fill_template(template: &str, key: TileKey) -> String {
    template
        .replace("{x}", &key.x.to_string())
        .replace("{y}", &key.y.to_string())
        .replace("{z}", &key.level.to_string())
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

    #[test]
    fn template_placeholders_are_replaced() {
        assert_eq!(
            fill_template("https://tiles/{z}/{x}/{y}.png", TileKey::new(14, 14552, 6451)),
            "https://tiles/14/14552/6451.png"
        );
        assert_eq!(fill_template("static.png", TileKey::new(1, 0, 1)), "static.png");
    }
}
