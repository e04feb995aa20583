use crate::indices::GridIndices;
use crate::key::TileKey;
use crate::sampling::HeightGrid;

use crate::core::glam::DVec3;
use crate::core::{
    oct_encode, BoundingSphere, Cartographic, OrientedBoundingBox, Rectangle, WebMercatorTilingScheme,
};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Upper bound of quantized vertex coordinates.
pub const QUANTIZED_MAX: u16 = 32767;

/// All four children of a tile are available.
pub const ALL_CHILDREN: u8 = 15;

/// Skirts hang this many geometric errors below the tile edges.
const SKIRT_ERROR_FACTOR: f64 = 5.0;

/// The finished geometry for one tile.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshArtifact {
    /// No data. Renders as a flat 2×2 grid at zero height.
    Empty,
    /// The resampled grid, for consumers that triangulate it themselves.
    Heightmap(HeightGrid),
    Quantized(QuantizedMesh),
}

impl MeshArtifact {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The grid represented by a heightmap artifact. [`MeshArtifact::Empty`] is the flat 2×2 grid.
    pub fn height_grid(&self) -> Option<HeightGrid> {
        match self {
            Self::Empty => Some(HeightGrid::flat(2, 0.0)),
            Self::Heightmap(grid) => Some(grid.clone()),
            Self::Quantized(_) => None,
        }
    }
}

/// A triangle mesh with vertex positions quantized to `[0, QUANTIZED_MAX]` relative to the tile rectangle and height range.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantizedMesh {
    pub minimum_height: f32,
    pub maximum_height: f32,
    /// `u`, then `v`, then height, each `vertex_count` long.
    pub quantized_vertices: Vec<u16>,
    pub indices: GridIndices,
    /// Shared by all four edges.
    pub skirt_height: f64,
    pub bounding_sphere: BoundingSphere,
    pub oriented_bounding_box: Option<OrientedBoundingBox>,
    /// In the ellipsoid's scaled space.
    pub horizon_occlusion_point: DVec3,
    pub child_tile_mask: u8,
    /// Two oct-encoded bytes per vertex.
    pub encoded_normals: Vec<u8>,
}

impl QuantizedMesh {
    pub fn vertex_count(&self) -> usize {
        self.quantized_vertices.len() / 3
    }

    pub fn u(&self) -> &[u16] {
        &self.quantized_vertices[..self.vertex_count()]
    }

    pub fn v(&self) -> &[u16] {
        let n = self.vertex_count();
        &self.quantized_vertices[n..2 * n]
    }

    pub fn heights(&self) -> &[u16] {
        let n = self.vertex_count();
        &self.quantized_vertices[2 * n..]
    }
}

/// Turns height grids into [`MeshArtifact`]s.
#[derive(Clone, Debug)]
pub struct MeshQuantizer {
    pub tiling_scheme: WebMercatorTilingScheme,
    pub use_vertex_normals: bool,
    /// Tiles wider than this many radians become [`MeshArtifact::Empty`].
    pub max_angular_width: Option<f64>,
    indices: GridIndices,
}

impl MeshQuantizer {
    pub fn new(
        tiling_scheme: WebMercatorTilingScheme,
        heightmap_width: u32,
        use_vertex_normals: bool,
        max_angular_width: Option<f64>,
    ) -> Self {
        Self {
            tiling_scheme,
            use_vertex_normals,
            max_angular_width,
            indices: GridIndices::new(heightmap_width),
        }
    }

    #[inline]
    pub fn heightmap_width(&self) -> u32 {
        self.indices.width
    }

    #[inline]
    pub fn indices(&self) -> &GridIndices {
        &self.indices
    }

    /// The geometric error of a `heightmap_width` grid covering a level-zero tile.
    pub fn level_zero_geometric_error(&self) -> f64 {
        self.tiling_scheme.ellipsoid().maximum_radius() * TAU * 0.25
            / (self.heightmap_width() as f64 * self.tiling_scheme.number_of_level_zero_tiles_x() as f64)
    }

    pub fn level_maximum_geometric_error(&self, level: u8) -> f64 {
        self.level_zero_geometric_error() / 2f64.powi(level as i32)
    }

    pub fn quantize(&self, grid: HeightGrid, key: TileKey) -> MeshArtifact {
        let rectangle = self.tiling_scheme.tile_rectangle(key.x, key.y, key.level);
        if let Some(limit) = self.max_angular_width {
            if rectangle.width() > limit {
                return MeshArtifact::Empty;
            }
        }
        if !self.use_vertex_normals {
            return MeshArtifact::Heightmap(grid);
        }
        MeshArtifact::Quantized(self.quantize_mesh(&grid, &rectangle, key.level))
    }

    fn quantize_mesh(&self, grid: &HeightGrid, rectangle: &Rectangle, level: u8) -> QuantizedMesh {
        assert_eq!(grid.width(), self.heightmap_width());
        let n = grid.width() as usize;
        let ellipsoid = self.tiling_scheme.ellipsoid();
        let radius = ellipsoid.maximum_radius();
        let (minimum_height, maximum_height) = grid.height_range();

        let mut quantized_vertices = Vec::with_capacity(3 * n * n);
        let factor = QUANTIZED_MAX as f64 / (n - 1) as f64;
        for _row in 0..n {
            quantized_vertices.extend((0..n).map(|col| (col as f64 * factor) as u16));
        }
        for row in 0..n {
            let v = ((n - 1 - row) as f64 * factor) as u16;
            quantized_vertices.extend(std::iter::repeat(v).take(n));
        }
        let range = maximum_height as f64 - minimum_height as f64;
        quantized_vertices.extend(grid.heights().iter().map(|&h| {
            if range == 0.0 {
                0
            } else {
                ((h as f64 - minimum_height as f64) / range * QUANTIZED_MAX as f64) as u16
            }
        }));

        let center = rectangle.center();
        let scaled_center =
            ellipsoid.transform_position_to_scaled_space(ellipsoid.cartographic_to_cartesian(center));
        let horizon_occlusion_point = DVec3::new(
            scaled_center.x,
            scaled_center.y,
            (1.0 + maximum_height as f64 / radius) / (rectangle.width() * 0.5).cos(),
        );

        let oriented_bounding_box = if rectangle.width() < FRAC_PI_2 + 1e-5 {
            OrientedBoundingBox::from_rectangle(
                rectangle,
                minimum_height as f64,
                maximum_height as f64,
                ellipsoid,
            )
        } else {
            None
        };
        let bounding_sphere = oriented_bounding_box
            .as_ref()
            .map_or(BoundingSphere::new(DVec3::ZERO, radius), BoundingSphere::from_oriented_bounding_box);

        QuantizedMesh {
            minimum_height,
            maximum_height,
            quantized_vertices,
            indices: self.indices.clone(),
            skirt_height: SKIRT_ERROR_FACTOR * self.level_maximum_geometric_error(level),
            bounding_sphere,
            oriented_bounding_box,
            horizon_occlusion_point,
            child_tile_mask: ALL_CHILDREN,
            encoded_normals: encode_vertex_normals(grid, rectangle, radius),
        }
    }
}

/// Estimates a surface normal at every grid vertex from finite differences and oct-encodes it in the earth-fixed frame.
fn encode_vertex_normals(grid: &HeightGrid, rectangle: &Rectangle, radius: f64) -> Vec<u8> {
    let n = grid.width();
    // Samples sit on both edges of the rectangle, so there are n - 1 intervals across it.
    let last = (n - 1) as f64;
    let mut encoded = Vec::with_capacity((2 * n * n) as usize);
    for y in 0..n {
        let t = y as f64 / last;
        let latitude = rectangle.north * (1.0 - t) + rectangle.south * t;
        // Ground distance between neighboring samples.
        let spacing = radius * rectangle.width() / last * latitude.cos();
        for x in 0..n {
            let s = x as f64 / last;
            let longitude = rectangle.west * (1.0 - s) + rectangle.east * s;

            let h = |x, y| grid.get(x, y) as f64;
            let nx = if x == n - 1 {
                h(x - 1, y) - h(x, y)
            } else {
                h(x, y) - h(x + 1, y)
            };
            let ny = if y == n - 1 {
                h(x, y) - h(x, y - 1)
            } else {
                h(x, y + 1) - h(x, y)
            };

            let [east, north, up] = east_north_up(Cartographic::from_radians(longitude, latitude));
            encoded.extend(oct_encode(nx * east + ny * north + spacing * up));
        }
    }
    encoded
}

/// Local tangent frame of the sphere at `c`.
fn east_north_up(c: Cartographic) -> [DVec3; 3] {
    let (sin_lon, cos_lon) = c.longitude.sin_cos();
    let (sin_lat, cos_lat) = c.latitude.sin_cos();
    [
        DVec3::new(-sin_lon, cos_lon, 0.0),
        DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
    ]
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
