use crate::core::static_assertions::const_assert;
use crate::decode::PixelDecoder;
use crate::raster::RasterTile;

use float_ord::FloatOrd;
use itertools::{iproduct, Itertools, MinMaxResult};
use std::ops::{Add, AddAssign};

/// Largest grid side whose vertex indices fit in 16 bits.
pub const MAX_HEIGHTMAP_WIDTH: u32 = 256;

const_assert!(
    (MAX_HEIGHTMAP_WIDTH * MAX_HEIGHTMAP_WIDTH) as usize <= u16::MAX as usize + 1
);

/// A square, row-major grid of elevations in meters. Row 0 is the north edge.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: u32,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// # Panics
    ///
    /// If `width` exceeds [`MAX_HEIGHTMAP_WIDTH`] or `heights` is not `width * width` long.
    pub fn new(width: u32, heights: Vec<f32>) -> Self {
        assert!(width <= MAX_HEIGHTMAP_WIDTH);
        assert_eq!(heights.len(), (width * width) as usize);
        Self { width, heights }
    }

    pub fn flat(width: u32, height: f32) -> Self {
        Self::new(width, vec![height; (width * width) as usize])
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn into_heights(self) -> Vec<f32> {
        self.heights
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.heights[(y * self.width + x) as usize]
    }

    /// `(minimum, maximum)` over all samples.
    pub fn height_range(&self) -> (f32, f32) {
        match self.heights.iter().map(|&h| FloatOrd(h)).minmax() {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(h) => (h.0, h.0),
            MinMaxResult::MinMax(min, max) => (min.0, max.0),
        }
    }
}

impl AddAssign<&HeightGrid> for HeightGrid {
    /// Element-wise sum.
    fn add_assign(&mut self, rhs: &HeightGrid) {
        assert_eq!(self.width, rhs.width);
        for (h, r) in self.heights.iter_mut().zip(&rhs.heights) {
            *h += r;
        }
    }
}

impl Add<&HeightGrid> for HeightGrid {
    type Output = HeightGrid;

    fn add(mut self, rhs: &HeightGrid) -> HeightGrid {
        self += rhs;
        self
    }
}

/// Reduces a composited raster to a `heightmap_width²` grid. Rasters recovered from a coarser ancestor are interpolated,
/// native rasters are decimated.
pub fn resample(raster: &RasterTile, decoder: &PixelDecoder, heightmap_width: u32) -> HeightGrid {
    if raster.resolution_unit > 1 {
        resample_bilinear(raster, decoder, heightmap_width)
    } else {
        decimate(raster, decoder, heightmap_width)
    }
}

/// Takes the nearest source pixel for each output sample.
pub fn decimate(raster: &RasterTile, decoder: &PixelDecoder, heightmap_width: u32) -> HeightGrid {
    let interval = (raster.width() - 1) as f64 / (heightmap_width - 1) as f64;
    let heights = iproduct!(0..heightmap_width, 0..heightmap_width)
        .map(|(y, x)| {
            let src_x = (x as f64 * interval).round() as u32;
            let src_y = (y as f64 * interval).round() as u32;
            decoder.decode(raster.pixel(src_x, src_y))
        })
        .collect();
    HeightGrid::new(heightmap_width, heights)
}

/// Blends the four surrounding block corners for each output sample.
///
/// The raster's blocks are `resolution_unit` pixels wide, so only the pixels at multiples of `resolution_unit` carry
/// distinct samples. The raster is expected to be a composite, one pixel wider than the tile.
pub fn resample_bilinear(
    raster: &RasterTile,
    decoder: &PixelDecoder,
    heightmap_width: u32,
) -> HeightGrid {
    let unit = raster.resolution_unit as f64;
    let tile_width = raster.width() - 1;
    let dst_interval = tile_width as f64 / (heightmap_width - 1) as f64;
    let corner = |x: u32, y: u32| decoder.decode(raster.pixel(x, y)) as f64;

    // Lower corner, upper corner and the fractional position between them.
    let span = |i: u32| {
        let p = i as f64 * dst_interval;
        let lo = ((p / unit).floor() * unit) as u32;
        let hi = (lo + raster.resolution_unit).min(tile_width);
        let t = if hi == lo {
            0.0
        } else {
            (p - lo as f64) / (hi - lo) as f64
        };
        (lo, hi, t)
    };

    let heights = iproduct!(0..heightmap_width, 0..heightmap_width)
        .map(|(y, x)| {
            let (top, bottom, dy) = span(y);
            let (left, right, dx) = span(x);
            let h = (1.0 - dx) * (1.0 - dy) * corner(left, top)
                + dx * (1.0 - dy) * corner(right, top)
                + (1.0 - dx) * dy * corner(left, bottom)
                + dx * dy * corner(right, bottom);
            h as f32
        })
        .collect();
    HeightGrid::new(heightmap_width, heights)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
