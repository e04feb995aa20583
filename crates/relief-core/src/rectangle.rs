use crate::ellipsoid::{Cartographic, Ellipsoid};

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// A geographic rectangle in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rectangle {
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Angular width, accounting for rectangles that cross the antimeridian.
    pub fn width(&self) -> f64 {
        let mut east = self.east;
        if east < self.west {
            east += TAU;
        }
        east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> Cartographic {
        let mut east = self.east;
        if east < self.west {
            east += TAU;
        }
        Cartographic::from_radians(
            negative_pi_to_pi((self.west + east) * 0.5),
            (self.south + self.north) * 0.5,
        )
    }
}

fn negative_pi_to_pi(angle: f64) -> f64 {
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU);
    if wrapped == 0.0 && angle > 0.0 {
        PI
    } else {
        wrapped - PI
    }
}

/// The spherical Mercator tiling used by slippy-map style tile services: a single root tile covering the projected square
/// `[-πR, πR]²`, with `2^level` columns and rows at each level and `y` increasing toward the south.
#[derive(Clone, Copy, Debug)]
pub struct WebMercatorTilingScheme {
    ellipsoid: Ellipsoid,
    semimajor_axis: f64,
}

impl WebMercatorTilingScheme {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            semimajor_axis: ellipsoid.maximum_radius(),
        }
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn number_of_level_zero_tiles_x(&self) -> u32 {
        1
    }

    /// Saturates at `u64::MAX` for levels past 63.
    pub fn number_of_x_tiles_at_level(&self, level: u8) -> u64 {
        (self.number_of_level_zero_tiles_x() as u64)
            .checked_shl(u32::from(level))
            .unwrap_or(u64::MAX)
    }

    /// Saturates at `u64::MAX` for levels past 63.
    pub fn number_of_y_tiles_at_level(&self, level: u8) -> u64 {
        1u64.checked_shl(u32::from(level)).unwrap_or(u64::MAX)
    }

    /// The geographic rectangle covered by tile `(x, y)` at `level`.
    pub fn tile_rectangle(&self, x: u32, y: u32, level: u8) -> Rectangle {
        let extent = PI * self.semimajor_axis;
        let tile_width = 2.0 * extent / self.number_of_x_tiles_at_level(level) as f64;
        let tile_height = 2.0 * extent / self.number_of_y_tiles_at_level(level) as f64;

        let west = -extent + x as f64 * tile_width;
        let east = -extent + (x as f64 + 1.0) * tile_width;
        let north = extent - y as f64 * tile_height;
        let south = extent - (y as f64 + 1.0) * tile_height;

        Rectangle::new(
            self.meters_to_longitude(west),
            self.meters_to_latitude(south),
            self.meters_to_longitude(east),
            self.meters_to_latitude(north),
        )
    }

    fn meters_to_longitude(&self, x: f64) -> f64 {
        x / self.semimajor_axis
    }

    fn meters_to_latitude(&self, y: f64) -> f64 {
        FRAC_PI_2 - 2.0 * (-y / self.semimajor_axis).exp().atan()
    }
}

impl Default for WebMercatorTilingScheme {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
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

    use approx::assert_relative_eq;

    // Latitude limit of the spherical Mercator projection.
    const MAX_LAT: f64 = 1.4844222297453324;

    #[test]
    fn root_tile_covers_whole_mercator_world() {
        let r = WebMercatorTilingScheme::default().tile_rectangle(0, 0, 0);
        assert_relative_eq!(r.west, -PI, epsilon = 1e-12);
        assert_relative_eq!(r.east, PI, epsilon = 1e-12);
        assert_relative_eq!(r.north, MAX_LAT, epsilon = 1e-12);
        assert_relative_eq!(r.south, -MAX_LAT, epsilon = 1e-12);
        assert_relative_eq!(r.width(), TAU, epsilon = 1e-12);
    }

    #[test]
    fn level_one_quadrants() {
        let scheme = WebMercatorTilingScheme::default();
        let nw = scheme.tile_rectangle(0, 0, 1);
        assert_relative_eq!(nw.west, -PI, epsilon = 1e-12);
        assert_relative_eq!(nw.east, 0.0, epsilon = 1e-12);
        assert_relative_eq!(nw.south, 0.0, epsilon = 1e-15);

        let se = scheme.tile_rectangle(1, 1, 1);
        assert_relative_eq!(se.west, 0.0, epsilon = 1e-12);
        assert_relative_eq!(se.north, 0.0, epsilon = 1e-15);
        assert_relative_eq!(se.south, -MAX_LAT, epsilon = 1e-12);
    }

    #[test]
    fn tile_counts_saturate_at_deep_levels() {
        let scheme = WebMercatorTilingScheme::default();
        assert_eq!(scheme.number_of_x_tiles_at_level(32), 1 << 32);
        assert_eq!(scheme.number_of_x_tiles_at_level(64), u64::MAX);
        assert_eq!(scheme.number_of_y_tiles_at_level(u8::MAX), u64::MAX);
    }

    #[test]
    fn center_of_antimeridian_rectangle_wraps() {
        let r = Rectangle::new(3.0, -0.1, -3.0, 0.1);
        assert_relative_eq!(r.width(), TAU - 6.0, epsilon = 1e-12);
        assert_relative_eq!(r.center().longitude.abs(), PI, epsilon = 1e-12);
    }
}
