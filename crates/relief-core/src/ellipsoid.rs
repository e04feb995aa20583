use crate::glam::DVec3;

use serde::{Deserialize, Serialize};

/// A geodetic position in radians, with height in meters above the ellipsoid surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    pub const fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    pub const fn from_radians(longitude: f64, latitude: f64) -> Self {
        Self::new(longitude, latitude, 0.0)
    }

    pub fn with_height(self, height: f64) -> Self {
        Self { height, ..self }
    }
}

/// An ellipsoid of revolution centered at the origin of an earth-fixed frame.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Ellipsoid {
    radii: DVec3,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl From<[f64; 3]> for Ellipsoid {
    fn from(radii: [f64; 3]) -> Self {
        Self::new(DVec3::from(radii))
    }
}

impl From<Ellipsoid> for [f64; 3] {
    fn from(e: Ellipsoid) -> Self {
        e.radii.to_array()
    }
}

impl Ellipsoid {
    pub const WGS84: Self = Self {
        radii: DVec3::new(6378137.0, 6378137.0, 6356752.314245179),
    };

    pub const fn new(radii: DVec3) -> Self {
        Self { radii }
    }

    #[inline]
    pub fn radii(&self) -> DVec3 {
        self.radii
    }

    #[inline]
    pub fn maximum_radius(&self) -> f64 {
        self.radii.max_element()
    }

    /// The outward unit normal of the surface at the given geodetic coordinates.
    pub fn geodetic_surface_normal_cartographic(&self, c: Cartographic) -> DVec3 {
        let cos_lat = c.latitude.cos();
        DVec3::new(
            cos_lat * c.longitude.cos(),
            cos_lat * c.longitude.sin(),
            c.latitude.sin(),
        )
        .normalize()
    }

    /// The outward unit normal of the surface passing through `p`.
    pub fn geodetic_surface_normal(&self, p: DVec3) -> DVec3 {
        (p / (self.radii * self.radii)).normalize()
    }

    pub fn cartographic_to_cartesian(&self, c: Cartographic) -> DVec3 {
        let n = self.geodetic_surface_normal_cartographic(c);
        let k = self.radii * self.radii * n;
        let gamma = n.dot(k).sqrt();
        k / gamma + n * c.height
    }

    /// Maps `p` into the space where this ellipsoid is the unit sphere.
    #[inline]
    pub fn transform_position_to_scaled_space(&self, p: DVec3) -> DVec3 {
        p / self.radii
    }

    /// The east/north/up frame tangent to the surface at `origin`, as unit column vectors.
    pub fn east_north_up(&self, origin: DVec3) -> [DVec3; 3] {
        let up = self.geodetic_surface_normal(origin);
        let east = DVec3::new(-origin.y, origin.x, 0.0);
        let east = if east.length_squared() < 1e-24 {
            // At the poles every horizontal direction is "east"; pick one consistently.
            DVec3::new(0.0, origin.z.signum(), 0.0)
        } else {
            east.normalize()
        };
        let north = up.cross(east);
        [east, north, up]
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
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn equator_prime_meridian_is_on_x_axis() {
        let p = Ellipsoid::WGS84.cartographic_to_cartesian(Cartographic::from_radians(0.0, 0.0));
        assert_relative_eq!(p.x, 6378137.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn north_pole_uses_polar_radius() {
        let p = Ellipsoid::WGS84
            .cartographic_to_cartesian(Cartographic::new(0.0, FRAC_PI_2, 100.0));
        assert_relative_eq!(p.z, 6356752.314245179 + 100.0, epsilon = 1e-6);
    }

    #[test]
    fn scaled_space_puts_surface_on_unit_sphere() {
        let e = Ellipsoid::WGS84;
        let p = e.cartographic_to_cartesian(Cartographic::from_radians(0.3, -0.7));
        assert_relative_eq!(e.transform_position_to_scaled_space(p).length(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn east_north_up_is_orthonormal() {
        let e = Ellipsoid::WGS84;
        let origin = e.cartographic_to_cartesian(Cartographic::from_radians(2.1, 0.4));
        let [east, north, up] = e.east_north_up(origin);
        assert_relative_eq!(east.dot(north), 0.0, epsilon = 1e-12);
        assert_relative_eq!(north.dot(up), 0.0, epsilon = 1e-12);
        assert_relative_eq!(east.cross(north).dot(up), 1.0, epsilon = 1e-12);
        assert!(north.z > 0.0);
    }

    #[test]
    fn ellipsoid_round_trips_through_radii_array() {
        let radii: [f64; 3] = Ellipsoid::WGS84.into();
        assert_eq!(Ellipsoid::from(radii), Ellipsoid::WGS84);
    }
}
