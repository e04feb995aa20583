use crate::ellipsoid::{Cartographic, Ellipsoid};
use crate::glam::{DMat3, DVec3};
use crate::rectangle::Rectangle;

use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The sphere that contains every corner of `obb`.
    pub fn from_oriented_bounding_box(obb: &OrientedBoundingBox) -> Self {
        let u = obb.half_axes.x_axis + obb.half_axes.y_axis + obb.half_axes.z_axis;
        Self::new(obb.center, u.length())
    }

    pub fn contains_point(&self, p: DVec3) -> bool {
        self.center.distance(p) <= self.radius
    }
}

/// A box with arbitrary orientation. The columns of `half_axes` point from the center to the centers of three faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: DVec3,
    pub half_axes: DMat3,
}

impl OrientedBoundingBox {
    /// Bounds the region of `ellipsoid` covered by `rectangle` between `minimum_height` and `maximum_height`.
    ///
    /// The box is aligned with the plane tangent to the ellipsoid at the rectangle's center. Returns `None` for rectangles wider
    /// than a hemisphere, which cannot be bounded tightly this way.
    pub fn from_rectangle(
        rectangle: &Rectangle,
        minimum_height: f64,
        maximum_height: f64,
        ellipsoid: &Ellipsoid,
    ) -> Option<Self> {
        if rectangle.width() > PI {
            return None;
        }

        let center_cartographic = rectangle.center();
        let tangent_point = ellipsoid.cartographic_to_cartesian(center_cartographic);
        let plane = TangentPlane::new(tangent_point, ellipsoid);

        // If the rectangle spans the equator, the west edge sticks out farthest at the equator.
        let lon_center = center_cartographic.longitude;
        let lat_center = if rectangle.south < 0.0 && rectangle.north > 0.0 {
            0.0
        } else {
            center_cartographic.latitude
        };

        let at_max = |lon, lat| {
            plane.project(ellipsoid.cartographic_to_cartesian(Cartographic::new(
                lon,
                lat,
                maximum_height,
            )))
        };
        let nc = at_max(lon_center, rectangle.north);
        let nw = at_max(rectangle.west, rectangle.north);
        let cw = at_max(rectangle.west, lat_center);
        let sw = at_max(rectangle.west, rectangle.south);
        let sc = at_max(lon_center, rectangle.south);

        let min_x = nw[0].min(cw[0]).min(sw[0]);
        // Symmetric about the central meridian.
        let max_x = -min_x;
        let max_y = nw[1].max(nc[1]);
        let min_y = sw[1].min(sc[1]);

        // The rectangle at minimum height reaches deeper below the tangent plane.
        let at_min = |lat| {
            plane.distance(ellipsoid.cartographic_to_cartesian(Cartographic::new(
                rectangle.west,
                lat,
                minimum_height,
            )))
        };
        let min_z = at_min(rectangle.north).min(at_min(rectangle.south));
        // The plane touches the surface at height zero.
        let max_z = maximum_height;

        Some(Self::from_plane_extents(
            &plane,
            [min_x, max_x],
            [min_y, max_y],
            [min_z, max_z],
        ))
    }

    fn from_plane_extents(plane: &TangentPlane, x: [f64; 2], y: [f64; 2], z: [f64; 2]) -> Self {
        let axes = DMat3::from_cols(plane.x_axis, plane.y_axis, plane.z_axis);
        let center_offset = DVec3::new(
            (x[0] + x[1]) * 0.5,
            (y[0] + y[1]) * 0.5,
            (z[0] + z[1]) * 0.5,
        );
        let scale = DVec3::new(
            (x[1] - x[0]) * 0.5,
            (y[1] - y[0]) * 0.5,
            (z[1] - z[0]) * 0.5,
        );
        Self {
            center: plane.origin + axes * center_offset,
            half_axes: axes * DMat3::from_diagonal(scale),
        }
    }

    pub fn contains_point(&self, p: DVec3) -> bool {
        let offset = p - self.center;
        [
            self.half_axes.x_axis,
            self.half_axes.y_axis,
            self.half_axes.z_axis,
        ]
        .iter()
        .all(|axis| {
            let len_sq = axis.length_squared();
            len_sq == 0.0 || offset.dot(*axis).abs() <= len_sq * (1.0 + 1e-9)
        })
    }
}

/// The plane tangent to an ellipsoid at `origin`, with an east/north/up basis.
struct TangentPlane {
    origin: DVec3,
    x_axis: DVec3,
    y_axis: DVec3,
    z_axis: DVec3,
}

impl TangentPlane {
    fn new(origin: DVec3, ellipsoid: &Ellipsoid) -> Self {
        let [east, north, up] = ellipsoid.east_north_up(origin);
        Self {
            origin,
            x_axis: east,
            y_axis: north,
            z_axis: up,
        }
    }

    /// Orthogonal projection of `p` into plane coordinates.
    fn project(&self, p: DVec3) -> [f64; 2] {
        let v = p - self.origin;
        [self.x_axis.dot(v), self.y_axis.dot(v)]
    }

    /// Signed distance of `p` above the plane.
    fn distance(&self, p: DVec3) -> f64 {
        self.z_axis.dot(p - self.origin)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
