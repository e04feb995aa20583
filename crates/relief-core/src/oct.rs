//! Octahedral encoding of unit vectors into two bytes.

use crate::glam::{DVec2, DVec3};

/// Projects the unit vector `v` onto the octahedron, unfolds it into the unit square, and quantizes each coordinate to a byte.
///
/// Quantization truncates rather than rounds.
pub fn oct_encode(v: DVec3) -> [u8; 2] {
    let l1 = v.x.abs() + v.y.abs() + v.z.abs();
    let mut p = DVec2::new(v.x / l1, v.y / l1);
    if v.z <= 0.0 {
        p = DVec2::new(
            (1.0 - p.y.abs()) * sign_not_zero(p.x),
            (1.0 - p.x.abs()) * sign_not_zero(p.y),
        );
    }
    [to_byte(p.x), to_byte(p.y)]
}

/// Inverse of [`oct_encode`], up to quantization error.
pub fn oct_decode(bytes: [u8; 2]) -> DVec3 {
    let x = bytes[0] as f64 / 255.0 * 2.0 - 1.0;
    let y = bytes[1] as f64 / 255.0 * 2.0 - 1.0;
    let z = 1.0 - (x.abs() + y.abs());
    let (x, y) = if z < 0.0 {
        (
            (1.0 - y.abs()) * sign_not_zero(x),
            (1.0 - x.abs()) * sign_not_zero(y),
        )
    } else {
        (x, y)
    };
    DVec3::new(x, y, z).normalize()
}

fn sign_not_zero(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn to_byte(x: f64) -> u8 {
    ((x + 1.0) * 127.5).clamp(0.0, 255.0) as u8
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
