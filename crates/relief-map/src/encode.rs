//! Binary serialization of finished tiles.
//!
//! Quantized meshes use the little-endian "quantized-mesh-1.0" layout understood by streaming terrain renderers. Heightmaps are
//! written as a bare little-endian `f32` grid.

use crate::quantize::QuantizedMesh;
use crate::sampling::HeightGrid;

use crate::core::glam::DVec3;

/// Extension carrying two oct-encoded bytes per vertex.
pub const OCT_VERTEX_NORMALS_EXTENSION: u8 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 88;

pub fn encode_quantized_mesh(mesh: &QuantizedMesh) -> Vec<u8> {
    let n = mesh.vertex_count();
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + 6 * n + 4 + 2 * mesh.indices.triangles.len() + 2 * n + 32);

    // Header.
    let sphere = &mesh.bounding_sphere;
    put_dvec3(&mut out, sphere.center);
    out.extend_from_slice(&mesh.minimum_height.to_le_bytes());
    out.extend_from_slice(&mesh.maximum_height.to_le_bytes());
    put_dvec3(&mut out, sphere.center);
    out.extend_from_slice(&sphere.radius.to_le_bytes());
    put_dvec3(&mut out, mesh.horizon_occlusion_point);

    // Vertices.
    out.extend_from_slice(&(n as u32).to_le_bytes());
    for values in [mesh.u(), mesh.v(), mesh.heights()] {
        let mut prev = 0i32;
        for &value in values {
            let value = value as i32;
            put_u16(&mut out, zigzag(value - prev));
            prev = value;
        }
    }

    // Triangles.
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&(mesh.indices.triangle_count() as u32).to_le_bytes());
    // High-water mark encoding. Codes wrap, as in the decoder's 16-bit arithmetic.
    let mut highest = 0u16;
    for &index in mesh.indices.triangles.iter() {
        let code = highest.wrapping_sub(index);
        put_u16(&mut out, code);
        if code == 0 {
            highest = highest.wrapping_add(1);
        }
    }

    // Edges.
    for edge in [&mesh.indices.west, &mesh.indices.south, &mesh.indices.east, &mesh.indices.north] {
        out.extend_from_slice(&(edge.len() as u32).to_le_bytes());
        for &index in edge.iter() {
            put_u16(&mut out, index);
        }
    }

    // Extensions.
    if !mesh.encoded_normals.is_empty() {
        out.push(OCT_VERTEX_NORMALS_EXTENSION);
        out.extend_from_slice(&(mesh.encoded_normals.len() as u32).to_le_bytes());
        out.extend_from_slice(&mesh.encoded_normals);
    }

    out
}

pub fn encode_heightmap(grid: &HeightGrid) -> Vec<u8> {
    grid.heights().iter().flat_map(|h| h.to_le_bytes()).collect()
}

#[inline]
fn zigzag(value: i32) -> u16 {
    ((value << 1) ^ (value >> 31)) as u16
}

#[inline]
fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_dvec3(out: &mut Vec<u8>, v: DVec3) {
    for c in v.to_array() {
        out.extend_from_slice(&c.to_le_bytes());
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
