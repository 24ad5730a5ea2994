//! Sphere mesh generation (UV sphere)

use std::f32::consts::PI;

use super::MeshData;

/// Generate a UV sphere mesh
///
/// # Arguments
/// * `radius` - Sphere radius
pub fn generate_sphere_mesh(radius: f32) -> MeshData {
    use crate::constants::{SPHERE_LAT_SEGMENTS, SPHERE_LON_SEGMENTS};
    generate_sphere_mesh_with_segments(radius, SPHERE_LAT_SEGMENTS, SPHERE_LON_SEGMENTS)
}

/// Generate a UV sphere mesh with custom resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `lat_segments` - Number of latitude bands (default: 16)
/// * `lon_segments` - Number of longitude segments (default: 32)
pub fn generate_sphere_mesh_with_segments(
    radius: f32,
    lat_segments: u32,
    lon_segments: u32,
) -> MeshData {
    let lat_segments = lat_segments.max(2);
    let lon_segments = lon_segments.max(3);
    let mut mesh = MeshData::default();

    // Poles on the Y axis
    for lat in 0..=lat_segments {
        let v = lat as f32 / lat_segments as f32;
        let theta = v * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for lon in 0..=lon_segments {
            let u = lon as f32 / lon_segments as f32;
            let phi = u * 2.0 * PI;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = [sin_theta * cos_phi, cos_theta, -sin_theta * sin_phi];
            mesh.push_vertex(
                [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                [u, v],
            );
        }
    }

    let row = lon_segments + 1;
    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let first = lat * row + lon;
            let second = first + row;

            mesh.indices
                .extend_from_slice(&[first, second, first + 1, second, second + 1, first + 1]);
        }
    }

    mesh
}
