//! Lathe mesh generation (surface of revolution around Y)

use std::f32::consts::PI;

use glam::Vec2;

use super::MeshData;

/// Revolve a `[radius, y]` profile around the Y axis
pub fn generate_lathe_mesh(profile: &[[f32; 2]]) -> MeshData {
    use crate::constants::LATHE_SEGMENTS;
    generate_lathe_mesh_with_segments(profile, LATHE_SEGMENTS)
}

/// Revolve a profile with a custom number of radial segments.
///
/// Each profile edge gets its own ring pair so creases in the profile
/// (platform bevels, rims) stay sharp. Texture `v` follows arc length
/// along the profile.
pub fn generate_lathe_mesh_with_segments(profile: &[[f32; 2]], segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut mesh = MeshData::default();
    if profile.len() < 2 {
        return mesh;
    }

    let total_length: f32 = profile
        .windows(2)
        .map(|w| Vec2::from(w[0]).distance(Vec2::from(w[1])))
        .sum();
    let total_length = total_length.max(f32::EPSILON);

    let mut travelled = 0.0;
    for edge in profile.windows(2) {
        let (a, b) = (Vec2::from(edge[0]), Vec2::from(edge[1]));
        let length = a.distance(b);
        if length <= f32::EPSILON {
            continue;
        }

        // Outward normal of the edge in the (radius, y) plane
        let dir = (b - a) / length;
        let profile_normal = Vec2::new(dir.y, -dir.x);

        let v0 = travelled / total_length;
        let v1 = (travelled + length) / total_length;
        travelled += length;

        let ring_start = mesh.positions.len() as u32;
        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let (sin, cos) = (u * 2.0 * PI).sin_cos();
            let normal = [profile_normal.x * cos, profile_normal.y, -profile_normal.x * sin];

            mesh.push_vertex([a.x * cos, a.y, -a.x * sin], normal, [u, v0]);
            mesh.push_vertex([b.x * cos, b.y, -b.x * sin], normal, [u, v1]);
        }

        for i in 0..segments {
            let base = ring_start + i * 2;
            mesh.indices
                .extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
        }
    }

    mesh
}
