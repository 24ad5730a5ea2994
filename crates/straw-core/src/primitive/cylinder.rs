//! Cylinder mesh generation (with end caps)

use std::f32::consts::PI;

use super::MeshData;

/// Generate a cylinder mesh along the Y axis, centered on the origin
///
/// # Arguments
/// * `radius` - Cylinder radius
/// * `height` - Cylinder height (along Y)
pub fn generate_cylinder_mesh(radius: f32, height: f32) -> MeshData {
    use crate::constants::CYLINDER_SEGMENTS;
    generate_cylinder_mesh_with_segments(radius, height, CYLINDER_SEGMENTS)
}

/// Generate a cylinder mesh with custom segment count
pub fn generate_cylinder_mesh_with_segments(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half_height = height / 2.0;
    let mut mesh = MeshData::default();

    // Side vertices, seam duplicated so u wraps cleanly
    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let theta = u * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        let normal = [cos, 0.0, -sin];

        mesh.push_vertex([radius * cos, -half_height, -radius * sin], normal, [u, 1.0]);
        mesh.push_vertex([radius * cos, half_height, -radius * sin], normal, [u, 0.0]);
    }

    for i in 0..segments {
        let base = i * 2;
        mesh.indices
            .extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
    }

    push_cap(&mut mesh, radius, half_height, segments, true);
    push_cap(&mut mesh, radius, -half_height, segments, false);

    mesh
}

fn push_cap(mesh: &mut MeshData, radius: f32, y: f32, segments: u32, top: bool) {
    let normal = if top { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = mesh.push_vertex([0.0, y, 0.0], normal, [0.5, 0.5]);

    let rim_start = mesh.positions.len() as u32;
    for i in 0..=segments {
        let theta = (i as f32 / segments as f32) * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            [radius * cos, y, -radius * sin],
            normal,
            [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
        );
    }

    for i in 0..segments {
        if top {
            mesh.indices
                .extend_from_slice(&[center, rim_start + i, rim_start + i + 1]);
        } else {
            // Reversed winding
            mesh.indices
                .extend_from_slice(&[center, rim_start + i + 1, rim_start + i]);
        }
    }
}
