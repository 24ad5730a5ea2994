//! Built-in procedural part set
//!
//! Used for any library part missing from the loaded bundles, so a straw can
//! always be assembled. Dimensions are in meters: a 12 mm straw split into
//! bottom, flex and top sections.

use std::f32::consts::PI;

use glam::Vec3;

use super::{PartKind, PartMesh};
use crate::constants::{LATHE_SEGMENTS, LONG_FLEX_DROP, LONG_FLEX_SCALE};
use crate::primitive::{MeshData, generate_lathe_mesh};

const RADIUS: f32 = 0.006;
const WALL: f32 = 0.0005;
const BOTTOM_HEIGHT: f32 = 0.16;
const FLEX_HEIGHT: f32 = 0.035;
const TOP_HEIGHT: f32 = 0.06;
const LONG_FLEX_HEIGHT: f32 = 0.12;
const FLEX_RIBS: f32 = 7.0;
const RIB_DEPTH: f32 = 0.12;
const SCOOP_BOWL_LENGTH: f32 = 0.03;
const SCOOP_BOWL_RADIUS: f32 = 2.4 * RADIUS;

/// Generate the built-in mesh for a library part
pub fn builtin_part(kind: PartKind) -> Option<PartMesh> {
    let name = kind.asset_name()?;
    let mesh = match kind {
        PartKind::StrawBottom => tube(0.0, BOTTOM_HEIGHT, RADIUS, 1, |_| 1.0),
        PartKind::StrawFlex => tube(0.0, FLEX_HEIGHT, RADIUS, 48, corrugation),
        PartKind::StrawTop => tube(0.0, TOP_HEIGHT, RADIUS, 1, |_| 1.0),
        PartKind::StrawTopBevel => bevel_tube(FLEX_HEIGHT + TOP_HEIGHT, RADIUS),
        PartKind::StrawLongFlex => long_flex(),
        PartKind::ScoopShell => scoop_shell(),
        PartKind::WrapPaper => generate_lathe_mesh(&[
            [0.0, 0.0],
            [0.42, 0.0],
            [0.5, 0.03],
            [0.5, 0.97],
            [0.42, 1.0],
            [0.0, 1.0],
        ]),
        PartKind::WrapFilm => generate_lathe_mesh(&[
            [0.0, 0.0],
            [0.5, 0.015],
            [0.5, 0.985],
            [0.0, 1.0],
        ]),
        PartKind::FlexKnee | PartKind::StraightFiller => return None,
    };
    Some(PartMesh::new(name, mesh))
}

/// Radius factor of the accordion section, `t` in [0, 1]
fn corrugation(t: f32) -> f32 {
    1.0 + RIB_DEPTH * (t * PI * FLEX_RIBS).sin().abs()
}

/// Hollow tube from `y0` to `y0 + height` with a radius profile
fn tube(y0: f32, height: f32, radius: f32, samples: u32, profile: impl Fn(f32) -> f32) -> MeshData {
    let samples = samples.max(1);
    let mut points = Vec::with_capacity(2 * samples as usize + 3);

    // Outer wall up, rim, inner wall down, closing ring at the bottom
    for i in 0..=samples {
        let t = i as f32 / samples as f32;
        points.push([radius * profile(t), y0 + t * height]);
    }
    for i in (0..=samples).rev() {
        let t = i as f32 / samples as f32;
        points.push([radius * profile(t) - WALL, y0 + t * height]);
    }
    points.push(points[0]);

    generate_lathe_mesh(&points)
}

/// Straight neck ending in a 45 degree cut. The lowest point of the cut sits
/// at `neck` above the base.
fn bevel_tube(neck: f32, radius: f32) -> MeshData {
    let segments = LATHE_SEGMENTS;
    let inner = radius - WALL;
    // Cut plane: y = neck + radius + x
    let cut = |x: f32| neck + radius + x;
    let plane_normal = Vec3::new(-1.0, 1.0, 0.0).normalize().to_array();

    let mut mesh = MeshData::default();
    let ring = |i: u32| {
        let u = i as f32 / segments as f32;
        let (sin, cos) = (u * 2.0 * PI).sin_cos();
        (u, cos, -sin)
    };

    // Outer and inner walls
    for (r, outward) in [(radius, 1.0), (inner, -1.0)] {
        let start = mesh.positions.len() as u32;
        for i in 0..=segments {
            let (u, x, z) = ring(i);
            let normal = [x * outward, 0.0, z * outward];
            mesh.push_vertex([r * x, 0.0, r * z], normal, [u, 1.0]);
            mesh.push_vertex([r * x, cut(r * x), r * z], normal, [u, 0.0]);
        }
        push_strip(&mut mesh, start, segments);
    }

    // Annulus on the cut plane, then the flat base ring
    for (normal, on_plane) in [(plane_normal, true), ([0.0, -1.0, 0.0], false)] {
        let start = mesh.positions.len() as u32;
        for i in 0..=segments {
            let (u, x, z) = ring(i);
            let y = |r: f32| if on_plane { cut(r * x) } else { 0.0 };
            mesh.push_vertex([radius * x, y(radius), radius * z], normal, [u, 0.0]);
            mesh.push_vertex([inner * x, y(inner), inner * z], normal, [u, 1.0]);
        }
        push_strip(&mut mesh, start, segments);
    }

    mesh
}

fn push_strip(mesh: &mut MeshData, start: u32, segments: u32) {
    for i in 0..segments {
        let base = start + i * 2;
        mesh.indices
            .extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
    }
}

/// Accordion section plus its own mouthpiece, placed so that after the drop
/// and scale applied by the assembler it starts at the joint
fn long_flex() -> MeshData {
    let y0 = LONG_FLEX_DROP / LONG_FLEX_SCALE;
    let radius = RADIUS / LONG_FLEX_SCALE;
    let flex_share = 0.4;
    tube(y0, LONG_FLEX_HEIGHT, radius, 96, |t| {
        if t <= flex_share {
            corrugation(t / flex_share)
        } else {
            1.0
        }
    })
}

/// Full-length straight body whose upper end widens into a flattened spoon.
/// The assembler flips it so the spoon ends up at the bottom.
fn scoop_shell() -> MeshData {
    let body = BOTTOM_HEIGHT + FLEX_HEIGHT + TOP_HEIGHT - SCOOP_BOWL_LENGTH;
    let total = body + SCOOP_BOWL_LENGTH;
    let samples = 24;

    let bowl_radius = |t: f32| RADIUS + (SCOOP_BOWL_RADIUS - RADIUS) * (t * PI / 2.0).sin();
    let mut points = vec![[RADIUS, 0.0], [RADIUS, body]];
    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        points.push([bowl_radius(t), body + t * SCOOP_BOWL_LENGTH]);
    }
    for i in (1..=samples).rev() {
        let t = i as f32 / samples as f32;
        points.push([bowl_radius(t) - WALL, body + t * SCOOP_BOWL_LENGTH]);
    }
    points.push([RADIUS - WALL, body]);
    points.push([RADIUS - WALL, 0.0]);
    points.push([RADIUS, 0.0]);

    let mut mesh = generate_lathe_mesh(&points);

    // Flatten the bowl along Z into a spoon
    for (position, normal) in mesh.positions.iter_mut().zip(mesh.normals.iter_mut()) {
        if position[1] <= body {
            continue;
        }
        let t = ((position[1] - body) / SCOOP_BOWL_LENGTH).clamp(0.0, 1.0);
        let squash = 1.0 - 0.65 * t;
        position[2] *= squash;
        *normal = Vec3::new(normal[0], normal[1], normal[2] / squash)
            .normalize_or_zero()
            .to_array();
    }

    debug_assert!(mesh.bounds().is_some_and(|(_, max)| (max[1] - total).abs() < 1e-4));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_library_part_has_builtin() {
        for kind in PartKind::library_parts() {
            let part = builtin_part(*kind).unwrap();
            assert!(!part.mesh.is_empty(), "{:?}", kind);
            assert_eq!(part.mesh.positions.len(), part.mesh.normals.len());
            assert_eq!(part.mesh.positions.len(), part.mesh.uvs.len());
        }
        assert!(builtin_part(PartKind::FlexKnee).is_none());
    }

    #[test]
    fn test_straight_sections_share_radius() {
        for kind in [PartKind::StrawBottom, PartKind::StrawTop] {
            let m = builtin_part(kind).unwrap().measure();
            assert!((m.radius() - RADIUS).abs() < 1e-5, "{:?}", kind);
            assert!(m.min_y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_bevel_top_spans_neck_and_cut() {
        let m = builtin_part(PartKind::StrawTopBevel).unwrap().measure();
        let neck = FLEX_HEIGHT + TOP_HEIGHT;
        assert!((m.height - (neck + 2.0 * RADIUS)).abs() < 1e-4);
    }

    #[test]
    fn test_long_flex_lands_on_joint() {
        let m = builtin_part(PartKind::StrawLongFlex).unwrap().measure();
        let world_min = -LONG_FLEX_DROP + LONG_FLEX_SCALE * m.min_y;
        assert!(world_min.abs() < 1e-4);
    }

    #[test]
    fn test_scoop_bowl_is_flattened() {
        let part = builtin_part(PartKind::ScoopShell).unwrap();
        let width = part.bbox_max[0] - part.bbox_min[0];
        let depth = part.bbox_max[2] - part.bbox_min[2];
        assert!(depth < width);
    }
}
