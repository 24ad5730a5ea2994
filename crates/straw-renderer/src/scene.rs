//! Scene placement and draw list
//!
//! The assembled straw lives in model space (meters, base at the origin).
//! Placement lifts it into the viewport scene next to the ground platform.

use glam::{EulerRot, Mat4, Quat, Vec3};

use straw_core::{
    MeshData, MeshKey, MeshSource, PartLibrary, SceneSubgraph, generate_cylinder_mesh,
    generate_lathe_mesh, generate_sphere_mesh,
};

use crate::config::SceneConfig;

/// Where the model and the ground sit in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePlacement {
    /// Vertical offset of the model group.
    pub group_offset_y: f32,
    /// Vertical offset of the model in its group.
    pub model_offset_y: f32,
    /// Uniform model scale.
    pub model_scale: f32,
    /// Model rotation.
    pub model_rotation: Quat,
    /// Ground platform center height.
    pub ground_y: f32,
    /// Height of the contact shadow, just above the platform top.
    pub shadow_y: f32,
}

impl ScenePlacement {
    /// Build from configuration
    pub fn from_config(config: &SceneConfig) -> Self {
        let [x, y, z] = config.model_rotation;
        Self {
            group_offset_y: config.group_offset_y,
            model_offset_y: config.model_offset_y,
            model_scale: config.model_scale,
            model_rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
            ground_y: config.ground_y,
            shadow_y: config.ground_y + config.ground_height / 2.0 + SHADOW_LIFT,
        }
    }

    /// Model-to-world transform with the float offset applied to the group
    pub fn model_matrix(&self, float_offset: f32) -> Mat4 {
        let group = Mat4::from_translation(Vec3::Y * (self.group_offset_y + float_offset));
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.model_scale),
            self.model_rotation,
            Vec3::Y * self.model_offset_y,
        );
        group * model
    }

    /// Ground platform transform
    pub fn ground_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::Y * self.ground_y)
    }

    /// Contact shadow transform, shrinking as the model floats up
    pub fn shadow_matrix(&self, float_offset: f32) -> Mat4 {
        let scale = (1.0 - float_offset * SHADOW_FLOAT_FALLOFF).clamp(0.5, 1.5);
        Mat4::from_scale_rotation_translation(
            Vec3::new(scale, 1.0, scale),
            Quat::IDENTITY,
            Vec3::Y * self.shadow_y,
        )
    }
}

/// Gap between the platform top and the shadow disc
const SHADOW_LIFT: f32 = 0.005;

/// Shadow shrink per unit of float offset
const SHADOW_FLOAT_FALLOFF: f32 = 0.5;

/// Ground platform: a cylinder with a beveled top edge
pub fn ground_mesh(radius: f32, height: f32, bevel: f32) -> MeshData {
    let half = height / 2.0;
    let bevel = bevel.clamp(0.0, radius.min(height) * 0.5);
    generate_lathe_mesh(&[
        [0.0, -half],
        [radius, -half],
        [radius, half - bevel],
        [radius - bevel, half],
        [0.0, half],
    ])
}

/// Flat disc facing up, with UVs spanning the disc's bounding square
pub fn shadow_mesh(radius: f32) -> MeshData {
    const SEGMENTS: u32 = 48;
    if radius <= 0.0 {
        return MeshData::default();
    }
    let mut mesh = MeshData {
        positions: vec![[0.0, 0.0, 0.0]],
        normals: vec![[0.0, 1.0, 0.0]],
        uvs: vec![[0.5, 0.5]],
        indices: Vec::new(),
    };
    for i in 0..SEGMENTS {
        let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        mesh.positions.push([cos * radius, 0.0, sin * radius]);
        mesh.normals.push([0.0, 1.0, 0.0]);
        mesh.uvs.push([0.5 + cos * 0.5, 0.5 + sin * 0.5]);
        let next = (i + 1) % SEGMENTS;
        mesh.indices.extend_from_slice(&[0, next + 1, i + 1]);
    }
    mesh
}

/// CPU mesh for a node's mesh source, `None` when the library part is missing
pub fn mesh_for_source(source: &MeshSource, library: &PartLibrary) -> Option<MeshData> {
    match *source {
        MeshSource::Library(kind) => library.get(kind).map(|part| part.mesh.clone()),
        MeshSource::Cylinder { radius, height } => Some(generate_cylinder_mesh(radius, height)),
        MeshSource::Sphere { radius } => Some(generate_sphere_mesh(radius)),
    }
}

/// One draw of the straw model
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Mesh cache key.
    pub mesh: MeshKey,
    /// Model-space transform.
    pub transform: Mat4,
    /// Index into the subgraph's materials.
    pub material: usize,
    /// Alpha blended, drawn after opaque items.
    pub translucent: bool,
}

/// Draw items for a subgraph: opaque first, translucent last, otherwise in
/// node order
pub fn draw_list(subgraph: &SceneSubgraph) -> Vec<DrawItem> {
    let mut items: Vec<DrawItem> = subgraph
        .nodes
        .iter()
        .map(|node| DrawItem {
            mesh: node.mesh.key(),
            transform: node.transform,
            material: node.material.0,
            translucent: subgraph
                .material(node.material)
                .is_some_and(|m| m.translucent),
        })
        .collect();
    items.sort_by_key(|item| item.translucent);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use straw_core::{Configuration, PartKind, WrapperType, assemble};

    #[test]
    fn test_model_matrix() {
        let placement = ScenePlacement::from_config(&SceneConfig::default());
        let origin = placement.model_matrix(0.0).transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5);

        let floated = placement.model_matrix(0.1).transform_point3(Vec3::ZERO);
        assert!((floated.y - origin.y - 0.1).abs() < 1e-5);

        // Scaled by the model scale
        let top = placement.model_matrix(0.0).transform_point3(Vec3::Y * 0.1);
        assert!(((top - origin).length() - 0.1 * 22.0).abs() < 1e-3);
    }

    #[test]
    fn test_model_stands_above_ground() {
        let config = SceneConfig::default();
        let placement = ScenePlacement::from_config(&config);
        let base = placement.model_matrix(-0.15).transform_point3(Vec3::ZERO);
        let ground_top = config.ground_y + config.ground_height / 2.0;
        assert!(base.y > ground_top);
    }

    #[test]
    fn test_ground_mesh_bounds() {
        let mesh = ground_mesh(3.0, 0.5, 0.2);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max[0] - 3.0).abs() < 1e-4);
        assert!((min[1] + 0.25).abs() < 1e-5);
        assert!((max[1] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_shadow_rests_on_ground() {
        let config = SceneConfig::default();
        let placement = ScenePlacement::from_config(&config);
        let ground_top = config.ground_y + config.ground_height / 2.0;
        let center = placement.shadow_matrix(0.0).transform_point3(Vec3::ZERO);
        assert!(center.y > ground_top && center.y - ground_top < 0.01);

        // Shrinks when floating up, grows when dipping down
        let rim = Vec3::X * config.shadow_radius;
        let rest = placement.shadow_matrix(0.0).transform_point3(rim).x;
        let up = placement.shadow_matrix(0.15).transform_point3(rim).x;
        let down = placement.shadow_matrix(-0.15).transform_point3(rim).x;
        assert!(up < rest && rest < down);
        assert!((rest - config.shadow_radius).abs() < 1e-5);
    }

    #[test]
    fn test_shadow_mesh_faces_up() {
        let mesh = shadow_mesh(1.2);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max[0] - 1.2).abs() < 1e-4);
        assert!((min[2] + 1.2).abs() < 1e-2);
        assert_eq!(min[1], 0.0);
        assert_eq!(max[1], 0.0);
        assert!(mesh.uvs.iter().flatten().all(|uv| (0.0..=1.0).contains(uv)));

        // Counter-clockwise seen from above
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(mesh.positions[mesh.indices[i] as usize]));
        assert!((b - a).cross(c - a).y > 0.0);

        assert!(shadow_mesh(0.0).is_empty());
    }

    #[test]
    fn test_translucent_drawn_last() {
        let library = PartLibrary::builtin();
        let config = Configuration {
            wrapper_type: WrapperType::FilmWrapped,
            ..Configuration::default()
        };
        let subgraph = assemble(&config, &library).unwrap();
        let items = draw_list(&subgraph);
        assert_eq!(items.len(), subgraph.nodes.len());
        assert!(items.last().unwrap().translucent);
        assert!(items[..items.len() - 1].iter().all(|i| !i.translucent));
        assert_eq!(
            items.last().unwrap().mesh,
            MeshKey::Library(PartKind::WrapFilm)
        );
    }

    #[test]
    fn test_every_source_has_mesh() {
        let library = PartLibrary::builtin();
        let subgraph = assemble(&Configuration::default(), &library).unwrap();
        for node in &subgraph.nodes {
            let mesh = mesh_for_source(&node.mesh, &library).unwrap();
            assert!(!mesh.is_empty());
        }
    }
}
