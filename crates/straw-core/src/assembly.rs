//! Parametric straw assembly
//!
//! Turns a [`Configuration`] and the loaded [`PartLibrary`] into a flat list of
//! transformed part instances. Assembly is a full rebuild: it is cheap, pure
//! and safe to run on every configuration change.
//!
//! Stacking works in model space (meters, +Y up):
//! - the bottom is scaled by `(rm, length_scale, rm)` and lifted so it starts at 0
//! - the joint group sits on top of the scaled bottom and is rotated about X
//! - parts above the joint are scaled only in X/Z, so a longer straw stretches
//!   the lower segment without breaking the seams above it

use glam::{Mat4, Vec3};

use crate::config::{Configuration, StrawColor};
use crate::constants::{
    DEFAULT_LENGTH_MM, DIAMETER_TABLE, FALLBACK_RADIUS_MULTIPLIER, FILLER_RADIUS_FACTOR,
    KNEE_RADIUS_FACTOR, LENGTH_SCALE_RANGE, LONG_FLEX_DROP, LONG_FLEX_SCALE, SEAM_OVERLAP,
    VISUAL_LENGTH_RANGE_MM, WRAPPER_CLEARANCE,
};
use crate::part::{PartKind, PartLibrary, PartMeasurements};
use crate::plan::{BodyShape, BuildPlan, WrapperPlan};
use crate::texture::TextureKind;

/// Radius multiplier for a diameter in millimeters.
///
/// Unknown diameters fall back to 1.0; this is logged, never an error.
pub fn radius_multiplier(diameter_mm: f32) -> f32 {
    DIAMETER_TABLE
        .iter()
        .find(|(mm, _)| (mm - diameter_mm).abs() < 1e-3)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or_else(|| {
            tracing::warn!(
                "Unknown diameter {} mm, using radius multiplier {}",
                diameter_mm,
                FALLBACK_RADIUS_MULTIPLIER
            );
            FALLBACK_RADIUS_MULTIPLIER
        })
}

/// Visual length scale for a length in millimeters.
///
/// Lengths are clamped into the visual range first, so very short or very long
/// straws still look like straws.
pub fn length_scale(length_mm: f32) -> f32 {
    let length = if length_mm.is_finite() && length_mm > 0.0 {
        length_mm
    } else {
        DEFAULT_LENGTH_MM
    };
    let (min_mm, max_mm) = VISUAL_LENGTH_RANGE_MM;
    let (min_scale, max_scale) = LENGTH_SCALE_RANGE;
    let t = (length.clamp(min_mm, max_mm) - min_mm) / (max_mm - min_mm);
    min_scale + t * (max_scale - min_scale)
}

/// Index into [`SceneSubgraph::materials`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Surface description of a node
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: &'static str,
    /// Linear RGBA
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub texture: Option<TextureKind>,
    /// Alpha-blended material
    pub translucent: bool,
}

impl Material {
    /// Shared straw body material
    pub fn body(color: StrawColor) -> Self {
        Self {
            name: "body",
            base_color: color.to_linear_rgba(),
            roughness: 0.4,
            metalness: 0.1,
            texture: None,
            translucent: false,
        }
    }

    /// Glossier variant used by the scoop shell
    pub fn scoop(color: StrawColor) -> Self {
        Self {
            name: "scoop",
            roughness: 0.2,
            texture: Some(TextureKind::BrushedMetal),
            ..Self::body(color)
        }
    }

    pub fn paper() -> Self {
        Self {
            name: "paper",
            base_color: StrawColor([0xD8, 0xCB, 0xB0]).to_linear_rgba(),
            roughness: 0.85,
            metalness: 0.0,
            texture: Some(TextureKind::Paper),
            translucent: false,
        }
    }

    pub fn film() -> Self {
        let mut base_color = StrawColor([0xF0, 0xF0, 0xF5]).to_linear_rgba();
        base_color[3] = 0.25;
        Self {
            name: "film",
            base_color,
            roughness: 0.15,
            metalness: 0.0,
            texture: Some(TextureKind::Film),
            translucent: true,
        }
    }
}

/// Geometry of a node: a library mesh or a generated primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshSource {
    Library(PartKind),
    /// Y-axis cylinder centered on the origin
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
}

/// Hashable identity of a [`MeshSource`], for GPU mesh caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Library(PartKind),
    Cylinder { radius_bits: u32, height_bits: u32 },
    Sphere { radius_bits: u32 },
}

impl MeshSource {
    pub fn key(&self) -> MeshKey {
        match *self {
            MeshSource::Library(kind) => MeshKey::Library(kind),
            MeshSource::Cylinder { radius, height } => MeshKey::Cylinder {
                radius_bits: radius.to_bits(),
                height_bits: height.to_bits(),
            },
            MeshSource::Sphere { radius } => MeshKey::Sphere {
                radius_bits: radius.to_bits(),
            },
        }
    }

    /// Local bounding box, `None` for a library part that is not loaded
    fn local_bounds(&self, library: &PartLibrary) -> Option<(Vec3, Vec3)> {
        match *self {
            MeshSource::Library(kind) => library
                .get(kind)
                .map(|part| (Vec3::from(part.bbox_min), Vec3::from(part.bbox_max))),
            MeshSource::Cylinder { radius, height } => {
                let half = Vec3::new(radius, height / 2.0, radius);
                Some((-half, half))
            }
            MeshSource::Sphere { radius } => Some((Vec3::splat(-radius), Vec3::splat(radius))),
        }
    }
}

/// One placed part
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: PartKind,
    pub mesh: MeshSource,
    /// Model-space transform
    pub transform: Mat4,
    pub material: MaterialId,
}

/// Assembled straw, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSubgraph {
    pub nodes: Vec<SceneNode>,
    pub materials: Vec<Material>,
    /// Model-space bounds of all nodes
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

impl SceneSubgraph {
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    /// Kinds of all nodes, in draw order
    pub fn kinds(&self) -> Vec<PartKind> {
        self.nodes.iter().map(|n| n.kind).collect()
    }

    pub fn contains(&self, kind: PartKind) -> bool {
        self.nodes.iter().any(|n| n.kind == kind)
    }

    pub fn height(&self) -> f32 {
        self.bounds_max.y - self.bounds_min.y
    }
}

/// Assemble the straw for a configuration.
///
/// Returns `None` while any part the configuration needs is missing from the
/// library (render nothing yet).
pub fn assemble(config: &Configuration, library: &PartLibrary) -> Option<SceneSubgraph> {
    let plan = BuildPlan::for_config(config);
    let missing: Vec<PartKind> = plan
        .required_library_parts()
        .into_iter()
        .filter(|kind| !library.contains(*kind))
        .collect();
    if !missing.is_empty() {
        tracing::debug!("Assembly deferred, missing parts: {:?}", missing);
        return None;
    }

    let rm = radius_multiplier(config.diameter_mm);
    let ls = length_scale(config.length_mm);
    let mut builder = Builder {
        library,
        rm,
        ls,
        nodes: Vec::new(),
        materials: vec![Material::body(config.color)],
    };

    builder.body(&plan, config.color)?;
    let (bounds_min, bounds_max) = builder.bounds()?;

    let (nodes, materials) = match plan.wrapper {
        Some(wrapper) => builder.wrap(wrapper, bounds_min, bounds_max)?,
        None => (builder.nodes, builder.materials),
    };

    let nodes: Vec<SceneNode> = if plan.body_visible() {
        nodes
    } else {
        nodes
            .into_iter()
            .filter(|n| plan.wrapper.is_some_and(|w| w.part == n.kind))
            .collect()
    };

    let (bounds_min, bounds_max) = node_bounds(&nodes, library).unwrap_or((bounds_min, bounds_max));
    tracing::debug!(
        "Assembled {:?} straw: {} nodes, radius x{:.2}, length x{:.2}",
        plan.body,
        nodes.len(),
        rm,
        ls
    );

    Some(SceneSubgraph {
        nodes,
        materials,
        bounds_min,
        bounds_max,
    })
}

const BODY: MaterialId = MaterialId(0);

struct Builder<'a> {
    library: &'a PartLibrary,
    rm: f32,
    ls: f32,
    nodes: Vec<SceneNode>,
    materials: Vec<Material>,
}

impl Builder<'_> {
    fn measure(&self, kind: PartKind) -> Option<PartMeasurements> {
        self.library.measurements(kind)
    }

    fn push(&mut self, kind: PartKind, mesh: MeshSource, transform: Mat4, material: MaterialId) {
        self.nodes.push(SceneNode {
            kind,
            mesh,
            transform,
            material,
        });
    }

    fn push_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Scale applied to parts above the joint
    fn upper_scale(&self) -> Vec3 {
        Vec3::new(self.rm, 1.0, self.rm)
    }

    /// Library part lifted so its base sits at the local origin
    fn seated(&self, m: PartMeasurements, scale: Vec3) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, -m.min_y * scale.y, 0.0)) * Mat4::from_scale(scale)
    }

    fn body(&mut self, plan: &BuildPlan, color: StrawColor) -> Option<()> {
        match plan.body {
            BodyShape::Scoop => self.scoop(color),
            BodyShape::Straight => {
                let (joint, radius) = self.bottom(plan.joint_angle)?;
                let flex = self.measure(PartKind::StrawFlex)?;
                self.push(
                    PartKind::StraightFiller,
                    MeshSource::Cylinder {
                        radius: radius * FILLER_RADIUS_FACTOR * self.rm,
                        height: flex.height,
                    },
                    joint * Mat4::from_translation(Vec3::new(0.0, flex.height / 2.0, 0.0)),
                    BODY,
                );
                self.top(joint, flex.height)
            }
            BodyShape::Flexible => {
                let (joint, radius) = self.bottom(plan.joint_angle)?;
                self.knee(joint, radius);
                let flex = self.measure(PartKind::StrawFlex)?;
                self.push(
                    PartKind::StrawFlex,
                    MeshSource::Library(PartKind::StrawFlex),
                    joint * self.seated(flex, self.upper_scale()),
                    BODY,
                );
                self.top(joint, flex.height)
            }
            BodyShape::ExtraFlexible => {
                let (joint, radius) = self.bottom(plan.joint_angle)?;
                self.knee(joint, radius);
                let long_flex = self.measure(PartKind::StrawLongFlex)?;
                let scale = Vec3::new(
                    LONG_FLEX_SCALE * self.rm,
                    LONG_FLEX_SCALE,
                    LONG_FLEX_SCALE * self.rm,
                );
                self.push(
                    PartKind::StrawLongFlex,
                    MeshSource::Library(PartKind::StrawLongFlex),
                    joint
                        * Mat4::from_translation(Vec3::new(0.0, -LONG_FLEX_DROP, 0.0))
                        * self.seated(long_flex, scale),
                    BODY,
                );
                Some(())
            }
            BodyShape::Beveled => {
                let (joint, _) = self.bottom(plan.joint_angle)?;
                let bevel = self.measure(PartKind::StrawTopBevel)?;
                self.push(
                    PartKind::StrawTopBevel,
                    MeshSource::Library(PartKind::StrawTopBevel),
                    joint
                        * Mat4::from_translation(Vec3::new(0.0, -SEAM_OVERLAP, 0.0))
                        * self.seated(bevel, self.upper_scale()),
                    BODY,
                );
                Some(())
            }
        }
    }

    /// Push the length-scaled bottom and return the joint frame on top of it
    /// together with the straw radius
    fn bottom(&mut self, joint_angle: f32) -> Option<(Mat4, f32)> {
        let bottom = self.measure(PartKind::StrawBottom)?;
        let scale = Vec3::new(self.rm, self.ls, self.rm);
        self.push(
            PartKind::StrawBottom,
            MeshSource::Library(PartKind::StrawBottom),
            self.seated(bottom, scale),
            BODY,
        );

        let joint = Mat4::from_translation(Vec3::new(0.0, bottom.height * self.ls, 0.0))
            * Mat4::from_rotation_x(joint_angle);
        Some((joint, bottom.radius()))
    }

    fn knee(&mut self, joint: Mat4, radius: f32) {
        self.push(
            PartKind::FlexKnee,
            MeshSource::Sphere {
                radius: radius * KNEE_RADIUS_FACTOR * self.rm,
            },
            joint,
            BODY,
        );
    }

    /// Generic top above a joint section of `below` height
    fn top(&mut self, joint: Mat4, below: f32) -> Option<()> {
        let top = self.measure(PartKind::StrawTop)?;
        self.push(
            PartKind::StrawTop,
            MeshSource::Library(PartKind::StrawTop),
            joint
                * Mat4::from_translation(Vec3::new(0.0, below - SEAM_OVERLAP, 0.0))
                * self.seated(top, self.upper_scale()),
            BODY,
        );
        Some(())
    }

    /// Scoop shell flipped upside down, base at the origin
    fn scoop(&mut self, color: StrawColor) -> Option<()> {
        let shell = self.measure(PartKind::ScoopShell)?;
        let material = self.push_material(Material::scoop(color));
        let transform = Mat4::from_scale(Vec3::new(self.rm, self.ls, self.rm))
            * Mat4::from_rotation_x(std::f32::consts::PI)
            * Mat4::from_translation(Vec3::new(0.0, -shell.max_y(), 0.0));
        self.push(
            PartKind::ScoopShell,
            MeshSource::Library(PartKind::ScoopShell),
            transform,
            material,
        );
        Some(())
    }

    fn bounds(&self) -> Option<(Vec3, Vec3)> {
        node_bounds(&self.nodes, self.library)
    }

    /// Fit the wrapper shell around the body bounds
    fn wrap(
        mut self,
        wrapper: WrapperPlan,
        min: Vec3,
        max: Vec3,
    ) -> Option<(Vec<SceneNode>, Vec<Material>)> {
        let shell = self.library.get(wrapper.part)?;
        let shell_min = Vec3::from(shell.bbox_min);
        let shell_size = Vec3::from(shell.bbox_max) - shell_min;
        if shell_size.min_element() <= f32::EPSILON {
            tracing::warn!("Wrapper mesh {:?} is degenerate", wrapper.part);
            return None;
        }

        let body_size = max - min;
        let girth = body_size.x.max(body_size.z) * WRAPPER_CLEARANCE;
        let pad = girth * (WRAPPER_CLEARANCE - 1.0);
        let target = Vec3::new(girth, body_size.y + 2.0 * pad, girth);
        let center = (min + max) / 2.0;

        let shell_center = shell_min + shell_size / 2.0;
        let transform = Mat4::from_translation(center)
            * Mat4::from_scale(target / shell_size)
            * Mat4::from_translation(-shell_center);

        let material = self.push_material(match wrapper.part {
            PartKind::WrapFilm => Material::film(),
            _ => Material::paper(),
        });
        self.push(
            wrapper.part,
            MeshSource::Library(wrapper.part),
            transform,
            material,
        );
        Some((self.nodes, self.materials))
    }
}

/// Model-space bounds of a set of nodes
fn node_bounds(nodes: &[SceneNode], library: &PartLibrary) -> Option<(Vec3, Vec3)> {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    let mut any = false;

    for node in nodes {
        let Some((lo, hi)) = node.mesh.local_bounds(library) else {
            continue;
        };
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = node.transform.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
            any = true;
        }
    }

    any.then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigUpdate, EndType, StrawType, WrapperType};
    use crate::part::PartMesh;
    use crate::primitive::generate_cylinder_mesh;

    fn straw(straw_type: StrawType, end_type: EndType, wrapper: WrapperType) -> Configuration {
        Configuration {
            straw_type,
            end_type,
            wrapper_type: wrapper,
            ..Configuration::default()
        }
    }

    fn node(subgraph: &SceneSubgraph, kind: PartKind) -> &SceneNode {
        subgraph.nodes.iter().find(|n| n.kind == kind).unwrap()
    }

    /// World-space Y extent of a library node
    fn node_y_range(subgraph: &SceneSubgraph, library: &PartLibrary, kind: PartKind) -> (f32, f32) {
        let (min, max) = node_bounds(std::slice::from_ref(node(subgraph, kind)), library).unwrap();
        (min.y, max.y)
    }

    #[test]
    fn test_radius_multiplier_table() {
        assert_eq!(radius_multiplier(3.0), 0.5);
        assert_eq!(radius_multiplier(5.5), 0.7);
        assert_eq!(radius_multiplier(8.0), 0.85);
        assert_eq!(radius_multiplier(12.0), 1.0);
        assert_eq!(radius_multiplier(7.0), 1.0);
    }

    #[test]
    fn test_length_scale_clamps_and_maps() {
        assert!((length_scale(200.0) - 0.8).abs() < 1e-6);
        assert!((length_scale(300.0) - 1.0).abs() < 1e-6);
        assert!((length_scale(400.0) - 1.2).abs() < 1e-6);
        assert!((length_scale(50.0) - 0.8).abs() < 1e-6);
        assert!((length_scale(999.0) - 1.2).abs() < 1e-6);
        // Non-positive lengths use the default
        assert!((length_scale(0.0) - 1.0).abs() < 1e-6);
        assert!((length_scale(f32::NAN) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_not_ready_library_yields_nothing() {
        let library = PartLibrary::new();
        assert!(assemble(&Configuration::default(), &library).is_none());
    }

    #[test]
    fn test_partial_library_assembles_what_it_can() {
        let mut library = PartLibrary::new();
        for kind in [PartKind::StrawBottom, PartKind::StrawFlex, PartKind::StrawTop] {
            library.insert(kind, crate::part::builtin_part(kind).unwrap());
        }
        let straight = straw(StrawType::Straight, EndType::Standard, WrapperType::Unwrapped);
        assert!(assemble(&straight, &library).is_some());

        let scoop = straw(StrawType::Straight, EndType::Scoop, WrapperType::Unwrapped);
        assert!(assemble(&scoop, &library).is_none());
    }

    #[test]
    fn test_straight_standard_scenario() {
        let library = PartLibrary::builtin();
        let config = Configuration {
            diameter_mm: 12.0,
            length_mm: 300.0,
            ..straw(StrawType::Straight, EndType::Standard, WrapperType::Unwrapped)
        };
        let subgraph = assemble(&config, &library).unwrap();

        assert!(subgraph.contains(PartKind::StraightFiller));
        assert!(!subgraph.contains(PartKind::FlexKnee));
        assert!(!subgraph.contains(PartKind::StrawFlex));

        // Unit scale on the bottom segment
        let bottom = library.measurements(PartKind::StrawBottom).unwrap();
        let (lo, hi) = node_y_range(&subgraph, &library, PartKind::StrawBottom);
        assert!(lo.abs() < 1e-5);
        assert!((hi - bottom.height).abs() < 1e-5);

        // Every body node shares the single body material
        assert!(subgraph.nodes.iter().all(|n| n.material == BODY));
        assert_eq!(subgraph.materials.len(), 1);
    }

    #[test]
    fn test_top_sits_on_scaled_bottom() {
        let library = PartLibrary::builtin();
        let bottom = library.measurements(PartKind::StrawBottom).unwrap();
        let flex = library.measurements(PartKind::StrawFlex).unwrap();

        for length in [200.0, 300.0, 400.0] {
            let config = Configuration {
                length_mm: length,
                ..straw(StrawType::Straight, EndType::Standard, WrapperType::Unwrapped)
            };
            let subgraph = assemble(&config, &library).unwrap();
            let (_, bottom_top) = node_y_range(&subgraph, &library, PartKind::StrawBottom);
            assert!((bottom_top - bottom.height * length_scale(length)).abs() < 1e-5);

            let (top_base, _) = node_y_range(&subgraph, &library, PartKind::StrawTop);
            let expected = bottom_top + flex.height - SEAM_OVERLAP;
            assert!((top_base - expected).abs() < 1e-5, "length {}", length);
            // Seams overlap rather than gap
            assert!(top_base <= bottom_top + flex.height);
        }
    }

    #[test]
    fn test_upper_parts_are_not_length_scaled() {
        let library = PartLibrary::builtin();
        let top = library.measurements(PartKind::StrawTop).unwrap();
        let config = Configuration {
            length_mm: 400.0,
            ..straw(StrawType::Straight, EndType::Standard, WrapperType::Unwrapped)
        };
        let subgraph = assemble(&config, &library).unwrap();
        let (lo, hi) = node_y_range(&subgraph, &library, PartKind::StrawTop);
        assert!(((hi - lo) - top.height).abs() < 1e-5);
    }

    #[test]
    fn test_flexible_joint_is_bent() {
        let library = PartLibrary::builtin();
        let subgraph = assemble(
            &straw(StrawType::Flexible, EndType::Standard, WrapperType::Unwrapped),
            &library,
        )
        .unwrap();
        assert_eq!(
            subgraph.kinds(),
            vec![
                PartKind::StrawBottom,
                PartKind::FlexKnee,
                PartKind::StrawFlex,
                PartKind::StrawTop
            ]
        );

        // The top leans toward +Z
        let top = node(&subgraph, PartKind::StrawTop);
        let up = top.transform.transform_vector3(Vec3::Y).normalize();
        assert!((up.angle_between(Vec3::Y) - crate::constants::FLEX_ANGLE).abs() < 1e-4);
    }

    #[test]
    fn test_knee_radius_follows_diameter() {
        let library = PartLibrary::builtin();
        let bottom = library.measurements(PartKind::StrawBottom).unwrap();
        let config = Configuration {
            diameter_mm: 5.5,
            ..straw(StrawType::ExtraFlexible, EndType::Standard, WrapperType::Unwrapped)
        };
        let subgraph = assemble(&config, &library).unwrap();
        let MeshSource::Sphere { radius } = node(&subgraph, PartKind::FlexKnee).mesh else {
            panic!("knee is not a sphere");
        };
        assert!((radius - bottom.radius() * KNEE_RADIUS_FACTOR * 0.7).abs() < 1e-6);
        assert!(!subgraph.contains(PartKind::StrawTop));
    }

    #[test]
    fn test_scoop_replaces_body() {
        let library = PartLibrary::builtin();
        let subgraph = assemble(
            &straw(StrawType::Flexible, EndType::Scoop, WrapperType::Unwrapped),
            &library,
        )
        .unwrap();
        assert_eq!(subgraph.kinds(), vec![PartKind::ScoopShell]);

        let shell = library.measurements(PartKind::ScoopShell).unwrap();
        assert!(subgraph.bounds_min.y.abs() < 1e-5);
        assert!((subgraph.height() - shell.height).abs() < 1e-5);

        let material = subgraph.material(node(&subgraph, PartKind::ScoopShell).material);
        assert_eq!(material.map(|m| m.roughness), Some(0.2));
    }

    #[test]
    fn test_bevel_sits_on_bottom() {
        let library = PartLibrary::builtin();
        let subgraph = assemble(
            &straw(StrawType::Flexible, EndType::FortyFiveDegree, WrapperType::Unwrapped),
            &library,
        )
        .unwrap();
        assert_eq!(
            subgraph.kinds(),
            vec![PartKind::StrawBottom, PartKind::StrawTopBevel]
        );
        let (_, bottom_top) = node_y_range(&subgraph, &library, PartKind::StrawBottom);
        let (bevel_base, _) = node_y_range(&subgraph, &library, PartKind::StrawTopBevel);
        assert!((bevel_base - (bottom_top - SEAM_OVERLAP)).abs() < 1e-5);
    }

    #[test]
    fn test_film_wrapper_envelops_body() {
        let library = PartLibrary::builtin();
        let subgraph = assemble(
            &straw(StrawType::Flexible, EndType::Standard, WrapperType::FilmWrapped),
            &library,
        )
        .unwrap();
        assert!(subgraph.contains(PartKind::StrawBottom));
        assert!(!subgraph.contains(PartKind::WrapPaper));

        let body_only = assemble(
            &straw(StrawType::Straight, EndType::Standard, WrapperType::Unwrapped),
            &library,
        )
        .unwrap();
        let (lo, hi) = node_y_range(&subgraph, &library, PartKind::WrapFilm);
        let (body_lo, _) = node_y_range(&subgraph, &library, PartKind::StrawBottom);
        let (_, body_hi) = node_y_range(&subgraph, &library, PartKind::StrawTop);
        assert!(lo < body_lo && hi > body_hi);
        // Wrapped flexible straws are shown unbent, as tall as a straight one
        assert!((body_hi - body_only.bounds_max.y).abs() < 1e-4);

        let film = subgraph.material(node(&subgraph, PartKind::WrapFilm).material).unwrap();
        assert!(film.translucent);
    }

    #[test]
    fn test_paper_wrapper_hides_body() {
        let library = PartLibrary::builtin();
        let subgraph = assemble(
            &straw(StrawType::Straight, EndType::Standard, WrapperType::PaperWrapped),
            &library,
        )
        .unwrap();
        assert_eq!(subgraph.kinds(), vec![PartKind::WrapPaper]);
    }

    #[test]
    fn test_every_combination_assembles_from_vocabulary() {
        let library = PartLibrary::builtin();
        for s in StrawType::all() {
            for e in EndType::all() {
                for w in WrapperType::all() {
                    let subgraph = assemble(&straw(*s, *e, *w), &library).unwrap();
                    assert!(!subgraph.nodes.is_empty());
                    assert!(subgraph.nodes.iter().all(|n| PartKind::all().contains(&n.kind)));
                    assert!(
                        subgraph
                            .nodes
                            .iter()
                            .all(|n| subgraph.material(n.material).is_some())
                    );
                    assert!(subgraph.nodes.iter().all(|n| !n.transform.is_nan()));
                }
            }
        }
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let library = PartLibrary::builtin();
        let config = Configuration::default()
            .apply(ConfigUpdate::Diameter(8.0))
            .apply(ConfigUpdate::Length(250.0));
        assert_eq!(assemble(&config, &library), assemble(&config, &library));
    }

    #[test]
    fn test_long_flex_is_seated_on_its_base() {
        let long_flex = |lift: f32| {
            let mut mesh = generate_cylinder_mesh(0.02, 0.4);
            for p in &mut mesh.positions {
                p[1] += lift;
            }
            let mut library = PartLibrary::new();
            library.insert(PartKind::StrawLongFlex, PartMesh::new("straw_long_flex", mesh));
            library.with_builtin_fallback()
        };
        let config = straw(StrawType::ExtraFlexible, EndType::Standard, WrapperType::Unwrapped);

        // Centered and base-aligned copies of the same mesh land in the same place
        let centered = long_flex(0.0);
        let based = long_flex(0.2);
        let a = assemble(&config, &centered).unwrap();
        let b = assemble(&config, &based).unwrap();
        let flex_bounds = |subgraph: &SceneSubgraph, library: &PartLibrary| {
            let flex = node(subgraph, PartKind::StrawLongFlex);
            node_bounds(std::slice::from_ref(flex), library).unwrap()
        };
        let (a_lo, a_hi) = flex_bounds(&a, &centered);
        let (b_lo, b_hi) = flex_bounds(&b, &based);
        assert!((a_lo - b_lo).length() < 1e-5);
        assert!((a_hi - b_hi).length() < 1e-5);
    }

    #[test]
    fn test_loaded_mesh_heights_drive_stacking() {
        let mut library = PartLibrary::new();
        library.insert(
            PartKind::StrawBottom,
            PartMesh::new("straw_bottom", generate_cylinder_mesh(0.5, 2.0)),
        );
        let library = library.with_builtin_fallback();
        let subgraph = assemble(
            &straw(StrawType::Straight, EndType::Standard, WrapperType::Unwrapped),
            &library,
        )
        .unwrap();
        let (lo, hi) = node_y_range(&subgraph, &library, PartKind::StrawBottom);
        assert!(lo.abs() < 1e-5);
        assert!((hi - 2.0).abs() < 1e-5);
    }
}
