//! Straw parts: vocabulary, meshes and the loaded part library

mod builtin;
mod library;
mod loader;

pub use builtin::builtin_part;
pub use library::PartLibrary;
pub use loader::{load_obj_bundle, load_obj_bundle_from_bytes};

use serde::{Deserialize, Serialize};

use crate::primitive::MeshData;

/// Closed vocabulary of parts a straw can be assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartKind {
    StrawBottom,
    StrawFlex,
    StrawTop,
    StrawTopBevel,
    StrawLongFlex,
    ScoopShell,
    WrapPaper,
    WrapFilm,
    /// Sphere hiding the seam at the joint (procedural)
    FlexKnee,
    /// Cylinder standing in for the flex section on straight straws (procedural)
    StraightFiller,
}

impl PartKind {
    /// Object name of the part inside a bundle, `None` for procedural parts
    pub fn asset_name(&self) -> Option<&'static str> {
        match self {
            PartKind::StrawBottom => Some("straw_bottom"),
            PartKind::StrawFlex => Some("straw_flex"),
            PartKind::StrawTop => Some("straw_top"),
            PartKind::StrawTopBevel => Some("straw_top_bevel"),
            PartKind::StrawLongFlex => Some("straw_long_flex"),
            PartKind::ScoopShell => Some("scoop_shell"),
            PartKind::WrapPaper => Some("wrap_paper"),
            PartKind::WrapFilm => Some("wrap_film"),
            PartKind::FlexKnee | PartKind::StraightFiller => None,
        }
    }

    /// Resolve a bundle object name. Matching ignores case and any exporter
    /// suffix after a `.` (e.g. `straw_top.001`).
    pub fn from_asset_name(name: &str) -> Option<PartKind> {
        let base = name.split('.').next().unwrap_or(name).trim().to_lowercase();
        match base.as_str() {
            "shell5" => Some(PartKind::ScoopShell),
            _ => Self::library_parts()
                .iter()
                .copied()
                .find(|kind| kind.asset_name() == Some(base.as_str())),
        }
    }

    /// Whether the part comes from the library rather than being generated
    pub fn is_library_part(&self) -> bool {
        self.asset_name().is_some()
    }

    /// Parts that must be present in the library
    pub fn library_parts() -> &'static [PartKind] {
        &[
            PartKind::StrawBottom,
            PartKind::StrawFlex,
            PartKind::StrawTop,
            PartKind::StrawTopBevel,
            PartKind::StrawLongFlex,
            PartKind::ScoopShell,
            PartKind::WrapPaper,
            PartKind::WrapFilm,
        ]
    }

    /// Every part kind
    pub fn all() -> &'static [PartKind] {
        &[
            PartKind::StrawBottom,
            PartKind::StrawFlex,
            PartKind::StrawTop,
            PartKind::StrawTopBevel,
            PartKind::StrawLongFlex,
            PartKind::ScoopShell,
            PartKind::WrapPaper,
            PartKind::WrapFilm,
            PartKind::FlexKnee,
            PartKind::StraightFiller,
        ]
    }
}

/// Vertical extent and width of a part, measured once at load time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartMeasurements {
    pub min_y: f32,
    pub height: f32,
    pub width: f32,
}

impl PartMeasurements {
    /// Used when a mesh has no usable bounds
    pub const FALLBACK: PartMeasurements = PartMeasurements {
        min_y: 0.0,
        height: 1.0,
        width: 0.1,
    };

    /// Radius of the part around its axis
    pub fn radius(&self) -> f32 {
        self.width / 2.0
    }

    /// Top of the part in its local space
    pub fn max_y(&self) -> f32 {
        self.min_y + self.height
    }
}

/// Immutable part geometry with its bounding box
#[derive(Debug, Clone)]
pub struct PartMesh {
    pub name: String,
    pub mesh: MeshData,
    /// Bounding box min
    pub bbox_min: [f32; 3],
    /// Bounding box max
    pub bbox_max: [f32; 3],
}

impl PartMesh {
    /// Create a part, computing its bounding box
    pub fn new(name: impl Into<String>, mesh: MeshData) -> Self {
        let (bbox_min, bbox_max) = mesh.bounds().unwrap_or(([0.0; 3], [0.0; 3]));
        Self {
            name: name.into(),
            mesh,
            bbox_min,
            bbox_max,
        }
    }

    /// Measure the part along Y (height) and X (width)
    pub fn measure(&self) -> PartMeasurements {
        let height = self.bbox_max[1] - self.bbox_min[1];
        let width = self.bbox_max[0] - self.bbox_min[0];
        if self.mesh.is_empty() || !height.is_finite() || height <= 0.0 || !width.is_finite() {
            return PartMeasurements::FALLBACK;
        }
        PartMeasurements {
            min_y: self.bbox_min[1],
            height,
            width,
        }
    }
}

/// Mesh loading errors
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty mesh")]
    EmptyMesh,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::generate_cylinder_mesh;

    #[test]
    fn test_asset_names_round_trip() {
        for kind in PartKind::library_parts() {
            let name = kind.asset_name().unwrap();
            assert_eq!(PartKind::from_asset_name(name), Some(*kind));
        }
        assert_eq!(PartKind::FlexKnee.asset_name(), None);
        assert_eq!(PartKind::StraightFiller.asset_name(), None);
    }

    #[test]
    fn test_asset_name_matching_is_lenient() {
        assert_eq!(
            PartKind::from_asset_name("Straw_Top.001"),
            Some(PartKind::StrawTop)
        );
        assert_eq!(
            PartKind::from_asset_name("Straw_Long_Flex"),
            Some(PartKind::StrawLongFlex)
        );
        assert_eq!(PartKind::from_asset_name("Shell5"), Some(PartKind::ScoopShell));
        assert_eq!(PartKind::from_asset_name("teapot"), None);
    }

    #[test]
    fn test_measure_cylinder() {
        let part = PartMesh::new("tube", generate_cylinder_mesh(0.5, 2.0));
        let m = part.measure();
        assert!((m.min_y + 1.0).abs() < 1e-5);
        assert!((m.height - 2.0).abs() < 1e-5);
        assert!((m.width - 1.0).abs() < 1e-5);
        assert!((m.radius() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_measure_empty_mesh_falls_back() {
        let part = PartMesh::new("empty", MeshData::default());
        assert_eq!(part.measure(), PartMeasurements::FALLBACK);
    }
}
