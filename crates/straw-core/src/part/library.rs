//! Loaded part set shared by the assembler and the renderer

use std::collections::HashMap;
use std::sync::Arc;

use super::{PartKind, PartMeasurements, PartMesh, builtin_part};

/// Loaded library parts keyed by kind, each measured once.
///
/// Meshes are shared behind `Arc`; every assembled straw references them and
/// owns only its transforms.
#[derive(Debug, Clone, Default)]
pub struct PartLibrary {
    parts: HashMap<PartKind, Arc<PartMesh>>,
    measurements: HashMap<PartKind, PartMeasurements>,
}

impl PartLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library built entirely from the built-in procedural parts
    pub fn builtin() -> Self {
        Self::new().with_builtin_fallback()
    }

    /// Insert or replace a part
    pub fn insert(&mut self, kind: PartKind, part: PartMesh) {
        if !kind.is_library_part() {
            tracing::warn!("Ignoring procedural part {:?} in library", kind);
            return;
        }
        self.measurements.insert(kind, part.measure());
        self.parts.insert(kind, Arc::new(part));
    }

    /// Fill every missing library part from the built-in set
    pub fn with_builtin_fallback(mut self) -> Self {
        for kind in PartKind::library_parts() {
            if !self.parts.contains_key(kind) {
                if let Some(part) = builtin_part(*kind) {
                    tracing::debug!("Using built-in mesh for {:?}", kind);
                    self.insert(*kind, part);
                }
            }
        }
        self
    }

    pub fn get(&self, kind: PartKind) -> Option<&Arc<PartMesh>> {
        self.parts.get(&kind)
    }

    pub fn contains(&self, kind: PartKind) -> bool {
        self.parts.contains_key(&kind)
    }

    /// Measurements of a loaded part
    pub fn measurements(&self, kind: PartKind) -> Option<PartMeasurements> {
        self.measurements.get(&kind).copied()
    }

    /// Library parts not loaded yet
    pub fn missing_parts(&self) -> Vec<PartKind> {
        PartKind::library_parts()
            .iter()
            .copied()
            .filter(|kind| !self.parts.contains_key(kind))
            .collect()
    }

    /// Whether every library part is present
    pub fn is_ready(&self) -> bool {
        self.missing_parts().is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::generate_cylinder_mesh;

    #[test]
    fn test_empty_library_is_not_ready() {
        let library = PartLibrary::new();
        assert!(!library.is_ready());
        assert_eq!(library.missing_parts().len(), PartKind::library_parts().len());
    }

    #[test]
    fn test_builtin_library_is_ready() {
        let library = PartLibrary::builtin();
        assert!(library.is_ready());
        for kind in PartKind::library_parts() {
            let m = library.measurements(*kind).unwrap();
            assert!(m.height > 0.0, "{:?} has no height", kind);
            assert!(m.width > 0.0, "{:?} has no width", kind);
        }
    }

    #[test]
    fn test_loaded_parts_take_precedence() {
        let mut library = PartLibrary::new();
        library.insert(
            PartKind::StrawBottom,
            PartMesh::new("straw_bottom", generate_cylinder_mesh(0.5, 4.0)),
        );
        let library = library.with_builtin_fallback();
        assert!(library.is_ready());
        let m = library.measurements(PartKind::StrawBottom).unwrap();
        assert!((m.height - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_procedural_parts_are_rejected() {
        let mut library = PartLibrary::new();
        library.insert(
            PartKind::FlexKnee,
            PartMesh::new("knee", generate_cylinder_mesh(0.5, 1.0)),
        );
        assert!(library.is_empty());
    }
}
