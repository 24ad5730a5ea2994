//! OBJ part bundle loading
//!
//! A bundle is one Wavefront OBJ file holding any number of named objects.
//! Objects whose name belongs to the part vocabulary become parts; everything
//! else is skipped.

use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use super::{MeshError, PartKind, PartMesh};
use crate::primitive::MeshData;

/// Load a bundle file
pub fn load_obj_bundle(path: impl AsRef<Path>) -> Result<Vec<(PartKind, PartMesh)>, MeshError> {
    let file = std::fs::File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    load_obj_bundle_from_reader(&mut reader)
}

/// Load a bundle from bytes
pub fn load_obj_bundle_from_bytes(data: &[u8]) -> Result<Vec<(PartKind, PartMesh)>, MeshError> {
    let mut cursor = Cursor::new(data);
    load_obj_bundle_from_reader(&mut cursor)
}

fn load_obj_bundle_from_reader(
    reader: &mut impl BufRead,
) -> Result<Vec<(PartKind, PartMesh)>, MeshError> {
    let (models, _materials) = tobj::load_obj_buf(
        reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| MeshError::Parse(e.to_string()))?;

    if models.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Objects split across several groups are merged by part kind
    let mut parts: Vec<(PartKind, MeshData)> = Vec::new();
    for model in &models {
        let Some(kind) = PartKind::from_asset_name(&model.name) else {
            tracing::debug!("Skipping unknown bundle object '{}'", model.name);
            continue;
        };

        let mesh = mesh_from_model(&model.mesh);
        if mesh.is_empty() {
            tracing::warn!("Bundle object '{}' has no triangles", model.name);
            continue;
        }

        match parts.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => existing.append(&mesh),
            None => parts.push((kind, mesh)),
        }
    }

    Ok(parts
        .into_iter()
        .filter_map(|(kind, mesh)| {
            let name = kind.asset_name()?;
            Some((kind, PartMesh::new(name, mesh)))
        })
        .collect())
}

fn mesh_from_model(mesh: &tobj::Mesh) -> MeshData {
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let uvs: Vec<[f32; 2]> = if mesh.texcoords.len() / 2 == positions.len() {
        // OBJ texture space has v pointing up
        mesh.texcoords
            .chunks_exact(2)
            .map(|c| [c[0], 1.0 - c[1]])
            .collect()
    } else {
        vec![[0.0, 0.0]; positions.len()]
    };

    // Triangles referencing missing vertices are dropped whole
    let indices = mesh
        .indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < positions.len()))
        .flatten()
        .copied()
        .collect();

    let mut data = MeshData {
        normals: Vec::new(),
        uvs,
        indices,
        positions,
    };

    if mesh.normals.len() / 3 == data.positions.len() {
        data.normals = mesh
            .normals
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
    } else {
        data.compute_vertex_normals();
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BUNDLE: &str = "\
o Straw_Bottom
v -1 0 0
v 1 0 0
v 0 2 0
f 1 2 3
o straw_top.001
v -1 0 0
v 1 0 0
v 0 0.5 0
vt 0 0
vt 1 0
vt 0.5 1
f 4/1 5/2 6/3
o Camera
v 0 0 0
v 1 0 0
v 0 1 0
f 7 8 9
";

    #[test]
    fn test_out_of_range_triangles_dropped_whole() {
        let model = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
            indices: vec![0, 1, 2, 1, 9, 3, 2, 1, 3, 0],
            ..Default::default()
        };
        let data = mesh_from_model(&model);
        assert_eq!(data.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(data.normals.len(), 4);
    }

    #[test]
    fn test_load_bundle_from_bytes() {
        let parts = load_obj_bundle_from_bytes(BUNDLE.as_bytes()).unwrap();
        assert_eq!(parts.len(), 2);

        let (kind, bottom) = &parts[0];
        assert_eq!(*kind, PartKind::StrawBottom);
        assert_eq!(bottom.mesh.triangle_count(), 1);
        assert!((bottom.measure().height - 2.0).abs() < 1e-5);
        // Normals are generated when the file has none
        assert_eq!(bottom.mesh.normals.len(), bottom.mesh.positions.len());

        let (kind, top) = &parts[1];
        assert_eq!(*kind, PartKind::StrawTop);
        assert_eq!(top.name, "straw_top");
    }

    #[test]
    fn test_load_bundle_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUNDLE.as_bytes()).unwrap();

        let parts = load_obj_bundle(file.path()).unwrap();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_garbage_bundle_is_an_error() {
        assert!(load_obj_bundle_from_bytes(b"").is_err());
        assert!(load_obj_bundle("/nonexistent/parts.obj").is_err());
    }
}
