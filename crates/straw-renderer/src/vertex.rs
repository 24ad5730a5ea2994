//! Vertex formats
//!
//! Attributes are declared with [`vertex_attr!`] so offsets always follow
//! the struct layout.

use straw_core::MeshData;

/// Creates a vertex attribute with the offset calculated from the struct field.
///
/// # Example
///
/// ```ignore
/// const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
///     vertex_attr!(MeshVertex, position, 0, Float32x3),
///     vertex_attr!(MeshVertex, normal, 1, Float32x3),
/// ];
/// ```
#[macro_export]
macro_rules! vertex_attr {
    ($struct:ty, $field:ident, $location:expr, $format:ident) => {
        wgpu::VertexAttribute {
            offset: std::mem::offset_of!($struct, $field) as u64,
            shader_location: $location,
            format: wgpu::VertexFormat::$format,
        }
    };
}

/// Vertex for textured, lit meshes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Vertex position in local space.
    pub position: [f32; 3],
    /// Vertex normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// Vertex attribute descriptors for the shader.
    pub const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        vertex_attr!(MeshVertex, position, 0, Float32x3),
        vertex_attr!(MeshVertex, normal, 1, Float32x3),
        vertex_attr!(MeshVertex, uv, 2, Float32x2),
    ];

    /// Returns the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }

    /// Interleave mesh attributes. Missing normals or uvs are zero-filled.
    pub fn from_mesh(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Self {
                position,
                normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
        assert_eq!(MeshVertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(MeshVertex::ATTRIBUTES[2].offset, 24);
    }

    #[test]
    fn test_from_mesh_fills_missing() {
        let mut mesh = MeshData::default();
        mesh.positions = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        mesh.normals = vec![[0.0, 0.0, 1.0]];
        let vertices = MeshVertex::from_mesh(&mesh);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[1].uv, [0.0, 0.0]);
    }
}
