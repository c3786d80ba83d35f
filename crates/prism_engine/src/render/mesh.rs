//! Host-side mesh data consumed by the mesh batching family

use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::render::texture::Texture2D;

/// Surface parameters applied to a whole mesh draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    /// Albedo tint
    pub color: Vec4,
    /// Metallic factor in [0, 1]
    pub metallic: f32,
    /// Roughness factor in [0, 1]
    pub roughness: f32,
    /// Optional albedo texture; the white fallback is used when absent
    pub texture: Option<Texture2D>,
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            metallic: 0.0,
            roughness: 0.5,
            texture: None,
        }
    }
}

/// One mesh vertex as authored (object space, untransformed)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertexData {
    /// Object-space position
    pub position: Vec3,
    /// Object-space normal
    pub normal: Vec3,
    /// Texture coordinate
    pub uv: Vec2,
}

/// An indexed triangle mesh in host memory
///
/// The renderer transforms vertices into world space while appending them to
/// the mesh batch, so one mesh can be drawn many times per frame with
/// different transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex records
    pub vertices: Vec<MeshVertexData>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// A unit cube centered at the origin
    pub fn cube() -> Self {
        // Six faces, four vertices each, with per-face normals.
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            // (normal, tangent u, tangent v)
            (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        ];
        let corners = [
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ];
        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (face, (normal, u, v)) in faces.iter().enumerate() {
            let base = (face * 4) as u32;
            for (corner, uv) in corners.iter().zip(uvs.iter()) {
                vertices.push(MeshVertexData {
                    position: normal * 0.5 + u * corner.x + v * corner.y,
                    normal: *normal,
                    uv: *uv,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        Self { vertices, indices }
    }

    /// A unit plane in the XZ plane facing +Y
    pub fn plane() -> Self {
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let vertices = vec![
            MeshVertexData {
                position: Vec3::new(-0.5, 0.0, 0.5),
                normal,
                uv: Vec2::new(0.0, 0.0),
            },
            MeshVertexData {
                position: Vec3::new(0.5, 0.0, 0.5),
                normal,
                uv: Vec2::new(1.0, 0.0),
            },
            MeshVertexData {
                position: Vec3::new(0.5, 0.0, -0.5),
                normal,
                uv: Vec2::new(1.0, 1.0),
            },
            MeshVertexData {
                position: Vec3::new(-0.5, 0.0, -0.5),
                normal,
                uv: Vec2::new(0.0, 1.0),
            },
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_expected_topology() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn plane_faces_up() {
        let plane = Mesh::plane();
        assert!(plane.vertices.iter().all(|v| v.normal.y == 1.0));
    }
}
