//! Per-family vertex records and capacity constants
//!
//! Each record is `#[repr(C)]` and mirrors its family's GPU attribute layout
//! exactly; the layouts returned here are the single source of truth the
//! vertex arrays are built from. Host staging capacities derive from one
//! compile-time triangle bound.

use crate::render::api::{VertexAttributeFormat, VertexLayout};
use bytemuck::{Pod, Zeroable};

/// Upper bound on triangles per batch across all families
pub const MAX_TRIANGLES: usize = 200_000;
/// Quads per batch (two triangles each)
pub const MAX_QUADS: usize = MAX_TRIANGLES / 2;
/// Quad-family vertex capacity
pub const MAX_QUAD_VERTICES: usize = MAX_QUADS * 4;
/// Quad-family index capacity
pub const MAX_QUAD_INDICES: usize = MAX_QUADS * 6;
/// Line-family vertex capacity (two vertices per line)
pub const MAX_LINE_VERTICES: usize = MAX_TRIANGLES;
/// Mesh-family vertex capacity
pub const MAX_MESH_VERTICES: usize = MAX_TRIANGLES * 2;
/// Mesh-family index capacity
pub const MAX_MESH_INDICES: usize = MAX_TRIANGLES * 3;
/// Texture slots shared by one batch; slot 0 is the white fallback
pub const MAX_TEXTURE_SLOTS: usize = 32;

/// Quad family vertex record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Tint color
    pub color: [f32; 4],
    /// Texture coordinate (tiling pre-multiplied)
    pub uv: [f32; 2],
    /// Slot into the shared texture table
    pub tex_index: i32,
    /// Editor picking id; -1 = no entity
    pub entity_id: i32,
}

impl QuadVertex {
    /// GPU attribute layout matching this record
    pub fn layout() -> VertexLayout {
        VertexLayout::new(&[
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Float4,
            VertexAttributeFormat::Float2,
            VertexAttributeFormat::Int,
            VertexAttributeFormat::Int,
        ])
    }
}

/// Circle family vertex record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CircleVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Position within the unit quad, used for rim distance
    pub local_position: [f32; 2],
    /// Fill color
    pub color: [f32; 4],
    /// Ring thickness in unit-quad space (1 = filled disc)
    pub thickness: f32,
    /// Edge fade width
    pub fade: f32,
    /// Editor picking id; -1 = no entity
    pub entity_id: i32,
}

impl CircleVertex {
    /// GPU attribute layout matching this record
    pub fn layout() -> VertexLayout {
        VertexLayout::new(&[
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Float2,
            VertexAttributeFormat::Float4,
            VertexAttributeFormat::Float,
            VertexAttributeFormat::Float,
            VertexAttributeFormat::Int,
        ])
    }
}

/// Line family vertex record, also used by mesh outlines
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Line color
    pub color: [f32; 4],
    /// Editor picking id; -1 = no entity
    pub entity_id: i32,
}

impl LineVertex {
    /// GPU attribute layout matching this record
    pub fn layout() -> VertexLayout {
        VertexLayout::new(&[
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Float4,
            VertexAttributeFormat::Int,
        ])
    }
}

/// Mesh family vertex record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// World-space position
    pub position: [f32; 3],
    /// World-space normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
    /// Albedo tint
    pub color: [f32; 4],
    /// Metallic and roughness
    pub material: [f32; 2],
    /// Slot into the shared texture table
    pub tex_index: i32,
    /// Editor picking id; -1 = no entity
    pub entity_id: i32,
}

impl MeshVertex {
    /// GPU attribute layout matching this record
    pub fn layout() -> VertexLayout {
        VertexLayout::new(&[
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Float2,
            VertexAttributeFormat::Float4,
            VertexAttributeFormat::Float2,
            VertexAttributeFormat::Int,
            VertexAttributeFormat::Int,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes_match_their_layout_strides() {
        assert_eq!(std::mem::size_of::<QuadVertex>() as u32, QuadVertex::layout().stride());
        assert_eq!(
            std::mem::size_of::<CircleVertex>() as u32,
            CircleVertex::layout().stride()
        );
        assert_eq!(std::mem::size_of::<LineVertex>() as u32, LineVertex::layout().stride());
        assert_eq!(std::mem::size_of::<MeshVertex>() as u32, MeshVertex::layout().stride());
    }

    #[test]
    fn capacities_derive_from_the_triangle_bound() {
        assert_eq!(MAX_QUAD_VERTICES, MAX_QUADS * 4);
        assert_eq!(MAX_QUAD_INDICES, MAX_QUADS * 6);
        assert_eq!(MAX_QUADS * 2, MAX_TRIANGLES);
    }
}
