//! # Batch Accumulation
//!
//! Host-side staging for the per-frame accumulate-and-flush protocol. Each
//! primitive family owns a pre-allocated, fixed-capacity staging arena
//! indexed by its batch counters; capacity checks live at the top of every
//! draw operation so "may trigger a draw call" is an explicit, testable
//! precondition rather than a side effect buried in an append.
//!
//! ## Families
//!
//! Quads and circles share the precomputed quad index pattern; lines are a
//! raw line list; meshes and outlines carry their own index staging with
//! base-vertex offsetting.

mod vertex;

pub use vertex::{
    CircleVertex, LineVertex, MeshVertex, QuadVertex, MAX_LINE_VERTICES, MAX_MESH_INDICES,
    MAX_MESH_VERTICES, MAX_QUADS, MAX_QUAD_INDICES, MAX_QUAD_VERTICES, MAX_TEXTURE_SLOTS,
    MAX_TRIANGLES,
};

use crate::render::api::{RenderBackend, TextureId};
use bytemuck::{Pod, Zeroable};

/// Cumulative per-frame draw statistics for the on-screen HUD
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// GPU draw calls issued this frame (batch flushes and pipeline passes)
    pub draw_calls: u32,
    /// Quads submitted
    pub quad_count: u32,
    /// Circles submitted
    pub circle_count: u32,
    /// Lines submitted
    pub line_count: u32,
    /// Meshes submitted
    pub mesh_count: u32,
    /// Mesh outlines submitted (editor selection)
    pub outline_count: u32,
    /// Total vertices staged
    pub total_vertex_count: u32,
    /// Total indices staged
    pub total_index_count: u32,
}

impl RenderStats {
    /// Zero all counters; called at the start of every frame
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fixed-capacity staging arena for one vertex family
#[derive(Debug)]
pub struct VertexArena<V: Pod> {
    staging: Box<[V]>,
    count: usize,
}

impl<V: Pod> VertexArena<V> {
    /// Allocate an arena of `capacity` vertices
    pub fn new(capacity: usize) -> Self {
        Self {
            staging: vec![V::zeroed(); capacity].into_boxed_slice(),
            count: 0,
        }
    }

    /// Whether `additional` more vertices would exceed capacity
    pub fn would_overflow(&self, additional: usize) -> bool {
        self.count + additional > self.staging.len()
    }

    /// Append a vertex at the current counter
    ///
    /// The caller has already performed the capacity check; overflow here is
    /// a protocol violation.
    pub fn push(&mut self, vertex: V) {
        debug_assert!(self.count < self.staging.len(), "vertex arena overflow");
        self.staging[self.count] = vertex;
        self.count += 1;
    }

    /// Vertices staged so far
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Staged vertex slice for upload
    pub fn staged(&self) -> &[V] {
        &self.staging[..self.count]
    }

    /// Reset the counter; capacity and allocation are untouched
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Staging for the indexed mesh families (meshes and outlines)
#[derive(Debug)]
pub struct MeshArena<V: Pod> {
    /// Vertex staging
    pub vertices: VertexArena<V>,
    indices: Box<[u32]>,
    index_count: usize,
}

impl<V: Pod> MeshArena<V> {
    /// Allocate an arena with separate vertex and index capacities
    pub fn new(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: VertexArena::new(vertex_capacity),
            indices: vec![0; index_capacity].into_boxed_slice(),
            index_count: 0,
        }
    }

    /// Whether appending a mesh of the given size would exceed either bound
    pub fn would_overflow(&self, vertex_count: usize, index_count: usize) -> bool {
        self.vertices.would_overflow(vertex_count)
            || self.index_count + index_count > self.indices.len()
    }

    /// Append one index, offset by the current base vertex
    pub fn push_index(&mut self, base_vertex: u32, index: u32) {
        debug_assert!(self.index_count < self.indices.len(), "index arena overflow");
        self.indices[self.index_count] = base_vertex + index;
        self.index_count += 1;
    }

    /// Base vertex for the next appended mesh
    pub fn base_vertex(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Indices staged so far
    pub fn index_len(&self) -> usize {
        self.index_count
    }

    /// Staged index slice for upload
    pub fn staged_indices(&self) -> &[u32] {
        &self.indices[..self.index_count]
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Reset both counters
    pub fn reset(&mut self) {
        self.vertices.reset();
        self.index_count = 0;
    }
}

/// Result of asking the slot table for a texture's slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAssignment {
    /// The texture already occupies this slot
    Existing(i32),
    /// The texture was inserted into this fresh slot
    Inserted(i32),
    /// The table is full; the caller must flush, reset, and retry
    Full,
}

/// Ordered, fixed-capacity mapping from slot index to bound texture
///
/// Slot 0 permanently holds the 1x1 white "no texture" fallback. A texture
/// already resident is reused by identity, never bound twice. Assignments are
/// scene-lifetime-scoped: the table resets at scene begin and when a full
/// table forces a flush, never on a plain vertex-overflow flush.
#[derive(Debug)]
pub struct TextureSlotTable {
    slots: [Option<TextureId>; MAX_TEXTURE_SLOTS],
    count: usize,
    white: TextureId,
}

impl TextureSlotTable {
    /// Create the table with `white` permanently in slot 0
    pub fn new(white: TextureId) -> Self {
        let mut table = Self {
            slots: [None; MAX_TEXTURE_SLOTS],
            count: 0,
            white,
        };
        table.reset();
        table
    }

    /// Clear every slot except slot 0
    pub fn reset(&mut self) {
        self.slots = [None; MAX_TEXTURE_SLOTS];
        self.slots[0] = Some(self.white);
        self.count = 1;
    }

    /// Find or insert a slot for `texture`
    pub fn slot_for(&mut self, texture: TextureId) -> SlotAssignment {
        for (index, slot) in self.slots[..self.count].iter().enumerate() {
            if *slot == Some(texture) {
                return SlotAssignment::Existing(index as i32);
            }
        }
        if self.count == MAX_TEXTURE_SLOTS {
            return SlotAssignment::Full;
        }
        let index = self.count;
        self.slots[index] = Some(texture);
        self.count += 1;
        SlotAssignment::Inserted(index as i32)
    }

    /// Occupied slot count, including the white fallback
    pub fn occupied(&self) -> usize {
        self.count
    }

    /// Bind every occupied slot on the backend
    pub fn bind_all(&self, backend: &mut dyn RenderBackend) {
        for (index, slot) in self.slots[..self.count].iter().enumerate() {
            if let Some(texture) = slot {
                backend.bind_texture(*texture, index as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{TextureFilter, TextureFormat, TextureSpec};
    use crate::render::backends::HeadlessBackend;

    fn make_texture(backend: &mut HeadlessBackend) -> TextureId {
        backend
            .create_texture(
                &TextureSpec {
                    width: 1,
                    height: 1,
                    format: TextureFormat::Rgba8,
                    filter: TextureFilter::Linear,
                    repeat: false,
                },
                None,
            )
            .unwrap()
    }

    #[test]
    fn arena_reports_overflow_before_append() {
        let mut arena: VertexArena<QuadVertex> = VertexArena::new(8);
        assert!(!arena.would_overflow(8));
        assert!(arena.would_overflow(9));
        for _ in 0..8 {
            arena.push(QuadVertex::zeroed());
        }
        assert!(arena.would_overflow(1));
        arena.reset();
        assert!(!arena.would_overflow(8));
        assert!(arena.is_empty());
    }

    #[test]
    fn mesh_arena_offsets_indices_by_base_vertex() {
        let mut arena: MeshArena<MeshVertex> = MeshArena::new(16, 32);
        for _ in 0..4 {
            arena.vertices.push(MeshVertex::zeroed());
        }
        let base = arena.base_vertex();
        assert_eq!(base, 4);
        for i in [0, 1, 2, 2, 3, 0] {
            arena.push_index(base, i);
        }
        assert_eq!(arena.staged_indices(), &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn slot_table_deduplicates_by_identity() {
        let mut backend = HeadlessBackend::new();
        let white = make_texture(&mut backend);
        let texture = make_texture(&mut backend);
        let mut table = TextureSlotTable::new(white);

        assert_eq!(table.slot_for(texture), SlotAssignment::Inserted(1));
        assert_eq!(table.slot_for(texture), SlotAssignment::Existing(1));
        assert_eq!(table.occupied(), 2);
    }

    #[test]
    fn white_fallback_is_always_slot_zero() {
        let mut backend = HeadlessBackend::new();
        let white = make_texture(&mut backend);
        let mut table = TextureSlotTable::new(white);
        assert_eq!(table.slot_for(white), SlotAssignment::Existing(0));
        table.reset();
        assert_eq!(table.occupied(), 1);
        assert_eq!(table.slot_for(white), SlotAssignment::Existing(0));
    }

    #[test]
    fn thirty_two_distinct_textures_fill_the_table() {
        let mut backend = HeadlessBackend::new();
        let white = make_texture(&mut backend);
        let mut table = TextureSlotTable::new(white);

        // 31 distinct textures fit alongside the white fallback.
        for i in 0..(MAX_TEXTURE_SLOTS - 1) {
            let texture = make_texture(&mut backend);
            assert_eq!(table.slot_for(texture), SlotAssignment::Inserted(i as i32 + 1));
        }
        assert_eq!(table.occupied(), MAX_TEXTURE_SLOTS);

        // The next distinct texture reports a full table; after a reset it
        // lands in slot 1.
        let overflow = make_texture(&mut backend);
        assert_eq!(table.slot_for(overflow), SlotAssignment::Full);
        table.reset();
        assert_eq!(table.slot_for(overflow), SlotAssignment::Inserted(1));
    }

    #[test]
    fn stats_reset_zeroes_all_counters() {
        let mut stats = RenderStats {
            draw_calls: 12,
            quad_count: 400,
            ..Default::default()
        };
        stats.reset();
        assert_eq!(stats, RenderStats::default());
    }
}
