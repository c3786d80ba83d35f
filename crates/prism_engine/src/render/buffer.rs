//! GPU buffer resources
//!
//! Thin ownership wrappers over backend buffer handles. Vertex and index
//! buffers come in two flavors: pre-sized empty for per-frame streaming
//! writes, or pre-populated for static geometry (the skybox cube and the
//! full-screen quad). Uniform and storage buffers are addressed by numeric
//! binding slots fixed at creation; one binding maps to exactly one semantic
//! struct for the renderer's lifetime.

use crate::render::api::{BufferId, BufferKind, RenderBackend};
use crate::render::RenderResult;
use bytemuck::Pod;

/// Vertex buffer holding one primitive family's GPU-side vertex stream
#[derive(Debug)]
pub struct VertexBuffer {
    id: BufferId,
    capacity: usize,
}

impl VertexBuffer {
    /// Create a streaming vertex buffer of `capacity` bytes
    pub fn new(backend: &mut dyn RenderBackend, capacity: usize) -> RenderResult<Self> {
        let id = backend.create_buffer(BufferKind::Vertex, capacity, None, None)?;
        Ok(Self { id, capacity })
    }

    /// Create a static vertex buffer pre-populated with `data`
    pub fn with_data(backend: &mut dyn RenderBackend, data: &[u8]) -> RenderResult<Self> {
        let id = backend.create_buffer(BufferKind::Vertex, data.len(), None, Some(data))?;
        Ok(Self {
            id,
            capacity: data.len(),
        })
    }

    /// Overwrite byte range `[0, data.len())`
    ///
    /// `data.len()` must not exceed the allocated capacity; that is a caller
    /// contract violation, not a runtime condition.
    pub fn set_data(&self, backend: &mut dyn RenderBackend, data: &[u8]) {
        debug_assert!(
            data.len() <= self.capacity,
            "vertex upload of {} bytes exceeds capacity {}",
            data.len(),
            self.capacity
        );
        backend.buffer_set_data(self.id, 0, data);
    }

    /// Backend handle
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Allocated capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release the GPU allocation
    pub fn destroy(self, backend: &mut dyn RenderBackend) {
        backend.destroy_buffer(self.id);
    }
}

/// Index buffer of 32-bit indices
#[derive(Debug)]
pub struct IndexBuffer {
    id: BufferId,
    index_count: u32,
}

impl IndexBuffer {
    /// Create a streaming index buffer able to hold `max_indices` indices
    pub fn new(backend: &mut dyn RenderBackend, max_indices: usize) -> RenderResult<Self> {
        let id = backend.create_buffer(
            BufferKind::Index,
            max_indices * std::mem::size_of::<u32>(),
            None,
            None,
        )?;
        Ok(Self {
            id,
            index_count: max_indices as u32,
        })
    }

    /// Create a static index buffer pre-populated with `indices`
    pub fn with_data(backend: &mut dyn RenderBackend, indices: &[u32]) -> RenderResult<Self> {
        let id = backend.create_buffer(
            BufferKind::Index,
            indices.len() * std::mem::size_of::<u32>(),
            None,
            Some(bytemuck::cast_slice(indices)),
        )?;
        Ok(Self {
            id,
            index_count: indices.len() as u32,
        })
    }

    /// Overwrite the first `indices.len()` indices
    pub fn set_data(&self, backend: &mut dyn RenderBackend, indices: &[u32]) {
        debug_assert!(
            indices.len() as u32 <= self.index_count,
            "index upload of {} exceeds capacity {}",
            indices.len(),
            self.index_count
        );
        backend.buffer_set_data(self.id, 0, bytemuck::cast_slice(indices));
    }

    /// Backend handle
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Number of indices the buffer holds
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Release the GPU allocation
    pub fn destroy(self, backend: &mut dyn RenderBackend) {
        backend.destroy_buffer(self.id);
    }
}

/// Uniform buffer of fixed byte size bound to a binding slot at creation
#[derive(Debug)]
pub struct UniformBuffer {
    id: BufferId,
    size: usize,
    binding: u32,
}

impl UniformBuffer {
    /// Create a uniform buffer of `size` bytes at `binding`
    pub fn new(backend: &mut dyn RenderBackend, size: usize, binding: u32) -> RenderResult<Self> {
        let id = backend.create_buffer(BufferKind::Uniform, size, Some(binding), None)?;
        Ok(Self { id, size, binding })
    }

    /// Push a full or partial host struct to the device
    pub fn set_data<T: Pod>(&self, backend: &mut dyn RenderBackend, value: &T) {
        let bytes = bytemuck::bytes_of(value);
        debug_assert!(
            bytes.len() <= self.size,
            "uniform upload of {} bytes exceeds block size {}",
            bytes.len(),
            self.size
        );
        backend.buffer_set_data(self.id, 0, bytes);
    }

    /// Binding slot this buffer was created with
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Block size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Release the GPU allocation
    pub fn destroy(self, backend: &mut dyn RenderBackend) {
        backend.destroy_buffer(self.id);
    }
}

/// Storage buffer resizable at runtime, for variable-length per-frame data
///
/// Growth-only: capacity never shrinks, so light counts fluctuating near a
/// boundary don't cause per-frame reallocation churn.
#[derive(Debug)]
pub struct StorageBuffer {
    id: BufferId,
    size: usize,
    binding: u32,
}

impl StorageBuffer {
    /// Create a storage buffer of `size` bytes at `binding`
    pub fn new(backend: &mut dyn RenderBackend, size: usize, binding: u32) -> RenderResult<Self> {
        let id = backend.create_buffer(BufferKind::Storage, size, Some(binding), None)?;
        Ok(Self { id, size, binding })
    }

    /// Grow the buffer to hold at least `size` bytes
    ///
    /// Requests smaller than the current capacity are ignored.
    pub fn set_size(&mut self, backend: &mut dyn RenderBackend, size: usize) {
        if size <= self.size {
            return;
        }
        backend.buffer_resize(self.id, size);
        self.size = size;
    }

    /// Upload a slice of Pod records starting at byte 0
    ///
    /// The slice must fit the current capacity; callers grow first via
    /// [`StorageBuffer::set_size`].
    pub fn set_data<T: Pod>(&self, backend: &mut dyn RenderBackend, values: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        debug_assert!(
            bytes.len() <= self.size,
            "storage upload of {} bytes exceeds capacity {}",
            bytes.len(),
            self.size
        );
        backend.buffer_set_data(self.id, 0, bytes);
    }

    /// Current capacity in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Binding slot this buffer was created with
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Release the GPU allocation
    pub fn destroy(self, backend: &mut dyn RenderBackend) {
        backend.destroy_buffer(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn storage_buffer_grows_but_never_shrinks() {
        let mut backend = HeadlessBackend::new();
        let mut buffer = StorageBuffer::new(&mut backend, 128, 0).unwrap();
        assert_eq!(buffer.size(), 128);

        buffer.set_size(&mut backend, 512);
        assert_eq!(buffer.size(), 512);

        // Shrink requests are ignored by policy.
        buffer.set_size(&mut backend, 64);
        assert_eq!(buffer.size(), 512);
        assert_eq!(backend.buffer_size(buffer.id), 512);
    }

    #[test]
    fn static_index_buffer_tracks_count() {
        let mut backend = HeadlessBackend::new();
        let indices = [0u32, 1, 2, 2, 3, 0];
        let buffer = IndexBuffer::with_data(&mut backend, &indices).unwrap();
        assert_eq!(buffer.index_count(), 6);
    }

    #[test]
    fn uniform_upload_within_block_size() {
        let mut backend = HeadlessBackend::new();
        let buffer = UniformBuffer::new(&mut backend, 64, 1).unwrap();
        let value = [0.0f32; 16];
        buffer.set_data(&mut backend, &value);
        assert_eq!(buffer.binding(), 1);
        assert_eq!(buffer.size(), 64);
    }
}
