//! CPU-side recording backend
//!
//! Implements the full [`RenderBackend`] contract without touching a GPU.
//! Resource registries, buffer sizes, and per-attachment integer clear
//! values are tracked host-side so the test suite can observe framebuffer
//! readback, storage growth, and pipeline ordering on machines with no
//! graphics device. `sandbox_app` runs on it for the same reason.

use crate::render::api::{
    BufferId, BufferKind, ClearFlags, CompareFunc, CullFace, FramebufferId, PolygonMode,
    RenderBackend, ShaderId, TextureId, TextureSpec, VertexArrayId, VertexLayout,
};
use crate::render::RenderResult;
use slotmap::SlotMap;
use std::collections::HashMap;

#[derive(Debug)]
struct HeadlessBuffer {
    #[allow(dead_code)]
    kind: BufferKind,
    size: usize,
    #[allow(dead_code)]
    binding: Option<u32>,
}

#[derive(Debug)]
struct HeadlessTexture {
    native_handle: u64,
    #[allow(dead_code)]
    spec: TextureSpec,
}

#[derive(Debug)]
struct HeadlessFramebuffer {
    color_attachments: Vec<TextureId>,
    #[allow(dead_code)]
    depth_attachment: Option<TextureId>,
}

#[derive(Debug)]
struct HeadlessVertexArray {
    index_count: Option<u32>,
}

/// Recording backend with no GPU behind it
pub struct HeadlessBackend {
    buffers: SlotMap<BufferId, HeadlessBuffer>,
    textures: SlotMap<TextureId, HeadlessTexture>,
    framebuffers: SlotMap<FramebufferId, HeadlessFramebuffer>,
    vertex_arrays: SlotMap<VertexArrayId, HeadlessVertexArray>,
    shaders: SlotMap<ShaderId, String>,
    /// Last integer clear value per (framebuffer, attachment); read back by
    /// `read_pixel_i32` since nothing rasterizes here.
    attachment_clears: HashMap<(FramebufferId, usize), i32>,
    next_native_handle: u64,
}

impl HeadlessBackend {
    /// Create an empty recording backend
    pub fn new() -> Self {
        Self {
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            vertex_arrays: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            attachment_clears: HashMap::new(),
            next_native_handle: 1,
        }
    }

    /// Allocated size of a buffer, for growth-policy tests
    pub fn buffer_size(&self, buffer: BufferId) -> usize {
        self.buffers.get(buffer).map_or(0, |b| b.size)
    }

    /// Number of live textures, for leak tests across resize cycles
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn set_viewport(&mut self, _x: u32, _y: u32, _width: u32, _height: u32) {}

    fn set_clear_color(&mut self, _color: [f32; 4]) {}

    fn clear(&mut self, _flags: ClearFlags) {}

    fn set_depth_test(&mut self, _enabled: bool) {}

    fn set_depth_func(&mut self, _func: CompareFunc) {}

    fn set_culling(&mut self, _enabled: bool) {}

    fn set_cull_face(&mut self, _face: CullFace) {}

    fn set_stencil_mask(&mut self, _mask: u32) {}

    fn set_stencil_func(&mut self, _func: CompareFunc, _reference: i32, _mask: u32) {}

    fn set_line_width(&mut self, _width: f32) {}

    fn set_point_size(&mut self, _size: f32) {}

    fn set_polygon_mode(&mut self, _mode: PolygonMode) {}

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: usize,
        binding: Option<u32>,
        _initial: Option<&[u8]>,
    ) -> RenderResult<BufferId> {
        Ok(self.buffers.insert(HeadlessBuffer { kind, size, binding }))
    }

    fn buffer_set_data(&mut self, buffer: BufferId, offset: usize, data: &[u8]) {
        let Some(entry) = self.buffers.get(buffer) else {
            return;
        };
        debug_assert!(
            offset + data.len() <= entry.size,
            "buffer upload of {} bytes at offset {offset} exceeds capacity {}",
            data.len(),
            entry.size
        );
    }

    fn buffer_resize(&mut self, buffer: BufferId, size: usize) {
        if let Some(entry) = self.buffers.get_mut(buffer) {
            entry.size = size;
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(buffer);
    }

    fn create_vertex_array(
        &mut self,
        _vertex_buffer: BufferId,
        index_buffer: Option<BufferId>,
        _layout: &VertexLayout,
    ) -> RenderResult<VertexArrayId> {
        let index_count = index_buffer
            .and_then(|id| self.buffers.get(id))
            .map(|b| (b.size / std::mem::size_of::<u32>()) as u32);
        Ok(self.vertex_arrays.insert(HeadlessVertexArray { index_count }))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.vertex_arrays.remove(vertex_array);
    }

    fn create_texture(&mut self, spec: &TextureSpec, _data: Option<&[u8]>) -> RenderResult<TextureId> {
        let native_handle = self.next_native_handle;
        self.next_native_handle += 1;
        Ok(self.textures.insert(HeadlessTexture {
            native_handle,
            spec: *spec,
        }))
    }

    fn create_cubemap(
        &mut self,
        spec: &TextureSpec,
        _faces: Option<&[&[u8]; 6]>,
    ) -> RenderResult<TextureId> {
        self.create_texture(spec, None)
    }

    fn bind_texture(&mut self, _texture: TextureId, _slot: u32) {}

    fn texture_native_handle(&self, texture: TextureId) -> u64 {
        self.textures.get(texture).map_or(0, |t| t.native_handle)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }

    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureId],
        depth_attachment: Option<TextureId>,
    ) -> RenderResult<FramebufferId> {
        Ok(self.framebuffers.insert(HeadlessFramebuffer {
            color_attachments: color_attachments.to_vec(),
            depth_attachment,
        }))
    }

    fn bind_framebuffer(&mut self, _framebuffer: Option<FramebufferId>) {}

    fn set_draw_buffers(&mut self, framebuffer: FramebufferId, enabled: &[usize]) {
        if let Some(fb) = self.framebuffers.get(framebuffer) {
            for &index in enabled {
                debug_assert!(
                    index < fb.color_attachments.len(),
                    "draw-buffer index {index} out of range"
                );
            }
        }
    }

    fn read_pixel_i32(
        &mut self,
        framebuffer: FramebufferId,
        attachment: usize,
        _x: u32,
        _y: u32,
    ) -> i32 {
        self.attachment_clears
            .get(&(framebuffer, attachment))
            .copied()
            .unwrap_or(0)
    }

    fn clear_attachment_i32(&mut self, framebuffer: FramebufferId, attachment: usize, value: i32) {
        if let Some(fb) = self.framebuffers.get(framebuffer) {
            debug_assert!(
                attachment < fb.color_attachments.len(),
                "attachment index {attachment} out of range"
            );
        }
        self.attachment_clears.insert((framebuffer, attachment), value);
    }

    fn blit_color(
        &mut self,
        _src: FramebufferId,
        _src_attachment: usize,
        _dst: FramebufferId,
        _width: u32,
        _height: u32,
    ) {
    }

    fn blit_depth(&mut self, _src: FramebufferId, _dst: FramebufferId, _width: u32, _height: u32) {}

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.framebuffers.remove(framebuffer);
        self.attachment_clears.retain(|(fb, _), _| *fb != framebuffer);
    }

    fn create_shader(
        &mut self,
        name: &str,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> RenderResult<ShaderId> {
        Ok(self.shaders.insert(name.to_string()))
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(shader);
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, _shader: ShaderId, index_count: Option<u32>) {
        debug_assert!(
            index_count.is_some()
                || self
                    .vertex_arrays
                    .get(vertex_array)
                    .is_some_and(|va| va.index_count.is_some()),
            "indexed draw without an index buffer or explicit count"
        );
    }

    fn draw_lines(&mut self, _vertex_array: VertexArrayId, _shader: ShaderId, _vertex_count: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{TextureFilter, TextureFormat};

    fn spec() -> TextureSpec {
        TextureSpec {
            width: 4,
            height: 4,
            format: TextureFormat::RedInteger,
            filter: TextureFilter::Nearest,
            repeat: false,
        }
    }

    #[test]
    fn attachment_clear_round_trips_through_read_pixel() {
        let mut backend = HeadlessBackend::new();
        let tex = backend.create_texture(&spec(), None).unwrap();
        let fb = backend.create_framebuffer(&[tex], None).unwrap();
        backend.clear_attachment_i32(fb, 0, -1);
        assert_eq!(backend.read_pixel_i32(fb, 0, 2, 2), -1);
        backend.clear_attachment_i32(fb, 0, 7);
        assert_eq!(backend.read_pixel_i32(fb, 0, 0, 0), 7);
    }

    #[test]
    fn destroying_a_framebuffer_drops_its_clear_state() {
        let mut backend = HeadlessBackend::new();
        let tex = backend.create_texture(&spec(), None).unwrap();
        let fb = backend.create_framebuffer(&[tex], None).unwrap();
        backend.clear_attachment_i32(fb, 0, -1);
        backend.destroy_framebuffer(fb);
        assert_eq!(backend.read_pixel_i32(fb, 0, 0, 0), 0);
    }

    #[test]
    fn buffer_resize_updates_tracked_size() {
        let mut backend = HeadlessBackend::new();
        let buf = backend
            .create_buffer(BufferKind::Storage, 64, Some(0), None)
            .unwrap();
        assert_eq!(backend.buffer_size(buf), 64);
        backend.buffer_resize(buf, 256);
        assert_eq!(backend.buffer_size(buf), 256);
    }
}
