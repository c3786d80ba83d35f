//! Backend abstraction traits for the rendering system
//!
//! This module defines the contract rendering backends implement so the
//! batching core and pass pipeline contain zero backend-specific code paths.
//!
//! ## Contract
//!
//! Every operation is synchronous from the caller's perspective; no fences or
//! submission objects are exposed upward. Resource creation returns opaque
//! `slotmap` handles owned by the backend. Out-of-range slot or attachment
//! indices are programmer errors and are enforced with debug assertions, not
//! runtime error codes.

use crate::render::RenderResult;
use bitflags::bitflags;
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a GPU buffer owned by the backend
    pub struct BufferId;
    /// Handle to a GPU texture (2D or cubemap) owned by the backend
    pub struct TextureId;
    /// Handle to an offscreen framebuffer object
    pub struct FramebufferId;
    /// Handle to a linked shader program
    pub struct ShaderId;
    /// Handle to a vertex-array binding (vertex buffer + layout + index buffer)
    pub struct VertexArrayId;
}

/// What a buffer is used for; determines its GPU bind target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex attribute data
    Vertex,
    /// 32-bit triangle indices
    Index,
    /// Fixed-size uniform block bound to a numeric binding slot
    Uniform,
    /// Resizable storage block bound to a numeric binding slot
    Storage,
}

/// Texel formats supported for textures and framebuffer attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 8-bit normalized RGBA
    Rgba8,
    /// 16-bit float RGBA (HDR color targets)
    Rgba16F,
    /// 16-bit float single channel (ambient occlusion)
    R16F,
    /// 16-bit float two channel (BRDF lookup)
    Rg16F,
    /// 32-bit signed integer single channel (entity-id picking)
    RedInteger,
    /// Combined 24-bit depth + 8-bit stencil
    Depth24Stencil8,
}

impl TextureFormat {
    /// Whether this format belongs on the depth/stencil attachment
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth24Stencil8)
    }
}

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest-texel sampling
    Nearest,
    /// Bilinear sampling
    Linear,
}

/// Parameters for creating a texture
#[derive(Debug, Clone, Copy)]
pub struct TextureSpec {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
    /// Min/mag filter
    pub filter: TextureFilter,
    /// Whether texture coordinates repeat (tiling) or clamp to edge
    pub repeat: bool,
}

/// Polygon rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    /// Filled triangles
    Fill,
    /// Wireframe edges
    Line,
    /// Vertices as points
    Point,
}

/// Which triangle faces get culled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Cull front faces (used by the outline pass)
    Front,
    /// Cull back faces (the steady-state default)
    Back,
}

/// Comparison function for depth and stencil tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    /// Never passes
    Never,
    /// Passes if incoming < stored
    Less,
    /// Passes if incoming <= stored (skybox depth trick)
    LessEqual,
    /// Passes if incoming == stored
    Equal,
    /// Passes if incoming != stored
    NotEqual,
    /// Passes if incoming > stored
    Greater,
    /// Passes if incoming >= stored
    GreaterEqual,
    /// Always passes
    Always,
}

bitflags! {
    /// Which buffers a clear operation touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color attachments
        const COLOR = 1 << 0;
        /// Depth buffer
        const DEPTH = 1 << 1;
        /// Stencil buffer
        const STENCIL = 1 << 2;
    }
}

/// A single vertex attribute within a [`VertexLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexAttributeFormat {
    /// One 32-bit float
    Float,
    /// Two 32-bit floats
    Float2,
    /// Three 32-bit floats
    Float3,
    /// Four 32-bit floats
    Float4,
    /// One 32-bit signed integer (texture slot / entity id)
    Int,
}

impl VertexAttributeFormat {
    /// Number of scalar components
    pub fn component_count(self) -> u32 {
        match self {
            Self::Float | Self::Int => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
        }
    }

    /// Size of the attribute in bytes
    pub fn byte_size(self) -> u32 {
        self.component_count() * 4
    }
}

/// Ordered attribute layout of one vertex record
///
/// Attribute offsets are derived from declaration order, so the layout must
/// match the host-side `#[repr(C)]` vertex struct exactly.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    attributes: Vec<VertexAttributeFormat>,
    stride: u32,
}

impl VertexLayout {
    /// Build a layout from an ordered attribute list
    pub fn new(attributes: &[VertexAttributeFormat]) -> Self {
        let stride = attributes.iter().map(|a| a.byte_size()).sum();
        Self {
            attributes: attributes.to_vec(),
            stride,
        }
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> &[VertexAttributeFormat] {
        &self.attributes
    }

    /// Distance in bytes between consecutive vertex records
    pub fn stride(&self) -> u32 {
        self.stride
    }
}

/// Main rendering backend trait
///
/// Abstracts over graphics APIs so the renderer core stays portable. The
/// batching hot path never crosses this boundary; only flushes and pass
/// orchestration do, a handful of calls per frame.
pub trait RenderBackend {
    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;

    // --- rasterizer state ---

    /// Set the viewport rectangle in pixels
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Set the color used by subsequent color clears
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Clear the selected buffers of the currently bound target
    fn clear(&mut self, flags: ClearFlags);

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Set the depth comparison function
    fn set_depth_func(&mut self, func: CompareFunc);

    /// Enable or disable face culling
    fn set_culling(&mut self, enabled: bool);

    /// Select which faces are culled while culling is enabled
    fn set_cull_face(&mut self, face: CullFace);

    /// Set the stencil write mask
    fn set_stencil_mask(&mut self, mask: u32);

    /// Set the stencil comparison function
    fn set_stencil_func(&mut self, func: CompareFunc, reference: i32, mask: u32);

    /// Set rasterized line width in pixels
    fn set_line_width(&mut self, width: f32);

    /// Set rasterized point size in pixels
    fn set_point_size(&mut self, size: f32);

    /// Set the polygon fill mode
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    // --- buffers ---

    /// Create a buffer, optionally pre-populated with initial data
    ///
    /// `binding` is required for uniform and storage buffers and ignored for
    /// vertex and index buffers.
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: usize,
        binding: Option<u32>,
        initial: Option<&[u8]>,
    ) -> RenderResult<BufferId>;

    /// Overwrite byte range `[offset, offset + data.len())` of a buffer
    ///
    /// Exceeding the buffer's allocated capacity is a caller contract
    /// violation enforced by a debug assertion.
    fn buffer_set_data(&mut self, buffer: BufferId, offset: usize, data: &[u8]);

    /// Reallocate a buffer to a new size, discarding its contents
    ///
    /// Used by the growth-only storage buffer policy; rebinding to the
    /// buffer's binding slot is the backend's responsibility.
    fn buffer_resize(&mut self, buffer: BufferId, size: usize);

    /// Destroy a buffer and release its GPU memory
    fn destroy_buffer(&mut self, buffer: BufferId);

    // --- vertex arrays ---

    /// Bind a vertex buffer, its attribute layout, and an optional index
    /// buffer into a drawable vertex array
    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferId,
        index_buffer: Option<BufferId>,
        layout: &VertexLayout,
    ) -> RenderResult<VertexArrayId>;

    /// Destroy a vertex array (the referenced buffers survive)
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayId);

    // --- textures ---

    /// Create a 2D texture, optionally uploading initial texel data
    fn create_texture(&mut self, spec: &TextureSpec, data: Option<&[u8]>) -> RenderResult<TextureId>;

    /// Create a cubemap from six face images (+X, -X, +Y, -Y, +Z, -Z)
    fn create_cubemap(
        &mut self,
        spec: &TextureSpec,
        faces: Option<&[&[u8]; 6]>,
    ) -> RenderResult<TextureId>;

    /// Bind a texture to a numeric texture slot
    fn bind_texture(&mut self, texture: TextureId, slot: u32);

    /// Opaque native handle for UI image display (e.g. an editor viewport)
    fn texture_native_handle(&self, texture: TextureId) -> u64;

    /// Destroy a texture and release its GPU memory
    fn destroy_texture(&mut self, texture: TextureId);

    // --- framebuffers ---

    /// Assemble color attachments and an optional depth attachment into a
    /// framebuffer; incompleteness is a fatal configuration error
    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureId],
        depth_attachment: Option<TextureId>,
    ) -> RenderResult<FramebufferId>;

    /// Bind a framebuffer as the draw target; `None` restores the default
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    /// Select which color attachments receive fragment output
    ///
    /// `enabled` lists attachment indices in fragment-output order.
    fn set_draw_buffers(&mut self, framebuffer: FramebufferId, enabled: &[usize]);

    /// Synchronous single-texel readback from an integer color attachment
    fn read_pixel_i32(
        &mut self,
        framebuffer: FramebufferId,
        attachment: usize,
        x: u32,
        y: u32,
    ) -> i32;

    /// Clear one integer color attachment to a constant value
    ///
    /// Precondition: all color attachments are currently enabled, so the
    /// draw-buffer index equals the attachment index.
    fn clear_attachment_i32(&mut self, framebuffer: FramebufferId, attachment: usize, value: i32);

    /// Blit one color attachment into attachment 0 of another framebuffer
    fn blit_color(
        &mut self,
        src: FramebufferId,
        src_attachment: usize,
        dst: FramebufferId,
        width: u32,
        height: u32,
    );

    /// Blit the depth attachment into another framebuffer of compatible size
    fn blit_depth(&mut self, src: FramebufferId, dst: FramebufferId, width: u32, height: u32);

    /// Destroy a framebuffer object (attachment textures survive)
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferId);

    // --- shaders ---

    /// Compile and link a shader program from vertex + fragment sources
    ///
    /// Link failure is a fatal asset-authoring error surfaced at startup.
    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> RenderResult<ShaderId>;

    /// Destroy a shader program
    fn destroy_shader(&mut self, shader: ShaderId);

    // --- draws ---

    /// Draw indexed triangles from a vertex array
    ///
    /// `index_count` overrides the number of indices consumed; `None` draws
    /// the vertex array's full index buffer.
    fn draw_indexed(&mut self, vertex_array: VertexArrayId, shader: ShaderId, index_count: Option<u32>);

    /// Draw a raw line list by vertex count
    fn draw_lines(&mut self, vertex_array: VertexArrayId, shader: ShaderId, vertex_count: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_stride_sums_attribute_sizes() {
        let layout = VertexLayout::new(&[
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Float4,
            VertexAttributeFormat::Float2,
            VertexAttributeFormat::Int,
            VertexAttributeFormat::Int,
        ]);
        assert_eq!(layout.stride(), (3 + 4 + 2 + 1 + 1) * 4);
        assert_eq!(layout.attributes().len(), 5);
    }

    #[test]
    fn depth_formats_are_detected_by_tag() {
        assert!(TextureFormat::Depth24Stencil8.is_depth());
        assert!(!TextureFormat::Rgba8.is_depth());
        assert!(!TextureFormat::RedInteger.is_depth());
    }

    #[test]
    fn clear_flags_compose() {
        let all = ClearFlags::COLOR | ClearFlags::DEPTH | ClearFlags::STENCIL;
        assert!(all.contains(ClearFlags::DEPTH));
        assert!(!ClearFlags::COLOR.contains(ClearFlags::STENCIL));
    }
}
