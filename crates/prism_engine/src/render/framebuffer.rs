//! Framebuffer / render target management
//!
//! Multi-attachment offscreen targets. Color attachment formats are listed in
//! order; depth formats are detected by tag and routed to the depth/stencil
//! attachment instead of a color slot. Every resize or spec change fully
//! reconstructs all attachment textures ("invalidate") so no stale attachment
//! state can survive — a simplicity/correctness tradeoff over in-place
//! resizing.

use crate::render::api::{
    FramebufferId, RenderBackend, TextureFilter, TextureFormat, TextureId, TextureSpec,
};
use crate::render::RenderResult;

/// Largest accepted framebuffer dimension, aligned with common GPU limits
pub const MAX_FRAMEBUFFER_SIZE: u32 = 8192;

/// Creation parameters for a [`Framebuffer`]
#[derive(Debug, Clone)]
pub struct FramebufferSpec {
    /// Attachment formats in order; depth formats route to the depth slot
    pub attachments: Vec<TextureFormat>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Multisample count (1 = disabled)
    pub samples: u32,
}

/// An offscreen render target owning one GPU texture per attachment
#[derive(Debug)]
pub struct Framebuffer {
    id: FramebufferId,
    color_formats: Vec<TextureFormat>,
    depth_format: Option<TextureFormat>,
    color_attachments: Vec<TextureId>,
    depth_attachment: Option<TextureId>,
    width: u32,
    height: u32,
    samples: u32,
}

impl Framebuffer {
    /// Create a framebuffer from a spec
    pub fn new(backend: &mut dyn RenderBackend, spec: &FramebufferSpec) -> RenderResult<Self> {
        let mut color_formats = Vec::new();
        let mut depth_format = None;
        for format in &spec.attachments {
            if format.is_depth() {
                depth_format = Some(*format);
            } else {
                color_formats.push(*format);
            }
        }
        let mut framebuffer = Self {
            id: FramebufferId::default(),
            color_formats,
            depth_format,
            color_attachments: Vec::new(),
            depth_attachment: None,
            width: spec.width,
            height: spec.height,
            samples: spec.samples,
        };
        framebuffer.invalidate(backend)?;
        Ok(framebuffer)
    }

    /// Destroy and recreate every attachment texture at the current size
    fn invalidate(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        self.release(backend);

        for format in &self.color_formats {
            let id = backend.create_texture(
                &TextureSpec {
                    width: self.width,
                    height: self.height,
                    format: *format,
                    filter: if *format == TextureFormat::RedInteger {
                        TextureFilter::Nearest
                    } else {
                        TextureFilter::Linear
                    },
                    repeat: false,
                },
                None,
            )?;
            self.color_attachments.push(id);
        }
        if let Some(format) = self.depth_format {
            self.depth_attachment = Some(backend.create_texture(
                &TextureSpec {
                    width: self.width,
                    height: self.height,
                    format,
                    filter: TextureFilter::Nearest,
                    repeat: false,
                },
                None,
            )?);
        }
        self.id = backend.create_framebuffer(&self.color_attachments, self.depth_attachment)?;
        Ok(())
    }

    /// Destroy all owned GPU objects, leaving the framebuffer empty
    fn release(&mut self, backend: &mut dyn RenderBackend) {
        if !self.color_attachments.is_empty() || self.depth_attachment.is_some() {
            backend.destroy_framebuffer(self.id);
        }
        for id in self.color_attachments.drain(..) {
            backend.destroy_texture(id);
        }
        if let Some(id) = self.depth_attachment.take() {
            backend.destroy_texture(id);
        }
    }

    /// Make this framebuffer the active draw target and set the viewport to
    /// its current size
    pub fn bind(&self, backend: &mut dyn RenderBackend) {
        backend.bind_framebuffer(Some(self.id));
        backend.set_viewport(0, 0, self.width, self.height);
    }

    /// Restore the default draw target
    pub fn unbind(&self, backend: &mut dyn RenderBackend) {
        backend.bind_framebuffer(None);
    }

    /// Resize the framebuffer, reconstructing all attachments
    ///
    /// Zero or oversized dimensions are rejected with a logged warning and no
    /// state mutation: windowing systems transiently report degenerate sizes
    /// (e.g. during minimize) and that must never crash the application.
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 || width > MAX_FRAMEBUFFER_SIZE || height > MAX_FRAMEBUFFER_SIZE
        {
            log::warn!("ignoring framebuffer resize to invalid dimensions {width}x{height}");
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.invalidate(backend)
    }

    /// Synchronous single-texel readback from an integer color attachment,
    /// used exclusively for entity-id picking
    pub fn read_pixel(
        &self,
        backend: &mut dyn RenderBackend,
        attachment: usize,
        x: u32,
        y: u32,
    ) -> i32 {
        debug_assert!(
            attachment < self.color_attachments.len(),
            "attachment index {attachment} out of range"
        );
        debug_assert_eq!(
            self.color_formats[attachment],
            TextureFormat::RedInteger,
            "pixel readback requires an integer attachment"
        );
        backend.read_pixel_i32(self.id, attachment, x, y)
    }

    /// Clear one integer color attachment to a constant value, independent of
    /// the color clear
    pub fn clear_attachment_int(
        &self,
        backend: &mut dyn RenderBackend,
        attachment: usize,
        value: i32,
    ) {
        debug_assert!(
            attachment < self.color_attachments.len(),
            "attachment index {attachment} out of range"
        );
        backend.clear_attachment_i32(self.id, attachment, value);
    }

    /// Blit one of this framebuffer's color attachments into attachment 0 of
    /// `dst` (used to seed ping-pong buffers)
    pub fn copy_color_to(
        &self,
        backend: &mut dyn RenderBackend,
        src_attachment: usize,
        dst: &Framebuffer,
    ) {
        debug_assert!(src_attachment < self.color_attachments.len());
        backend.blit_color(self.id, src_attachment, dst.id, dst.width, dst.height);
    }

    /// Blit this framebuffer's depth attachment into `dst`
    pub fn copy_depth_to(&self, backend: &mut dyn RenderBackend, dst: &Framebuffer) {
        debug_assert!(self.depth_attachment.is_some(), "source has no depth attachment");
        backend.blit_depth(self.id, dst.id, dst.width, dst.height);
    }

    /// Select which color attachments receive fragment output for the next
    /// draw calls
    pub fn set_enabled_attachments(&self, backend: &mut dyn RenderBackend, enabled: &[usize]) {
        debug_assert!(enabled.iter().all(|&i| i < self.color_attachments.len()));
        backend.set_draw_buffers(self.id, enabled);
    }

    /// Enable every color attachment for fragment output
    pub fn enable_all_attachments(&self, backend: &mut dyn RenderBackend) {
        let all: Vec<usize> = (0..self.color_attachments.len()).collect();
        backend.set_draw_buffers(self.id, &all);
    }

    /// Texture handle of a color attachment
    pub fn color_attachment(&self, index: usize) -> TextureId {
        self.color_attachments[index]
    }

    /// Number of color attachments
    pub fn color_attachment_count(&self) -> usize {
        self.color_attachments.len()
    }

    /// Opaque native handle of a color attachment for UI image display
    pub fn render_id(&self, backend: &dyn RenderBackend, index: usize) -> u64 {
        backend.texture_native_handle(self.color_attachments[index])
    }

    /// Current width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Multisample count
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Backend handle
    pub fn id(&self) -> FramebufferId {
        self.id
    }

    /// Release all GPU objects owned by this framebuffer
    pub fn destroy(mut self, backend: &mut dyn RenderBackend) {
        self.release(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    fn gbuffer_like_spec() -> FramebufferSpec {
        FramebufferSpec {
            attachments: vec![
                TextureFormat::Rgba16F,
                TextureFormat::RedInteger,
                TextureFormat::Depth24Stencil8,
            ],
            width: 640,
            height: 480,
            samples: 1,
        }
    }

    #[test]
    fn depth_formats_route_to_the_depth_slot() {
        let mut backend = HeadlessBackend::new();
        let fb = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        assert_eq!(fb.color_attachment_count(), 2);
        assert!(fb.depth_attachment.is_some());
    }

    #[test]
    fn degenerate_resize_is_a_noop() {
        let mut backend = HeadlessBackend::new();
        let mut fb = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        fb.resize(&mut backend, 0, 480).unwrap();
        assert_eq!(fb.width(), 640);
        fb.resize(&mut backend, 640, MAX_FRAMEBUFFER_SIZE + 1).unwrap();
        assert_eq!(fb.height(), 480);
    }

    #[test]
    fn repeated_same_size_resize_does_not_leak_textures() {
        let mut backend = HeadlessBackend::new();
        let mut fb = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        let baseline = backend.texture_count();
        for _ in 0..4 {
            fb.resize(&mut backend, 640, 480).unwrap();
            assert_eq!(backend.texture_count(), baseline);
        }
    }

    #[test]
    fn resize_mutates_dimensions() {
        let mut backend = HeadlessBackend::new();
        let mut fb = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        fb.resize(&mut backend, 1920, 1080).unwrap();
        assert_eq!((fb.width(), fb.height()), (1920, 1080));
    }

    #[test]
    fn blits_seed_a_compatible_target() {
        let mut backend = HeadlessBackend::new();
        let src = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        let dst = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        src.copy_color_to(&mut backend, 0, &dst);
        src.copy_depth_to(&mut backend, &dst);
    }

    #[test]
    fn integer_attachment_clear_reads_back() {
        let mut backend = HeadlessBackend::new();
        let fb = Framebuffer::new(&mut backend, &gbuffer_like_spec()).unwrap();
        fb.clear_attachment_int(&mut backend, 1, -1);
        assert_eq!(fb.read_pixel(&mut backend, 1, 10, 10), -1);
    }
}
