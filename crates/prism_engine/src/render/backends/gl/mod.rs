//! OpenGL 4.3 backend
//!
//! Implements [`RenderBackend`] over `glow`. Requires a core-profile context
//! with shader storage buffer support (4.3+); the windowing layer owns the
//! context and hands this backend a loader function.
//!
//! All GL objects are registered in `slotmap` tables keyed by the opaque
//! handles the rest of the renderer passes around, so no `glow` type leaks
//! above this module.

use crate::render::api::{
    BufferId, BufferKind, ClearFlags, CompareFunc, CullFace, FramebufferId, PolygonMode,
    RenderBackend, ShaderId, TextureFilter, TextureFormat, TextureId, TextureSpec, VertexArrayId,
    VertexAttributeFormat, VertexLayout,
};
use crate::render::{RenderError, RenderResult};
use glow::HasContext;
use slotmap::SlotMap;

// Not exposed by glow's constant set for all profiles; value from the GL spec.
const GL_PROGRAM_POINT_SIZE: u32 = 0x8642;

struct GlBuffer {
    raw: glow::Buffer,
    target: u32,
    size: usize,
    binding: Option<u32>,
}

struct GlTexture {
    raw: glow::Texture,
    target: u32,
}

struct GlFramebuffer {
    raw: glow::Framebuffer,
    color_count: usize,
}

struct GlVertexArray {
    raw: glow::VertexArray,
    index_count: Option<u32>,
}

/// OpenGL implementation of the rendering backend
pub struct GlBackend {
    gl: glow::Context,
    buffers: SlotMap<BufferId, GlBuffer>,
    textures: SlotMap<TextureId, GlTexture>,
    framebuffers: SlotMap<FramebufferId, GlFramebuffer>,
    vertex_arrays: SlotMap<VertexArrayId, GlVertexArray>,
    shaders: SlotMap<ShaderId, glow::Program>,
}

impl GlBackend {
    /// Create the backend from a GL symbol loader provided by the windowing
    /// layer (e.g. `glfw.get_proc_address` or an SDL equivalent)
    ///
    /// # Safety-adjacent contract
    /// The calling thread must hold a current OpenGL 4.3 core context for the
    /// lifetime of the backend.
    pub fn from_loader<F>(loader: F) -> RenderResult<Self>
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        let backend = Self {
            gl,
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            vertex_arrays: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
        };
        unsafe {
            backend.gl.enable(glow::DEPTH_TEST);
            backend.gl.enable(glow::BLEND);
            backend
                .gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            backend.gl.enable(glow::CULL_FACE);
            backend.gl.cull_face(glow::BACK);
            backend.gl.enable(GL_PROGRAM_POINT_SIZE);
        }
        log::info!("OpenGL backend initialized");
        Ok(backend)
    }

    fn buffer_target(kind: BufferKind) -> u32 {
        match kind {
            BufferKind::Vertex => glow::ARRAY_BUFFER,
            BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
            BufferKind::Uniform => glow::UNIFORM_BUFFER,
            BufferKind::Storage => glow::SHADER_STORAGE_BUFFER,
        }
    }

    /// (internal format, pixel format, pixel type) triple for a texel format
    fn format_triple(format: TextureFormat) -> (i32, u32, u32) {
        match format {
            TextureFormat::Rgba8 => (glow::RGBA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE),
            TextureFormat::Rgba16F => (glow::RGBA16F as i32, glow::RGBA, glow::FLOAT),
            TextureFormat::R16F => (glow::R16F as i32, glow::RED, glow::FLOAT),
            TextureFormat::Rg16F => (glow::RG16F as i32, glow::RG, glow::FLOAT),
            TextureFormat::RedInteger => (glow::R32I as i32, glow::RED_INTEGER, glow::INT),
            TextureFormat::Depth24Stencil8 => (
                glow::DEPTH24_STENCIL8 as i32,
                glow::DEPTH_STENCIL,
                glow::UNSIGNED_INT_24_8,
            ),
        }
    }

    fn compare_func(func: CompareFunc) -> u32 {
        match func {
            CompareFunc::Never => glow::NEVER,
            CompareFunc::Less => glow::LESS,
            CompareFunc::LessEqual => glow::LEQUAL,
            CompareFunc::Equal => glow::EQUAL,
            CompareFunc::NotEqual => glow::NOTEQUAL,
            CompareFunc::Greater => glow::GREATER,
            CompareFunc::GreaterEqual => glow::GEQUAL,
            CompareFunc::Always => glow::ALWAYS,
        }
    }

    fn apply_texture_parameters(&self, target: u32, spec: &TextureSpec) {
        let filter = match spec.filter {
            TextureFilter::Nearest => glow::NEAREST,
            TextureFilter::Linear => glow::LINEAR,
        } as i32;
        let wrap = if spec.repeat {
            glow::REPEAT
        } else {
            glow::CLAMP_TO_EDGE
        } as i32;
        unsafe {
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, filter);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, filter);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
            if target == glow::TEXTURE_CUBE_MAP {
                self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap);
            }
        }
    }

    fn compile_stage(&self, name: &str, stage: u32, src: &str) -> RenderResult<glow::Shader> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage)
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.shader_source(shader, src);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(RenderError::ShaderBuild {
                    name: name.to_string(),
                    log,
                });
            }
            Ok(shader)
        }
    }
}

impl RenderBackend for GlBackend {
    fn name(&self) -> &'static str {
        "opengl"
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        unsafe {
            self.gl
                .viewport(x as i32, y as i32, width as i32, height as i32);
        }
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
        }
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe {
            self.gl.clear(mask);
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_depth_func(&mut self, func: CompareFunc) {
        unsafe {
            self.gl.depth_func(Self::compare_func(func));
        }
    }

    fn set_culling(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::CULL_FACE);
            } else {
                self.gl.disable(glow::CULL_FACE);
            }
        }
    }

    fn set_cull_face(&mut self, face: CullFace) {
        unsafe {
            self.gl.cull_face(match face {
                CullFace::Front => glow::FRONT,
                CullFace::Back => glow::BACK,
            });
        }
    }

    fn set_stencil_mask(&mut self, mask: u32) {
        unsafe {
            self.gl.stencil_mask(mask);
        }
    }

    fn set_stencil_func(&mut self, func: CompareFunc, reference: i32, mask: u32) {
        unsafe {
            self.gl
                .stencil_func(Self::compare_func(func), reference, mask);
        }
    }

    fn set_line_width(&mut self, width: f32) {
        unsafe {
            self.gl.line_width(width);
        }
    }

    fn set_point_size(&mut self, _size: f32) {
        // Point size is driven by gl_PointSize in the vertex stage, fed from
        // the frame-settings uniform block; PROGRAM_POINT_SIZE is enabled at
        // startup so the shader value wins.
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        let gl_mode = match mode {
            PolygonMode::Fill => glow::FILL,
            PolygonMode::Line => glow::LINE,
            PolygonMode::Point => glow::POINT,
        };
        unsafe {
            self.gl.polygon_mode(glow::FRONT_AND_BACK, gl_mode);
        }
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: usize,
        binding: Option<u32>,
        initial: Option<&[u8]>,
    ) -> RenderResult<BufferId> {
        let target = Self::buffer_target(kind);
        let usage = if initial.is_some() {
            glow::STATIC_DRAW
        } else {
            glow::DYNAMIC_DRAW
        };
        let raw = unsafe {
            let raw = self
                .gl
                .create_buffer()
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.bind_buffer(target, Some(raw));
            match initial {
                Some(data) => self.gl.buffer_data_u8_slice(target, data, usage),
                None => self.gl.buffer_data_size(target, size as i32, usage),
            }
            if let Some(binding) = binding {
                self.gl.bind_buffer_base(target, binding, Some(raw));
            }
            raw
        };
        let size = initial.map_or(size, <[u8]>::len);
        Ok(self.buffers.insert(GlBuffer {
            raw,
            target,
            size,
            binding,
        }))
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
        unsafe {
            self.gl.bind_buffer(entry.target, Some(entry.raw));
            self.gl
                .buffer_sub_data_u8_slice(entry.target, offset as i32, data);
        }
    }

    fn buffer_resize(&mut self, buffer: BufferId, size: usize) {
        let Some(entry) = self.buffers.get_mut(buffer) else {
            return;
        };
        unsafe {
            self.gl.bind_buffer(entry.target, Some(entry.raw));
            self.gl
                .buffer_data_size(entry.target, size as i32, glow::DYNAMIC_DRAW);
            if let Some(binding) = entry.binding {
                self.gl.bind_buffer_base(entry.target, binding, Some(entry.raw));
            }
        }
        entry.size = size;
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if let Some(entry) = self.buffers.remove(buffer) {
            unsafe {
                self.gl.delete_buffer(entry.raw);
            }
        }
    }

    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferId,
        index_buffer: Option<BufferId>,
        layout: &VertexLayout,
    ) -> RenderResult<VertexArrayId> {
        let vb = self
            .buffers
            .get(vertex_buffer)
            .ok_or_else(|| RenderError::ResourceAllocation("stale vertex buffer handle".into()))?;
        let ib = match index_buffer {
            Some(id) => Some(self.buffers.get(id).ok_or_else(|| {
                RenderError::ResourceAllocation("stale index buffer handle".into())
            })?),
            None => None,
        };
        let raw = unsafe {
            let raw = self
                .gl
                .create_vertex_array()
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.bind_vertex_array(Some(raw));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vb.raw));

            let stride = layout.stride() as i32;
            let mut offset = 0;
            for (index, attribute) in layout.attributes().iter().enumerate() {
                let index = index as u32;
                self.gl.enable_vertex_attrib_array(index);
                match attribute {
                    VertexAttributeFormat::Int => {
                        self.gl
                            .vertex_attrib_pointer_i32(index, 1, glow::INT, stride, offset);
                    }
                    _ => {
                        self.gl.vertex_attrib_pointer_f32(
                            index,
                            attribute.component_count() as i32,
                            glow::FLOAT,
                            false,
                            stride,
                            offset,
                        );
                    }
                }
                offset += attribute.byte_size() as i32;
            }

            if let Some(ib) = ib {
                self.gl
                    .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ib.raw));
            }
            self.gl.bind_vertex_array(None);
            raw
        };
        let index_count = ib.map(|b| (b.size / std::mem::size_of::<u32>()) as u32);
        Ok(self.vertex_arrays.insert(GlVertexArray { raw, index_count }))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if let Some(entry) = self.vertex_arrays.remove(vertex_array) {
            unsafe {
                self.gl.delete_vertex_array(entry.raw);
            }
        }
    }

    fn create_texture(&mut self, spec: &TextureSpec, data: Option<&[u8]>) -> RenderResult<TextureId> {
        let (internal, format, ty) = Self::format_triple(spec.format);
        let raw = unsafe {
            let raw = self
                .gl
                .create_texture()
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                spec.width as i32,
                spec.height as i32,
                0,
                format,
                ty,
                data,
            );
            raw
        };
        self.apply_texture_parameters(glow::TEXTURE_2D, spec);
        Ok(self.textures.insert(GlTexture {
            raw,
            target: glow::TEXTURE_2D,
        }))
    }

    fn create_cubemap(
        &mut self,
        spec: &TextureSpec,
        faces: Option<&[&[u8]; 6]>,
    ) -> RenderResult<TextureId> {
        let (internal, format, ty) = Self::format_triple(spec.format);
        let raw = unsafe {
            let raw = self
                .gl
                .create_texture()
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(raw));
            for face in 0..6u32 {
                let data = faces.map(|f| f[face as usize]);
                self.gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                    0,
                    internal,
                    spec.width as i32,
                    spec.height as i32,
                    0,
                    format,
                    ty,
                    data,
                );
            }
            raw
        };
        self.apply_texture_parameters(glow::TEXTURE_CUBE_MAP, spec);
        Ok(self.textures.insert(GlTexture {
            raw,
            target: glow::TEXTURE_CUBE_MAP,
        }))
    }

    fn bind_texture(&mut self, texture: TextureId, slot: u32) {
        if let Some(entry) = self.textures.get(texture) {
            unsafe {
                self.gl.active_texture(glow::TEXTURE0 + slot);
                self.gl.bind_texture(entry.target, Some(entry.raw));
            }
        }
    }

    fn texture_native_handle(&self, texture: TextureId) -> u64 {
        self.textures
            .get(texture)
            .map_or(0, |t| u64::from(t.raw.0.get()))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(entry) = self.textures.remove(texture) {
            unsafe {
                self.gl.delete_texture(entry.raw);
            }
        }
    }

    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureId],
        depth_attachment: Option<TextureId>,
    ) -> RenderResult<FramebufferId> {
        let raw = unsafe {
            let raw = self
                .gl
                .create_framebuffer()
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(raw));

            let mut draw_buffers = Vec::with_capacity(color_attachments.len());
            for (index, id) in color_attachments.iter().enumerate() {
                let tex = self.textures.get(*id).ok_or_else(|| {
                    RenderError::ResourceAllocation("stale color attachment handle".into())
                })?;
                let attachment = glow::COLOR_ATTACHMENT0 + index as u32;
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    attachment,
                    glow::TEXTURE_2D,
                    Some(tex.raw),
                    0,
                );
                draw_buffers.push(attachment);
            }
            if let Some(id) = depth_attachment {
                let tex = self.textures.get(id).ok_or_else(|| {
                    RenderError::ResourceAllocation("stale depth attachment handle".into())
                })?;
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_STENCIL_ATTACHMENT,
                    glow::TEXTURE_2D,
                    Some(tex.raw),
                    0,
                );
            }
            if !draw_buffers.is_empty() {
                self.gl.draw_buffers(&draw_buffers);
            }

            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                self.gl.delete_framebuffer(raw);
                return Err(RenderError::FramebufferIncomplete(format!(
                    "status {status:#06x}"
                )));
            }
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            raw
        };
        Ok(self.framebuffers.insert(GlFramebuffer {
            raw,
            color_count: color_attachments.len(),
        }))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        let raw = framebuffer.and_then(|id| self.framebuffers.get(id)).map(|f| f.raw);
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, raw);
        }
    }

    fn set_draw_buffers(&mut self, framebuffer: FramebufferId, enabled: &[usize]) {
        let Some(entry) = self.framebuffers.get(framebuffer) else {
            return;
        };
        debug_assert!(
            enabled.iter().all(|&i| i < entry.color_count),
            "draw-buffer index out of range"
        );
        let buffers: Vec<u32> = enabled
            .iter()
            .map(|&i| glow::COLOR_ATTACHMENT0 + i as u32)
            .collect();
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(entry.raw));
            self.gl.draw_buffers(&buffers);
        }
    }

    fn read_pixel_i32(
        &mut self,
        framebuffer: FramebufferId,
        attachment: usize,
        x: u32,
        y: u32,
    ) -> i32 {
        let Some(entry) = self.framebuffers.get(framebuffer) else {
            return 0;
        };
        debug_assert!(attachment < entry.color_count, "attachment index out of range");
        let mut bytes = [0u8; 4];
        unsafe {
            self.gl
                .bind_framebuffer(glow::READ_FRAMEBUFFER, Some(entry.raw));
            self.gl
                .read_buffer(glow::COLOR_ATTACHMENT0 + attachment as u32);
            self.gl.read_pixels(
                x as i32,
                y as i32,
                1,
                1,
                glow::RED_INTEGER,
                glow::INT,
                glow::PixelPackData::Slice(&mut bytes),
            );
        }
        i32::from_ne_bytes(bytes)
    }

    fn clear_attachment_i32(&mut self, framebuffer: FramebufferId, attachment: usize, value: i32) {
        let Some(entry) = self.framebuffers.get(framebuffer) else {
            return;
        };
        debug_assert!(attachment < entry.color_count, "attachment index out of range");
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(entry.raw));
            self.gl
                .clear_buffer_i32_slice(glow::COLOR, attachment as u32, &[value; 4]);
        }
    }

    fn blit_color(
        &mut self,
        src: FramebufferId,
        src_attachment: usize,
        dst: FramebufferId,
        width: u32,
        height: u32,
    ) {
        let (Some(src_fb), Some(dst_fb)) =
            (self.framebuffers.get(src), self.framebuffers.get(dst))
        else {
            return;
        };
        unsafe {
            self.gl
                .bind_framebuffer(glow::READ_FRAMEBUFFER, Some(src_fb.raw));
            self.gl
                .read_buffer(glow::COLOR_ATTACHMENT0 + src_attachment as u32);
            self.gl
                .bind_framebuffer(glow::DRAW_FRAMEBUFFER, Some(dst_fb.raw));
            self.gl.blit_framebuffer(
                0,
                0,
                width as i32,
                height as i32,
                0,
                0,
                width as i32,
                height as i32,
                glow::COLOR_BUFFER_BIT,
                glow::NEAREST,
            );
        }
    }

    fn blit_depth(&mut self, src: FramebufferId, dst: FramebufferId, width: u32, height: u32) {
        let (Some(src_fb), Some(dst_fb)) =
            (self.framebuffers.get(src), self.framebuffers.get(dst))
        else {
            return;
        };
        unsafe {
            self.gl
                .bind_framebuffer(glow::READ_FRAMEBUFFER, Some(src_fb.raw));
            self.gl
                .bind_framebuffer(glow::DRAW_FRAMEBUFFER, Some(dst_fb.raw));
            self.gl.blit_framebuffer(
                0,
                0,
                width as i32,
                height as i32,
                0,
                0,
                width as i32,
                height as i32,
                glow::DEPTH_BUFFER_BIT,
                glow::NEAREST,
            );
        }
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferId) {
        if let Some(entry) = self.framebuffers.remove(framebuffer) {
            unsafe {
                self.gl.delete_framebuffer(entry.raw);
            }
        }
    }

    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> RenderResult<ShaderId> {
        let vertex = self.compile_stage(name, glow::VERTEX_SHADER, vertex_src)?;
        let fragment = match self.compile_stage(name, glow::FRAGMENT_SHADER, fragment_src) {
            Ok(fragment) => fragment,
            Err(err) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(err);
            }
        };
        let program = unsafe {
            let program = self
                .gl
                .create_program()
                .map_err(RenderError::ResourceAllocation)?;
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(RenderError::ShaderBuild {
                    name: name.to_string(),
                    log,
                });
            }
            program
        };
        log::debug!("linked shader program '{name}'");
        Ok(self.shaders.insert(program))
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        if let Some(program) = self.shaders.remove(shader) {
            unsafe {
                self.gl.delete_program(program);
            }
        }
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, shader: ShaderId, index_count: Option<u32>) {
        let (Some(va), Some(program)) = (
            self.vertex_arrays.get(vertex_array),
            self.shaders.get(shader),
        ) else {
            return;
        };
        let count = index_count.or(va.index_count).unwrap_or(0);
        if count == 0 {
            return;
        }
        unsafe {
            self.gl.use_program(Some(*program));
            self.gl.bind_vertex_array(Some(va.raw));
            self.gl
                .draw_elements(glow::TRIANGLES, count as i32, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }

    fn draw_lines(&mut self, vertex_array: VertexArrayId, shader: ShaderId, vertex_count: u32) {
        let (Some(va), Some(program)) = (
            self.vertex_arrays.get(vertex_array),
            self.shaders.get(shader),
        ) else {
            return;
        };
        if vertex_count == 0 {
            return;
        }
        unsafe {
            self.gl.use_program(Some(*program));
            self.gl.bind_vertex_array(Some(va.raw));
            self.gl.draw_arrays(glow::LINES, 0, vertex_count as i32);
            self.gl.bind_vertex_array(None);
        }
    }
}
