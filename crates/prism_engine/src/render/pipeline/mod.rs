//! # Render Pipeline
//!
//! The per-frame accumulation-and-flush protocol plus multi-pass
//! orchestration. [`Renderer`] is the explicit context object owning every
//! staging arena, GPU resource, and the backend box; its lifecycle is
//! init-at-startup, mutate-per-frame, teardown-at-shutdown.
//!
//! ## Frame protocol
//!
//! ```text
//! begin_render_pass
//!   begin_scene(camera, lights)
//!     draw_quad / draw_circle / draw_line / draw_rect / draw_mesh / ...
//!   end_scene                      (flush: quads, circles, lines, meshes, outlines)
//! ssao_pass                        (optional; white substituted when disabled)
//! deferred_lighting_pass           (writes lit color + bright threshold)
//! begin_post_processing            (seed ping-pong from the lit color)
//!   apply_bloom                    (20 Gaussian iterations + additive composite)
//!   draw_post_processing(effects)  (editor-attached custom effects)
//! end_post_processing              (tone-map unless HDR, then gamma, always last)
//! end_render_pass
//! ```
//!
//! Every pass records itself as the "last drawn" target so the next pass
//! reads the correct upstream image without the caller tracking it, and the
//! post ping-pong strictly alternates: each step writes the *other* buffer
//! and the previous write target becomes the new read source.

pub mod post;
pub mod settings;

pub use post::{
    PostEffect, PostEffectParams, PostProcessor, BLOOM_ITERATIONS, MAX_POST_EFFECTS,
    SSAO_KERNEL_SIZE, SSAO_NOISE_SIZE,
};
pub use settings::{DisplayBuffer, RenderSettings};

use crate::config::RendererConfig;
use crate::foundation::math::{Mat4, Transform, Vec3, Vec4, Vector4};
use crate::render::api::{
    ClearFlags, CompareFunc, CullFace, PolygonMode, RenderBackend, TextureFilter, TextureFormat,
    TextureId, TextureSpec, VertexArrayId,
};
use crate::render::batch::{
    CircleVertex, LineVertex, MeshArena, MeshVertex, QuadVertex, RenderStats, SlotAssignment,
    TextureSlotTable, VertexArena, MAX_LINE_VERTICES, MAX_MESH_INDICES, MAX_MESH_VERTICES,
    MAX_QUADS, MAX_QUAD_VERTICES,
};
use crate::render::buffer::{IndexBuffer, StorageBuffer, UniformBuffer, VertexBuffer};
use crate::render::camera::{CameraMatrices, EditorCamera, SceneCamera};
use crate::render::framebuffer::{Framebuffer, FramebufferSpec};
use crate::render::lighting::GpuLight;
use crate::render::mesh::{Mesh, MeshMaterial};
use crate::render::shader::ShaderSet;
use crate::render::skybox::Skybox;
use crate::render::texture::Texture2D;
use crate::render::uniforms::{
    CameraUniform, FrameSettingsUniform, LightCountUniform, CAMERA_BINDING,
    FRAME_SETTINGS_BINDING, LIGHT_COUNT_BINDING, LIGHT_STORAGE_BINDING,
};
use crate::render::RenderResult;

/// G-buffer color attachment: composited output color
pub const GBUFFER_COLOR: usize = 0;
/// G-buffer color attachment: world position
pub const GBUFFER_POSITION: usize = 1;
/// G-buffer color attachment: world normal
pub const GBUFFER_NORMAL: usize = 2;
/// G-buffer color attachment: albedo
pub const GBUFFER_ALBEDO: usize = 3;
/// G-buffer color attachment: material parameters
pub const GBUFFER_MATERIAL: usize = 4;
/// G-buffer color attachment: integer entity id for picking
pub const GBUFFER_ENTITY: usize = 5;
/// G-buffer color attachment: bloom bright-color threshold output
pub const GBUFFER_BRIGHT: usize = 6;

/// Entity-id attachment value meaning "no entity here"
pub const NO_ENTITY: i32 = -1;

const INITIAL_LIGHT_CAPACITY: usize = 16;
const BRDF_LUT_SIZE: u32 = 512;

const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, 0.5, 0.0],
];
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Which framebuffer holds the most recently produced image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassTarget {
    GBuffer,
    Post(usize),
    Ssao(usize),
}

struct QuadFamily {
    arena: VertexArena<QuadVertex>,
    vertex_buffer: VertexBuffer,
    vertex_array: VertexArrayId,
}

struct CircleFamily {
    arena: VertexArena<CircleVertex>,
    vertex_buffer: VertexBuffer,
    vertex_array: VertexArrayId,
}

struct LineFamily {
    arena: VertexArena<LineVertex>,
    vertex_buffer: VertexBuffer,
    vertex_array: VertexArrayId,
}

struct MeshFamily {
    arena: MeshArena<MeshVertex>,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    vertex_array: VertexArrayId,
}

struct OutlineFamily {
    arena: MeshArena<LineVertex>,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    vertex_array: VertexArrayId,
}

/// The renderer context: batching state, pass orchestration, and statistics
pub struct Renderer {
    backend: Box<dyn RenderBackend>,
    shaders: ShaderSet,
    settings: RenderSettings,
    stats: RenderStats,

    gbuffer: Framebuffer,
    post_buffers: [Framebuffer; 2],
    bloom_buffers: [Framebuffer; 2],
    ssao_buffers: [Framebuffer; 2],
    brdf_buffer: Framebuffer,

    quads: QuadFamily,
    circles: CircleFamily,
    lines: LineFamily,
    meshes: MeshFamily,
    outlines: OutlineFamily,
    quad_index_buffer: IndexBuffer,

    slot_table: TextureSlotTable,
    white_texture: Texture2D,
    fallback_cubemap: TextureId,
    active_skybox: Option<Skybox>,
    skybox_vertex_buffer: VertexBuffer,
    skybox_index_buffer: IndexBuffer,
    skybox_vertex_array: VertexArrayId,

    camera_buffer: UniformBuffer,
    frame_settings_buffer: UniformBuffer,
    light_count_buffer: UniformBuffer,
    light_buffer: StorageBuffer,

    post: PostProcessor,
    post_front: usize,
    last_drawn: PassTarget,
}

impl Renderer {
    /// Build the renderer on an already-selected backend
    ///
    /// Creates the G-buffer and every ping-pong target at the configured
    /// size, allocates all family staging, links the built-in shaders, and
    /// integrates the BRDF lookup texture once.
    pub fn new(mut backend: Box<dyn RenderBackend>, config: &RendererConfig) -> RenderResult<Self> {
        log::info!(
            "initializing renderer on '{}' backend at {}x{}",
            backend.name(),
            config.width,
            config.height
        );
        let b = backend.as_mut();
        let shaders = ShaderSet::build(b)?;
        let white_texture = Texture2D::white(b)?;

        let gbuffer = Framebuffer::new(
            b,
            &FramebufferSpec {
                attachments: vec![
                    TextureFormat::Rgba16F,        // composited color
                    TextureFormat::Rgba16F,        // world position
                    TextureFormat::Rgba16F,        // world normal
                    TextureFormat::Rgba8,          // albedo
                    TextureFormat::Rgba8,          // material
                    TextureFormat::RedInteger,     // entity id
                    TextureFormat::Rgba16F,        // bright color
                    TextureFormat::Depth24Stencil8,
                ],
                width: config.width,
                height: config.height,
                samples: config.samples,
            },
        )?;
        let color_only = |b: &mut dyn RenderBackend, format| {
            Framebuffer::new(
                b,
                &FramebufferSpec {
                    attachments: vec![format],
                    width: config.width,
                    height: config.height,
                    samples: 1,
                },
            )
        };
        let post_buffers = [
            color_only(b, TextureFormat::Rgba16F)?,
            color_only(b, TextureFormat::Rgba16F)?,
        ];
        let bloom_buffers = [
            color_only(b, TextureFormat::Rgba16F)?,
            color_only(b, TextureFormat::Rgba16F)?,
        ];
        let ssao_buffers = [
            color_only(b, TextureFormat::R16F)?,
            color_only(b, TextureFormat::R16F)?,
        ];

        // Quads and circles share one precomputed index pattern.
        let quad_index_buffer = IndexBuffer::with_data(b, &quad_index_pattern())?;

        let quad_vb = VertexBuffer::new(b, MAX_QUAD_VERTICES * std::mem::size_of::<QuadVertex>())?;
        let quad_vao =
            b.create_vertex_array(quad_vb.id(), Some(quad_index_buffer.id()), &QuadVertex::layout())?;
        let quads = QuadFamily {
            arena: VertexArena::new(MAX_QUAD_VERTICES),
            vertex_buffer: quad_vb,
            vertex_array: quad_vao,
        };

        let circle_vb =
            VertexBuffer::new(b, MAX_QUAD_VERTICES * std::mem::size_of::<CircleVertex>())?;
        let circle_vao = b.create_vertex_array(
            circle_vb.id(),
            Some(quad_index_buffer.id()),
            &CircleVertex::layout(),
        )?;
        let circles = CircleFamily {
            arena: VertexArena::new(MAX_QUAD_VERTICES),
            vertex_buffer: circle_vb,
            vertex_array: circle_vao,
        };

        let line_vb = VertexBuffer::new(b, MAX_LINE_VERTICES * std::mem::size_of::<LineVertex>())?;
        let line_vao = b.create_vertex_array(line_vb.id(), None, &LineVertex::layout())?;
        let lines = LineFamily {
            arena: VertexArena::new(MAX_LINE_VERTICES),
            vertex_buffer: line_vb,
            vertex_array: line_vao,
        };

        let mesh_vb = VertexBuffer::new(b, MAX_MESH_VERTICES * std::mem::size_of::<MeshVertex>())?;
        let mesh_ib = IndexBuffer::new(b, MAX_MESH_INDICES)?;
        let mesh_vao =
            b.create_vertex_array(mesh_vb.id(), Some(mesh_ib.id()), &MeshVertex::layout())?;
        let meshes = MeshFamily {
            arena: MeshArena::new(MAX_MESH_VERTICES, MAX_MESH_INDICES),
            vertex_buffer: mesh_vb,
            index_buffer: mesh_ib,
            vertex_array: mesh_vao,
        };

        let outline_vb =
            VertexBuffer::new(b, MAX_MESH_VERTICES * std::mem::size_of::<LineVertex>())?;
        let outline_ib = IndexBuffer::new(b, MAX_MESH_INDICES)?;
        let outline_vao =
            b.create_vertex_array(outline_vb.id(), Some(outline_ib.id()), &LineVertex::layout())?;
        let outlines = OutlineFamily {
            arena: MeshArena::new(MAX_MESH_VERTICES, MAX_MESH_INDICES),
            vertex_buffer: outline_vb,
            index_buffer: outline_ib,
            vertex_array: outline_vao,
        };

        let (skybox_vertices, skybox_indices) = skybox_cube();
        let skybox_vertex_buffer =
            VertexBuffer::with_data(b, bytemuck::cast_slice(&skybox_vertices))?;
        let skybox_index_buffer = IndexBuffer::with_data(b, &skybox_indices)?;
        let skybox_vertex_array = b.create_vertex_array(
            skybox_vertex_buffer.id(),
            Some(skybox_index_buffer.id()),
            &crate::render::api::VertexLayout::new(&[crate::render::api::VertexAttributeFormat::Float3]),
        )?;

        let camera_buffer =
            UniformBuffer::new(b, std::mem::size_of::<CameraUniform>(), CAMERA_BINDING)?;
        let frame_settings_buffer = UniformBuffer::new(
            b,
            std::mem::size_of::<FrameSettingsUniform>(),
            FRAME_SETTINGS_BINDING,
        )?;
        let light_count_buffer =
            UniformBuffer::new(b, std::mem::size_of::<LightCountUniform>(), LIGHT_COUNT_BINDING)?;
        let light_buffer = StorageBuffer::new(
            b,
            INITIAL_LIGHT_CAPACITY * std::mem::size_of::<GpuLight>(),
            LIGHT_STORAGE_BINDING,
        )?;

        let post = PostProcessor::new(b)?;

        let white_face = [0xffu8; 4];
        let fallback_cubemap = b.create_cubemap(
            &TextureSpec {
                width: 1,
                height: 1,
                format: TextureFormat::Rgba8,
                filter: TextureFilter::Linear,
                repeat: false,
            },
            Some(&[&white_face, &white_face, &white_face, &white_face, &white_face, &white_face]),
        )?;

        // Integrate the BRDF lookup once; the framebuffer stays alive to own
        // the texture.
        let brdf_buffer = Framebuffer::new(
            b,
            &FramebufferSpec {
                attachments: vec![TextureFormat::Rg16F],
                width: BRDF_LUT_SIZE,
                height: BRDF_LUT_SIZE,
                samples: 1,
            },
        )?;
        brdf_buffer.bind(b);
        b.set_depth_test(false);
        b.clear(ClearFlags::COLOR);
        post.apply(b, shaders.brdf_lut, PostEffectParams::default(), false);
        b.set_depth_test(true);
        b.bind_framebuffer(None);

        let slot_table = TextureSlotTable::new(white_texture.id());

        Ok(Self {
            backend,
            shaders,
            settings: RenderSettings::default(),
            stats: RenderStats::default(),
            gbuffer,
            post_buffers,
            bloom_buffers,
            ssao_buffers,
            brdf_buffer,
            quads,
            circles,
            lines,
            meshes,
            outlines,
            quad_index_buffer,
            slot_table,
            white_texture,
            fallback_cubemap,
            active_skybox: None,
            skybox_vertex_buffer,
            skybox_index_buffer,
            skybox_vertex_array,
            camera_buffer,
            frame_settings_buffer,
            light_count_buffer,
            light_buffer,
            post,
            post_front: 0,
            last_drawn: PassTarget::GBuffer,
        })
    }

    // --- frame protocol -------------------------------------------------

    /// Bind the G-buffer, enable all attachments, clear, and reset the
    /// entity-id attachment to the [`NO_ENTITY`] sentinel
    pub fn begin_render_pass(&mut self) {
        self.stats.reset();
        self.gbuffer.bind(self.backend.as_mut());
        self.gbuffer.enable_all_attachments(self.backend.as_mut());
        self.backend.set_clear_color(self.settings.clear_color);
        self.backend
            .clear(ClearFlags::COLOR | ClearFlags::DEPTH | ClearFlags::STENCIL);
        self.gbuffer
            .clear_attachment_int(self.backend.as_mut(), GBUFFER_ENTITY, NO_ENTITY);
        self.last_drawn = PassTarget::GBuffer;
    }

    /// Begin a scene viewed through the runtime camera and its transform
    pub fn begin_scene(
        &mut self,
        camera: &SceneCamera,
        camera_transform: &Transform,
        lights: &[GpuLight],
    ) {
        self.begin_scene_internal(&camera.matrices(camera_transform), lights);
    }

    /// Begin a scene viewed through the editor's free camera
    pub fn begin_scene_editor(&mut self, camera: &EditorCamera, lights: &[GpuLight]) {
        self.begin_scene_internal(&camera.matrices(), lights);
    }

    fn begin_scene_internal(&mut self, matrices: &CameraMatrices, lights: &[GpuLight]) {
        let camera_uniform =
            CameraUniform::new(&matrices.view, &matrices.projection, matrices.position);
        self.camera_buffer
            .set_data(self.backend.as_mut(), &camera_uniform);

        let frame_settings = FrameSettingsUniform {
            gamma: self.settings.gamma,
            exposure: self.settings.exposure,
            parallax_scale: self.settings.parallax_scale,
            bloom_threshold: self.settings.bloom_threshold,
            point_size: self.settings.point_size,
            _padding: [0.0; 3],
        };
        self.frame_settings_buffer
            .set_data(self.backend.as_mut(), &frame_settings);

        // Grow-only upload of the per-frame light array.
        let needed = lights.len() * std::mem::size_of::<GpuLight>();
        self.light_buffer.set_size(self.backend.as_mut(), needed);
        if !lights.is_empty() {
            self.light_buffer.set_data(self.backend.as_mut(), lights);
        }
        self.light_count_buffer.set_data(
            self.backend.as_mut(),
            &LightCountUniform {
                count: lights.len() as i32,
                _padding: [0; 3],
            },
        );

        self.active_skybox = None;
        self.start_batch();
        self.slot_table.reset();
    }

    /// Flush all families with pending geometry
    pub fn end_scene(&mut self) {
        self.flush();
    }

    // --- draw operations ------------------------------------------------

    /// Draw a flat-colored quad
    pub fn draw_quad(&mut self, transform: &Mat4, color: Vec4, entity_id: i32) {
        self.ensure_quad_capacity();
        self.push_quad(transform, color, 0, 1.0, entity_id);
    }

    /// Draw a textured quad with a tiling factor
    pub fn draw_textured_quad(
        &mut self,
        transform: &Mat4,
        texture: &Texture2D,
        tiling: f32,
        color: Vec4,
        entity_id: i32,
    ) {
        self.ensure_quad_capacity();
        let slot = self.slot_for_texture(texture.id());
        self.push_quad(transform, color, slot, tiling, entity_id);
    }

    /// Draw a sprite component: dispatches to the textured or flat path
    pub fn draw_sprite(
        &mut self,
        transform: &Mat4,
        color: Vec4,
        texture: Option<&Texture2D>,
        tiling: f32,
        entity_id: i32,
    ) {
        match texture {
            Some(texture) => self.draw_textured_quad(transform, texture, tiling, color, entity_id),
            None => self.draw_quad(transform, color, entity_id),
        }
    }

    fn push_quad(&mut self, transform: &Mat4, color: Vec4, slot: i32, tiling: f32, entity_id: i32) {
        for (corner, uv) in QUAD_POSITIONS.iter().zip(QUAD_UVS.iter()) {
            let world = transform * Vector4::new(corner[0], corner[1], corner[2], 1.0);
            self.quads.arena.push(QuadVertex {
                position: [world.x, world.y, world.z],
                color: [color.x, color.y, color.z, color.w],
                uv: [uv[0] * tiling, uv[1] * tiling],
                tex_index: slot,
                entity_id,
            });
        }
        self.stats.quad_count += 1;
        self.stats.total_vertex_count += 4;
        self.stats.total_index_count += 6;
    }

    /// Draw a circle (or ring, when `thickness < 1`) inscribed in the
    /// transformed unit quad
    pub fn draw_circle(
        &mut self,
        transform: &Mat4,
        color: Vec4,
        thickness: f32,
        fade: f32,
        entity_id: i32,
    ) {
        self.ensure_circle_capacity();
        for corner in &QUAD_POSITIONS {
            let world = transform * Vector4::new(corner[0], corner[1], corner[2], 1.0);
            self.circles.arena.push(CircleVertex {
                position: [world.x, world.y, world.z],
                local_position: [corner[0] * 2.0, corner[1] * 2.0],
                color: [color.x, color.y, color.z, color.w],
                thickness,
                fade,
                entity_id,
            });
        }
        self.stats.circle_count += 1;
        self.stats.total_vertex_count += 4;
        self.stats.total_index_count += 6;
    }

    /// Draw a world-space line segment
    pub fn draw_line(&mut self, from: Vec3, to: Vec3, color: Vec4, entity_id: i32) {
        self.ensure_line_capacity();
        for point in [from, to] {
            self.lines.arena.push(LineVertex {
                position: [point.x, point.y, point.z],
                color: [color.x, color.y, color.z, color.w],
                entity_id,
            });
        }
        self.stats.line_count += 1;
        self.stats.total_vertex_count += 2;
    }

    /// Draw the transformed unit quad's edges as four lines
    pub fn draw_rect(&mut self, transform: &Mat4, color: Vec4, entity_id: i32) {
        let mut corners = [Vec3::zeros(); 4];
        for (corner, out) in QUAD_POSITIONS.iter().zip(corners.iter_mut()) {
            let world = transform * Vector4::new(corner[0], corner[1], corner[2], 1.0);
            *out = Vec3::new(world.x, world.y, world.z);
        }
        for i in 0..4 {
            self.draw_line(corners[i], corners[(i + 1) % 4], color, entity_id);
        }
    }

    /// Append a mesh, transformed into world space, to the mesh batch
    pub fn draw_mesh(
        &mut self,
        transform: &Mat4,
        mesh: &Mesh,
        material: &MeshMaterial,
        entity_id: i32,
    ) {
        let vertex_count = mesh.vertex_count();
        let index_count = mesh.index_count();
        if vertex_count > MAX_MESH_VERTICES || index_count > MAX_MESH_INDICES {
            log::warn!("mesh exceeds batch capacity ({vertex_count} vertices), skipping");
            return;
        }
        if self.meshes.arena.would_overflow(vertex_count, index_count) {
            self.next_batch();
        }
        let slot = match material.texture {
            Some(texture) => self.slot_for_texture(texture.id()),
            None => 0,
        };

        let normal_matrix = transform
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Mat4::identity);
        let base = self.meshes.arena.base_vertex();
        for vertex in &mesh.vertices {
            let world = transform
                * Vector4::new(vertex.position.x, vertex.position.y, vertex.position.z, 1.0);
            let normal = normal_matrix
                * Vector4::new(vertex.normal.x, vertex.normal.y, vertex.normal.z, 0.0);
            let normal = normal.xyz().normalize();
            self.meshes.arena.vertices.push(MeshVertex {
                position: [world.x, world.y, world.z],
                normal: [normal.x, normal.y, normal.z],
                uv: [vertex.uv.x, vertex.uv.y],
                color: [
                    material.color.x,
                    material.color.y,
                    material.color.z,
                    material.color.w,
                ],
                material: [material.metallic, material.roughness],
                tex_index: slot,
                entity_id,
            });
        }
        for &index in &mesh.indices {
            self.meshes.arena.push_index(base, index);
        }
        self.stats.mesh_count += 1;
        self.stats.total_vertex_count += vertex_count as u32;
        self.stats.total_index_count += index_count as u32;
    }

    /// Append a mesh silhouette to the outline batch
    ///
    /// Outlines flush last, in wireframe with front-face culling and widened
    /// lines, so silhouette edges land on top of opaque geometry without
    /// z-fighting.
    pub fn draw_mesh_outline(&mut self, transform: &Mat4, mesh: &Mesh, color: Vec4, entity_id: i32) {
        let vertex_count = mesh.vertex_count();
        let index_count = mesh.index_count();
        if vertex_count > MAX_MESH_VERTICES || index_count > MAX_MESH_INDICES {
            log::warn!("outline mesh exceeds batch capacity ({vertex_count} vertices), skipping");
            return;
        }
        if self.outlines.arena.would_overflow(vertex_count, index_count) {
            self.next_batch();
        }
        let base = self.outlines.arena.base_vertex();
        for vertex in &mesh.vertices {
            let world = transform
                * Vector4::new(vertex.position.x, vertex.position.y, vertex.position.z, 1.0);
            self.outlines.arena.vertices.push(LineVertex {
                position: [world.x, world.y, world.z],
                color: [color.x, color.y, color.z, color.w],
                entity_id,
            });
        }
        for &index in &mesh.indices {
            self.outlines.arena.push_index(base, index);
        }
        self.stats.outline_count += 1;
        self.stats.total_vertex_count += vertex_count as u32;
        self.stats.total_index_count += index_count as u32;
    }

    /// Draw the skybox and register its environment maps for the deferred
    /// pass's image-based lighting
    pub fn draw_skybox(&mut self, skybox: &Skybox) {
        self.active_skybox = Some(*skybox);
        self.backend.set_depth_func(CompareFunc::LessEqual);
        self.backend.set_culling(false);
        self.backend.bind_texture(skybox.cubemap(), 0);
        self.backend
            .draw_indexed(self.skybox_vertex_array, self.shaders.skybox, None);
        self.backend.set_culling(true);
        self.backend.set_depth_func(CompareFunc::Less);
        self.stats.draw_calls += 1;
    }

    // --- batching internals ---------------------------------------------

    fn ensure_quad_capacity(&mut self) {
        if self.quads.arena.would_overflow(4) {
            self.next_batch();
        }
    }

    fn ensure_circle_capacity(&mut self) {
        if self.circles.arena.would_overflow(4) {
            self.next_batch();
        }
    }

    fn ensure_line_capacity(&mut self) {
        if self.lines.arena.would_overflow(2) {
            self.next_batch();
        }
    }

    /// Resolve a texture slot, flushing when the table is full
    ///
    /// A full table frees every slot except the white fallback, exactly like
    /// vertex overflow forces a new batch; unlike vertex overflow it also
    /// resets the table, so the requested texture lands in slot 1.
    fn slot_for_texture(&mut self, texture: TextureId) -> i32 {
        match self.slot_table.slot_for(texture) {
            SlotAssignment::Existing(slot) | SlotAssignment::Inserted(slot) => slot,
            SlotAssignment::Full => {
                self.flush();
                self.reset_counters();
                self.slot_table.reset();
                match self.slot_table.slot_for(texture) {
                    SlotAssignment::Existing(slot) | SlotAssignment::Inserted(slot) => slot,
                    SlotAssignment::Full => unreachable!("slot table full after reset"),
                }
            }
        }
    }

    fn start_batch(&mut self) {
        self.reset_counters();
    }

    /// Flush pending geometry, then reset counters for the next batch
    ///
    /// Texture-slot assignments survive: they are scene-lifetime-scoped and
    /// reset only at scene begin or when the table itself overflows.
    fn next_batch(&mut self) {
        self.flush();
        self.reset_counters();
    }

    fn reset_counters(&mut self) {
        self.quads.arena.reset();
        self.circles.arena.reset();
        self.lines.arena.reset();
        self.meshes.arena.reset();
        self.outlines.arena.reset();
    }

    /// Upload and draw every nonempty family in fixed order: quads, circles,
    /// lines, meshes, outlines
    fn flush(&mut self) {
        if !self.quads.arena.is_empty() || !self.meshes.arena.is_empty() {
            self.slot_table.bind_all(self.backend.as_mut());
        }

        if !self.quads.arena.is_empty() {
            self.quads
                .vertex_buffer
                .set_data(self.backend.as_mut(), bytemuck::cast_slice(self.quads.arena.staged()));
            let index_count = (self.quads.arena.len() / 4 * 6) as u32;
            self.backend
                .draw_indexed(self.quads.vertex_array, self.shaders.quad, Some(index_count));
            self.stats.draw_calls += 1;
        }

        if !self.circles.arena.is_empty() {
            self.circles.vertex_buffer.set_data(
                self.backend.as_mut(),
                bytemuck::cast_slice(self.circles.arena.staged()),
            );
            let index_count = (self.circles.arena.len() / 4 * 6) as u32;
            self.backend.draw_indexed(
                self.circles.vertex_array,
                self.shaders.circle,
                Some(index_count),
            );
            self.stats.draw_calls += 1;
        }

        if !self.lines.arena.is_empty() {
            self.lines
                .vertex_buffer
                .set_data(self.backend.as_mut(), bytemuck::cast_slice(self.lines.arena.staged()));
            self.backend.set_line_width(self.settings.line_width);
            self.backend.draw_lines(
                self.lines.vertex_array,
                self.shaders.line,
                self.lines.arena.len() as u32,
            );
            self.stats.draw_calls += 1;
        }

        if !self.meshes.arena.is_empty() {
            self.meshes.vertex_buffer.set_data(
                self.backend.as_mut(),
                bytemuck::cast_slice(self.meshes.arena.vertices.staged()),
            );
            self.meshes
                .index_buffer
                .set_data(self.backend.as_mut(), self.meshes.arena.staged_indices());
            self.backend.draw_indexed(
                self.meshes.vertex_array,
                self.shaders.mesh,
                Some(self.meshes.arena.index_len() as u32),
            );
            self.stats.draw_calls += 1;
        }

        // Outlines last: wireframe, front-face culling, widened lines.
        if !self.outlines.arena.is_empty() {
            self.outlines.vertex_buffer.set_data(
                self.backend.as_mut(),
                bytemuck::cast_slice(self.outlines.arena.vertices.staged()),
            );
            self.outlines
                .index_buffer
                .set_data(self.backend.as_mut(), self.outlines.arena.staged_indices());
            self.backend.set_polygon_mode(PolygonMode::Line);
            self.backend.set_cull_face(CullFace::Front);
            self.backend.set_line_width(self.settings.outline_width);
            self.backend.draw_indexed(
                self.outlines.vertex_array,
                self.shaders.outline,
                Some(self.outlines.arena.index_len() as u32),
            );
            self.backend.set_polygon_mode(PolygonMode::Fill);
            self.backend.set_cull_face(CullFace::Back);
            self.backend.set_line_width(1.0);
            self.stats.draw_calls += 1;
        }
    }

    // --- pipeline passes ------------------------------------------------

    /// Ambient-occlusion estimation and blur; no-op when disabled
    ///
    /// When disabled, the deferred pass samples the white fallback so
    /// downstream shading treats occlusion as "fully lit" without branching.
    pub fn ssao_pass(&mut self) {
        if !self.settings.ssao_enabled {
            return;
        }
        self.backend.set_depth_test(false);

        self.ssao_buffers[0].bind(self.backend.as_mut());
        self.backend.clear(ClearFlags::COLOR);
        self.backend
            .bind_texture(self.gbuffer.color_attachment(GBUFFER_POSITION), 1);
        self.backend
            .bind_texture(self.gbuffer.color_attachment(GBUFFER_NORMAL), 2);
        self.backend.bind_texture(self.post.noise_texture(), 3);
        self.post.apply(
            self.backend.as_mut(),
            self.shaders.ssao,
            PostEffectParams::default(),
            false,
        );
        self.stats.draw_calls += 1;

        self.ssao_buffers[1].bind(self.backend.as_mut());
        self.backend
            .bind_texture(self.ssao_buffers[0].color_attachment(0), 0);
        self.post.apply(
            self.backend.as_mut(),
            self.shaders.ssao_blur,
            PostEffectParams::default(),
            false,
        );
        self.stats.draw_calls += 1;

        self.backend.set_depth_test(true);
        self.last_drawn = PassTarget::Ssao(1);
    }

    /// Composite the lit result from the G-buffer into attachments
    /// {color, bright}
    pub fn deferred_lighting_pass(&mut self) {
        self.gbuffer.bind(self.backend.as_mut());
        self.gbuffer
            .set_enabled_attachments(self.backend.as_mut(), &[GBUFFER_COLOR, GBUFFER_BRIGHT]);
        self.backend.set_depth_test(false);

        self.bind_deferred_inputs();
        self.post.apply(
            self.backend.as_mut(),
            self.shaders.deferred,
            PostEffectParams::default(),
            false,
        );
        self.stats.draw_calls += 1;

        self.backend.set_depth_test(true);
        self.gbuffer.enable_all_attachments(self.backend.as_mut());
        self.last_drawn = PassTarget::GBuffer;
    }

    fn bind_deferred_inputs(&mut self) {
        self.backend
            .bind_texture(self.gbuffer.color_attachment(GBUFFER_POSITION), 1);
        self.backend
            .bind_texture(self.gbuffer.color_attachment(GBUFFER_NORMAL), 2);
        self.backend
            .bind_texture(self.gbuffer.color_attachment(GBUFFER_ALBEDO), 3);
        self.backend
            .bind_texture(self.gbuffer.color_attachment(GBUFFER_MATERIAL), 4);
        let occlusion = self.occlusion_texture();
        self.backend.bind_texture(occlusion, 5);
        self.backend
            .bind_texture(self.brdf_buffer.color_attachment(0), 6);
        let (irradiance, prefiltered) = match &self.active_skybox {
            Some(skybox) => (skybox.irradiance(), skybox.prefiltered()),
            None => (self.fallback_cubemap, self.fallback_cubemap),
        };
        self.backend.bind_texture(irradiance, 7);
        self.backend.bind_texture(prefiltered, 8);
    }

    /// The occlusion input the deferred pass samples: the blurred SSAO
    /// result, or pure white when SSAO is disabled
    fn occlusion_texture(&self) -> TextureId {
        if self.settings.ssao_enabled {
            self.ssao_buffers[1].color_attachment(0)
        } else {
            self.white_texture.id()
        }
    }

    /// Seed the post-processing ping-pong with the composited color
    pub fn begin_post_processing(&mut self) {
        self.post_front = 0;
        match self.last_drawn {
            PassTarget::GBuffer => self.gbuffer.copy_color_to(
                self.backend.as_mut(),
                GBUFFER_COLOR,
                &self.post_buffers[0],
            ),
            PassTarget::Post(index) => {
                self.post_buffers[index].copy_color_to(self.backend.as_mut(), 0, &self.post_buffers[0]);
            }
            PassTarget::Ssao(index) => {
                self.ssao_buffers[index].copy_color_to(self.backend.as_mut(), 0, &self.post_buffers[0]);
            }
        }
        self.last_drawn = PassTarget::Post(0);
    }

    /// Blur the bright-color attachment through the bloom ping-pong pair,
    /// then additively blend the result onto the base color; no-op when
    /// bloom is disabled
    pub fn apply_bloom(&mut self) {
        if !self.settings.bloom_enabled {
            return;
        }
        self.backend.set_depth_test(false);

        // Alternating-direction Gaussian over the bright output. The first
        // iteration reads the G-buffer; later ones read the other bloom
        // buffer.
        let mut horizontal = true;
        for iteration in 0..BLOOM_ITERATIONS {
            let write = iteration % 2;
            self.bloom_buffers[write].bind(self.backend.as_mut());
            let source = if iteration == 0 {
                self.gbuffer.color_attachment(GBUFFER_BRIGHT)
            } else {
                self.bloom_buffers[1 - write].color_attachment(0)
            };
            self.backend.bind_texture(source, 0);
            self.post.apply(
                self.backend.as_mut(),
                self.shaders.gaussian_blur,
                PostEffectParams::default(),
                horizontal,
            );
            self.stats.draw_calls += 1;
            horizontal = !horizontal;
        }
        let blurred = self.bloom_buffers[(BLOOM_ITERATIONS - 1) % 2].color_attachment(0);

        // Additive composite onto the base color, continuing the ping-pong.
        let read = self.post_front;
        let write = 1 - read;
        self.post_buffers[write].bind(self.backend.as_mut());
        self.backend
            .bind_texture(self.post_buffers[read].color_attachment(0), 0);
        self.backend.bind_texture(blurred, 1);
        self.post.apply(
            self.backend.as_mut(),
            self.shaders.additive,
            PostEffectParams::default(),
            false,
        );
        self.stats.draw_calls += 1;
        self.backend.set_depth_test(true);
        self.post_front = write;
        self.last_drawn = PassTarget::Post(write);
    }

    /// Apply an editor-attached effect list in order
    ///
    /// `effects` and `kernel_offsets` are parallel fixed-size arrays;
    /// [`PostEffect::None`] entries are skipped.
    pub fn draw_post_processing(
        &mut self,
        effects: &[PostEffect; MAX_POST_EFFECTS],
        kernel_offsets: &[f32; MAX_POST_EFFECTS],
    ) {
        for (effect, offset) in effects.iter().zip(kernel_offsets.iter()) {
            self.apply_post_effect(
                *effect,
                PostEffectParams {
                    strength: 1.0,
                    kernel_offset: *offset,
                },
            );
        }
    }

    /// Apply one effect from the catalog as a ping-pong step
    pub fn apply_post_effect(&mut self, effect: PostEffect, params: PostEffectParams) {
        let shader = match effect {
            PostEffect::None => return,
            PostEffect::Inversion => self.shaders.inversion,
            PostEffect::Greyscale => self.shaders.greyscale,
            PostEffect::Sharpen => self.shaders.sharpen,
            PostEffect::Blur => self.shaders.box_blur,
            PostEffect::EdgeDetection => self.shaders.edge_detection,
            PostEffect::GammaCorrection => self.shaders.gamma,
            PostEffect::ToneMapping => self.shaders.tonemap,
            PostEffect::GaussianBlur => self.shaders.gaussian_blur,
            PostEffect::Ssao => {
                self.backend
                    .bind_texture(self.gbuffer.color_attachment(GBUFFER_POSITION), 1);
                self.backend
                    .bind_texture(self.gbuffer.color_attachment(GBUFFER_NORMAL), 2);
                self.backend.bind_texture(self.post.noise_texture(), 3);
                self.shaders.ssao
            }
            PostEffect::SsaoBlur => self.shaders.ssao_blur,
            PostEffect::AdditiveBlending => {
                let blurred = self.bloom_buffers[(BLOOM_ITERATIONS - 1) % 2].color_attachment(0);
                self.backend.bind_texture(blurred, 1);
                self.shaders.additive
            }
            PostEffect::DeferredLighting => {
                self.bind_deferred_inputs();
                self.shaders.deferred
            }
        };
        let horizontal = params.kernel_offset >= 0.0;
        self.post_step(shader, params, horizontal);
    }

    /// One ping-pong step: read the front buffer, write the back buffer,
    /// swap
    fn post_step(&mut self, shader: crate::render::api::ShaderId, params: PostEffectParams, horizontal: bool) {
        let read = self.post_front;
        let write = 1 - read;
        self.post_buffers[write].bind(self.backend.as_mut());
        self.backend.set_depth_test(false);
        self.backend
            .bind_texture(self.post_buffers[read].color_attachment(0), 0);
        self.post
            .apply(self.backend.as_mut(), shader, params, horizontal);
        self.backend.set_depth_test(true);
        self.stats.draw_calls += 1;
        self.post_front = write;
        self.last_drawn = PassTarget::Post(write);
    }

    /// Tone-map (only when HDR output is disabled), then gamma-correct —
    /// always last
    pub fn end_post_processing(&mut self) {
        if !self.settings.hdr {
            self.post_step(self.shaders.tonemap, PostEffectParams::default(), false);
        }
        self.post_step(self.shaders.gamma, PostEffectParams::default(), false);
    }

    /// Unbind the last-drawn framebuffer
    pub fn end_render_pass(&mut self) {
        self.backend.bind_framebuffer(None);
    }

    // --- outbound interface ---------------------------------------------

    /// Resize every offscreen target; degenerate sizes are logged no-ops
    pub fn resize_framebuffer(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.gbuffer.resize(self.backend.as_mut(), width, height)?;
        for buffer in &mut self.post_buffers {
            buffer.resize(self.backend.as_mut(), width, height)?;
        }
        for buffer in &mut self.bloom_buffers {
            buffer.resize(self.backend.as_mut(), width, height)?;
        }
        for buffer in &mut self.ssao_buffers {
            buffer.resize(self.backend.as_mut(), width, height)?;
        }
        Ok(())
    }

    /// Entity id rendered at a pixel, or [`NO_ENTITY`]
    pub fn entity_id_at_pixel(&mut self, x: u32, y: u32) -> i32 {
        self.gbuffer
            .read_pixel(self.backend.as_mut(), GBUFFER_ENTITY, x, y)
    }

    /// Native texture handle of the buffer selected for display
    pub fn displayed_render_buffer_id(&self) -> u64 {
        self.framebuffer_render_id(self.settings.displayed_buffer)
    }

    /// Native texture handle for a specific buffer tag
    pub fn framebuffer_render_id(&self, tag: DisplayBuffer) -> u64 {
        let backend = self.backend.as_ref();
        match tag {
            DisplayBuffer::Final => match self.last_drawn {
                PassTarget::GBuffer => self.gbuffer.render_id(backend, GBUFFER_COLOR),
                PassTarget::Post(index) => self.post_buffers[index].render_id(backend, 0),
                PassTarget::Ssao(index) => self.ssao_buffers[index].render_id(backend, 0),
            },
            DisplayBuffer::Albedo => self.gbuffer.render_id(backend, GBUFFER_ALBEDO),
            DisplayBuffer::Position => self.gbuffer.render_id(backend, GBUFFER_POSITION),
            DisplayBuffer::Normal => self.gbuffer.render_id(backend, GBUFFER_NORMAL),
            DisplayBuffer::Material => self.gbuffer.render_id(backend, GBUFFER_MATERIAL),
            DisplayBuffer::Occlusion => self.ssao_buffers[1].render_id(backend, 0),
            DisplayBuffer::Bright => self.gbuffer.render_id(backend, GBUFFER_BRIGHT),
        }
    }

    /// Per-frame statistics for the HUD
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Occupied texture slots in the current scene, including the white
    /// fallback in slot 0
    pub fn texture_slots_occupied(&self) -> usize {
        self.slot_table.occupied()
    }

    /// Create a texture from raw RGBA8 texels on this renderer's backend
    pub fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        texels: &[u8],
    ) -> RenderResult<Texture2D> {
        Texture2D::from_rgba8(self.backend.as_mut(), width, height, texels)
    }

    /// Decode and upload a texture from disk
    pub fn load_texture(&mut self, path: impl AsRef<std::path::Path>) -> RenderResult<Texture2D> {
        Texture2D::from_file(self.backend.as_mut(), path)
    }

    /// Create a skybox from six equally-sized RGBA8 faces
    pub fn create_skybox(
        &mut self,
        face_size: u32,
        faces: &[&[u8]; 6],
    ) -> RenderResult<Skybox> {
        Skybox::from_faces(self.backend.as_mut(), face_size, faces)
    }

    /// Current settings snapshot
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Gamma exponent
    pub fn gamma(&self) -> f32 {
        self.settings.gamma
    }

    /// Set the gamma exponent (unclamped)
    pub fn set_gamma(&mut self, gamma: f32) {
        self.settings.gamma = gamma;
    }

    /// Tone-mapping exposure
    pub fn exposure(&self) -> f32 {
        self.settings.exposure
    }

    /// Set the tone-mapping exposure (unclamped)
    pub fn set_exposure(&mut self, exposure: f32) {
        self.settings.exposure = exposure;
    }

    /// Parallax-mapping height scale
    pub fn parallax_scale(&self) -> f32 {
        self.settings.parallax_scale
    }

    /// Set the parallax-mapping height scale (unclamped)
    pub fn set_parallax_scale(&mut self, scale: f32) {
        self.settings.parallax_scale = scale;
    }

    /// Bloom luminance threshold
    pub fn bloom_threshold(&self) -> f32 {
        self.settings.bloom_threshold
    }

    /// Set the bloom luminance threshold (unclamped)
    pub fn set_bloom_threshold(&mut self, threshold: f32) {
        self.settings.bloom_threshold = threshold;
    }

    /// Whether HDR output (skipping tone-mapping) is enabled
    pub fn hdr_enabled(&self) -> bool {
        self.settings.hdr
    }

    /// Enable or disable HDR output
    pub fn set_hdr_enabled(&mut self, enabled: bool) {
        self.settings.hdr = enabled;
    }

    /// Whether the bloom chain runs
    pub fn bloom_enabled(&self) -> bool {
        self.settings.bloom_enabled
    }

    /// Enable or disable bloom
    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.settings.bloom_enabled = enabled;
    }

    /// Whether the SSAO passes run
    pub fn ssao_enabled(&self) -> bool {
        self.settings.ssao_enabled
    }

    /// Enable or disable SSAO
    pub fn set_ssao_enabled(&mut self, enabled: bool) {
        self.settings.ssao_enabled = enabled;
    }

    /// Currently displayed buffer
    pub fn displayed_buffer(&self) -> DisplayBuffer {
        self.settings.displayed_buffer
    }

    /// Select which buffer the viewport displays
    pub fn set_displayed_buffer(&mut self, buffer: DisplayBuffer) {
        self.settings.displayed_buffer = buffer;
    }

    /// Set the geometry-pass clear color
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.settings.clear_color = color;
    }

    /// Capacity of the light storage buffer in bytes (growth-only)
    pub fn light_buffer_capacity(&self) -> usize {
        self.light_buffer.size()
    }

    /// Tear down every GPU resource owned by the renderer
    pub fn shutdown(mut self) {
        log::info!("shutting down renderer");
        let b = self.backend.as_mut();
        self.gbuffer.destroy(b);
        let [post_a, post_b] = self.post_buffers;
        post_a.destroy(b);
        post_b.destroy(b);
        let [bloom_a, bloom_b] = self.bloom_buffers;
        bloom_a.destroy(b);
        bloom_b.destroy(b);
        let [ssao_a, ssao_b] = self.ssao_buffers;
        ssao_a.destroy(b);
        ssao_b.destroy(b);
        self.brdf_buffer.destroy(b);

        b.destroy_vertex_array(self.quads.vertex_array);
        self.quads.vertex_buffer.destroy(b);
        b.destroy_vertex_array(self.circles.vertex_array);
        self.circles.vertex_buffer.destroy(b);
        b.destroy_vertex_array(self.lines.vertex_array);
        self.lines.vertex_buffer.destroy(b);
        b.destroy_vertex_array(self.meshes.vertex_array);
        self.meshes.vertex_buffer.destroy(b);
        self.meshes.index_buffer.destroy(b);
        b.destroy_vertex_array(self.outlines.vertex_array);
        self.outlines.vertex_buffer.destroy(b);
        self.outlines.index_buffer.destroy(b);
        self.quad_index_buffer.destroy(b);

        b.destroy_vertex_array(self.skybox_vertex_array);
        self.skybox_vertex_buffer.destroy(b);
        self.skybox_index_buffer.destroy(b);
        b.destroy_texture(self.fallback_cubemap);

        self.post.destroy(b);
    }
}

/// Indices for `MAX_QUADS` quads in 0,1,2,2,3,0 order
fn quad_index_pattern() -> Vec<u32> {
    let mut indices = Vec::with_capacity(MAX_QUADS * 6);
    for quad in 0..MAX_QUADS as u32 {
        let base = quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// Unit cube positions and indices for the skybox
fn skybox_cube() -> ([f32; 24], [u32; 36]) {
    let vertices = [
        -1.0, -1.0, -1.0, //
        1.0, -1.0, -1.0, //
        1.0, 1.0, -1.0, //
        -1.0, 1.0, -1.0, //
        -1.0, -1.0, 1.0, //
        1.0, -1.0, 1.0, //
        1.0, 1.0, 1.0, //
        -1.0, 1.0, 1.0,
    ];
    let indices = [
        0, 1, 2, 2, 3, 0, // back
        4, 5, 6, 6, 7, 4, // front
        0, 4, 7, 7, 3, 0, // left
        1, 5, 6, 6, 2, 1, // right
        3, 2, 6, 6, 7, 3, // top
        0, 1, 5, 5, 4, 0, // bottom
    ];
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_index_pattern_is_two_triangles_per_quad() {
        let pattern = quad_index_pattern();
        assert_eq!(pattern.len(), MAX_QUADS * 6);
        assert_eq!(&pattern[..6], &[0, 1, 2, 2, 3, 0]);
        assert_eq!(&pattern[6..12], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn skybox_cube_indices_are_in_range() {
        let (vertices, indices) = skybox_cube();
        assert_eq!(vertices.len(), 24);
        assert!(indices.iter().all(|&i| i < 8));
    }
}
