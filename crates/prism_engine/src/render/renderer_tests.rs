//! End-to-end tests for the per-frame renderer protocol
//!
//! Run against the headless backend so the full pass sequence, batching
//! invariants, and readback semantics are observable without a GPU.

use crate::config::{BackendKind, RendererConfig};
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::backends::HeadlessBackend;
use crate::render::batch::{MAX_QUADS, MAX_TEXTURE_SLOTS};
use crate::render::camera::EditorCamera;
use crate::render::lighting::GpuLight;
use crate::render::mesh::{Mesh, MeshMaterial};
use crate::render::pipeline::{PostEffect, Renderer, BLOOM_ITERATIONS, MAX_POST_EFFECTS, NO_ENTITY};
use crate::render::texture::Texture2D;
use bytemuck::Zeroable;

fn test_renderer() -> Renderer {
    let config = RendererConfig {
        backend: BackendKind::Headless,
        width: 640,
        height: 480,
        samples: 1,
    };
    Renderer::new(Box::new(HeadlessBackend::new()), &config).expect("headless renderer")
}

fn distinct_texture(renderer: &mut Renderer) -> Texture2D {
    renderer
        .create_texture_rgba8(1, 1, &[0x80, 0x80, 0x80, 0xff])
        .expect("texture")
}

/// Run the geometry portion of a frame: pass begin + scene begin.
fn begin_frame(renderer: &mut Renderer) {
    renderer.begin_render_pass();
    renderer.begin_scene_editor(&EditorCamera::default(), &[]);
}

#[test]
fn quad_overflow_forces_ceil_n_over_capacity_flushes() {
    let mut renderer = test_renderer();
    begin_frame(&mut renderer);

    // One quad past capacity: exactly one implicit flush mid-scene plus the
    // end-of-scene flush.
    let n = MAX_QUADS + 1;
    let transform = Mat4::identity();
    let color = Vec4::new(1.0, 1.0, 1.0, 1.0);
    for _ in 0..n {
        renderer.draw_quad(&transform, color, NO_ENTITY);
    }
    renderer.end_scene();

    let stats = renderer.stats();
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.quad_count, n as u32);
    assert_eq!(stats.total_vertex_count, (n * 4) as u32);
    assert_eq!(stats.total_index_count, (n * 6) as u32);
}

#[test]
fn exactly_full_batch_flushes_once() {
    let mut renderer = test_renderer();
    begin_frame(&mut renderer);
    let transform = Mat4::identity();
    for _ in 0..MAX_QUADS {
        renderer.draw_quad(&transform, Vec4::new(1.0, 1.0, 1.0, 1.0), NO_ENTITY);
    }
    renderer.end_scene();
    assert_eq!(renderer.stats().draw_calls, 1);
}

#[test]
fn same_texture_twice_occupies_one_slot() {
    let mut renderer = test_renderer();
    let texture = distinct_texture(&mut renderer);
    begin_frame(&mut renderer);

    let transform = Mat4::identity();
    let color = Vec4::new(1.0, 1.0, 1.0, 1.0);
    renderer.draw_textured_quad(&transform, &texture, 1.0, color, NO_ENTITY);
    renderer.draw_textured_quad(&transform, &texture, 1.0, color, NO_ENTITY);

    // White fallback + the one deduplicated texture.
    assert_eq!(renderer.texture_slots_occupied(), 2);
    renderer.end_scene();
}

#[test]
fn texture_table_overflow_triggers_one_implicit_flush() {
    let mut renderer = test_renderer();
    let textures: Vec<Texture2D> = (0..MAX_TEXTURE_SLOTS)
        .map(|_| distinct_texture(&mut renderer))
        .collect();
    begin_frame(&mut renderer);

    let transform = Mat4::identity();
    let color = Vec4::new(1.0, 1.0, 1.0, 1.0);

    // 31 distinct textures fill the table alongside the white fallback,
    // without any flush.
    for texture in &textures[..MAX_TEXTURE_SLOTS - 1] {
        renderer.draw_textured_quad(&transform, texture, 1.0, color, NO_ENTITY);
    }
    assert_eq!(renderer.texture_slots_occupied(), MAX_TEXTURE_SLOTS);
    assert_eq!(renderer.stats().draw_calls, 0);

    // The 32nd distinct texture overflows the table: exactly one implicit
    // flush, after which it occupies slot 1 of the reset table.
    renderer.draw_textured_quad(&transform, &textures[MAX_TEXTURE_SLOTS - 1], 1.0, color, NO_ENTITY);
    assert_eq!(renderer.stats().draw_calls, 1);
    assert_eq!(renderer.texture_slots_occupied(), 2);

    renderer.end_scene();
    assert_eq!(renderer.stats().draw_calls, 2);
}

#[test]
fn entity_attachment_reads_sentinel_after_pass_begin() {
    let mut renderer = test_renderer();
    renderer.begin_render_pass();
    assert_eq!(renderer.entity_id_at_pixel(17, 230), NO_ENTITY);
}

#[test]
fn pipeline_emits_a_fixed_countable_draw_sequence() {
    let mut renderer = test_renderer();
    renderer.set_hdr_enabled(false);
    renderer.set_bloom_enabled(true);
    renderer.set_ssao_enabled(true);

    begin_frame(&mut renderer);
    renderer.draw_quad(&Mat4::identity(), Vec4::new(1.0, 1.0, 1.0, 1.0), NO_ENTITY);
    renderer.end_scene();
    let geometry = renderer.stats().draw_calls;
    assert_eq!(geometry, 1);

    renderer.ssao_pass();
    assert_eq!(renderer.stats().draw_calls, geometry + 2); // occlusion + blur

    renderer.deferred_lighting_pass();
    assert_eq!(renderer.stats().draw_calls, geometry + 3);

    renderer.begin_post_processing();
    renderer.apply_bloom();
    // 20 Gaussian iterations plus the additive composite.
    assert_eq!(
        renderer.stats().draw_calls,
        geometry + 3 + BLOOM_ITERATIONS as u32 + 1
    );

    renderer.end_post_processing();
    // Tone-mapping (HDR off) and gamma correction.
    assert_eq!(
        renderer.stats().draw_calls,
        geometry + 3 + BLOOM_ITERATIONS as u32 + 3
    );
    renderer.end_render_pass();
}

#[test]
fn hdr_skips_tonemapping_and_disabled_passes_drop_out() {
    let mut renderer = test_renderer();
    renderer.set_hdr_enabled(true);
    renderer.set_bloom_enabled(false);
    renderer.set_ssao_enabled(false);

    begin_frame(&mut renderer);
    renderer.draw_quad(&Mat4::identity(), Vec4::new(1.0, 1.0, 1.0, 1.0), NO_ENTITY);
    renderer.end_scene();
    renderer.ssao_pass();
    renderer.deferred_lighting_pass();
    renderer.begin_post_processing();
    renderer.apply_bloom();
    renderer.end_post_processing();
    renderer.end_render_pass();

    // flush + deferred + gamma only.
    assert_eq!(renderer.stats().draw_calls, 3);
}

#[test]
fn light_storage_grows_but_never_shrinks() {
    let mut renderer = test_renderer();
    let initial = renderer.light_buffer_capacity();

    let many: Vec<GpuLight> = vec![GpuLight::zeroed(); 40];
    renderer.begin_render_pass();
    renderer.begin_scene_editor(&EditorCamera::default(), &many);
    renderer.end_scene();
    let grown = renderer.light_buffer_capacity();
    assert!(grown >= 40 * std::mem::size_of::<GpuLight>());
    assert!(grown >= initial);

    let few: Vec<GpuLight> = vec![GpuLight::zeroed(); 2];
    renderer.begin_render_pass();
    renderer.begin_scene_editor(&EditorCamera::default(), &few);
    renderer.end_scene();
    assert_eq!(renderer.light_buffer_capacity(), grown);
}

#[test]
fn settings_round_trip_unclamped() {
    let mut renderer = test_renderer();

    renderer.set_gamma(1.8);
    assert_eq!(renderer.gamma(), 1.8);
    renderer.set_exposure(3.5);
    assert_eq!(renderer.exposure(), 3.5);
    renderer.set_parallax_scale(0.2);
    assert_eq!(renderer.parallax_scale(), 0.2);
    renderer.set_bloom_threshold(7.25);
    assert_eq!(renderer.bloom_threshold(), 7.25);

    renderer.set_hdr_enabled(true);
    assert!(renderer.hdr_enabled());
    renderer.set_bloom_enabled(false);
    assert!(!renderer.bloom_enabled());
    renderer.set_ssao_enabled(false);
    assert!(!renderer.ssao_enabled());
}

#[test]
fn mixed_families_flush_in_one_scene() {
    let mut renderer = test_renderer();
    begin_frame(&mut renderer);

    let transform = Mat4::identity();
    let color = Vec4::new(0.2, 0.9, 0.4, 1.0);
    renderer.draw_quad(&transform, color, 1);
    renderer.draw_circle(&transform, color, 1.0, 0.01, 2);
    renderer.draw_line(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), color, 3);
    renderer.draw_rect(&transform, color, 4);
    let cube = Mesh::cube();
    renderer.draw_mesh(&transform, &cube, &MeshMaterial::default(), 5);
    renderer.draw_mesh_outline(&transform, &cube, color, 5);
    renderer.end_scene();

    let stats = renderer.stats();
    // One flush per nonempty family: quads, circles, lines, meshes, outlines.
    assert_eq!(stats.draw_calls, 5);
    assert_eq!(stats.quad_count, 1);
    assert_eq!(stats.circle_count, 1);
    assert_eq!(stats.line_count, 5); // one explicit line + four rect edges
    assert_eq!(stats.mesh_count, 1);
    assert_eq!(stats.outline_count, 1);
}

#[test]
fn stats_reset_at_pass_begin() {
    let mut renderer = test_renderer();
    begin_frame(&mut renderer);
    renderer.draw_quad(&Mat4::identity(), Vec4::new(1.0, 1.0, 1.0, 1.0), NO_ENTITY);
    renderer.end_scene();
    assert!(renderer.stats().draw_calls > 0);

    renderer.begin_render_pass();
    assert_eq!(renderer.stats().draw_calls, 0);
    assert_eq!(renderer.stats().quad_count, 0);
}

#[test]
fn custom_post_effects_each_advance_the_ping_pong() {
    let mut renderer = test_renderer();
    renderer.set_ssao_enabled(false);
    renderer.set_bloom_enabled(false);
    renderer.set_hdr_enabled(true);

    begin_frame(&mut renderer);
    renderer.end_scene();
    renderer.deferred_lighting_pass();
    renderer.begin_post_processing();

    let mut effects = [PostEffect::None; MAX_POST_EFFECTS];
    effects[0] = PostEffect::Greyscale;
    effects[1] = PostEffect::Sharpen;
    effects[2] = PostEffect::Blur;
    let offsets = [1.0 / 300.0; MAX_POST_EFFECTS];

    let before = renderer.stats().draw_calls;
    renderer.draw_post_processing(&effects, &offsets);
    assert_eq!(renderer.stats().draw_calls, before + 3);

    renderer.end_post_processing();
    renderer.end_render_pass();
}

#[test]
fn viewport_resize_rejects_degenerate_sizes() {
    let mut renderer = test_renderer();
    renderer.resize_framebuffer(0, 720).expect("soft no-op");
    renderer.resize_framebuffer(1920, 1080).expect("resize");
    renderer.begin_render_pass();
    assert_eq!(renderer.entity_id_at_pixel(1900, 1000), NO_ENTITY);
}

#[test]
fn shutdown_consumes_the_renderer() {
    let renderer = test_renderer();
    renderer.shutdown();
}
