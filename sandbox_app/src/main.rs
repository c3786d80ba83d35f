//! Sandbox: drives the full per-frame pipeline on the headless backend
//!
//! Renders a small scene (ground plane, a ring of cubes, a few sprites and
//! debug shapes, three lights) for a handful of frames and prints the
//! per-frame draw statistics, demonstrating the complete pass sequence
//! without needing a GPU or a window.

use prism_engine::prelude::*;
use prism_engine::render::backends;

fn build_lights() -> Vec<GpuLight> {
    let sun_transform = TransformComponent::default();
    let sun = LightComponent {
        kind: LightKind::Directional,
        color: Vec3::new(1.0, 0.96, 0.9),
        intensity: 2.0,
        ambient: 0.15,
        ..Default::default()
    };

    let mut lamp_transform = TransformComponent::default();
    lamp_transform.transform.position = Vec3::new(3.0, 4.0, 1.0);
    let lamp = LightComponent {
        kind: LightKind::Point,
        color: Vec3::new(0.9, 0.4, 0.2),
        intensity: 6.0,
        radius: 12.0,
        ..Default::default()
    };

    let mut spot_transform = TransformComponent::default();
    spot_transform.transform.position = Vec3::new(-4.0, 6.0, 2.0);
    let spot = LightComponent {
        kind: LightKind::Spot,
        color: Vec3::new(0.3, 0.5, 1.0),
        intensity: 8.0,
        radius: 20.0,
        inner_angle: 0.25,
        outer_angle: 0.4,
        ..Default::default()
    };

    collect_lights([
        (&sun_transform, &sun),
        (&lamp_transform, &lamp),
        (&spot_transform, &spot),
    ])
}

fn run() -> Result<(), RenderError> {
    let config = EngineConfig::default();
    let backend = backends::select(BackendKind::Headless)?;
    let mut renderer = Renderer::new(backend, &config.renderer)?;

    let camera = EditorCamera::default();
    let lights = build_lights();
    let cube = Mesh::cube();
    let ground = Mesh::plane();
    let checker = renderer.create_texture_rgba8(
        2,
        2,
        &[
            0xff, 0xff, 0xff, 0xff, 0x30, 0x30, 0x30, 0xff, //
            0x30, 0x30, 0x30, 0xff, 0xff, 0xff, 0xff, 0xff,
        ],
    )?;
    let night: [u8; 4] = [26, 30, 48, 255];
    let skybox = renderer.create_skybox(1, &[&night, &night, &night, &night, &night, &night])?;

    let mut post_chain = PostProcessComponent::default();
    post_chain.set_effect(0, PostEffect::Sharpen, 1.0 / 300.0);

    for frame in 0..5 {
        let spin = frame as f32 * 0.2;

        renderer.begin_render_pass();
        renderer.begin_scene_editor(&camera, &lights);

        let ground_transform = Transform {
            scale: Vec3::new(30.0, 1.0, 30.0),
            ..Default::default()
        };
        renderer.draw_mesh(
            &ground_transform.to_matrix(),
            &ground,
            &MeshMaterial {
                color: Vec4::new(0.6, 0.6, 0.65, 1.0),
                roughness: 0.9,
                ..Default::default()
            },
            -1,
        );

        for i in 0..8 {
            let angle = spin + i as f32 * std::f32::consts::FRAC_PI_4;
            let transform = Transform {
                position: Vec3::new(angle.cos() * 5.0, 1.0, angle.sin() * 5.0),
                ..Default::default()
            };
            renderer.draw_mesh(
                &transform.to_matrix(),
                &cube,
                &MeshMaterial {
                    color: Vec4::new(0.8, 0.3, 0.25, 1.0),
                    metallic: 0.1,
                    roughness: 0.4,
                    texture: Some(checker),
                },
                i,
            );
        }

        // Selection outline around the first cube.
        let selected = Transform {
            position: Vec3::new(spin.cos() * 5.0, 1.0, spin.sin() * 5.0),
            scale: Vec3::new(1.05, 1.05, 1.05),
            ..Default::default()
        };
        renderer.draw_mesh_outline(
            &selected.to_matrix(),
            &cube,
            Vec4::new(1.0, 0.55, 0.0, 1.0),
            0,
        );

        // Editor helpers: a gizmo rect, axes, and a soft circle marker.
        let marker = Transform {
            position: Vec3::new(0.0, 0.02, 0.0),
            ..Default::default()
        };
        renderer.draw_rect(&marker.to_matrix(), Vec4::new(0.2, 0.8, 0.2, 1.0), -1);
        renderer.draw_circle(&marker.to_matrix(), Vec4::new(0.2, 0.6, 1.0, 1.0), 0.1, 0.01, -1);
        renderer.draw_line(
            Vec3::zeros(),
            Vec3::new(0.0, 3.0, 0.0),
            Vec4::new(0.1, 1.0, 0.1, 1.0),
            -1,
        );
        renderer.draw_sprite(
            &Transform::from_position(Vec3::new(0.0, 3.0, 0.0)).to_matrix(),
            Vec4::new(1.0, 1.0, 0.4, 1.0),
            Some(&checker),
            2.0,
            -1,
        );
        renderer.draw_skybox(&skybox);

        renderer.end_scene();
        renderer.ssao_pass();
        renderer.deferred_lighting_pass();
        renderer.begin_post_processing();
        renderer.apply_bloom();
        renderer.draw_post_processing(&post_chain.effects, &post_chain.kernel_offsets);
        renderer.end_post_processing();
        renderer.end_render_pass();

        let stats = renderer.stats();
        log::info!(
            "frame {frame}: {} draw calls, {} quads, {} circles, {} lines, {} meshes, {} outlines, {} vertices",
            stats.draw_calls,
            stats.quad_count,
            stats.circle_count,
            stats.line_count,
            stats.mesh_count,
            stats.outline_count,
            stats.total_vertex_count
        );
    }

    println!(
        "displayed buffer handle: {:#x}",
        renderer.displayed_render_buffer_id()
    );
    println!(
        "entity under cursor (320, 240): {}",
        renderer.entity_id_at_pixel(320, 240)
    );
    renderer.shutdown();
    Ok(())
}

fn main() {
    prism_engine::foundation::logging::init_with_default("info");
    if let Err(err) = run() {
        log::error!("sandbox failed: {err}");
        std::process::exit(1);
    }
}
