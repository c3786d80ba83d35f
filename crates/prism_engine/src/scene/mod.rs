//! Scene/editor integration boundary
//!
//! The renderer consumes camera, transform, light, and post-process data
//! from whatever entity storage the scene uses; this module defines the pure
//! data components at that boundary and the per-frame conversions into
//! renderer inputs. The storage mechanism itself is external: everything
//! here works on iterators of component pairs, never on a concrete
//! container.

pub mod components;
pub mod lights;

pub use components::{
    CameraComponent, LightComponent, LightKind, MeshComponent, OutlineComponent,
    PostProcessComponent, SpriteComponent, TransformComponent,
};
pub use lights::collect_lights;
