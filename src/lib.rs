//! # Sector Walk
//!
//! A first-person walkthrough of a textured triangle world.
//!
//! The world is read from a small text format ([`World`]), drawn with a single
//! non-indexed draw per frame, and explored with a bobbing walk camera. Texture
//! filtering cycles between nearest, linear and mip-mapped sampling, and an
//! additive blend mode renders the world translucent.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sector_walk::{Engine, FrameStatus, InputFlag, WgpuBackend};
//! # fn demo(window: Arc<winit::window::Window>) -> sector_walk::Result<()> {
//! let backend = WgpuBackend::new(window)?;
//! let mut engine = Engine::init(backend, ".")?;
//!
//! engine.on_input(InputFlag::Forward);
//! if engine.render_frame()? == FrameStatus::Skipped {
//!     // minimized, or the swap chain was rebuilt
//! }
//! engine.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! Rendering goes through the [`RenderBackend`] trait; [`WgpuBackend`] is the
//! implementation the binary uses.

mod backend;
mod camera;
mod config;
mod engine;
mod error;
mod gpu;
mod input;
pub mod matrix;
mod mipmap;
mod pipeline;
mod resources;
mod texture;
mod wgpu_backend;
mod world;

pub use backend::{DrawCall, FramePass, RenderBackend};
pub use camera::{Camera, HeldInput};
pub use config::AppConfig;
pub use engine::{
    CLEAR_COLOR, Engine, FAR_PLANE, FIELD_OF_VIEW, FrameStatus, NEAR_PLANE, TEXTURE_FILE,
    WORLD_FILE, projection_for,
};
pub use error::{Error, Result};
pub use gpu::GpuContext;
pub use input::{BINDINGS, Input, InputFlag};
pub use pipeline::{ADDITIVE_ALPHA, DEPTH_FORMAT, PipelineConfig, ShaderFormat};
pub use resources::{RenderResources, compile_or_load_pipeline, create_samplers};
pub use texture::{Filter, ImageData, SamplerConfig, Texture, mip_level_count};
pub use wgpu_backend::{DepthTarget, WgpuBackend};
pub use world::{Triangle, Vertex, World, load_world};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3, Vec4};
