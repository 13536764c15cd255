//! The seam between the engine and a GPU API.
//!
//! [`Engine`](crate::Engine) only ever talks to a [`RenderBackend`]. Every GPU
//! object is an owned associated type, so a handle can't outlive the backend
//! that made it, and the `release_*` methods consume the handle they free.

use glam::Mat4;

use crate::error::Result;
use crate::pipeline::{PipelineConfig, ShaderFormat};
use crate::texture::{ImageData, SamplerConfig};
use crate::world::Vertex;

/// A GPU API the walkthrough can render through.
pub trait RenderBackend {
    type Texture;
    type Sampler;
    type Buffer;
    type DepthTarget;
    type Pipeline;
    /// A presentable image acquired for one frame.
    type Frame;

    /// Shader encodings this backend can build pipelines from.
    fn shader_formats(&self) -> &[ShaderFormat];

    /// Current drawable size in pixels. Either side may be zero.
    fn surface_size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    fn create_texture_from_image(
        &mut self,
        image: &ImageData,
        generate_mips: bool,
        label: &str,
    ) -> Result<Self::Texture>;

    fn create_sampler(&mut self, config: &SamplerConfig) -> Result<Self::Sampler>;

    fn create_pipeline(&mut self, config: &PipelineConfig) -> Result<Self::Pipeline>;

    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<Self::DepthTarget>;

    fn depth_target_size(target: &Self::DepthTarget) -> (u32, u32);

    /// Uploads vertices into an immutable, non-indexed vertex buffer.
    fn create_mesh_buffer(&mut self, vertices: &[Vertex], label: &str) -> Result<Self::Buffer>;

    /// Fails with [`Error::SwapchainUnavailable`](crate::Error::SwapchainUnavailable)
    /// when nothing can be presented right now.
    fn acquire_frame(&mut self) -> Result<Self::Frame>;

    fn frame_size(frame: &Self::Frame) -> (u32, u32);

    /// Records the pass, submits it and presents `frame`.
    fn submit(&mut self, frame: Self::Frame, pass: &FramePass<'_, Self>) -> Result<()>;

    fn release_texture(&mut self, texture: Self::Texture);
    fn release_sampler(&mut self, sampler: Self::Sampler);
    fn release_pipeline(&mut self, pipeline: Self::Pipeline);
    fn release_depth_target(&mut self, target: Self::DepthTarget);
    fn release_buffer(&mut self, buffer: Self::Buffer);
}

/// One frame's worth of work: clear colour and depth, then at most one draw.
pub struct FramePass<'a, B: RenderBackend + ?Sized> {
    pub clear_color: wgpu::Color,
    pub depth_target: &'a B::DepthTarget,
    /// `None` when there is nothing to draw; the pass still clears.
    pub draw: Option<DrawCall<'a, B>>,
}

/// A non-indexed triangle-list draw of the world mesh.
pub struct DrawCall<'a, B: RenderBackend + ?Sized> {
    pub pipeline: &'a B::Pipeline,
    pub texture: &'a B::Texture,
    pub sampler: &'a B::Sampler,
    pub vertex_buffer: &'a B::Buffer,
    pub vertex_count: u32,
    pub view_proj: Mat4,
}
