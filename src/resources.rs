//! Every GPU object the walkthrough keeps for its whole lifetime.

use crate::backend::RenderBackend;
use crate::error::{Error, Result};
use crate::pipeline::{PipelineConfig, ShaderFormat};
use crate::texture::{Filter, ImageData};
use crate::world::World;

/// Builds the three filter samplers, indexed by [`Filter::index`].
///
/// On failure the samplers already built are released before returning.
pub fn create_samplers<B: RenderBackend>(backend: &mut B) -> Result<[B::Sampler; 3]> {
    let [nearest, linear, mipmapped] = Filter::ALL.map(Filter::sampler);
    let nearest = backend.create_sampler(&nearest)?;
    let linear = match backend.create_sampler(&linear) {
        Ok(sampler) => sampler,
        Err(e) => {
            backend.release_sampler(nearest);
            return Err(e);
        }
    };
    let mipmapped = match backend.create_sampler(&mipmapped) {
        Ok(sampler) => sampler,
        Err(e) => {
            backend.release_sampler(linear);
            backend.release_sampler(nearest);
            return Err(e);
        }
    };
    Ok([nearest, linear, mipmapped])
}

/// Builds a world pipeline from whichever shader encoding the backend takes.
pub fn compile_or_load_pipeline<B: RenderBackend>(
    backend: &mut B,
    blended: bool,
) -> Result<B::Pipeline> {
    let shader = ShaderFormat::negotiate(backend.shader_formats())
        .ok_or_else(|| Error::resource("pipeline", "no supported shader format"))?;
    let config = if blended {
        PipelineConfig::blended(shader)
    } else {
        PipelineConfig::opaque(shader)
    };
    backend.create_pipeline(&config)
}

/// Texture, samplers, pipelines, depth target and mesh, created in that order.
pub struct RenderResources<B: RenderBackend> {
    texture: B::Texture,
    samplers: [B::Sampler; 3],
    opaque: B::Pipeline,
    blended: B::Pipeline,
    /// Empty after a failed recreation until the next frame retries.
    depth: Option<B::DepthTarget>,
    mesh: B::Buffer,
    vertex_count: u32,
}

/// Handles acquired so far by [`RenderResources::create`].
struct Staged<B: RenderBackend> {
    texture: Option<B::Texture>,
    samplers: Option<[B::Sampler; 3]>,
    opaque: Option<B::Pipeline>,
    blended: Option<B::Pipeline>,
    depth: Option<B::DepthTarget>,
}

impl<B: RenderBackend> Staged<B> {
    fn new() -> Self {
        Self {
            texture: None,
            samplers: None,
            opaque: None,
            blended: None,
            depth: None,
        }
    }

    fn acquire(&mut self, backend: &mut B, image: &ImageData) -> Result<()> {
        self.texture = Some(backend.create_texture_from_image(image, true, "Mud Texture")?);
        self.samplers = Some(create_samplers(backend)?);
        self.opaque = Some(compile_or_load_pipeline(backend, false)?);
        self.blended = Some(compile_or_load_pipeline(backend, true)?);

        let (width, height) = backend.surface_size();
        self.depth = Some(backend.create_depth_target(width.max(1), height.max(1))?);
        Ok(())
    }

    /// Frees whatever was acquired, newest first.
    fn release(self, backend: &mut B) {
        if let Some(depth) = self.depth {
            backend.release_depth_target(depth);
        }
        if let Some(blended) = self.blended {
            backend.release_pipeline(blended);
        }
        if let Some(opaque) = self.opaque {
            backend.release_pipeline(opaque);
        }
        if let Some([nearest, linear, mipmapped]) = self.samplers {
            backend.release_sampler(mipmapped);
            backend.release_sampler(linear);
            backend.release_sampler(nearest);
        }
        if let Some(texture) = self.texture {
            backend.release_texture(texture);
        }
    }
}

impl<B: RenderBackend> RenderResources<B> {
    /// Creates everything in order. If any step fails, the handles created
    /// before it are released in reverse order and the error is returned.
    pub fn create(backend: &mut B, world: &World, image: &ImageData) -> Result<Self> {
        let mut staged = Staged::new();
        let acquired = staged.acquire(backend, image).and_then(|()| {
            let vertex_count = u32::try_from(world.vertex_count())
                .map_err(|_| Error::resource("vertex buffer", "world has too many vertices"))?;
            let mesh = backend.create_mesh_buffer(world.vertices(), "World Vertices")?;
            Ok((mesh, vertex_count))
        });
        let (mesh, vertex_count) = match acquired {
            Ok(done) => done,
            Err(e) => {
                log::warn!("render resource creation failed, releasing partial set: {e}");
                staged.release(backend);
                return Err(e);
            }
        };

        match staged {
            Staged {
                texture: Some(texture),
                samplers: Some(samplers),
                opaque: Some(opaque),
                blended: Some(blended),
                depth: Some(depth),
            } => {
                log::info!(
                    "render resources ready: {}x{} texture, {vertex_count} vertices",
                    image.width,
                    image.height
                );
                Ok(Self {
                    texture,
                    samplers,
                    opaque,
                    blended,
                    depth: Some(depth),
                    mesh,
                    vertex_count,
                })
            }
            partial => {
                backend.release_buffer(mesh);
                partial.release(backend);
                Err(Error::resource("render resources", "incomplete resource set"))
            }
        }
    }

    /// Makes sure the depth target matches `size`, replacing it if not.
    ///
    /// The old target is freed before the new one is created. If creation
    /// fails the error is returned and the next call tries again.
    pub fn ensure_depth_target(&mut self, backend: &mut B, size: (u32, u32)) -> Result<()> {
        if let Some(depth) = &self.depth {
            let actual = B::depth_target_size(depth);
            if actual == size {
                return Ok(());
            }
            log::debug!(
                "{}",
                Error::DepthTargetStale {
                    expected: size,
                    actual
                }
            );
        }

        if let Some(stale) = self.depth.take() {
            backend.release_depth_target(stale);
        }
        self.depth = Some(backend.create_depth_target(size.0, size.1)?);
        Ok(())
    }

    pub fn depth_target(&self) -> Option<&B::DepthTarget> {
        self.depth.as_ref()
    }

    pub fn texture(&self) -> &B::Texture {
        &self.texture
    }

    pub fn sampler(&self, filter: Filter) -> &B::Sampler {
        &self.samplers[filter.index()]
    }

    pub fn pipeline(&self, blended: bool) -> &B::Pipeline {
        if blended { &self.blended } else { &self.opaque }
    }

    pub fn mesh(&self) -> &B::Buffer {
        &self.mesh
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Frees everything in reverse creation order.
    pub fn release(self, backend: &mut B) {
        let [nearest, linear, mipmapped] = self.samplers;

        backend.release_buffer(self.mesh);
        if let Some(depth) = self.depth {
            backend.release_depth_target(depth);
        }
        backend.release_pipeline(self.blended);
        backend.release_pipeline(self.opaque);
        backend.release_sampler(mipmapped);
        backend.release_sampler(linear);
        backend.release_sampler(nearest);
        backend.release_texture(self.texture);

        log::info!("render resources released");
    }
}
