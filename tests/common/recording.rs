//! A [`RenderBackend`] that records what the engine asks of it.

use sector_walk::{
    Error, FramePass, ImageData, Mat4, PipelineConfig, RenderBackend, Result, SamplerConfig,
    ShaderFormat, Vertex,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Texture,
    Sampler,
    Pipeline,
    DepthTarget,
    Buffer,
}

impl Resource {
    fn name(self) -> &'static str {
        match self {
            Resource::Texture => "texture",
            Resource::Sampler => "sampler",
            Resource::Pipeline => "pipeline",
            Resource::DepthTarget => "depth target",
            Resource::Buffer => "vertex buffer",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Created(Resource, u32),
    Released(Resource, u32),
    Submitted { depth_target: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub pipeline: &'static str,
    pub blended: bool,
    pub sampler: &'static str,
    pub texture: u32,
    pub vertex_count: u32,
    pub view_proj: Mat4,
}

#[derive(Debug)]
pub struct TextureHandle {
    pub id: u32,
    pub size: (u32, u32),
    pub mip_level_count: u32,
}

#[derive(Debug)]
pub struct SamplerHandle {
    pub id: u32,
    pub config: SamplerConfig,
}

#[derive(Debug)]
pub struct PipelineHandle {
    pub id: u32,
    pub config: PipelineConfig,
}

#[derive(Debug)]
pub struct DepthHandle {
    pub id: u32,
    pub size: (u32, u32),
}

#[derive(Debug)]
pub struct BufferHandle {
    pub id: u32,
    pub vertex_count: usize,
}

#[derive(Debug)]
pub struct FrameHandle {
    pub size: (u32, u32),
}

pub struct RecordingBackend {
    pub surface: (u32, u32),
    pub formats: Vec<ShaderFormat>,
    /// The next `n` acquisitions report an unavailable swap chain.
    pub unavailable_frames: u32,
    /// The next `n` depth target creations fail.
    pub failing_depth_targets: u32,
    /// Every creation of this kind fails.
    pub failing_resource: Option<Resource>,
    pub events: Vec<Event>,
    pub draws: Vec<DrawRecord>,
    pub presents: u32,
    /// Mip level count of every texture created.
    pub mip_levels: Vec<u32>,
    next_id: u32,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: (width, height),
            formats: vec![ShaderFormat::Wgsl],
            unavailable_frames: 0,
            failing_depth_targets: 0,
            failing_resource: None,
            events: Vec::new(),
            draws: Vec::new(),
            presents: 0,
            mip_levels: Vec::new(),
            next_id: 0,
        }
    }

    fn create(&mut self, kind: Resource) -> Result<u32> {
        if self.failing_resource == Some(kind) {
            return Err(Error::ResourceCreationFailed {
                resource: kind.name(),
                reason: "injected failure".to_string(),
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(Event::Created(kind, id));
        Ok(id)
    }

    fn release(&mut self, kind: Resource, id: u32) {
        self.events.push(Event::Released(kind, id));
    }

    pub fn created(&self, kind: Resource) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Created(k, id) if *k == kind => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn released(&self) -> Vec<(Resource, u32)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Released(kind, id) => Some((*kind, *id)),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    type Texture = TextureHandle;
    type Sampler = SamplerHandle;
    type Buffer = BufferHandle;
    type DepthTarget = DepthHandle;
    type Pipeline = PipelineHandle;
    type Frame = FrameHandle;

    fn shader_formats(&self) -> &[ShaderFormat] {
        &self.formats
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    fn create_texture_from_image(
        &mut self,
        image: &ImageData,
        generate_mips: bool,
        _label: &str,
    ) -> Result<TextureHandle> {
        let id = self.create(Resource::Texture)?;
        let mip_level_count = if generate_mips {
            image.mip_level_count()
        } else {
            1
        };
        self.mip_levels.push(mip_level_count);
        Ok(TextureHandle {
            id,
            size: (image.width, image.height),
            mip_level_count,
        })
    }

    fn create_sampler(&mut self, config: &SamplerConfig) -> Result<SamplerHandle> {
        let id = self.create(Resource::Sampler)?;
        Ok(SamplerHandle {
            id,
            config: *config,
        })
    }

    fn create_pipeline(&mut self, config: &PipelineConfig) -> Result<PipelineHandle> {
        let id = self.create(Resource::Pipeline)?;
        Ok(PipelineHandle {
            id,
            config: *config,
        })
    }

    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<DepthHandle> {
        if self.failing_depth_targets > 0 {
            self.failing_depth_targets -= 1;
            return Err(Error::ResourceCreationFailed {
                resource: "depth target",
                reason: "injected failure".to_string(),
            });
        }
        let id = self.create(Resource::DepthTarget)?;
        Ok(DepthHandle {
            id,
            size: (width, height),
        })
    }

    fn depth_target_size(target: &DepthHandle) -> (u32, u32) {
        target.size
    }

    fn create_mesh_buffer(&mut self, vertices: &[Vertex], _label: &str) -> Result<BufferHandle> {
        let id = self.create(Resource::Buffer)?;
        Ok(BufferHandle {
            id,
            vertex_count: vertices.len(),
        })
    }

    fn acquire_frame(&mut self) -> Result<FrameHandle> {
        if self.unavailable_frames > 0 {
            self.unavailable_frames -= 1;
            return Err(Error::SwapchainUnavailable);
        }
        if self.surface.0 == 0 || self.surface.1 == 0 {
            return Err(Error::SwapchainUnavailable);
        }
        Ok(FrameHandle { size: self.surface })
    }

    fn frame_size(frame: &FrameHandle) -> (u32, u32) {
        frame.size
    }

    fn submit(&mut self, _frame: FrameHandle, pass: &FramePass<'_, Self>) -> Result<()> {
        assert_eq!(pass.clear_color, sector_walk::CLEAR_COLOR);
        self.events.push(Event::Submitted {
            depth_target: pass.depth_target.id,
        });
        if let Some(draw) = &pass.draw {
            assert!(draw.vertex_count > 0, "zero-length draw issued");
            assert!(draw.vertex_count as usize <= draw.vertex_buffer.vertex_count);
            self.draws.push(DrawRecord {
                pipeline: draw.pipeline.config.label,
                blended: draw.pipeline.config.blend.is_some(),
                sampler: draw.sampler.config.label,
                texture: draw.texture.id,
                vertex_count: draw.vertex_count,
                view_proj: draw.view_proj,
            });
        }
        self.presents += 1;
        Ok(())
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.release(Resource::Texture, texture.id);
    }

    fn release_sampler(&mut self, sampler: SamplerHandle) {
        self.release(Resource::Sampler, sampler.id);
    }

    fn release_pipeline(&mut self, pipeline: PipelineHandle) {
        self.release(Resource::Pipeline, pipeline.id);
    }

    fn release_depth_target(&mut self, target: DepthHandle) {
        self.release(Resource::DepthTarget, target.id);
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.release(Resource::Buffer, buffer.id);
    }
}
