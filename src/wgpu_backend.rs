//! [`RenderBackend`] on top of wgpu.

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{FramePass, RenderBackend};
use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::mipmap::MipGenerator;
use crate::pipeline::{DEPTH_FORMAT, PipelineConfig, ShaderFormat};
use crate::texture::{ImageData, SamplerConfig, Texture};
use crate::world::Vertex;

/// Uniform buffer layout for the world shader. Must match `world.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct WorldUniforms {
    view_proj: [[f32; 4]; 4],
}

/// A depth buffer together with the size it was created for.
#[derive(Debug)]
pub struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

/// Renders the walkthrough through wgpu into a winit window.
pub struct WgpuBackend {
    gpu: GpuContext,
    mips: MipGenerator,
    world_shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
}

impl WgpuBackend {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let gpu = GpuContext::new(window)?;
        Self::from_context(gpu)
    }

    pub fn from_context(gpu: GpuContext) -> Result<Self> {
        let world_shader = gpu.scoped("world shader", |device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("World Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/world.wgsl").into()),
            })
        })?;

        let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("World Uniforms"),
            size: std::mem::size_of::<WorldUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("World Uniform Bind Group Layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let uniform_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("World Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("World Texture Bind Group Layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("World Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
                push_constant_ranges: &[],
            });

        let mips = MipGenerator::new(&gpu.device);

        Ok(Self {
            gpu,
            mips,
            world_shader,
            pipeline_layout,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group_layout,
        })
    }
}

impl RenderBackend for WgpuBackend {
    type Texture = Texture;
    type Sampler = wgpu::Sampler;
    type Buffer = wgpu::Buffer;
    type DepthTarget = DepthTarget;
    type Pipeline = wgpu::RenderPipeline;
    type Frame = wgpu::SurfaceTexture;

    fn shader_formats(&self) -> &[ShaderFormat] {
        &[ShaderFormat::Wgsl]
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.gpu.width(), self.gpu.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn create_texture_from_image(
        &mut self,
        image: &ImageData,
        generate_mips: bool,
        label: &str,
    ) -> Result<Texture> {
        Texture::from_image(&self.gpu, &self.mips, image, generate_mips, label)
    }

    fn create_sampler(&mut self, config: &SamplerConfig) -> Result<wgpu::Sampler> {
        self.gpu
            .scoped("sampler", |device| device.create_sampler(&config.descriptor()))
    }

    fn create_pipeline(&mut self, config: &PipelineConfig) -> Result<wgpu::RenderPipeline> {
        if config.shader != ShaderFormat::Wgsl {
            return Err(Error::resource(
                "pipeline",
                format!("{:?} shaders are not supported", config.shader),
            ));
        }

        self.gpu.scoped("pipeline", |device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(config.label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.world_shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.world_shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.config.format,
                        blend: config.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: config.primitive(),
                depth_stencil: Some(config.depth_stencil()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })
    }

    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<DepthTarget> {
        let texture = self.gpu.scoped("depth target", |device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        })?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(DepthTarget {
            texture,
            view,
            size: (width, height),
        })
    }

    fn depth_target_size(target: &DepthTarget) -> (u32, u32) {
        target.size
    }

    fn create_mesh_buffer(&mut self, vertices: &[Vertex], label: &str) -> Result<wgpu::Buffer> {
        self.gpu.scoped("vertex buffer", |device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })
    }

    fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture> {
        if !self.gpu.has_area() {
            return Err(Error::SwapchainUnavailable);
        }

        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                log::debug!("surface outdated, reconfiguring");
                self.gpu.reconfigure();
                Err(Error::SwapchainUnavailable)
            }
            Err(wgpu::SurfaceError::Timeout) => Err(Error::SwapchainUnavailable),
            Err(e) => Err(Error::Backend(e.to_string())),
        }
    }

    fn frame_size(frame: &wgpu::SurfaceTexture) -> (u32, u32) {
        (frame.texture.width(), frame.texture.height())
    }

    fn submit(&mut self, frame: wgpu::SurfaceTexture, pass: &FramePass<'_, Self>) -> Result<()> {
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let texture_bind_group = pass.draw.as_ref().map(|draw| {
            self.gpu
                .queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&WorldUniforms {
                    view_proj: draw.view_proj.to_cols_array_2d(),
                }));
            self.gpu
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("World Texture Bind Group"),
                    layout: &self.texture_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&draw.texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(draw.sampler),
                        },
                    ],
                })
        });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("World Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("World Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pass.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &pass.depth_target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (Some(draw), Some(bind_group)) = (&pass.draw, &texture_bind_group) {
                render_pass.set_pipeline(draw.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                render_pass.draw(0..draw.vertex_count, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release_texture(&mut self, texture: Texture) {
        texture.texture.destroy();
    }

    fn release_sampler(&mut self, sampler: wgpu::Sampler) {
        drop(sampler);
    }

    fn release_pipeline(&mut self, pipeline: wgpu::RenderPipeline) {
        drop(pipeline);
    }

    fn release_depth_target(&mut self, target: DepthTarget) {
        target.texture.destroy();
    }

    fn release_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}
