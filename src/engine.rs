//! The walkthrough session: input, camera, and one frame at a time.

use std::path::Path;

use glam::Mat4;

use crate::backend::{DrawCall, FramePass, RenderBackend};
use crate::camera::{Camera, HeldInput};
use crate::error::Result;
use crate::input::InputFlag;
use crate::matrix;
use crate::resources::RenderResources;
use crate::texture::{Filter, ImageData};
use crate::world::World;

/// Vertical field of view in degrees.
pub const FIELD_OF_VIEW: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// World file, relative to the resource root.
pub const WORLD_FILE: &str = "Data/World.txt";
/// Texture image, relative to the resource root.
pub const TEXTURE_FILE: &str = "Data/Mud.bmp";

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// What [`Engine::render_frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// Nothing was drawn and the camera did not move.
    Skipped,
}

/// Projection for a drawable of the given size. A zero height counts as one.
pub fn projection_for(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    matrix::perspective(FIELD_OF_VIEW, aspect, NEAR_PLANE, FAR_PLANE)
}

/// A running walkthrough bound to one backend.
pub struct Engine<B: RenderBackend> {
    backend: B,
    resources: RenderResources<B>,
    world: World,
    camera: Camera,
    projection: Mat4,
    held: HeldInput,
    filter: Filter,
    blend: bool,
}

impl<B: RenderBackend> Engine<B> {
    /// Loads `Data/World.txt` and `Data/Mud.bmp` from `resource_root` and
    /// creates every GPU resource. Any failure is fatal.
    pub fn init(backend: B, resource_root: impl AsRef<Path>) -> Result<Self> {
        let root = resource_root.as_ref();
        let world = World::from_file(root.join(WORLD_FILE))?;
        let image = ImageData::open(root.join(TEXTURE_FILE))?;
        Self::with_assets(backend, world, &image)
    }

    /// Starts a session from assets that are already in memory.
    pub fn with_assets(mut backend: B, world: World, image: &ImageData) -> Result<Self> {
        let resources = RenderResources::create(&mut backend, &world, image)?;
        let (width, height) = backend.surface_size();

        Ok(Self {
            backend,
            resources,
            world,
            camera: Camera::new(),
            projection: projection_for(width, height),
            held: HeldInput::default(),
            filter: Filter::default(),
            blend: false,
        })
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
        self.projection = projection_for(width, height);
    }

    /// Held flags apply to the next rendered frame only; toggles apply now.
    pub fn on_input(&mut self, flag: InputFlag) {
        match flag {
            InputFlag::Forward => self.held.forward = true,
            InputFlag::Back => self.held.back = true,
            InputFlag::Left => self.held.turn_left = true,
            InputFlag::Right => self.held.turn_right = true,
            InputFlag::LookUp => self.held.look_up = true,
            InputFlag::LookDown => self.held.look_down = true,
            InputFlag::ToggleBlend => {
                self.blend = !self.blend;
                log::debug!("blending {}", if self.blend { "on" } else { "off" });
            }
            InputFlag::CycleFilter => {
                self.filter = self.filter.next();
                log::debug!("filter {:?}", self.filter);
            }
        }
    }

    /// Draws and presents one frame, then advances the camera.
    ///
    /// A missing swap chain image or depth target skips the frame; only
    /// non-transient backend faults are returned as errors.
    pub fn render_frame(&mut self) -> Result<FrameStatus> {
        let held = std::mem::take(&mut self.held);

        let frame = match self.backend.acquire_frame() {
            Ok(frame) => frame,
            Err(e) if e.is_transient() => {
                log::debug!("skipping frame: {e}");
                return Ok(FrameStatus::Skipped);
            }
            Err(e) => return Err(e),
        };

        let size = B::frame_size(&frame);
        if let Err(e) = self.resources.ensure_depth_target(&mut self.backend, size) {
            log::warn!("depth target unavailable, retrying next frame: {e}");
            return Ok(FrameStatus::Skipped);
        }

        let resources = &self.resources;
        let Some(depth_target) = resources.depth_target() else {
            return Ok(FrameStatus::Skipped);
        };

        let view_proj = matrix::multiply(self.projection, self.camera.model_view());
        let vertex_count = resources.vertex_count();
        let draw = (vertex_count > 0).then(|| DrawCall {
            pipeline: resources.pipeline(self.blend),
            texture: resources.texture(),
            sampler: resources.sampler(self.filter),
            vertex_buffer: resources.mesh(),
            vertex_count,
            view_proj,
        });

        let pass = FramePass {
            clear_color: CLEAR_COLOR,
            depth_target,
            draw,
        };
        self.backend.submit(frame, &pass)?;

        self.camera.integrate(&held);
        Ok(FrameStatus::Presented)
    }

    /// Frees every resource in reverse creation order and hands the backend back.
    pub fn shutdown(self) -> B {
        let Self {
            mut backend,
            resources,
            ..
        } = self;
        resources.release(&mut backend);
        backend
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
