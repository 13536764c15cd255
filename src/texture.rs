//! CPU-side image decoding, GPU textures and the fixed sampler table.

use std::path::Path;

use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::mipmap::MipGenerator;

/// Format every world texture is uploaded in.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Number of levels in a full mip chain: `floor(log2(max(w, h))) + 1`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

/// Decoded RGBA8 pixels, bottom row first.
///
/// Bitmaps store rows top to bottom while texture coordinates put `v = 0` at
/// the bottom of the image, so every decoded image is flipped vertically
/// before it is handed to the GPU.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Wraps pixels that are already in upload order.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decodes and flips an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => Error::Io {
                path: path.to_path_buf(),
                source,
            },
            other => Error::resource("texture", format!("{}: {other}", path.display())),
        })?;
        Ok(Self::from_decoded(image))
    }

    /// Decodes and flips an encoded image held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::resource("texture", e))?;
        Ok(Self::from_decoded(image))
    }

    fn from_decoded(image: image::DynamicImage) -> Self {
        let mut rgba = image.to_rgba8();
        image::imageops::flip_vertical_in_place(&mut rgba);
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    pub fn mip_level_count(&self) -> u32 {
        mip_level_count(self.width, self.height)
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
}

impl Texture {
    /// Uploads `image` to level 0 and, when asked, fills the rest of the mip
    /// chain on the GPU.
    pub(crate) fn from_image(
        gpu: &GpuContext,
        mips: &MipGenerator,
        image: &ImageData,
        generate_mips: bool,
        label: &str,
    ) -> Result<Self> {
        let (width, height) = (image.width, image.height);
        let mip_level_count = if generate_mips {
            image.mip_level_count()
        } else {
            1
        };
        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        if generate_mips {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.scoped("texture", |device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage,
                view_formats: &[],
            })
        })?;

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        if mip_level_count > 1 {
            gpu.scoped("texture mip chain", |_| {
                mips.generate(gpu, &texture, mip_level_count)
            })?;
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
            mip_level_count,
        })
    }
}

/// The three ways the world texture can be sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
    Mipmapped,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::Nearest, Filter::Linear, Filter::Mipmapped];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Nearest → linear → mipmapped → nearest.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn sampler(self) -> SamplerConfig {
        match self {
            Filter::Nearest => SamplerConfig {
                label: "Nearest Sampler",
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                mipmap_filter: wgpu::FilterMode::Nearest,
                lod_max_clamp: 0.0,
            },
            Filter::Linear => SamplerConfig {
                label: "Linear Sampler",
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                lod_max_clamp: 0.0,
            },
            Filter::Mipmapped => SamplerConfig {
                label: "Mipmap Sampler",
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                lod_max_clamp: f32::MAX,
            },
        }
    }
}

/// Backend-neutral sampler description. Addressing always repeats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerConfig {
    pub label: &'static str,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::FilterMode,
    pub lod_max_clamp: f32,
}

impl SamplerConfig {
    pub const ADDRESS_MODE: wgpu::AddressMode = wgpu::AddressMode::Repeat;

    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some(self.label),
            address_mode_u: Self::ADDRESS_MODE,
            address_mode_v: Self::ADDRESS_MODE,
            address_mode_w: Self::ADDRESS_MODE,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: self.mipmap_filter,
            lod_min_clamp: 0.0,
            lod_max_clamp: self.lod_max_clamp,
            ..Default::default()
        }
    }
}
