//! Pipeline state for the world draw and shader format negotiation.

/// Depth buffer format used by every depth target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// `src * src_alpha + dst`, the translucent look of the blend toggle.
pub const ADDITIVE_ALPHA: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Encodings the world shader ships in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderFormat {
    Wgsl,
    SpirV,
}

impl ShaderFormat {
    /// Most preferred first.
    pub const PREFERENCE: [ShaderFormat; 2] = [ShaderFormat::Wgsl, ShaderFormat::SpirV];

    /// Picks the first format in [`PREFERENCE`](Self::PREFERENCE) that the
    /// backend accepts.
    pub fn negotiate(supported: &[ShaderFormat]) -> Option<ShaderFormat> {
        Self::PREFERENCE
            .into_iter()
            .find(|format| supported.contains(format))
    }
}

/// Fixed-function state for one of the two world pipelines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    pub label: &'static str,
    pub shader: ShaderFormat,
    pub blend: Option<wgpu::BlendState>,
    pub depth_compare: wgpu::CompareFunction,
    pub depth_write: bool,
    pub topology: wgpu::PrimitiveTopology,
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
}

impl PipelineConfig {
    /// Depth tested and written, no blending.
    pub fn opaque(shader: ShaderFormat) -> Self {
        Self {
            label: "World Pipeline",
            shader,
            blend: None,
            depth_compare: wgpu::CompareFunction::Less,
            depth_write: true,
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
        }
    }

    /// Additive alpha blending with the depth test switched off.
    pub fn blended(shader: ShaderFormat) -> Self {
        Self {
            label: "World Pipeline (Blended)",
            blend: Some(ADDITIVE_ALPHA),
            depth_compare: wgpu::CompareFunction::Always,
            depth_write: false,
            ..Self::opaque(shader)
        }
    }

    pub fn depth_stencil(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: self.depth_write,
            depth_compare: self.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: self.topology,
            front_face: self.front_face,
            cull_mode: self.cull_mode,
            ..Default::default()
        }
    }
}
