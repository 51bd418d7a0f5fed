//! The external rasterization collaborator
//!
//! The engine never talks to a GPU driver directly. Everything it needs from
//! one (shader compilation and reflection, buffers, textures, an offscreen
//! target for the pick pass, draw calls and a single-pixel readback) goes
//! through [`Rasterizer`]. Handles are opaque ids minted by the implementation
//! and stay valid until the matching `delete_*` call.

use std::fmt;

use crate::gfx::{geometry::buffer_attribute::DataType, resources::texture::SamplerParams};

macro_rules! handle {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);
        )*
    };
}

handle!(BufferHandle, ShaderHandle, ProgramHandle, TextureHandle, RenderTargetHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Declared type of an active attribute or uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    IVec2,
    IVec3,
    IVec4,
    Bool,
    BVec2,
    BVec3,
    BVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
}

/// How a uniform of a given type is fed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformCategory {
    Scalar,
    Vector,
    Matrix,
    Sampler,
}

impl GlslType {
    /// Parses a GLSL type keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let ty = match keyword {
            "float" => GlslType::Float,
            "vec2" => GlslType::Vec2,
            "vec3" => GlslType::Vec3,
            "vec4" => GlslType::Vec4,
            "int" => GlslType::Int,
            "ivec2" => GlslType::IVec2,
            "ivec3" => GlslType::IVec3,
            "ivec4" => GlslType::IVec4,
            "bool" => GlslType::Bool,
            "bvec2" => GlslType::BVec2,
            "bvec3" => GlslType::BVec3,
            "bvec4" => GlslType::BVec4,
            "mat2" => GlslType::Mat2,
            "mat3" => GlslType::Mat3,
            "mat4" => GlslType::Mat4,
            "sampler2D" => GlslType::Sampler2D,
            "samplerCube" => GlslType::SamplerCube,
            _ => return None,
        };
        Some(ty)
    }

    /// Number of scalar components one value of this type holds
    pub fn components(self) -> usize {
        match self {
            GlslType::Float | GlslType::Int | GlslType::Bool => 1,
            GlslType::Sampler2D | GlslType::SamplerCube => 1,
            GlslType::Vec2 | GlslType::IVec2 | GlslType::BVec2 => 2,
            GlslType::Vec3 | GlslType::IVec3 | GlslType::BVec3 => 3,
            GlslType::Vec4 | GlslType::IVec4 | GlslType::BVec4 | GlslType::Mat2 => 4,
            GlslType::Mat3 => 9,
            GlslType::Mat4 => 16,
        }
    }

    pub fn category(self) -> UniformCategory {
        match self {
            GlslType::Float | GlslType::Int | GlslType::Bool => UniformCategory::Scalar,
            GlslType::Mat2 | GlslType::Mat3 | GlslType::Mat4 => UniformCategory::Matrix,
            GlslType::Sampler2D | GlslType::SamplerCube => UniformCategory::Sampler,
            _ => UniformCategory::Vector,
        }
    }

    /// Integer-valued types are uploaded through the integer entry points
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            GlslType::Int
                | GlslType::IVec2
                | GlslType::IVec3
                | GlslType::IVec4
                | GlslType::Bool
                | GlslType::BVec2
                | GlslType::BVec3
                | GlslType::BVec4
        )
    }
}

/// One active attribute or uniform reported by program reflection
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveInfo {
    pub name: String,
    pub ty: GlslType,
    /// Array length, 1 for non-arrays
    pub size: usize,
    pub location: u32,
}

/// Layout of a vertex buffer bound to an attribute location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexLayout {
    pub size: usize,
    pub dtype: DataType,
    pub normalize: bool,
    pub stride: usize,
    pub offset: usize,
}

/// Uniform payload after conversion to the declared type
#[derive(Debug, Clone, PartialEq)]
pub enum UniformData {
    Floats(Vec<f32>),
    Ints(Vec<i32>),
    /// Column-major matrix data
    Matrix(Vec<f32>),
}

/// Decoded RGBA8 pixel data ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// 1×1 image of a single colour
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::new(1, 1, rgba.to_vec())
    }
}

/// A GL-like rasterization backend
pub trait Rasterizer {
    /// Compiles one shader stage, returning the compiler log on failure
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;

    /// Links a vertex and fragment shader, returning the linker log on failure
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String>;

    fn active_attributes(&self, program: ProgramHandle) -> Vec<ActiveInfo>;

    fn active_uniforms(&self, program: ProgramHandle) -> Vec<ActiveInfo>;

    fn use_program(&mut self, program: ProgramHandle);

    fn create_buffer(&mut self) -> BufferHandle;

    fn upload_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Enables the attribute array at `location` and points it at `buffer`
    fn bind_vertex_buffer(&mut self, location: u32, buffer: BufferHandle, layout: VertexLayout);

    /// Disables the attribute array at `location` and feeds it a constant value
    fn set_constant_attribute(&mut self, location: u32, value: &[f32]);

    fn set_uniform(&mut self, location: u32, ty: GlslType, data: UniformData);

    fn create_texture(&mut self) -> TextureHandle;

    fn upload_texture(&mut self, texture: TextureHandle, image: &ImageData);

    fn delete_texture(&mut self, texture: TextureHandle);

    fn set_sampler(&mut self, texture: TextureHandle, params: &SamplerParams);

    fn generate_mipmaps(&mut self, texture: TextureHandle);

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Creates an offscreen colour + depth target
    fn create_render_target(&mut self, width: u32, height: u32) -> RenderTargetHandle;

    fn resize_render_target(&mut self, target: RenderTargetHandle, width: u32, height: u32);

    /// Redirects drawing to `target`, or back to the default framebuffer with `None`
    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>);

    fn viewport(&mut self, width: u32, height: u32);

    /// Clears colour and depth of the bound target
    fn clear(&mut self, color: [f32; 4]);

    fn draw_arrays(&mut self, first: usize, count: usize);

    /// Reads one RGBA8 pixel from the bound target, in framebuffer coordinates
    fn read_pixel(&mut self, x: u32, y: u32) -> [u8; 4];

    /// Size of the default framebuffer in device pixels
    fn drawing_buffer_size(&self) -> (u32, u32);
}
