//! Recording rasterizer without a GPU
//!
//! Reflects `attribute` / `uniform` declarations straight out of the shader
//! source, records every call it receives and answers pixel reads from a
//! small programmable framebuffer. Used by the test-suite and by hosts that
//! want to drive the editor core without a window.

use std::collections::HashMap;

use super::rasterizer::{
    ActiveInfo, BufferHandle, GlslType, ImageData, ProgramHandle, Rasterizer, RenderTargetHandle,
    ShaderHandle, ShaderStage, TextureHandle, UniformData, VertexLayout,
};
use crate::gfx::resources::texture::SamplerParams;

/// One recorded rasterizer call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(ProgramHandle),
    CreateBuffer(BufferHandle),
    UploadBuffer { buffer: BufferHandle, bytes: usize },
    DeleteBuffer(BufferHandle),
    BindVertexBuffer { location: u32, buffer: BufferHandle, layout: VertexLayout },
    ConstantAttribute { location: u32, value: Vec<f32> },
    Uniform { location: u32, ty: GlslType, data: UniformData },
    CreateTexture(TextureHandle),
    UploadTexture { texture: TextureHandle, width: u32, height: u32 },
    DeleteTexture(TextureHandle),
    SetSampler { texture: TextureHandle, params: SamplerParams },
    GenerateMipmaps(TextureHandle),
    BindTexture { unit: u32, texture: TextureHandle },
    CreateRenderTarget { target: RenderTargetHandle, width: u32, height: u32 },
    ResizeRenderTarget { target: RenderTargetHandle, width: u32, height: u32 },
    BindRenderTarget(Option<RenderTargetHandle>),
    Viewport { width: u32, height: u32 },
    Clear([f32; 4]),
    DrawArrays { first: usize, count: usize },
    ReadPixel { x: u32, y: u32 },
}

#[derive(Debug, Clone)]
struct Declaration {
    qualifier: Qualifier,
    ty: GlslType,
    name: String,
    size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    Attribute,
    Uniform,
}

#[derive(Debug, Default)]
struct Program {
    attributes: Vec<ActiveInfo>,
    uniforms: Vec<ActiveInfo>,
}

pub struct HeadlessRasterizer {
    width: u32,
    height: u32,
    next_handle: u32,
    next_location: u32,
    shaders: HashMap<ShaderHandle, (ShaderStage, Vec<Declaration>)>,
    programs: HashMap<ProgramHandle, Program>,
    location_names: HashMap<u32, String>,
    render_targets: HashMap<RenderTargetHandle, (u32, u32)>,
    bound_target: Option<RenderTargetHandle>,
    pixels: HashMap<(Option<RenderTargetHandle>, u32, u32), [u8; 4]>,
    calls: Vec<Call>,
}

impl HeadlessRasterizer {
    /// Creates a rasterizer whose default framebuffer is `width` × `height` device pixels
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_handle: 1,
            next_location: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            location_names: HashMap::new(),
            render_targets: HashMap::new(),
            bound_target: None,
            pixels: HashMap::new(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Changes the default framebuffer size, as a window resize would
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Programs the value [`Rasterizer::read_pixel`] returns at `(x, y)` of `target`
    pub fn set_pixel(&mut self, target: Option<RenderTargetHandle>, x: u32, y: u32, rgba: [u8; 4]) {
        self.pixels.insert((target, x, y), rgba);
    }

    pub fn render_target_size(&self, target: RenderTargetHandle) -> Option<(u32, u32)> {
        self.render_targets.get(&target).copied()
    }

    /// Name of the attribute or uniform that was assigned `location`
    pub fn location_name(&self, location: u32) -> Option<&str> {
        self.location_names.get(&location).map(String::as_str)
    }

    /// Most recent value uploaded to the uniform called `name`
    pub fn last_uniform(&self, name: &str) -> Option<&UniformData> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Uniform { location, data, .. } if self.location_name(*location) == Some(name) => {
                Some(data)
            }
            _ => None,
        })
    }

    /// Every value uploaded to the uniform called `name`, oldest first
    pub fn uniform_history(&self, name: &str) -> Vec<&UniformData> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Uniform { location, data, .. }
                    if self.location_name(*location) == Some(name) =>
                {
                    Some(data)
                }
                _ => None,
            })
            .collect()
    }

    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn mint(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn reflect(&mut self, declaration: &Declaration) -> ActiveInfo {
        let location = self.next_location;
        self.next_location += 1;
        let name = if declaration.size > 1 {
            format!("{}[0]", declaration.name)
        } else {
            declaration.name.clone()
        };
        self.location_names.insert(location, declaration.name.clone());
        ActiveInfo {
            name,
            ty: declaration.ty,
            size: declaration.size,
            location,
        }
    }
}

/// Scans GLSL source for top-level `attribute` and `uniform` declarations
fn parse_declarations(source: &str) -> Result<Vec<Declaration>, String> {
    let mut declarations = Vec::new();
    for (line_number, line) in source.lines().enumerate() {
        let line = line.split("//").next().unwrap_or_default().trim();
        let mut tokens = line
            .trim_end_matches(';')
            .split_whitespace()
            .filter(|t| !matches!(*t, "lowp" | "mediump" | "highp"));
        let qualifier = match tokens.next() {
            Some("attribute") => Qualifier::Attribute,
            Some("uniform") => Qualifier::Uniform,
            _ => continue,
        };
        let (Some(keyword), Some(declarator)) = (tokens.next(), tokens.next()) else {
            return Err(format!("ERROR: 0:{}: syntax error", line_number + 1));
        };
        let ty = GlslType::from_keyword(keyword)
            .ok_or_else(|| format!("ERROR: 0:{}: '{}' : unknown type", line_number + 1, keyword))?;
        let (name, size) = match declarator.split_once('[') {
            Some((name, rest)) => {
                let size = rest
                    .trim_end_matches(']')
                    .parse::<usize>()
                    .map_err(|_| format!("ERROR: 0:{}: bad array size", line_number + 1))?;
                (name, size)
            }
            None => (declarator, 1),
        };
        declarations.push(Declaration {
            qualifier,
            ty,
            name: name.to_string(),
            size,
        });
    }
    Ok(declarations)
}

impl Rasterizer for HeadlessRasterizer {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        if !source.contains("void main") {
            return Err("ERROR: 0:0: 'main' : function not defined".to_string());
        }
        let declarations = parse_declarations(source)?;
        if stage == ShaderStage::Fragment
            && declarations.iter().any(|d| d.qualifier == Qualifier::Attribute)
        {
            return Err("ERROR: 0:0: 'attribute' : not supported in fragment shaders".to_string());
        }
        let handle = ShaderHandle(self.mint());
        self.shaders.insert(handle, (stage, declarations));
        Ok(handle)
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String> {
        let (Some((ShaderStage::Vertex, vertex_decls)), Some((ShaderStage::Fragment, fragment_decls))) =
            (self.shaders.get(&vertex).cloned(), self.shaders.get(&fragment).cloned())
        else {
            return Err("link error: a program needs one vertex and one fragment shader".to_string());
        };

        let mut program = Program::default();
        for declaration in vertex_decls.iter().chain(fragment_decls.iter()) {
            let already_reflected = match declaration.qualifier {
                Qualifier::Attribute => &program.attributes,
                Qualifier::Uniform => &program.uniforms,
            }
            .iter()
            .any(|info| info.name.trim_end_matches("[0]") == declaration.name);
            if already_reflected {
                continue;
            }
            let info = self.reflect(declaration);
            match declaration.qualifier {
                Qualifier::Attribute => program.attributes.push(info),
                Qualifier::Uniform => program.uniforms.push(info),
            }
        }

        let handle = ProgramHandle(self.mint());
        self.programs.insert(handle, program);
        Ok(handle)
    }

    fn active_attributes(&self, program: ProgramHandle) -> Vec<ActiveInfo> {
        self.programs
            .get(&program)
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: ProgramHandle) -> Vec<ActiveInfo> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::UseProgram(program));
    }

    fn create_buffer(&mut self) -> BufferHandle {
        let buffer = BufferHandle(self.mint());
        self.calls.push(Call::CreateBuffer(buffer));
        buffer
    }

    fn upload_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        self.calls.push(Call::UploadBuffer {
            buffer,
            bytes: data.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn bind_vertex_buffer(&mut self, location: u32, buffer: BufferHandle, layout: VertexLayout) {
        self.calls.push(Call::BindVertexBuffer {
            location,
            buffer,
            layout,
        });
    }

    fn set_constant_attribute(&mut self, location: u32, value: &[f32]) {
        self.calls.push(Call::ConstantAttribute {
            location,
            value: value.to_vec(),
        });
    }

    fn set_uniform(&mut self, location: u32, ty: GlslType, data: UniformData) {
        self.calls.push(Call::Uniform { location, ty, data });
    }

    fn create_texture(&mut self) -> TextureHandle {
        let texture = TextureHandle(self.mint());
        self.calls.push(Call::CreateTexture(texture));
        texture
    }

    fn upload_texture(&mut self, texture: TextureHandle, image: &ImageData) {
        self.calls.push(Call::UploadTexture {
            texture,
            width: image.width,
            height: image.height,
        });
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.calls.push(Call::DeleteTexture(texture));
    }

    fn set_sampler(&mut self, texture: TextureHandle, params: &SamplerParams) {
        self.calls.push(Call::SetSampler {
            texture,
            params: *params,
        });
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) {
        self.calls.push(Call::GenerateMipmaps(texture));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.calls.push(Call::BindTexture { unit, texture });
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> RenderTargetHandle {
        let target = RenderTargetHandle(self.mint());
        self.render_targets.insert(target, (width, height));
        self.calls.push(Call::CreateRenderTarget {
            target,
            width,
            height,
        });
        target
    }

    fn resize_render_target(&mut self, target: RenderTargetHandle, width: u32, height: u32) {
        self.render_targets.insert(target, (width, height));
        self.calls.push(Call::ResizeRenderTarget {
            target,
            width,
            height,
        });
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>) {
        self.bound_target = target;
        self.calls.push(Call::BindRenderTarget(target));
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport { width, height });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }

    fn draw_arrays(&mut self, first: usize, count: usize) {
        self.calls.push(Call::DrawArrays { first, count });
    }

    fn read_pixel(&mut self, x: u32, y: u32) -> [u8; 4] {
        self.calls.push(Call::ReadPixel { x, y });
        self.pixels
            .get(&(self.bound_target, x, y))
            .copied()
            .unwrap_or([0, 0, 0, 0])
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
