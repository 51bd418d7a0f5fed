//! Attribute and uniform binding layer
//!
//! A [`ProgramInfo`] is built once per linked program by reflecting over its
//! active attributes and uniforms. Each entry becomes a setter that remembers
//! its location (and, for samplers, a texture unit claimed at build time).
//! Per draw, geometry attributes are matched to `a_<name>` setters and
//! uniform bags to `u_<name>` setters; names with no active counterpart are
//! ignored.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use slotmap::SlotMap;

use super::rasterizer::{
    GlslType, ProgramHandle, Rasterizer, ShaderStage, UniformCategory, UniformData, VertexLayout,
};
use crate::{
    error::{Result, SceneError},
    gfx::{
        geometry::buffer_attribute::BufferAttribute,
        resources::{
            texture::Texture,
            uniforms::{UniformBag, UniformValue},
        },
        scene::TextureKey,
    },
};

pub const ATTRIBUTE_PREFIX: &str = "a_";
pub const UNIFORM_PREFIX: &str = "u_";

/// Value fed to an attribute: a vertex buffer or a constant per-vertex value
#[derive(Debug)]
pub enum AttributeValue<'a> {
    Buffer(&'a mut BufferAttribute),
    Constant(&'a [f32]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSetter {
    pub location: u32,
    pub ty: GlslType,
}

impl AttributeSetter {
    /// Binds `value` to this attribute. Buffers are uploaded only while dirty.
    pub fn apply(&self, rasterizer: &mut dyn Rasterizer, value: AttributeValue<'_>) {
        match value {
            AttributeValue::Buffer(attribute) => {
                let buffer = match attribute.gpu_buffer {
                    Some(buffer) => buffer,
                    None => {
                        let buffer = rasterizer.create_buffer();
                        attribute.gpu_buffer = Some(buffer);
                        buffer
                    }
                };
                if attribute.is_dirty() {
                    rasterizer.upload_buffer(buffer, attribute.as_bytes());
                    attribute.consume();
                }
                rasterizer.bind_vertex_buffer(
                    self.location,
                    buffer,
                    VertexLayout {
                        size: attribute.size(),
                        dtype: attribute.dtype(),
                        normalize: attribute.normalize(),
                        stride: attribute.stride(),
                        offset: attribute.offset(),
                    },
                );
            }
            AttributeValue::Constant(value) => {
                rasterizer.set_constant_attribute(self.location, value);
            }
        }
    }
}

/// Uniform setter, dispatched by the declared type's category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformSetter {
    Scalar { location: u32, ty: GlslType, len: usize },
    Vector { location: u32, ty: GlslType, len: usize },
    Matrix { location: u32, ty: GlslType, len: usize },
    Sampler { location: u32, ty: GlslType, unit: u32 },
}

impl UniformSetter {
    pub fn location(&self) -> u32 {
        match self {
            UniformSetter::Scalar { location, .. }
            | UniformSetter::Vector { location, .. }
            | UniformSetter::Matrix { location, .. }
            | UniformSetter::Sampler { location, .. } => *location,
        }
    }

    pub fn apply(
        &self,
        rasterizer: &mut dyn Rasterizer,
        name: &str,
        value: &UniformValue,
        textures: &mut SlotMap<TextureKey, Texture>,
    ) {
        match *self {
            UniformSetter::Scalar { location, ty, len }
            | UniformSetter::Vector { location, ty, len }
            | UniformSetter::Matrix { location, ty, len } => {
                match value.to_uniform_data(ty, len) {
                    Some(data) => rasterizer.set_uniform(location, ty, data),
                    None => warn!("Uniform '{}' expects {:?}, got a texture", name, ty),
                }
            }
            UniformSetter::Sampler { location, ty, unit } => {
                let UniformValue::Texture(key) = value else {
                    warn!("Sampler uniform '{}' was given a non-texture value", name);
                    return;
                };
                let Some(texture) = textures.get_mut(*key) else {
                    warn!("Sampler uniform '{}' references a removed texture", name);
                    return;
                };
                texture.bind(rasterizer, unit);
                rasterizer.set_uniform(location, ty, UniformData::Ints(vec![unit as i32]));
            }
        }
    }
}

/// A linked program plus the setters for its active inputs
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub program: ProgramHandle,
    pub attribute_setters: HashMap<String, AttributeSetter>,
    pub uniform_setters: HashMap<String, UniformSetter>,
}

impl ProgramInfo {
    /// Compiles and links a vertex/fragment pair and reflects it
    ///
    /// Compiler and linker diagnostics are returned verbatim.
    pub fn create(
        rasterizer: &mut dyn Rasterizer,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self> {
        let vertex = rasterizer
            .compile_shader(ShaderStage::Vertex, vertex_source)
            .map_err(|log| SceneError::ShaderCompile {
                stage: ShaderStage::Vertex,
                log,
            })?;
        let fragment = rasterizer
            .compile_shader(ShaderStage::Fragment, fragment_source)
            .map_err(|log| SceneError::ShaderCompile {
                stage: ShaderStage::Fragment,
                log,
            })?;
        let program = rasterizer
            .link_program(vertex, fragment)
            .map_err(SceneError::ProgramLink)?;
        Ok(Self::reflect(rasterizer, program))
    }

    /// Builds setters for an already linked program
    pub fn reflect(rasterizer: &dyn Rasterizer, program: ProgramHandle) -> Self {
        let attribute_setters = rasterizer
            .active_attributes(program)
            .into_iter()
            .map(|info| {
                (
                    info.name,
                    AttributeSetter {
                        location: info.location,
                        ty: info.ty,
                    },
                )
            })
            .collect();

        let mut next_unit = 0;
        let mut uniform_setters = HashMap::new();
        for info in rasterizer.active_uniforms(program) {
            let name = info.name.trim_end_matches("[0]").to_string();
            let (location, ty, len) = (info.location, info.ty, info.size.max(1));
            let setter = match ty.category() {
                UniformCategory::Scalar => UniformSetter::Scalar { location, ty, len },
                UniformCategory::Vector => UniformSetter::Vector { location, ty, len },
                UniformCategory::Matrix => UniformSetter::Matrix { location, ty, len },
                UniformCategory::Sampler => {
                    if len > 1 {
                        warn!("Sampler array '{}' is not supported, skipping", name);
                        continue;
                    }
                    let unit = next_unit;
                    next_unit += 1;
                    UniformSetter::Sampler { location, ty, unit }
                }
            };
            uniform_setters.insert(name, setter);
        }

        Self {
            program,
            attribute_setters,
            uniform_setters,
        }
    }

    pub fn attribute_setter(&self, name: &str) -> Option<&AttributeSetter> {
        self.attribute_setters
            .get(&format!("{}{}", ATTRIBUTE_PREFIX, name))
    }

    pub fn uniform_setter(&self, name: &str) -> Option<&UniformSetter> {
        self.uniform_setters.get(&format!("{}{}", UNIFORM_PREFIX, name))
    }

    /// Binds every geometry attribute that has a matching `a_<name>` input
    pub fn set_attributes(
        &self,
        rasterizer: &mut dyn Rasterizer,
        attributes: &mut BTreeMap<String, BufferAttribute>,
    ) {
        for (name, attribute) in attributes.iter_mut() {
            if let Some(setter) = self.attribute_setter(name) {
                setter.apply(rasterizer, AttributeValue::Buffer(attribute));
            }
        }
    }

    /// Feeds a constant value to `a_<name>`, if the program has it
    pub fn set_attribute_constant(&self, rasterizer: &mut dyn Rasterizer, name: &str, value: &[f32]) {
        if let Some(setter) = self.attribute_setter(name) {
            setter.apply(rasterizer, AttributeValue::Constant(value));
        }
    }

    pub fn set_uniform(
        &self,
        rasterizer: &mut dyn Rasterizer,
        name: &str,
        value: &UniformValue,
        textures: &mut SlotMap<TextureKey, Texture>,
    ) {
        if let Some(setter) = self.uniform_setter(name) {
            setter.apply(rasterizer, name, value, textures);
        }
    }

    pub fn set_uniforms(
        &self,
        rasterizer: &mut dyn Rasterizer,
        uniforms: &UniformBag,
        textures: &mut SlotMap<TextureKey, Texture>,
    ) {
        for (name, value) in uniforms {
            self.set_uniform(rasterizer, name, value, textures);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::headless::{Call, HeadlessRasterizer};

    const VERT: &str = "
        attribute vec4 a_position;
        attribute vec3 a_normal;
        attribute vec4 a_color;
        uniform mat4 u_worldViewProjection;
        uniform sampler2D u_displacementTexture;
        void main() {}";
    const FRAG: &str = "
        precision mediump float;
        uniform vec4 u_color;
        uniform bool u_lightIsDirectional;
        uniform sampler2D u_diffuseTexture;
        void main() {}";

    fn setup() -> (HeadlessRasterizer, ProgramInfo) {
        let mut raster = HeadlessRasterizer::new(100, 100);
        let info = ProgramInfo::create(&mut raster, VERT, FRAG).unwrap();
        (raster, info)
    }

    #[test]
    fn test_reflection_builds_setters() {
        let (_, info) = setup();
        assert_eq!(info.attribute_setters.len(), 3);
        assert!(matches!(
            info.uniform_setter("worldViewProjection"),
            Some(UniformSetter::Matrix { .. })
        ));
        assert!(matches!(
            info.uniform_setter("lightIsDirectional"),
            Some(UniformSetter::Scalar { ty: GlslType::Bool, .. })
        ));
    }

    #[test]
    fn test_samplers_claim_distinct_units() {
        let (_, info) = setup();
        let unit = |name| match info.uniform_setter(name) {
            Some(UniformSetter::Sampler { unit, .. }) => *unit,
            other => panic!("expected sampler, got {:?}", other),
        };
        assert_eq!(unit("displacementTexture"), 0);
        assert_eq!(unit("diffuseTexture"), 1);
    }

    #[test]
    fn test_compile_failure_reports_stage() {
        let mut raster = HeadlessRasterizer::new(1, 1);
        let err = ProgramInfo::create(&mut raster, VERT, "precision mediump float;").unwrap_err();
        assert!(matches!(
            err,
            SceneError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn test_attribute_uploads_only_when_dirty() {
        let (mut raster, info) = setup();
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "position".to_string(),
            BufferAttribute::new(vec![0.0f32; 9], 3),
        );
        attributes.insert("unused".to_string(), BufferAttribute::new(vec![0.0f32; 3], 1));

        info.set_attributes(&mut raster, &mut attributes);
        info.set_attributes(&mut raster, &mut attributes);
        let uploads = raster.count_calls(|c| matches!(c, Call::UploadBuffer { bytes: 36, .. }));
        let binds = raster.count_calls(|c| matches!(c, Call::BindVertexBuffer { .. }));
        assert_eq!(uploads, 1);
        assert_eq!(binds, 2);
        assert!(!attributes["position"].is_dirty());
        assert!(attributes["unused"].is_dirty());

        attributes.get_mut("position").unwrap().set(0, &[1.0, 1.0, 1.0]);
        info.set_attributes(&mut raster, &mut attributes);
        assert_eq!(raster.count_calls(|c| matches!(c, Call::UploadBuffer { .. })), 2);
    }

    #[test]
    fn test_constant_attribute() {
        let (mut raster, info) = setup();
        info.set_attribute_constant(&mut raster, "color", &[1.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            raster.calls().last(),
            Some(Call::ConstantAttribute { value, .. }) if value == &vec![1.0, 0.0, 0.0, 1.0]
        ));
    }

    #[test]
    fn test_uniform_bag_binding() {
        let (mut raster, info) = setup();
        let mut textures = SlotMap::with_key();
        let diffuse = textures.insert(Texture::new());

        let mut bag = UniformBag::new();
        bag.insert("color".into(), UniformValue::Vec4([0.5, 0.5, 0.5, 1.0]));
        bag.insert("lightIsDirectional".into(), UniformValue::Bool(true));
        bag.insert("diffuseTexture".into(), UniformValue::Texture(diffuse));
        bag.insert("notInShader".into(), UniformValue::Float(1.0));
        info.set_uniforms(&mut raster, &bag, &mut textures);

        assert_eq!(
            raster.last_uniform("u_color"),
            Some(&UniformData::Floats(vec![0.5, 0.5, 0.5, 1.0]))
        );
        assert_eq!(
            raster.last_uniform("u_lightIsDirectional"),
            Some(&UniformData::Ints(vec![1]))
        );
        assert_eq!(
            raster.last_uniform("u_diffuseTexture"),
            Some(&UniformData::Ints(vec![1]))
        );
        assert!(raster
            .calls()
            .iter()
            .any(|c| matches!(c, Call::BindTexture { unit: 1, .. })));
        assert!(!textures[diffuse].needs_upload());
    }
}
