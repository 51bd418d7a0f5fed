//! Serde shapes shared by the model and subtree documents, and their
//! conversions to and from scene types

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SceneError},
    gfx::{
        camera::camera_utils::{Camera, CameraKind, ProjectionType},
        geometry::buffer_attribute::{AttributeData, BufferAttribute, DataType},
        math::Vec3,
        resources::{
            color::{Color, WHITE},
            material::{BasicMaterial, Material, PhongMaterial},
            texture::Texture,
        },
        scene::{Light, LightKind, TextureKey},
    },
};

pub(crate) fn zero3() -> [f32; 3] {
    [0.0; 3]
}

pub(crate) fn one3() -> [f32; 3] {
    [1.0; 3]
}

fn white() -> Color {
    WHITE
}

fn default_size() -> usize {
    3
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn to_array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

pub(crate) fn to_vec3(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

pub(crate) fn invalid(message: impl Into<String>) -> SceneError {
    SceneError::InvalidDocument(message.into())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrthographicDef {
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveDef {
    /// Radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObliqueDef {
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    pub angle_x: f32,
    pub angle_y: f32,
}

/// Camera block, discriminated by `type` with one parameter block per type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthographic: Option<OrthographicDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<PerspectiveDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oblique: Option<ObliqueDef>,
}

impl From<&Camera> for CameraDef {
    fn from(camera: &Camera) -> Self {
        let mut def = CameraDef {
            kind: camera.projection_type().to_string(),
            orthographic: None,
            perspective: None,
            oblique: None,
        };
        match camera.kind {
            CameraKind::Orthographic {
                width,
                height,
                near,
                far,
            } => {
                def.orthographic = Some(OrthographicDef {
                    width,
                    height,
                    near,
                    far,
                })
            }
            CameraKind::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => {
                def.perspective = Some(PerspectiveDef {
                    fov_y,
                    aspect,
                    near,
                    far,
                })
            }
            CameraKind::Oblique {
                width,
                height,
                near,
                far,
                angle_x,
                angle_y,
            } => {
                def.oblique = Some(ObliqueDef {
                    width,
                    height,
                    near,
                    far,
                    angle_x,
                    angle_y,
                })
            }
        }
        def
    }
}

impl CameraDef {
    /// The camera described, or `None` when the type or its block is missing
    pub fn to_camera(&self) -> Option<Camera> {
        let kind = match self.kind.parse::<ProjectionType>().ok()? {
            ProjectionType::Orthographic => {
                let p = self.orthographic.as_ref()?;
                CameraKind::Orthographic {
                    width: p.width,
                    height: p.height,
                    near: p.near,
                    far: p.far,
                }
            }
            ProjectionType::Perspective => {
                let p = self.perspective.as_ref()?;
                CameraKind::Perspective {
                    fov_y: p.fov_y,
                    aspect: p.aspect,
                    near: p.near,
                    far: p.far,
                }
            }
            ProjectionType::Oblique => {
                let p = self.oblique.as_ref()?;
                CameraKind::Oblique {
                    width: p.width,
                    height: p.height,
                    near: p.near,
                    far: p.far,
                    angle_x: p.angle_x,
                    angle_y: p.angle_y,
                }
            }
        };
        Some(Camera::new(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDef {
    pub att_a: f32,
    pub att_b: f32,
    pub att_c: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "white")]
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<PointDef>,
}

impl From<&Light> for LightDef {
    fn from(light: &Light) -> Self {
        let point = match light.kind {
            LightKind::Directional => None,
            LightKind::Point {
                attenuation_a,
                attenuation_b,
                attenuation_c,
            } => Some(PointDef {
                att_a: attenuation_a,
                att_b: attenuation_b,
                att_c: attenuation_c,
            }),
        };
        LightDef {
            kind: light.kind.as_str().to_string(),
            color: light.color,
            point,
        }
    }
}

impl LightDef {
    pub fn to_light(&self) -> Option<Light> {
        let kind = match self.kind.as_str() {
            "directional" => LightKind::Directional,
            "point" => match &self.point {
                Some(p) => LightKind::Point {
                    attenuation_a: p.att_a,
                    attenuation_b: p.att_b,
                    attenuation_c: p.att_c,
                },
                None => LightKind::point(),
            },
            _ => return None,
        };
        Some(Light {
            color: self.color,
            kind,
        })
    }
}

/// Texture reference: the image path plus the colour shown before it loads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_color: Option<[u8; 4]>,
}

impl From<&Texture> for TextureDef {
    fn from(texture: &Texture) -> Self {
        TextureDef {
            src: texture.source().map(str::to_string),
            default_color: Some(texture.default_color()),
        }
    }
}

impl TextureDef {
    pub fn to_texture(&self) -> Texture {
        let texture = match &self.src {
            Some(src) => Texture::from_source(src),
            None => Texture::new(),
        };
        match self.default_color {
            Some(rgba) => texture.with_default_color(rgba),
            None => texture,
        }
    }
}

/// Phong parameters; `T` is a texture index in models and an inline
/// [`TextureDef`] in subtrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhongDef<T> {
    pub color: Color,
    pub shininess: f32,
    pub ambient_color: Color,
    pub specular_color: Color,
    pub diffuse_texture: T,
    pub specular_texture: T,
    pub normal_texture: T,
    pub displacement_texture: T,
    pub displacement_factor: f32,
    pub displacement_bias: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialDef<T> {
    Basic { color: Color },
    Phong(PhongDef<T>),
    #[serde(other)]
    Unsupported,
}

impl<T> MaterialDef<T> {
    pub fn from_material(material: &Material, mut texture: impl FnMut(TextureKey) -> T) -> Self {
        match material {
            Material::Basic(basic) => MaterialDef::Basic { color: basic.color },
            Material::Phong(phong) => MaterialDef::Phong(PhongDef {
                color: phong.color,
                shininess: phong.shininess,
                ambient_color: phong.ambient_color,
                specular_color: phong.specular_color,
                diffuse_texture: texture(phong.diffuse_texture),
                specular_texture: texture(phong.specular_texture),
                normal_texture: texture(phong.normal_texture),
                displacement_texture: texture(phong.displacement_texture),
                displacement_factor: phong.displacement_factor,
                displacement_bias: phong.displacement_bias,
            }),
        }
    }

    /// Rebuilds the material, resolving texture references through `texture`
    ///
    /// Returns `Ok(None)` for an unsupported material type.
    pub fn to_material(&self, mut texture: impl FnMut(&T) -> Result<TextureKey>) -> Result<Option<Material>> {
        let material = match self {
            MaterialDef::Basic { color } => Material::Basic(BasicMaterial { color: *color }),
            MaterialDef::Phong(def) => Material::Phong(PhongMaterial {
                color: def.color,
                shininess: def.shininess,
                ambient_color: def.ambient_color,
                specular_color: def.specular_color,
                diffuse_texture: texture(&def.diffuse_texture)?,
                specular_texture: texture(&def.specular_texture)?,
                normal_texture: texture(&def.normal_texture)?,
                displacement_texture: texture(&def.displacement_texture)?,
                displacement_factor: def.displacement_factor,
                displacement_bias: def.displacement_bias,
            }),
            MaterialDef::Unsupported => {
                warn!("Skipping material of unsupported type");
                return Ok(None);
            }
        };
        Ok(Some(material))
    }
}

/// Vertex attribute with its data inlined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub data: Vec<f64>,
    pub component_type: u32,
    pub byte_length: usize,
    pub count: usize,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub normalized: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_stride: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,
}

impl From<&BufferAttribute> for AttributeDef {
    fn from(attribute: &BufferAttribute) -> Self {
        AttributeDef {
            data: attribute.data().to_f64_vec(),
            component_type: attribute.dtype().code(),
            byte_length: attribute.byte_length(),
            count: attribute.count(),
            size: attribute.size(),
            normalized: attribute.normalize(),
            byte_stride: attribute.stride(),
            byte_offset: attribute.offset(),
        }
    }
}

impl AttributeDef {
    pub fn data_type(&self) -> Result<DataType> {
        DataType::from_code(self.component_type)
            .ok_or_else(|| invalid(format!("unknown component type {}", self.component_type)))
    }

    pub fn to_attribute(&self) -> Result<BufferAttribute> {
        build_attribute(
            self.data_type()?,
            &self.data,
            self.size,
            self.normalized,
            self.byte_stride,
            self.byte_offset,
        )
    }
}

/// Rebuilds an attribute, rejecting layouts that do not fit `values`
///
/// Elements hold 1 to 4 components, a non-zero stride spans at least one
/// element and the offset stays inside the data.
pub(crate) fn build_attribute(
    dtype: DataType,
    values: &[f64],
    size: usize,
    normalized: bool,
    stride: usize,
    offset: usize,
) -> Result<BufferAttribute> {
    if !(1..=4).contains(&size) {
        return Err(invalid(format!("attribute size {} is not between 1 and 4", size)));
    }
    let element_bytes = size * dtype.byte_size();
    if stride != 0 && stride < element_bytes {
        return Err(invalid(format!(
            "byte stride {} is shorter than one {}-byte element",
            stride, element_bytes
        )));
    }
    let data_bytes = values.len().saturating_mul(dtype.byte_size());
    if offset > data_bytes {
        return Err(invalid(format!(
            "byte offset {} lies past the {} bytes of data",
            offset, data_bytes
        )));
    }
    Ok(BufferAttribute::new(AttributeData::from_values(dtype, values), size)
        .with_normalize(normalized)
        .with_layout(stride, offset))
}
