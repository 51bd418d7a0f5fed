//! Material system
//!
//! A material is a tagged union over the shading models the renderer knows.
//! The tag selects the shader program; the payload is exposed to the program
//! as a [`UniformBag`] so materials never see shader compilation details.
//! Materials live in the scene's material arena and meshes reference them by key.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    color::{Color, WHITE},
    uniforms::{UniformBag, UniformValue},
};
use crate::gfx::scene::TextureKey;

/// Shading model of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Basic,
    Phong,
}

impl MaterialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialKind::Basic => "basic",
            MaterialKind::Phong => "phong",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(MaterialKind::Basic),
            "phong" => Ok(MaterialKind::Phong),
            other => Err(format!("unknown material type '{}'", other)),
        }
    }
}

/// Unlit flat colour
#[derive(Debug, Clone, PartialEq)]
pub struct BasicMaterial {
    pub color: Color,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self { color: WHITE }
    }
}

/// Blinn-Phong shading with diffuse, specular, normal and displacement maps
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub shininess: f32,
    pub ambient_color: Color,
    pub specular_color: Color,
    pub diffuse_texture: TextureKey,
    pub specular_texture: TextureKey,
    pub normal_texture: TextureKey,
    pub displacement_texture: TextureKey,
    pub displacement_factor: f32,
    pub displacement_bias: f32,
}

/// The four texture maps a Phong material samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaps {
    pub diffuse: TextureKey,
    pub specular: TextureKey,
    pub normal: TextureKey,
    pub displacement: TextureKey,
}

impl PhongMaterial {
    pub fn new(color: Color, maps: PhongMaps) -> Self {
        Self {
            color,
            shininess: 32.0,
            ambient_color: [0.0, 0.0, 0.0, 1.0],
            specular_color: WHITE,
            diffuse_texture: maps.diffuse,
            specular_texture: maps.specular,
            normal_texture: maps.normal,
            displacement_texture: maps.displacement,
            displacement_factor: 0.0,
            displacement_bias: 0.0,
        }
    }

    pub fn maps(&self) -> PhongMaps {
        PhongMaps {
            diffuse: self.diffuse_texture,
            specular: self.specular_texture,
            normal: self.normal_texture,
            displacement: self.displacement_texture,
        }
    }

    /// Builder pattern: specular exponent
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    /// Builder pattern: ambient and specular colours
    pub fn with_colors(mut self, ambient: Color, specular: Color) -> Self {
        self.ambient_color = ambient;
        self.specular_color = specular;
        self
    }

    /// Builder pattern: displacement map scale and offset
    pub fn with_displacement(mut self, factor: f32, bias: f32) -> Self {
        self.displacement_factor = factor;
        self.displacement_bias = bias;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Basic(BasicMaterial),
    Phong(PhongMaterial),
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Material::Basic(BasicMaterial { color })
    }

    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Basic(_) => MaterialKind::Basic,
            Material::Phong(_) => MaterialKind::Phong,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Material::Basic(m) => m.color,
            Material::Phong(m) => m.color,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        match self {
            Material::Basic(m) => m.color = color,
            Material::Phong(m) => m.color = color,
        }
    }

    /// Textures referenced by this material
    pub fn textures(&self) -> Vec<TextureKey> {
        match self {
            Material::Basic(_) => Vec::new(),
            Material::Phong(m) => vec![
                m.diffuse_texture,
                m.specular_texture,
                m.normal_texture,
                m.displacement_texture,
            ],
        }
    }

    /// Shader inputs of this material keyed by uniform name (without the `u_` prefix)
    pub fn uniforms(&self) -> UniformBag {
        let mut bag = UniformBag::new();
        match self {
            Material::Basic(m) => {
                bag.insert("color".into(), UniformValue::Vec4(m.color));
            }
            Material::Phong(m) => {
                bag.insert("color".into(), UniformValue::Vec4(m.color));
                bag.insert("shininess".into(), UniformValue::Float(m.shininess));
                bag.insert("ambientColor".into(), UniformValue::Vec4(m.ambient_color));
                bag.insert("specularColor".into(), UniformValue::Vec4(m.specular_color));
                bag.insert("diffuseTexture".into(), UniformValue::Texture(m.diffuse_texture));
                bag.insert("specularTexture".into(), UniformValue::Texture(m.specular_texture));
                bag.insert("normalTexture".into(), UniformValue::Texture(m.normal_texture));
                bag.insert(
                    "displacementTexture".into(),
                    UniformValue::Texture(m.displacement_texture),
                );
                bag.insert(
                    "displacementFactor".into(),
                    UniformValue::Float(m.displacement_factor),
                );
                bag.insert("displacementBias".into(), UniformValue::Float(m.displacement_bias));
            }
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn maps() -> PhongMaps {
        let mut textures: SlotMap<TextureKey, ()> = SlotMap::with_key();
        PhongMaps {
            diffuse: textures.insert(()),
            specular: textures.insert(()),
            normal: textures.insert(()),
            displacement: textures.insert(()),
        }
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in [MaterialKind::Basic, MaterialKind::Phong] {
            assert_eq!(kind.as_str().parse::<MaterialKind>(), Ok(kind));
        }
        assert!("lambert".parse::<MaterialKind>().is_err());
    }

    #[test]
    fn test_basic_uniforms() {
        let bag = Material::basic([1.0, 0.0, 0.0, 1.0]).uniforms();
        assert_eq!(bag.len(), 1);
        assert_eq!(bag["color"], UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_phong_uniforms_cover_all_inputs() {
        let maps = maps();
        let material = Material::Phong(
            PhongMaterial::new(WHITE, maps)
                .with_shininess(8.0)
                .with_displacement(0.5, -0.1),
        );
        let bag = material.uniforms();
        assert_eq!(bag["shininess"], UniformValue::Float(8.0));
        assert_eq!(bag["displacementBias"], UniformValue::Float(-0.1));
        assert_eq!(bag["normalTexture"], UniformValue::Texture(maps.normal));
        assert_eq!(material.textures().len(), 4);
    }

    #[test]
    fn test_set_color_on_either_variant() {
        let mut material = Material::Phong(PhongMaterial::new(WHITE, maps()));
        material.set_color([0.2, 0.3, 0.4, 1.0]);
        assert_eq!(material.color(), [0.2, 0.3, 0.4, 1.0]);
    }
}
