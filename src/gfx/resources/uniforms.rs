//! Shader inputs expressed as plain name → value maps
//!
//! Materials, lights and the renderer describe what they feed a program as a
//! [`UniformBag`]; the binding layer matches each entry to `u_<name>` and
//! converts it to the declared type.

use std::collections::BTreeMap;

use crate::gfx::{
    math::{to_array, Vec3, M4},
    rendering::rasterizer::{GlslType, UniformData},
    scene::TextureKey,
};

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4(M4),
    /// Arbitrary float array, for array uniforms and `vec`/`mat` payloads
    Floats(Vec<f32>),
    Texture(TextureKey),
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v.into())
    }
}

impl From<M4> for UniformValue {
    fn from(v: M4) -> Self {
        UniformValue::Mat4(v)
    }
}

impl From<TextureKey> for UniformValue {
    fn from(v: TextureKey) -> Self {
        UniformValue::Texture(v)
    }
}

impl UniformValue {
    /// Flattened float components, `None` for textures
    pub fn components(&self) -> Option<Vec<f32>> {
        let values = match self {
            UniformValue::Float(v) => vec![*v],
            UniformValue::Int(v) => vec![*v as f32],
            UniformValue::Bool(v) => vec![if *v { 1.0 } else { 0.0 }],
            UniformValue::Vec2(v) => v.to_vec(),
            UniformValue::Vec3(v) => v.to_vec(),
            UniformValue::Vec4(v) => v.to_vec(),
            UniformValue::Mat4(m) => to_array(m).to_vec(),
            UniformValue::Floats(v) => v.clone(),
            UniformValue::Texture(_) => return None,
        };
        Some(values)
    }

    /// Converts to the payload for a uniform declared as `ty` with `array_len` elements
    ///
    /// Short values are zero padded (a `vec3` colour fed to a `vec4` uniform
    /// gets alpha 0 unless it was given as `Vec4`); long values are truncated.
    pub fn to_uniform_data(&self, ty: GlslType, array_len: usize) -> Option<UniformData> {
        let mut values = self.components()?;
        values.resize(ty.components() * array_len.max(1), 0.0);
        let data = match ty {
            GlslType::Mat2 | GlslType::Mat3 | GlslType::Mat4 => UniformData::Matrix(values),
            ty if ty.is_integer() => UniformData::Ints(values.into_iter().map(|v| v as i32).collect()),
            _ => UniformData::Floats(values),
        };
        Some(data)
    }
}

/// Named uniform values, iterated in name order
pub type UniformBag = BTreeMap<String, UniformValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::translation;

    #[test]
    fn test_bool_uploads_as_int() {
        let data = UniformValue::Bool(true).to_uniform_data(GlslType::Bool, 1);
        assert_eq!(data, Some(UniformData::Ints(vec![1])));
    }

    #[test]
    fn test_matrix_is_column_major() {
        let m = translation(Vec3::new(5.0, 6.0, 7.0));
        let Some(UniformData::Matrix(values)) = UniformValue::Mat4(m).to_uniform_data(GlslType::Mat4, 1)
        else {
            panic!("expected matrix data");
        };
        assert_eq!(&values[12..15], &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_padding_and_truncation() {
        let padded = UniformValue::Vec3([1.0, 2.0, 3.0]).to_uniform_data(GlslType::Vec4, 1);
        assert_eq!(padded, Some(UniformData::Floats(vec![1.0, 2.0, 3.0, 0.0])));
        let truncated = UniformValue::Vec4([1.0, 2.0, 3.0, 4.0]).to_uniform_data(GlslType::Vec3, 1);
        assert_eq!(truncated, Some(UniformData::Floats(vec![1.0, 2.0, 3.0])));
    }

    #[test]
    fn test_texture_has_no_components() {
        let key = TextureKey::default();
        assert_eq!(UniformValue::Texture(key).to_uniform_data(GlslType::Vec4, 1), None);
    }
}
