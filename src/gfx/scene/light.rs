use cgmath::InnerSpace;

use crate::gfx::{
    math::{position_of, Vec3, M4},
    resources::{
        color::{Color, WHITE},
        uniforms::{UniformBag, UniformValue},
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Light arriving from the direction of the node's translation
    Directional,
    /// Omni light at the node's world position with `1 / (a + b·d + c·d²)` falloff
    Point {
        attenuation_a: f32,
        attenuation_b: f32,
        attenuation_c: f32,
    },
}

impl LightKind {
    pub fn point() -> Self {
        LightKind::Point {
            attenuation_a: 1.0,
            attenuation_b: 1.0,
            attenuation_c: 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LightKind::Directional => "directional",
            LightKind::Point { .. } => "point",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color: Color,
    pub kind: LightKind,
}

impl Default for Light {
    fn default() -> Self {
        Self::directional()
    }
}

impl Light {
    pub fn directional() -> Self {
        Self {
            color: WHITE,
            kind: LightKind::Directional,
        }
    }

    pub fn point() -> Self {
        Self {
            color: WHITE,
            kind: LightKind::point(),
        }
    }

    /// Builder pattern: light colour
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Shader inputs contributed by this light, given its node's transform
    pub fn uniforms(&self, translation: Vec3, world: &M4) -> UniformBag {
        let mut bag = UniformBag::new();
        bag.insert("lightColor".into(), UniformValue::Vec4(self.color));
        match self.kind {
            LightKind::Directional => {
                let reverse = if translation.magnitude2() > 0.0 {
                    translation.normalize()
                } else {
                    Vec3::unit_z()
                };
                bag.insert("reverseLightDirection".into(), reverse.into());
                bag.insert("lightIsDirectional".into(), UniformValue::Bool(true));
            }
            LightKind::Point {
                attenuation_a,
                attenuation_b,
                attenuation_c,
            } => {
                bag.insert("lightWorldPosition".into(), position_of(world).into());
                bag.insert("lightIsDirectional".into(), UniformValue::Bool(false));
                bag.insert("attenuationA".into(), UniformValue::Float(attenuation_a));
                bag.insert("attenuationB".into(), UniformValue::Float(attenuation_b));
                bag.insert("attenuationC".into(), UniformValue::Float(attenuation_c));
            }
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::{identity, translation};

    #[test]
    fn test_directional_uniforms() {
        let light = Light::directional().with_color([1.0, 0.5, 0.0, 1.0]);
        let bag = light.uniforms(Vec3::new(0.0, 3.0, 4.0), &identity());
        assert_eq!(bag["reverseLightDirection"], UniformValue::Vec3([0.0, 0.6, 0.8]));
        assert_eq!(bag["lightIsDirectional"], UniformValue::Bool(true));
        assert_eq!(bag["lightColor"], UniformValue::Vec4([1.0, 0.5, 0.0, 1.0]));
        assert!(!bag.contains_key("attenuationA"));
    }

    #[test]
    fn test_directional_at_origin_points_down_z() {
        let bag = Light::directional().uniforms(Vec3::new(0.0, 0.0, 0.0), &identity());
        assert_eq!(bag["reverseLightDirection"], UniformValue::Vec3([0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_point_uniforms_use_world_position() {
        let world = translation(Vec3::new(10.0, 20.0, 30.0));
        let bag = Light::point().uniforms(Vec3::new(1.0, 2.0, 3.0), &world);
        assert_eq!(bag["lightWorldPosition"], UniformValue::Vec3([10.0, 20.0, 30.0]));
        assert_eq!(bag["lightIsDirectional"], UniformValue::Bool(false));
        assert_eq!(bag["attenuationC"], UniformValue::Float(1.0));
    }
}
