//! Shader Sources
//!
//! GLSL ES 1.0 programs for the three passes: unlit, Phong and object picking.

pub const BASIC_VERTEX: &str = include_str!("shaders/basic.vert");
pub const BASIC_FRAGMENT: &str = include_str!("shaders/basic.frag");
pub const PHONG_VERTEX: &str = include_str!("shaders/phong.vert");
pub const PHONG_FRAGMENT: &str = include_str!("shaders/phong.frag");
pub const PICK_VERTEX: &str = include_str!("shaders/pick.vert");
pub const PICK_FRAGMENT: &str = include_str!("shaders/pick.frag");

/// A vertex/fragment source pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

pub const BASIC: ShaderSources = ShaderSources {
    vertex: BASIC_VERTEX,
    fragment: BASIC_FRAGMENT,
};

pub const PHONG: ShaderSources = ShaderSources {
    vertex: PHONG_VERTEX,
    fragment: PHONG_FRAGMENT,
};

pub const PICK: ShaderSources = ShaderSources {
    vertex: PICK_VERTEX,
    fragment: PICK_FRAGMENT,
};
