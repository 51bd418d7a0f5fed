//! Materials, textures and the uniform values they expose to shaders

pub mod color;
pub mod material;
pub mod texture;
pub mod uniforms;

pub use color::{hex_to_rgba, rgba_to_hex, Color};
pub use material::{BasicMaterial, Material, MaterialKind, PhongMaps, PhongMaterial};
pub use texture::{SamplerParams, Texture};
pub use uniforms::{UniformBag, UniformValue};
