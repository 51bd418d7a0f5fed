//! Core rendering functionality
//!
//! The draw and pick traversals, the shader binding layer and the seam to
//! whatever actually rasterizes triangles.

pub mod headless;
pub mod program;
pub mod rasterizer;
pub mod render_engine;
pub mod shaders;

// Re-export main types
pub use headless::HeadlessRasterizer;
pub use program::{ProgramInfo, UniformSetter};
pub use rasterizer::{ImageData, Rasterizer, ShaderStage};
pub use render_engine::RenderEngine;
