// src/lib.rs
//! Marionette 3D Editor Core
//!
//! The scene, rendering, animation and file layers behind an interactive 3D
//! modelling editor. Rendering goes through the [`Rasterizer`](gfx::rendering::Rasterizer)
//! seam so the same session runs against a GPU backend or headless.

pub mod animation;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod gfx;
pub mod prelude;

// Re-export main types for convenience
pub use editor::Editor;
pub use error::{Result, SceneError};

/// Creates an editor that draws into an in-memory `width`×`height` buffer
pub fn headless(width: u32, height: u32) -> Result<Editor<gfx::rendering::HeadlessRasterizer>> {
    Editor::new(
        gfx::rendering::HeadlessRasterizer::new(width, height),
        config::EditorConfig::default(),
    )
}
