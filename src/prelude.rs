//! # Marionette Prelude
//!
//! Commonly used types in one import.
//!
//! ```rust
//! use marionette::prelude::*;
//!
//! let mut editor = marionette::headless(800, 600).unwrap();
//! let mesh = editor.add_default();
//! editor.scene_mut().set_translation(mesh, Vector3::new(10.0, 0.0, 0.0));
//! editor.animator_mut().set_easing(Easing::Sine);
//! assert_eq!(editor.tick(0.016).draw_calls, 1);
//! ```

// Session
pub use crate::config::{AnimationSettings, EditorConfig, RenderConfig};
pub use crate::editor::Editor;
pub use crate::error::{Result, SceneError};

// Scene graph and resources
pub use crate::gfx::camera::{Camera, CameraKind, CameraRig, OrbitController, ProjectionType};
pub use crate::gfx::geometry::{box_geometry, BufferAttribute, BufferGeometry};
pub use crate::gfx::resources::material::{Material, MaterialKind};
pub use crate::gfx::scene::{Light, LightKind, MeshData, Node, NodeId, NodeKey, NodeKind, Scene};

// Rendering
pub use crate::gfx::rendering::{HeadlessRasterizer, Rasterizer, RenderEngine};

// Animation and files
pub use crate::animation::{Animation, AnimationController, Easing, Frame, Keyframe};
pub use crate::document::{MeshSubtree, ModelDocument};

// Math
pub use cgmath::Vector3;
