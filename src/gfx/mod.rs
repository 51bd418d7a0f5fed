//! # Graphics Module
//!
//! Everything between a node's transform and a pixel: math, geometry, the
//! scene graph, cameras, materials and textures, and the rendering traversal.
//!
//! ## Architecture Overview
//!
//! - **Math** ([`math`]) - pure 4×4 matrix functions over `cgmath`
//! - **Geometry** ([`geometry`]) - vertex attributes, derived normals, primitives, OBJ import
//! - **Scene Management** ([`scene`]) - node arena with eagerly computed world matrices
//! - **Camera System** ([`camera`]) - projections, the editor's orbit rig and its controller
//! - **Resource Management** ([`resources`]) - materials, textures and uniform values
//! - **Rendering Pipeline** ([`rendering`]) - shader binding layer, draw and pick passes
//! - **Picking** ([`picking`]) - pick-id colour packing and pointer conversion
//!
//! ## Usage
//!
//! ```rust
//! use marionette::gfx::{
//!     geometry::box_geometry,
//!     rendering::{HeadlessRasterizer, RenderEngine},
//!     scene::{MeshData, Scene},
//! };
//!
//! let mut scene = Scene::new();
//! let (basic, phong) = scene.add_material_pair([1.0, 0.0, 0.0, 1.0]);
//! scene.add_mesh("box", MeshData::new(box_geometry(150.0, 150.0, 150.0), basic, phong), None);
//!
//! let mut engine = RenderEngine::new(HeadlessRasterizer::new(800, 600), Default::default()).unwrap();
//! let stats = engine.render(&mut scene, None, None);
//! assert_eq!(stats.draw_calls, 1);
//! ```

pub mod camera;
pub mod geometry;
pub mod math;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;
pub use scene::Scene;
