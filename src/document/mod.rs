//! # Documents
//!
//! JSON formats the editor reads and writes:
//!
//! - [`ModelDocument`] - the whole model: nodes, meshes with their vertex
//!   buffers, cameras, lights, materials, textures and an optional animation
//! - [`AnimationDef`] - a standalone keyframe timeline
//! - [`MeshSubtree`] - a self-contained mesh hierarchy for copy/paste
//!
//! Loading never mutates an existing scene: [`ModelDocument::load`] builds a
//! fresh [`Scene`](crate::gfx::scene::Scene) and the caller decides whether to
//! swap it in.

pub mod animation;
pub mod defs;
pub mod model;
pub mod subtree;

pub use animation::{animation_from_json, animation_to_json, AnimationDef};
pub use model::{LoadedModel, ModelDocument};
pub use subtree::{subtrees_from_json, subtrees_to_json, MeshSubtree};
