//! # Scene Management Module
//!
//! The scene graph: an arena of [`Node`]s owned by a [`Scene`], plus the
//! material and texture arenas the nodes reference.
//!
//! ## Key Components
//!
//! - [`Scene`] - owns every node, material and texture; all hierarchy and
//!   transform mutations go through it so world matrices stay consistent
//! - [`Node`] - translation/rotation/scale, cached local and world matrices,
//!   parent/children links and a [`NodeKind`] role
//! - [`NodeKind`] - `Transform`, `Mesh`, `Camera` or `Light`
//! - [`Light`] - directional or point light contributing shader uniforms
//!
//! ## Identity
//!
//! Nodes are addressed by [`NodeKey`] inside the arena. Each node also carries
//! a [`NodeId`], a per-scene monotonic integer that is never reused, used by
//! animation keyframes. Meshes additionally get a 1-based pick id for GPU
//! object picking.

use slotmap::new_key_type;

pub mod light;
pub mod node;
pub mod scene;

new_key_type! {
    /// Arena handle of a node
    pub struct NodeKey;
    /// Arena handle of a material
    pub struct MaterialKey;
    /// Arena handle of a texture
    pub struct TextureKey;
}

// Re-export main types
pub use light::{Light, LightKind};
pub use node::{MeshData, Node, NodeId, NodeKind};
pub use scene::{Scene, SceneStatistics};
