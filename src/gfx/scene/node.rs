use std::fmt;

use serde::{Deserialize, Serialize};

use super::{light::Light, MaterialKey, NodeKey};
use crate::gfx::{
    camera::camera_utils::Camera,
    geometry::buffer_geometry::BufferGeometry,
    math::{self, Vec3, M4},
    resources::material::MaterialKind,
};

/// Per-scene node identity, monotonic and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry plus the materials a mesh can switch between
#[derive(Debug, Clone)]
pub struct MeshData {
    pub geometry: BufferGeometry,
    pub basic_material: MaterialKey,
    pub phong_material: MaterialKey,
    /// Which of the two materials is drawn
    pub active: MaterialKind,
    pub(crate) pick_id: u32,
}

impl MeshData {
    pub fn new(geometry: BufferGeometry, basic_material: MaterialKey, phong_material: MaterialKey) -> Self {
        Self {
            geometry,
            basic_material,
            phong_material,
            active: MaterialKind::Basic,
            pick_id: 0,
        }
    }

    /// Builder pattern: select the drawn material
    pub fn with_active(mut self, active: MaterialKind) -> Self {
        self.active = active;
        self
    }

    pub fn active_material(&self) -> MaterialKey {
        match self.active {
            MaterialKind::Basic => self.basic_material,
            MaterialKind::Phong => self.phong_material,
        }
    }

    /// 1-based id written by the pick pass; 0 until the mesh joins a scene
    pub fn pick_id(&self) -> u32 {
        self.pick_id
    }
}

/// Role of a node in the scene
#[derive(Debug, Clone)]
pub enum NodeKind {
    Transform,
    Mesh(MeshData),
    Camera(Camera),
    Light(Light),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Transform => "transform",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Camera(_) => "camera",
            NodeKind::Light(_) => "light",
        }
    }
}

/// A positioned element of the scene graph
///
/// Transform fields are read here and written through [`Scene`](super::Scene)
/// so that the cached matrices of the node and its descendants are recomputed
/// immediately.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub(crate) translation: Vec3,
    pub(crate) rotation: Vec3,
    pub(crate) scale: Vec3,
    pub(crate) local_matrix: M4,
    pub(crate) world_matrix: M4,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub visible: bool,
    /// Changed through [`Scene::set_kind`](super::Scene::set_kind) so pick
    /// slots stay in step with the node's role
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: &str, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            translation: Vec3::new(0.0, 0.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, 0.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_matrix: math::identity(),
            world_matrix: math::identity(),
            parent: None,
            children: Vec::new(),
            visible: true,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Euler rotation in radians
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn local_matrix(&self) -> &M4 {
        &self.local_matrix
    }

    pub fn world_matrix(&self) -> &M4 {
        &self.world_matrix
    }

    pub fn world_position(&self) -> Vec3 {
        math::position_of(&self.world_matrix)
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub(crate) fn compute_local_matrix(&mut self) {
        self.local_matrix = math::compose(self.translation, self.rotation, self.scale);
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }
}
