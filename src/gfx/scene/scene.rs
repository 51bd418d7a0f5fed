use std::{collections::HashMap, path::Path};

use anyhow::Context;
use log::{debug, info, warn};
use slotmap::SlotMap;

use super::{
    node::{MeshData, Node, NodeId, NodeKind},
    MaterialKey, NodeKey, TextureKey,
};
use crate::gfx::{
    geometry::{buffer_geometry::BufferGeometry, obj},
    math::{Vec3, M4},
    resources::{
        color::Color,
        material::{Material, PhongMaps, PhongMaterial},
        texture::Texture,
    },
};

/// Arena owning every node, material and texture of a scene
///
/// All structural and transform mutations go through `Scene`, which
/// recomputes world matrices eagerly: after any call returns,
/// `world == parent.world * local` holds for every node.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: SlotMap<NodeKey, Node>,
    ids: HashMap<NodeId, NodeKey>,
    next_id: u32,
    roots: Vec<NodeKey>,
    /// Indexed by `pick_id - 1`; removed meshes leave a tombstone
    pickables: Vec<Option<NodeKey>>,
    pub materials: SlotMap<MaterialKey, Material>,
    pub textures: SlotMap<TextureKey, Texture>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parentless node
    pub fn create_node(&mut self, name: &str, kind: NodeKind) -> NodeKey {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let key = self.nodes.insert(Node::new(id, name, kind));
        self.ids.insert(id, key);
        self.roots.push(key);

        self.register_pickable(key);
        self.compute_world_matrix(key, false, false);
        key
    }

    /// Hands a fresh pick id to `key` if it is a mesh
    fn register_pickable(&mut self, key: NodeKey) {
        if let Some(mesh) = self.nodes.get_mut(key).and_then(|node| node.as_mesh_mut()) {
            self.pickables.push(Some(key));
            mesh.pick_id = self.pickables.len() as u32;
        }
    }

    fn release_pickable(&mut self, pick_id: u32) {
        let Some(index) = pick_id.checked_sub(1) else {
            return;
        };
        if let Some(slot) = self.pickables.get_mut(index as usize) {
            *slot = None;
        }
    }

    /// Replaces the role of `key`. Returns false when the node does not exist.
    ///
    /// A mesh replacing a mesh keeps its pick id. A node that stops being a
    /// mesh leaves a tombstone; one that becomes a mesh gets a fresh id.
    pub fn set_kind(&mut self, key: NodeKey, kind: NodeKind) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        let previous = node.as_mesh().map(MeshData::pick_id).filter(|id| *id != 0);
        node.kind = kind;

        match (previous, node.is_mesh()) {
            (Some(pick_id), true) => {
                if let Some(mesh) = node.as_mesh_mut() {
                    mesh.pick_id = pick_id;
                }
            }
            (Some(pick_id), false) => self.release_pickable(pick_id),
            (None, true) => self.register_pickable(key),
            (None, false) => {}
        }
        true
    }

    /// Creates a node and attaches it to `parent` when given
    pub fn add_node(&mut self, name: &str, kind: NodeKind, parent: Option<NodeKey>) -> NodeKey {
        let key = self.create_node(name, kind);
        if let Some(parent) = parent {
            self.add_child(parent, key);
        }
        key
    }

    pub fn add_mesh(&mut self, name: &str, mesh: MeshData, parent: Option<NodeKey>) -> NodeKey {
        self.add_node(name, NodeKind::Mesh(mesh), parent)
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Mutable access to a node's name, visibility and role
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn key_of(&self, id: NodeId) -> Option<NodeKey> {
        self.ids.get(&id).copied()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.key_of(id).and_then(|key| self.nodes.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parentless nodes in creation/detach order
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    pub fn parent_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    pub fn children_of(&self, key: NodeKey) -> &[NodeKey] {
        match self.nodes.get(key) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Whether `ancestor` is `key` itself or one of its ancestors
    pub fn is_ancestor(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.parent_of(k);
        }
        false
    }

    /// Mesh registered under the 1-based `pick_id`, if it still exists
    pub fn pickable(&self, pick_id: u32) -> Option<NodeKey> {
        let index = pick_id.checked_sub(1)? as usize;
        self.pickables.get(index).copied().flatten()
    }

    /// Number of pick ids handed out so far, including tombstones
    pub fn pick_id_count(&self) -> usize {
        self.pickables.len()
    }

    /// Attaches `child` to `parent`, detaching it from its current parent first
    ///
    /// Adding a node to its current parent is a no-op. Attaching a node below
    /// itself is refused. Returns whether `child` is now a child of `parent`.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.nodes[child].parent == Some(parent) {
            return true;
        }
        if self.is_ancestor(child, parent) {
            warn!(
                "Refusing to attach node {} below its own descendant {}",
                self.nodes[child].id(), self.nodes[parent].id()
            );
            return false;
        }

        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.compute_world_matrix(child, false, true);
        true
    }

    /// Detaches `child` from `parent`, making it a root
    ///
    /// Returns false when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        if self.parent_of(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        self.roots.push(child);
        self.compute_world_matrix(child, false, true);
        true
    }

    /// Unlinks `key` from its parent's children or from the root list
    fn detach(&mut self, key: NodeKey) {
        match self.nodes[key].parent.take() {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|c| *c != key);
                }
            }
            None => self.roots.retain(|r| *r != key),
        }
    }

    /// Destroys `key` and its whole subtree. Returns the number of nodes removed.
    ///
    /// Node ids and pick ids of removed nodes are never handed out again.
    pub fn remove_node(&mut self, key: NodeKey) -> usize {
        if !self.contains(key) {
            return 0;
        }
        self.detach(key);

        let subtree = self.preorder(key);
        for k in &subtree {
            if let Some(node) = self.nodes.remove(*k) {
                self.ids.remove(&node.id());
                if let Some(mesh) = node.as_mesh() {
                    self.release_pickable(mesh.pick_id);
                }
            }
        }
        debug!("Removed {} node(s)", subtree.len());
        subtree.len()
    }

    /// Recomputes the local matrix of `key` from its TRS and its world matrix
    /// from its parent's
    ///
    /// With `update_parent` the ancestors are refreshed first (root down);
    /// with `update_children` every descendant is refreshed afterwards.
    pub fn compute_world_matrix(&mut self, key: NodeKey, update_parent: bool, update_children: bool) {
        if !self.contains(key) {
            return;
        }
        if update_parent {
            let mut ancestors = Vec::new();
            let mut current = self.parent_of(key);
            while let Some(ancestor) = current {
                ancestors.push(ancestor);
                current = self.parent_of(ancestor);
            }
            for ancestor in ancestors.into_iter().rev() {
                self.update_world(ancestor);
            }
        }

        self.update_world(key);

        if update_children {
            let mut stack: Vec<NodeKey> = self.nodes[key].children.iter().rev().copied().collect();
            while let Some(next) = stack.pop() {
                self.update_world(next);
                stack.extend(self.nodes[next].children.iter().rev().copied());
            }
        }
    }

    fn update_world(&mut self, key: NodeKey) {
        let parent_world = self
            .parent_of(key)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.world_matrix);
        let node = &mut self.nodes[key];
        node.compute_local_matrix();
        node.world_matrix = match parent_world {
            Some(parent_world) => parent_world * node.local_matrix,
            None => node.local_matrix,
        };
    }

    pub fn set_translation(&mut self, key: NodeKey, translation: Vec3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.translation = translation;
            self.compute_world_matrix(key, false, true);
        }
    }

    /// Sets the Euler rotation in radians
    pub fn set_rotation(&mut self, key: NodeKey, rotation: Vec3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.rotation = rotation;
            self.compute_world_matrix(key, false, true);
        }
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.scale = scale;
            self.compute_world_matrix(key, false, true);
        }
    }

    /// Sets any subset of the TRS channels with a single recomputation
    pub fn set_transform(
        &mut self,
        key: NodeKey,
        translation: Option<Vec3>,
        rotation: Option<Vec3>,
        scale: Option<Vec3>,
    ) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        if let Some(t) = translation {
            node.translation = t;
        }
        if let Some(r) = rotation {
            node.rotation = r;
        }
        if let Some(s) = scale {
            node.scale = s;
        }
        self.compute_world_matrix(key, false, true);
    }

    /// World matrix of `key` with its ancestors refreshed first
    pub fn world_matrix(&mut self, key: NodeKey) -> Option<M4> {
        self.compute_world_matrix(key, true, false);
        self.nodes.get(key).map(|node| node.world_matrix)
    }

    /// `projection * inverse(world)` of a camera node, recomputed on every call
    pub fn view_projection(&mut self, camera: NodeKey) -> Option<M4> {
        let world = self.world_matrix(camera)?;
        self.nodes
            .get(camera)
            .and_then(Node::as_camera)
            .map(|camera| camera.view_projection(&world))
    }

    /// Split borrow of a mesh node for drawing: its mesh data, world matrix,
    /// the material arena and the texture arena
    pub(crate) fn draw_parts(
        &mut self,
        key: NodeKey,
    ) -> Option<(
        &mut MeshData,
        &M4,
        &SlotMap<MaterialKey, Material>,
        &mut SlotMap<TextureKey, Texture>,
    )> {
        let node = self.nodes.get_mut(key)?;
        let NodeKind::Mesh(mesh) = &mut node.kind else {
            return None;
        };
        Some((mesh, &node.world_matrix, &self.materials, &mut self.textures))
    }

    /// Depth-first search of the subtree rooted at `start` for node `id`
    pub fn find_node_by_id(&self, start: NodeKey, id: NodeId) -> Option<NodeKey> {
        let node = self.nodes.get(start)?;
        if node.id() == id {
            return Some(start);
        }
        node.children
            .iter()
            .find_map(|child| self.find_node_by_id(*child, id))
    }

    /// `key` and its descendants in depth-first preorder
    pub fn preorder(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(next) {
                order.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Every node reachable from the roots, in depth-first preorder
    pub fn preorder_all(&self) -> Vec<NodeKey> {
        self.roots.iter().flat_map(|root| self.preorder(*root)).collect()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        self.materials.insert(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureKey {
        self.textures.insert(texture)
    }

    /// Four placeholder textures for a Phong material: white diffuse and
    /// specular, a flat normal map and zero displacement
    pub fn add_phong_maps(&mut self) -> PhongMaps {
        PhongMaps {
            diffuse: self.add_texture(Texture::new()),
            specular: self.add_texture(Texture::new()),
            normal: self.add_texture(Texture::new().with_default_color([128, 128, 255, 255])),
            displacement: self.add_texture(Texture::new().with_default_color([0, 0, 0, 255])),
        }
    }

    /// A basic and a Phong material of the same colour, as every mesh carries both
    pub fn add_material_pair(&mut self, color: Color) -> (MaterialKey, MaterialKey) {
        let maps = self.add_phong_maps();
        let basic = self.add_material(Material::basic(color));
        let phong = self.add_material(Material::Phong(PhongMaterial::new(color, maps)));
        (basic, phong)
    }

    /// Loads every model of an OBJ file as a mesh node below `parent`
    pub fn import_obj(
        &mut self,
        path: impl AsRef<Path>,
        parent: Option<NodeKey>,
        materials: (MaterialKey, MaterialKey),
    ) -> anyhow::Result<Vec<NodeKey>> {
        let path = path.as_ref();
        let models = obj::load_obj(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;

        let mut keys = Vec::new();
        for (name, geometry) in models {
            let name = self.ensure_unique_name(&name);
            let mesh = MeshData::new(geometry, materials.0, materials.1);
            keys.push(self.add_mesh(&name, mesh, parent));
        }
        info!("Imported {} mesh(es) from {}", keys.len(), path.display());
        Ok(keys)
    }

    /// Gets statistics about the scene
    pub fn statistics(&self) -> SceneStatistics {
        let meshes: Vec<&BufferGeometry> = self
            .nodes
            .values()
            .filter_map(|node| node.as_mesh().map(|mesh| &mesh.geometry))
            .collect();

        SceneStatistics {
            node_count: self.nodes.len(),
            mesh_count: meshes.len(),
            material_count: self.materials.len(),
            texture_count: self.textures.len(),
            total_vertices: meshes.iter().map(|g| g.vertex_count()).sum(),
        }
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.nodes.values().any(|node| node.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

/// Scene statistics for debugging and editor display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub total_vertices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        geometry::primitives,
        math::{assert_mat_close, compose, identity},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn mesh(scene: &mut Scene) -> MeshData {
        let (basic, phong) = scene.add_material_pair([1.0, 0.0, 0.0, 1.0]);
        MeshData::new(primitives::box_geometry(10.0, 10.0, 10.0), basic, phong)
    }

    fn assert_consistent(scene: &Scene) {
        for (_, node) in scene.iter() {
            let local = compose(node.translation(), node.rotation(), node.scale());
            assert_mat_close(node.local_matrix(), &local);
            let parent_world = node
                .parent()
                .map(|p| *scene.node(p).unwrap().world_matrix())
                .unwrap_or_else(identity);
            assert_mat_close(node.world_matrix(), &(parent_world * local));
        }
    }

    fn random_vec(rng: &mut StdRng, range: std::ops::Range<f32>) -> Vec3 {
        Vec3::new(
            rng.random_range(range.clone()),
            rng.random_range(range.clone()),
            rng.random_range(range),
        )
    }

    #[test]
    fn test_transform_composition_random_trees() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut scene = Scene::new();
        let mut keys = vec![scene.create_node("root", NodeKind::Transform)];
        for i in 0..40 {
            let parent = keys[rng.random_range(0..keys.len())];
            keys.push(scene.add_node(&format!("n{}", i), NodeKind::Transform, Some(parent)));
        }

        for _ in 0..200 {
            let key = keys[rng.random_range(0..keys.len())];
            match rng.random_range(0..4) {
                0 => scene.set_translation(key, random_vec(&mut rng, -50.0..50.0)),
                1 => scene.set_rotation(key, random_vec(&mut rng, -3.0..3.0)),
                2 => scene.set_scale(key, random_vec(&mut rng, 0.5..2.0)),
                _ => {
                    let parent = keys[rng.random_range(0..keys.len())];
                    scene.add_child(parent, key);
                }
            }
            assert_consistent(&scene);
        }
    }

    #[test]
    fn test_readding_to_same_parent_is_noop() {
        let mut scene = Scene::new();
        let parent = scene.create_node("parent", NodeKind::Transform);
        let a = scene.add_node("a", NodeKind::Transform, Some(parent));
        let b = scene.add_node("b", NodeKind::Transform, Some(parent));

        assert!(scene.add_child(parent, a));
        assert_eq!(scene.children_of(parent), &[a, b]);
    }

    #[test]
    fn test_reparent_moves_between_parents() {
        let mut scene = Scene::new();
        let p1 = scene.create_node("p1", NodeKind::Transform);
        let p2 = scene.create_node("p2", NodeKind::Transform);
        scene.set_translation(p2, Vec3::new(5.0, 0.0, 0.0));
        let child = scene.add_node("child", NodeKind::Transform, Some(p1));
        let grandchild = scene.add_node("grandchild", NodeKind::Transform, Some(child));

        scene.add_child(p2, child);
        assert!(scene.children_of(p1).is_empty());
        assert_eq!(scene.children_of(p2), &[child]);
        assert_eq!(scene.node(grandchild).unwrap().world_position(), Vec3::new(5.0, 0.0, 0.0));
        assert_consistent(&scene);
    }

    #[test]
    fn test_cycles_are_refused() {
        let mut scene = Scene::new();
        let a = scene.create_node("a", NodeKind::Transform);
        let b = scene.add_node("b", NodeKind::Transform, Some(a));
        assert!(!scene.add_child(b, a));
        assert!(!scene.add_child(a, a));
        assert_eq!(scene.parent_of(b), Some(a));
        assert_eq!(scene.roots(), &[a]);
    }

    #[test]
    fn test_remove_child_becomes_root() {
        let mut scene = Scene::new();
        let parent = scene.create_node("parent", NodeKind::Transform);
        scene.set_translation(parent, Vec3::new(0.0, 10.0, 0.0));
        let child = scene.add_node("child", NodeKind::Transform, Some(parent));
        assert_eq!(scene.node(child).unwrap().world_position(), Vec3::new(0.0, 10.0, 0.0));

        assert!(scene.remove_child(parent, child));
        assert!(!scene.remove_child(parent, child));
        assert_eq!(scene.parent_of(child), None);
        assert_eq!(scene.roots(), &[parent, child]);
        assert_eq!(scene.node(child).unwrap().world_position(), Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_find_node_by_id_searches_subtree() {
        let mut scene = Scene::new();
        let root = scene.create_node("root", NodeKind::Transform);
        let a = scene.add_node("a", NodeKind::Transform, Some(root));
        let b = scene.add_node("b", NodeKind::Transform, Some(a));
        let other = scene.create_node("other", NodeKind::Transform);

        let b_id = scene.node(b).unwrap().id();
        assert_eq!(scene.find_node_by_id(root, b_id), Some(b));
        assert_eq!(scene.find_node_by_id(other, b_id), None);
        assert_eq!(scene.key_of(b_id), Some(b));
    }

    #[test]
    fn test_remove_node_destroys_subtree_and_keeps_ids_stable() {
        let mut scene = Scene::new();
        let root = scene.create_node("root", NodeKind::Transform);
        let m1 = mesh(&mut scene);
        let first = scene.add_mesh("first", m1, Some(root));
        let m2 = mesh(&mut scene);
        let second = scene.add_mesh("second", m2, Some(first));
        let m3 = mesh(&mut scene);
        let third = scene.add_mesh("third", m3, Some(root));
        let third_id = scene.node(third).unwrap().id();

        assert_eq!(scene.remove_node(first), 2);
        assert!(!scene.contains(second));
        assert_eq!(scene.children_of(root), &[third]);

        // surviving ids and pick ids are untouched, removed pick slots are tombstones
        assert_eq!(scene.node(third).unwrap().id(), third_id);
        assert_eq!(scene.pickable(1), None);
        assert_eq!(scene.pickable(2), None);
        assert_eq!(scene.pickable(3), Some(third));

        let m4 = mesh(&mut scene);
        let fourth = scene.add_mesh("fourth", m4, Some(root));
        assert_eq!(scene.node(fourth).unwrap().as_mesh().unwrap().pick_id(), 4);
        assert!(scene.node(fourth).unwrap().id() > third_id);
    }

    #[test]
    fn test_pick_ids_are_one_based_and_dense() {
        let mut scene = Scene::new();
        scene.create_node("group", NodeKind::Transform);
        let m = mesh(&mut scene);
        let a = scene.add_mesh("a", m, None);
        let m = mesh(&mut scene);
        let b = scene.add_mesh("b", m, None);
        assert_eq!(scene.pickable(0), None);
        assert_eq!(scene.pickable(1), Some(a));
        assert_eq!(scene.pickable(2), Some(b));
        assert_eq!(scene.pick_id_count(), 2);
    }

    #[test]
    fn test_set_kind_keeps_pick_slots_in_step() {
        let mut scene = Scene::new();
        let node = scene.create_node("node", NodeKind::Transform);
        let m = mesh(&mut scene);
        assert!(scene.set_kind(node, NodeKind::Mesh(m)));
        let pick_id = scene.node(node).unwrap().as_mesh().unwrap().pick_id();
        assert_eq!(pick_id, 1);
        assert_eq!(scene.pickable(pick_id), Some(node));

        let m = mesh(&mut scene);
        scene.set_kind(node, NodeKind::Mesh(m));
        assert_eq!(scene.node(node).unwrap().as_mesh().unwrap().pick_id(), pick_id);

        scene.set_kind(node, NodeKind::Transform);
        assert_eq!(scene.pickable(pick_id), None);
        assert_eq!(scene.remove_node(node), 1);
    }

    #[test]
    fn test_remove_node_ignores_unregistered_mesh() {
        let mut scene = Scene::new();
        let key = scene.create_node("orphan", NodeKind::Transform);
        let m = mesh(&mut scene);
        scene.node_mut(key).unwrap().kind = NodeKind::Mesh(m);
        assert_eq!(scene.node(key).unwrap().as_mesh().unwrap().pick_id(), 0);
        assert_eq!(scene.remove_node(key), 1);
        assert!(!scene.contains(key));
    }

    #[test]
    fn test_view_projection_refreshes_ancestors() {
        use crate::gfx::camera::camera_utils::{Camera, ProjectionType};

        let mut scene = Scene::new();
        let pivot = scene.create_node("origin", NodeKind::Transform);
        let camera = Camera::for_viewport(ProjectionType::Orthographic, 200.0, 200.0);
        let cam = scene.add_node("camera", NodeKind::Camera(camera), Some(pivot));
        scene.set_translation(cam, Vec3::new(0.0, 0.0, 850.0));
        scene.set_translation(pivot, Vec3::new(10.0, 0.0, 0.0));

        let vp = scene.view_projection(cam).unwrap();
        let expected = camera.projection_matrix()
            * crate::gfx::math::translation(Vec3::new(-10.0, 0.0, -850.0));
        assert_mat_close(&vp, &expected);
        assert!(scene.view_projection(pivot).is_none());
    }

    #[test]
    fn test_statistics_and_unique_names() {
        let mut scene = Scene::new();
        let m = mesh(&mut scene);
        scene.add_mesh("box", m, None);
        assert_eq!(scene.ensure_unique_name("box"), "box (1)");
        assert_eq!(scene.ensure_unique_name("sphere"), "sphere");

        let stats = scene.statistics();
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.mesh_count, 1);
        assert_eq!(stats.material_count, 2);
        assert_eq!(stats.texture_count, 4);
        assert_eq!(stats.total_vertices, 36);
    }
}
