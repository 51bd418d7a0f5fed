//! Full model document
//!
//! A glTF-flavoured JSON layout: nodes reference meshes, cameras and lights by
//! index, meshes reference accessors, accessors reference buffer views and
//! buffer views reference flat number buffers. Node children are indices into
//! the same `nodes` array and `scenes[scene].nodes` lists the roots.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{
    animation::AnimationDef,
    defs::{build_attribute, invalid, one3, to_array, to_vec3, zero3, CameraDef, LightDef, MaterialDef, TextureDef},
};
use crate::{
    animation::Animation,
    error::{Result, SceneError},
    gfx::{
        geometry::{
            buffer_attribute::{BufferAttribute, DataType},
            buffer_geometry::BufferGeometry,
        },
        resources::{color::WHITE, material::MaterialKind},
        scene::{MaterialKey, MeshData, Node, NodeId, NodeKey, NodeKind, Scene, TextureKey},
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(default = "zero3")]
    pub translation: [f32; 3],
    #[serde(default = "zero3")]
    pub rotation: [f32; 3],
    #[serde(default = "one3")]
    pub scale: [f32; 3],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<usize>,
}

impl From<&Node> for NodeDef {
    fn from(node: &Node) -> Self {
        NodeDef {
            name: node.name.clone(),
            translation: to_array(node.translation()),
            rotation: to_array(node.rotation()),
            scale: to_array(node.scale()),
            children: Vec::new(),
            mesh: None,
            camera: None,
            light: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDef {
    /// Attribute name to accessor index
    pub attributes: BTreeMap<String, usize>,
    pub material: MaterialKind,
    pub basic_material: usize,
    pub phong_material: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferDef {
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferViewDef {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(default)]
    pub byte_stride: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorDef {
    pub buffer_view: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    /// Components per element
    #[serde(default = "default_accessor_size")]
    pub size: usize,
    #[serde(default)]
    pub normalized: bool,
}

fn default_accessor_size() -> usize {
    3
}

/// The whole saved model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelDocument {
    pub scene: usize,
    pub scenes: Vec<SceneDef>,
    pub nodes: Vec<NodeDef>,
    pub meshes: Vec<MeshDef>,
    pub buffers: Vec<BufferDef>,
    pub buffer_views: Vec<BufferViewDef>,
    pub accessors: Vec<AccessorDef>,
    pub cameras: Vec<CameraDef>,
    pub lights: Vec<LightDef>,
    pub materials: Vec<MaterialDef<usize>>,
    pub textures: Vec<TextureDef>,
    /// At most one entry is used
    pub animation: Vec<AnimationDef>,
}

impl ModelDocument {
    /// Captures the subtrees under `roots`, plus the nodes under `extra` that
    /// the roots do not reach (saved but not listed as scene roots)
    pub fn save(scene: &Scene, roots: &[NodeKey], extra: &[NodeKey], animation: Option<&Animation>) -> Self {
        let mut writer = ModelWriter::new(scene);
        let root_indices = roots.iter().filter_map(|root| writer.node(*root)).collect();
        for key in extra {
            if !writer.node_index.contains_key(key) {
                writer.node(*key);
            }
        }

        let mut doc = writer.doc;
        doc.scene = 0;
        doc.scenes = vec![SceneDef { nodes: root_indices }];

        if let Some(animation) = animation {
            let ids: HashMap<NodeId, usize> = writer
                .node_index
                .iter()
                .filter_map(|(key, index)| scene.node(*key).map(|node| (node.id(), *index)))
                .collect();
            doc.animation = vec![AnimationDef::from_animation(animation, |id| {
                ids.get(&id).map(|index| *index as u32)
            })];
        }

        debug!(
            "Saved {} node(s), {} mesh(es), {} material(s)",
            doc.nodes.len(),
            doc.meshes.len(),
            doc.materials.len()
        );
        doc
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a fresh scene from the document
    ///
    /// Unsupported camera, light or material blocks are logged and skipped.
    /// Dangling indices and child cycles are [`SceneError::InvalidDocument`].
    pub fn load(&self) -> Result<LoadedModel> {
        let mut reader = ModelReader {
            doc: self,
            scene: Scene::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            fallback: None,
        };

        reader.textures = self.textures.iter().map(|def| reader.scene.add_texture(def.to_texture())).collect();
        for def in &self.materials {
            let material = def.to_material(|index| reader.texture(*index))?;
            let key = material.map(|material| reader.scene.add_material(material));
            reader.materials.push(key);
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (index, def) in self.nodes.iter().enumerate() {
            let kind = reader.kind(index, def)?;
            let key = reader.scene.create_node(&def.name, kind);
            reader.scene.set_transform(
                key,
                Some(to_vec3(def.translation)),
                Some(to_vec3(def.rotation)),
                Some(to_vec3(def.scale)),
            );
            nodes.push(key);
        }

        let scene = &mut reader.scene;
        for (index, def) in self.nodes.iter().enumerate() {
            for &child in &def.children {
                let child_key = *nodes
                    .get(child)
                    .ok_or_else(|| invalid(format!("node {} has out-of-range child {}", index, child)))?;
                if scene.parent_of(child_key).is_some() {
                    return Err(invalid(format!("node {} has more than one parent", child)));
                }
                if !scene.add_child(nodes[index], child_key) {
                    return Err(invalid(format!("child cycle through node {}", index)));
                }
            }
        }

        let roots = match self.scenes.get(self.scene) {
            Some(def) => def
                .nodes
                .iter()
                .map(|&i| {
                    nodes
                        .get(i)
                        .copied()
                        .ok_or_else(|| invalid(format!("root {} out of range", i)))
                })
                .collect::<Result<Vec<_>>>()?,
            None if self.scenes.is_empty() => scene.roots().to_vec(),
            None => return Err(invalid(format!("scene {} out of range", self.scene))),
        };

        let cameras = nodes
            .iter()
            .copied()
            .filter(|key| scene.node(*key).is_some_and(|node| node.as_camera().is_some()))
            .collect();
        let lights = nodes
            .iter()
            .copied()
            .filter(|key| scene.node(*key).is_some_and(|node| node.as_light().is_some()))
            .collect();

        let animation = match self.animation.first() {
            Some(def) => def.to_animation(|index| {
                nodes
                    .get(index as usize)
                    .and_then(|key| scene.node(*key))
                    .map(Node::id)
            }),
            None => Animation::default(),
        };

        info!("Loaded model with {} node(s)", nodes.len());
        Ok(LoadedModel {
            scene: reader.scene,
            roots,
            nodes,
            cameras,
            lights,
            animation,
        })
    }
}

/// Result of [`ModelDocument::load`]
#[derive(Debug)]
pub struct LoadedModel {
    pub scene: Scene,
    pub roots: Vec<NodeKey>,
    /// Keys in document order
    pub nodes: Vec<NodeKey>,
    pub cameras: Vec<NodeKey>,
    pub lights: Vec<NodeKey>,
    /// Keyframes retargeted to the new node ids
    pub animation: Animation,
}

struct ModelWriter<'a> {
    scene: &'a Scene,
    doc: ModelDocument,
    node_index: HashMap<NodeKey, usize>,
    materials: HashMap<MaterialKey, usize>,
    textures: HashMap<TextureKey, usize>,
}

impl<'a> ModelWriter<'a> {
    fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            doc: ModelDocument::default(),
            node_index: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    fn node(&mut self, key: NodeKey) -> Option<usize> {
        let scene = self.scene;
        let node = scene.node(key)?;
        let index = self.doc.nodes.len();
        self.node_index.insert(key, index);

        let mut def = NodeDef::from(node);
        match &node.kind {
            NodeKind::Transform => {}
            NodeKind::Mesh(mesh) => def.mesh = Some(self.mesh(mesh)),
            NodeKind::Camera(camera) => {
                def.camera = Some(self.doc.cameras.len());
                self.doc.cameras.push(CameraDef::from(camera));
            }
            NodeKind::Light(light) => {
                def.light = Some(self.doc.lights.len());
                self.doc.lights.push(LightDef::from(light));
            }
        }
        self.doc.nodes.push(def);

        let children = scene
            .children_of(key)
            .iter()
            .filter_map(|child| self.node(*child))
            .collect();
        self.doc.nodes[index].children = children;
        Some(index)
    }

    fn mesh(&mut self, mesh: &MeshData) -> usize {
        let mut attributes = BTreeMap::new();
        for (name, attribute) in mesh.geometry.attributes() {
            let buffer = self.doc.buffers.len();
            self.doc.buffers.push(BufferDef {
                data: attribute.data().to_f64_vec(),
            });
            self.doc.buffer_views.push(BufferViewDef {
                buffer,
                byte_offset: 0,
                byte_length: attribute.byte_length(),
                byte_stride: attribute.stride(),
            });
            self.doc.accessors.push(AccessorDef {
                buffer_view: self.doc.buffer_views.len() - 1,
                byte_offset: attribute.offset(),
                component_type: attribute.dtype().code(),
                count: attribute.count(),
                size: attribute.size(),
                normalized: attribute.normalize(),
            });
            attributes.insert(name.clone(), self.doc.accessors.len() - 1);
        }

        let def = MeshDef {
            attributes,
            material: mesh.active,
            basic_material: self.material(mesh.basic_material),
            phong_material: self.material(mesh.phong_material),
        };
        self.doc.meshes.push(def);
        self.doc.meshes.len() - 1
    }

    fn material(&mut self, key: MaterialKey) -> usize {
        if let Some(index) = self.materials.get(&key) {
            return *index;
        }
        let scene = self.scene;
        let def = match scene.materials.get(key) {
            Some(material) => MaterialDef::from_material(material, |texture| self.texture(texture)),
            None => {
                warn!("Mesh references a missing material, saving a white basic material");
                MaterialDef::Basic { color: WHITE }
            }
        };
        self.doc.materials.push(def);
        let index = self.doc.materials.len() - 1;
        self.materials.insert(key, index);
        index
    }

    fn texture(&mut self, key: TextureKey) -> usize {
        if let Some(index) = self.textures.get(&key) {
            return *index;
        }
        let def = self.scene.textures.get(key).map(TextureDef::from).unwrap_or_default();
        self.doc.textures.push(def);
        let index = self.doc.textures.len() - 1;
        self.textures.insert(key, index);
        index
    }
}

struct ModelReader<'a> {
    doc: &'a ModelDocument,
    scene: Scene,
    textures: Vec<TextureKey>,
    materials: Vec<Option<MaterialKey>>,
    fallback: Option<(MaterialKey, MaterialKey)>,
}

impl ModelReader<'_> {
    fn texture(&self, index: usize) -> Result<TextureKey> {
        self.textures
            .get(index)
            .copied()
            .ok_or_else(|| invalid(format!("texture {} out of range", index)))
    }

    fn kind(&mut self, index: usize, def: &NodeDef) -> Result<NodeKind> {
        let doc = self.doc;
        if let Some(mesh) = def.mesh {
            let mesh = doc
                .meshes
                .get(mesh)
                .ok_or_else(|| invalid(format!("node {} references missing mesh {}", index, mesh)))?;
            return Ok(NodeKind::Mesh(self.mesh(mesh)?));
        }
        if let Some(camera) = def.camera {
            let camera = doc
                .cameras
                .get(camera)
                .ok_or_else(|| invalid(format!("node {} references missing camera {}", index, camera)))?;
            match camera.to_camera() {
                Some(camera) => return Ok(NodeKind::Camera(camera)),
                None => warn!("Skipping camera of node {}: unsupported type '{}'", index, camera.kind),
            }
        }
        if let Some(light) = def.light {
            let light = doc
                .lights
                .get(light)
                .ok_or_else(|| invalid(format!("node {} references missing light {}", index, light)))?;
            match light.to_light() {
                Some(light) => return Ok(NodeKind::Light(light)),
                None => warn!("Skipping light of node {}: unsupported type '{}'", index, light.kind),
            }
        }
        Ok(NodeKind::Transform)
    }

    fn mesh(&mut self, def: &MeshDef) -> Result<MeshData> {
        let mut geometry = BufferGeometry::new();
        for (name, accessor) in &def.attributes {
            let attribute = self.attribute(*accessor)?;
            geometry.set_attribute(name, attribute);
        }

        let basic = self.material(def.basic_material, 0)?;
        let phong = self.material(def.phong_material, 1)?;
        Ok(MeshData::new(geometry, basic, phong).with_active(def.material))
    }

    /// Material `index`, or slot `fallback_slot` of a shared default pair
    /// when the material was skipped
    fn material(&mut self, index: usize, fallback_slot: usize) -> Result<MaterialKey> {
        match self.materials.get(index) {
            Some(Some(key)) => Ok(*key),
            Some(None) => {
                let (basic, phong) = *self
                    .fallback
                    .get_or_insert_with(|| self.scene.add_material_pair(WHITE));
                Ok(if fallback_slot == 0 { basic } else { phong })
            }
            None => Err(SceneError::ReferenceNotFound {
                kind: "material",
                index,
            }),
        }
    }

    fn attribute(&self, index: usize) -> Result<BufferAttribute> {
        let doc = self.doc;
        let accessor = doc
            .accessors
            .get(index)
            .ok_or_else(|| invalid(format!("accessor {} out of range", index)))?;
        let view = doc
            .buffer_views
            .get(accessor.buffer_view)
            .ok_or_else(|| invalid(format!("buffer view {} out of range", accessor.buffer_view)))?;
        let buffer = doc
            .buffers
            .get(view.buffer)
            .ok_or_else(|| invalid(format!("buffer {} out of range", view.buffer)))?;
        let dtype = DataType::from_code(accessor.component_type)
            .ok_or_else(|| invalid(format!("unknown component type {}", accessor.component_type)))?;

        let start = view.byte_offset / dtype.byte_size();
        let values = start
            .checked_add(view.byte_length / dtype.byte_size())
            .and_then(|end| buffer.data.get(start..end))
            .ok_or_else(|| invalid(format!("buffer view exceeds buffer {}", view.buffer)))?;

        build_attribute(
            dtype,
            values,
            accessor.size,
            accessor.normalized,
            view.byte_stride,
            accessor.byte_offset,
        )
    }
}
