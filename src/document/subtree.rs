//! Mesh subtree copy/paste
//!
//! A self-contained nested shape: each entry carries its transform, inlined
//! vertex data and inlined materials, so it can be pasted into any scene.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::defs::{invalid, one3, to_array, to_vec3, zero3, AttributeDef, MaterialDef, TextureDef};
use crate::{
    error::Result,
    gfx::{
        geometry::buffer_geometry::BufferGeometry,
        resources::{color::WHITE, material::MaterialKind},
        scene::{MaterialKey, MeshData, NodeKey, NodeKind, Scene},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSubtree {
    pub name: String,
    #[serde(default = "zero3")]
    pub translation: [f32; 3],
    #[serde(default = "zero3")]
    pub rotation: [f32; 3],
    #[serde(default = "one3")]
    pub scale: [f32; 3],
    pub attributes: BTreeMap<String, AttributeDef>,
    pub material: MaterialKind,
    pub basic_material: MaterialDef<TextureDef>,
    pub phong_material: MaterialDef<TextureDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MeshSubtree>,
}

impl MeshSubtree {
    /// Captures the mesh at `key` with its mesh descendants
    ///
    /// Returns `None` when `key` is not a mesh. Non-mesh children are left out.
    pub fn export(scene: &Scene, key: NodeKey) -> Option<Self> {
        let node = scene.node(key)?;
        let mesh = node.as_mesh()?;

        let material = |key: MaterialKey| match scene.materials.get(key) {
            Some(material) => MaterialDef::from_material(material, |texture| {
                scene.textures.get(texture).map(TextureDef::from).unwrap_or_default()
            }),
            None => MaterialDef::Basic { color: WHITE },
        };

        let children = scene
            .children_of(key)
            .iter()
            .filter_map(|child| {
                let subtree = Self::export(scene, *child);
                if subtree.is_none() {
                    debug!("Leaving non-mesh child out of the exported subtree");
                }
                subtree
            })
            .collect();

        Some(MeshSubtree {
            name: node.name.clone(),
            translation: to_array(node.translation()),
            rotation: to_array(node.rotation()),
            scale: to_array(node.scale()),
            attributes: mesh
                .geometry
                .attributes()
                .iter()
                .map(|(name, attribute)| (name.clone(), AttributeDef::from(attribute)))
                .collect(),
            material: mesh.active,
            basic_material: material(mesh.basic_material),
            phong_material: material(mesh.phong_material),
            children,
        })
    }

    /// Checks every entry can be rebuilt, without touching any scene
    pub fn validate(&self) -> Result<()> {
        for (name, attribute) in &self.attributes {
            attribute.to_attribute().map_err(|err| {
                invalid(format!("attribute '{}' of '{}': {}", name, self.name, err))
            })?;
        }
        self.children.iter().try_for_each(MeshSubtree::validate)
    }

    /// Rebuilds the subtree below `parent` with fresh materials and textures.
    /// Returns the new top node.
    ///
    /// The scene is untouched when the subtree fails validation.
    pub fn import(&self, scene: &mut Scene, parent: Option<NodeKey>) -> Result<NodeKey> {
        self.validate()?;
        self.build(scene, parent)
    }

    fn build(&self, scene: &mut Scene, parent: Option<NodeKey>) -> Result<NodeKey> {
        let mut geometry = BufferGeometry::new();
        for (name, attribute) in &self.attributes {
            geometry.set_attribute(name, attribute.to_attribute()?);
        }

        let basic = material_key(scene, &self.basic_material, MaterialKind::Basic)?;
        let phong = material_key(scene, &self.phong_material, MaterialKind::Phong)?;
        let mesh = MeshData::new(geometry, basic, phong).with_active(self.material);

        let key = scene.add_node(&self.name, NodeKind::Mesh(mesh), parent);
        scene.set_transform(
            key,
            Some(to_vec3(self.translation)),
            Some(to_vec3(self.rotation)),
            Some(to_vec3(self.scale)),
        );
        for child in &self.children {
            child.build(scene, Some(key))?;
        }
        Ok(key)
    }
}

/// Adds the material described by `def`, or a white default of `fallback`
/// kind when its type is unsupported
fn material_key(scene: &mut Scene, def: &MaterialDef<TextureDef>, fallback: MaterialKind) -> Result<MaterialKey> {
    let material = def.to_material(|texture| Ok(scene.add_texture(texture.to_texture())))?;
    let key = match material {
        Some(material) => scene.add_material(material),
        None => {
            warn!("Replacing unsupported material with a white {} material", fallback);
            let (basic, phong) = scene.add_material_pair(WHITE);
            match fallback {
                MaterialKind::Basic => basic,
                MaterialKind::Phong => phong,
            }
        }
    };
    Ok(key)
}

pub fn subtrees_to_json(subtrees: &[MeshSubtree]) -> Result<String> {
    Ok(serde_json::to_string_pretty(subtrees)?)
}

pub fn subtrees_from_json(json: &str) -> Result<Vec<MeshSubtree>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SceneError,
        gfx::{
            geometry::primitives::{box_geometry, sphere_geometry},
            math::Vec3,
            resources::material::Material,
        },
    };

    fn puppet() -> (Scene, NodeKey) {
        let mut scene = Scene::new();
        let (basic, phong) = scene.add_material_pair([0.0, 1.0, 0.0, 1.0]);
        let torso = scene.add_mesh("torso", MeshData::new(box_geometry(2.0, 4.0, 1.0), basic, phong), None);
        let head = scene.add_mesh("head", MeshData::new(sphere_geometry(1.0, 8, 6), basic, phong), Some(torso));
        scene.set_transform(head, Some(Vec3::new(0.0, 3.0, 0.0)), None, Some(Vec3::new(0.5, 0.5, 0.5)));
        scene.add_node("socket", NodeKind::Transform, Some(torso));
        (scene, torso)
    }

    #[test]
    fn test_export_skips_non_mesh_children() {
        let (scene, torso) = puppet();
        let subtree = MeshSubtree::export(&scene, torso).unwrap();
        assert_eq!(subtree.name, "torso");
        assert_eq!(subtree.children.len(), 1);
        assert_eq!(subtree.children[0].name, "head");
        assert_eq!(subtree.children[0].scale, [0.5, 0.5, 0.5]);
        assert!(matches!(subtree.phong_material, MaterialDef::Phong(_)));

        let socket = scene.children_of(torso)[1];
        assert!(MeshSubtree::export(&scene, socket).is_none());
    }

    #[test]
    fn test_paste_into_other_scene() {
        let (scene, torso) = puppet();
        let json = subtrees_to_json(&[MeshSubtree::export(&scene, torso).unwrap()]).unwrap();

        let mut target = Scene::new();
        let stage = target.create_node("stage", NodeKind::Transform);
        target.set_translation(stage, Vec3::new(10.0, 0.0, 0.0));

        let subtrees = subtrees_from_json(&json).unwrap();
        let pasted = subtrees[0].import(&mut target, Some(stage)).unwrap();
        assert_eq!(target.parent_of(pasted), Some(stage));

        let head = target.children_of(pasted)[0];
        assert_eq!(target.node(head).unwrap().world_position(), Vec3::new(10.0, 3.0, 0.0));

        let original = scene.node(torso).unwrap().as_mesh().unwrap();
        let copy = target.node(pasted).unwrap().as_mesh().unwrap();
        assert_eq!(original.geometry.attributes(), copy.geometry.attributes());
        assert_eq!(target.materials[copy.basic_material], Material::basic([0.0, 1.0, 0.0, 1.0]));
        // every pasted node owns its materials and phong maps
        assert_eq!(target.materials.len(), 4);
        assert_eq!(target.textures.len(), 8);
        assert!(target.node(pasted).unwrap().as_mesh().unwrap().pick_id() > 0);
    }

    #[test]
    fn test_invalid_subtree_leaves_scene_untouched() {
        let (scene, torso) = puppet();
        let mut subtree = MeshSubtree::export(&scene, torso).unwrap();
        if let Some(attribute) = subtree.children[0].attributes.values_mut().next() {
            attribute.component_type = 42;
        }

        let mut target = Scene::new();
        assert!(matches!(
            subtree.import(&mut target, None),
            Err(SceneError::InvalidDocument(_))
        ));
        assert!(target.is_empty());
        assert!(target.materials.is_empty());
    }

    #[test]
    fn test_subtree_with_bad_layout_is_rejected() {
        let (scene, torso) = puppet();
        let exported = MeshSubtree::export(&scene, torso).unwrap();
        let edits: [fn(&mut AttributeDef); 3] = [
            |attribute| attribute.byte_offset = usize::MAX,
            |attribute| attribute.size = 0,
            |attribute| attribute.byte_stride = 1,
        ];
        for edit in edits {
            let mut subtree = exported.clone();
            if let Some(attribute) = subtree.attributes.values_mut().next() {
                edit(attribute);
            }
            let mut target = Scene::new();
            assert!(matches!(
                subtree.import(&mut target, None),
                Err(SceneError::InvalidDocument(_))
            ));
            assert!(target.is_empty());
        }
    }
}
