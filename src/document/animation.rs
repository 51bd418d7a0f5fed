//! Animation file: `{ frames: [ { keyframes: [ { nodeId, translation?, rotation?, scale? } ] } ] }`

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    animation::{Animation, Frame, Keyframe},
    error::Result,
    gfx::{math::Vec3, scene::NodeId},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Xyz {
    fn from(v: Vec3) -> Self {
        Xyz { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Xyz> for Vec3 {
    fn from(v: Xyz) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeDef {
    pub node_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Xyz>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Xyz>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Xyz>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDef {
    #[serde(default)]
    pub keyframes: Vec<KeyframeDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    #[serde(default)]
    pub frames: Vec<FrameDef>,
}

impl AnimationDef {
    /// Converts `animation`, writing each keyframe's target through `target`
    ///
    /// Keyframes whose node has no mapping are dropped.
    pub fn from_animation(animation: &Animation, mut target: impl FnMut(NodeId) -> Option<u32>) -> Self {
        let frames = animation
            .frames
            .iter()
            .map(|frame| FrameDef {
                keyframes: frame
                    .keyframes
                    .iter()
                    .filter_map(|keyframe| {
                        let Some(node_id) = target(keyframe.node_id) else {
                            warn!("Dropping keyframe for unsaved node {}", keyframe.node_id);
                            return None;
                        };
                        Some(KeyframeDef {
                            node_id,
                            translation: keyframe.translation.map(Xyz::from),
                            rotation: keyframe.rotation.map(Xyz::from),
                            scale: keyframe.scale.map(Xyz::from),
                        })
                    })
                    .collect(),
            })
            .collect();
        AnimationDef { frames }
    }

    /// Rebuilds the animation, resolving each `nodeId` through `target`
    pub fn to_animation(&self, mut target: impl FnMut(u32) -> Option<NodeId>) -> Animation {
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                Frame::new(
                    frame
                        .keyframes
                        .iter()
                        .filter_map(|def| {
                            let Some(node_id) = target(def.node_id) else {
                                warn!("Dropping keyframe for unknown node {}", def.node_id);
                                return None;
                            };
                            Some(Keyframe {
                                node_id,
                                translation: def.translation.map(Vec3::from),
                                rotation: def.rotation.map(Vec3::from),
                                scale: def.scale.map(Vec3::from),
                            })
                        })
                        .collect(),
                )
            })
            .collect();
        Animation::new(frames)
    }
}

/// Serializes an animation addressing nodes by their [`NodeId`]
pub fn animation_to_json(animation: &Animation) -> Result<String> {
    let def = AnimationDef::from_animation(animation, |id| Some(id.0));
    Ok(serde_json::to_string_pretty(&def)?)
}

pub fn animation_from_json(json: &str) -> Result<Animation> {
    let def: AnimationDef = serde_json::from_str(json)?;
    Ok(def.to_animation(|id| Some(NodeId(id))))
}
