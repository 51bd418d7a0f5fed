use crate::gfx::{math::Vec3, scene::NodeId};

/// Transform channels pinned for one node at one frame
///
/// A `None` channel is not animated at this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub node_id: NodeId,
    pub translation: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<Vec3>,
}

impl Keyframe {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            translation: None,
            rotation: None,
            scale: None,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub keyframes: Vec<Keyframe>,
}

impl Frame {
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    /// First keyframe targeting `node_id`
    pub fn keyframe_for(&self, node_id: NodeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|keyframe| keyframe.node_id == node_id)
    }
}

/// Ordered list of frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
