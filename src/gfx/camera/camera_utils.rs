//! Projection cameras
//!
//! A camera is a node role: its view comes from the node's world matrix, its
//! projection from the frustum parameters held here.

use std::{fmt, str::FromStr};

use crate::gfx::math::{self, M4};

/// Default near/far distances used by editor cameras
pub const DEFAULT_NEAR: f32 = 1.0;
pub const DEFAULT_FAR: f32 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraKind {
    Orthographic {
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Oblique {
        width: f32,
        height: f32,
        near: f32,
        far: f32,
        /// Shear angles in radians; `π/2` degenerates to orthographic
        angle_x: f32,
        angle_y: f32,
    },
}

/// Discriminant of [`CameraKind`], as named in documents and the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionType {
    Orthographic,
    Perspective,
    Oblique,
}

impl ProjectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectionType::Orthographic => "orthographic",
            ProjectionType::Perspective => "perspective",
            ProjectionType::Oblique => "oblique",
        }
    }
}

impl fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orthographic" => Ok(ProjectionType::Orthographic),
            "perspective" => Ok(ProjectionType::Perspective),
            "oblique" => Ok(ProjectionType::Oblique),
            other => Err(format!("unknown projection type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub kind: CameraKind,
}

impl Camera {
    pub fn new(kind: CameraKind) -> Self {
        Self { kind }
    }

    /// Editor default for `projection` on a `width` × `height` drawing buffer
    ///
    /// Perspective uses a 60° vertical field of view, oblique a 50° shear.
    pub fn for_viewport(projection: ProjectionType, width: f32, height: f32) -> Self {
        let (near, far) = (DEFAULT_NEAR, DEFAULT_FAR);
        let kind = match projection {
            ProjectionType::Orthographic => CameraKind::Orthographic {
                width,
                height,
                near,
                far,
            },
            ProjectionType::Perspective => CameraKind::Perspective {
                fov_y: math::deg_to_rad(60.0),
                aspect: if height > 0.0 { width / height } else { 1.0 },
                near,
                far,
            },
            ProjectionType::Oblique => CameraKind::Oblique {
                width,
                height,
                near,
                far,
                angle_x: math::deg_to_rad(50.0),
                angle_y: math::deg_to_rad(50.0),
            },
        };
        Self::new(kind)
    }

    pub fn projection_type(&self) -> ProjectionType {
        match self.kind {
            CameraKind::Orthographic { .. } => ProjectionType::Orthographic,
            CameraKind::Perspective { .. } => ProjectionType::Perspective,
            CameraKind::Oblique { .. } => ProjectionType::Oblique,
        }
    }

    pub fn projection_matrix(&self) -> M4 {
        match self.kind {
            CameraKind::Orthographic {
                width,
                height,
                near,
                far,
            } => math::orthographic(width, height, near, far),
            CameraKind::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => math::perspective(fov_y, aspect, near, far),
            CameraKind::Oblique {
                width,
                height,
                near,
                far,
                angle_x,
                angle_y,
            } => math::oblique(width, height, near, far, angle_x, angle_y),
        }
    }

    /// `projection * inverse(world)` for a camera whose node has world matrix `world`
    pub fn view_projection(&self, world: &M4) -> M4 {
        self.projection_matrix() * math::inverse(world)
    }

    /// Adapts the frustum to a new drawing-buffer size
    pub fn resize(&mut self, new_width: f32, new_height: f32) {
        match &mut self.kind {
            CameraKind::Orthographic { width, height, .. }
            | CameraKind::Oblique { width, height, .. } => {
                *width = new_width;
                *height = new_height;
            }
            CameraKind::Perspective { aspect, .. } => {
                if new_height > 0.0 {
                    *aspect = new_width / new_height;
                }
            }
        }
    }
}
