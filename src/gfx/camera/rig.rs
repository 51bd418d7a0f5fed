//! Editor camera rig
//!
//! An "origin" pivot node with the active camera as its only child, pushed
//! out along the pivot's local +Z by the orbit radius. Orbiting rotates the
//! pivot; zooming moves the camera along Z.

use log::debug;

use super::camera_utils::{Camera, ProjectionType};
use crate::gfx::{
    math::Vec3,
    scene::{NodeKey, NodeKind, Scene},
};

pub const PIVOT_NAME: &str = "origin";
pub const CAMERA_NAME: &str = "camera";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pivot: NodeKey,
    camera: NodeKey,
    default_radius: f32,
}

impl CameraRig {
    /// Adds a pivot and a `projection` camera sized to `viewport` to `scene`
    pub fn build(scene: &mut Scene, projection: ProjectionType, viewport: (f32, f32), radius: f32) -> Self {
        let pivot = scene.create_node(PIVOT_NAME, NodeKind::Transform);
        let camera = Camera::for_viewport(projection, viewport.0, viewport.1);
        Self::adopt(scene, pivot, camera, radius)
    }

    /// Wraps an existing camera in a fresh pivot, keeping its distance as radius
    pub fn around(scene: &mut Scene, camera: NodeKey, default_radius: f32) -> Option<Self> {
        scene.node(camera)?.as_camera()?;
        let pivot = scene.create_node(PIVOT_NAME, NodeKind::Transform);
        scene.add_child(pivot, camera);
        Some(Self {
            pivot,
            camera,
            default_radius,
        })
    }

    fn adopt(scene: &mut Scene, pivot: NodeKey, camera: Camera, radius: f32) -> Self {
        let camera = scene.add_node(CAMERA_NAME, NodeKind::Camera(camera), Some(pivot));
        scene.set_translation(camera, Vec3::new(0.0, 0.0, radius));
        Self {
            pivot,
            camera,
            default_radius: radius,
        }
    }

    pub fn pivot(&self) -> NodeKey {
        self.pivot
    }

    pub fn camera(&self) -> NodeKey {
        self.camera
    }

    pub fn projection_type(&self, scene: &Scene) -> Option<ProjectionType> {
        scene
            .node(self.camera)
            .and_then(|node| node.as_camera())
            .map(Camera::projection_type)
    }

    /// Replaces the camera node with a new `projection` camera at the same radius
    pub fn switch_projection(&mut self, scene: &mut Scene, projection: ProjectionType, viewport: (f32, f32)) {
        self.replace_camera(scene, Camera::for_viewport(projection, viewport.0, viewport.1));
        debug!("Switched editor camera to {}", projection);
    }

    /// Swaps in `camera`, destroying the previous camera node
    pub fn replace_camera(&mut self, scene: &mut Scene, camera: Camera) {
        let radius = self.radius(scene);
        scene.remove_node(self.camera);
        let rig = Self::adopt(scene, self.pivot, camera, radius);
        self.camera = rig.camera;
    }

    /// Distance of the camera from the pivot
    pub fn radius(&self, scene: &Scene) -> f32 {
        scene
            .node(self.camera)
            .map_or(self.default_radius, |node| node.translation().z)
    }

    pub fn set_radius(&self, scene: &mut Scene, radius: f32) {
        let translation = scene
            .node(self.camera)
            .map_or(Vec3::new(0.0, 0.0, 0.0), |node| node.translation());
        scene.set_translation(self.camera, Vec3::new(translation.x, translation.y, radius));
    }

    /// Adds to the pivot's X (pitch) and Y (yaw) rotation, in radians
    pub fn rotate(&self, scene: &mut Scene, pitch: f32, yaw: f32) {
        let Some(rotation) = scene.node(self.pivot).map(|node| node.rotation()) else {
            return;
        };
        scene.set_rotation(self.pivot, Vec3::new(rotation.x + pitch, rotation.y + yaw, rotation.z));
    }

    /// Restores the default radius and clears the pivot's pitch and yaw
    pub fn reset(&self, scene: &mut Scene) {
        self.set_radius(scene, self.default_radius);
        if let Some(rotation) = scene.node(self.pivot).map(|node| node.rotation()) {
            scene.set_rotation(self.pivot, Vec3::new(0.0, 0.0, rotation.z));
        }
    }

    /// Adapts the camera frustum to a new drawing-buffer size
    pub fn resize(&self, scene: &mut Scene, width: f32, height: f32) {
        if let Some(camera) = scene.node_mut(self.camera).and_then(|node| node.as_camera_mut()) {
            camera.resize(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::assert_mat_close;

    #[test]
    fn test_build_places_camera_at_radius() {
        let mut scene = Scene::new();
        let rig = CameraRig::build(&mut scene, ProjectionType::Orthographic, (800.0, 600.0), 850.0);
        assert_eq!(scene.parent_of(rig.camera()), Some(rig.pivot()));
        assert_eq!(rig.radius(&scene), 850.0);
        assert_eq!(
            scene.node(rig.camera()).unwrap().world_position(),
            Vec3::new(0.0, 0.0, 850.0)
        );
    }

    #[test]
    fn test_switch_projection_replaces_camera() {
        let mut scene = Scene::new();
        let mut rig = CameraRig::build(&mut scene, ProjectionType::Orthographic, (800.0, 600.0), 850.0);
        rig.set_radius(&mut scene, 1200.0);
        let old = rig.camera();

        rig.switch_projection(&mut scene, ProjectionType::Perspective, (800.0, 600.0));
        assert!(!scene.contains(old));
        assert_eq!(scene.children_of(rig.pivot()), &[rig.camera()]);
        assert_eq!(rig.projection_type(&scene), Some(ProjectionType::Perspective));
        assert_eq!(rig.radius(&scene), 1200.0);
    }

    #[test]
    fn test_rotate_and_reset() {
        let mut scene = Scene::new();
        let rig = CameraRig::build(&mut scene, ProjectionType::Oblique, (800.0, 600.0), 850.0);
        rig.rotate(&mut scene, 0.5, -0.25);
        rig.set_radius(&mut scene, 100.0);
        assert_eq!(scene.node(rig.pivot()).unwrap().rotation(), Vec3::new(0.5, -0.25, 0.0));

        rig.reset(&mut scene);
        assert_eq!(scene.node(rig.pivot()).unwrap().rotation(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(rig.radius(&scene), 850.0);
        let expected = crate::gfx::math::translation(Vec3::new(0.0, 0.0, 850.0));
        assert_mat_close(scene.node(rig.camera()).unwrap().world_matrix(), &expected);
    }

    #[test]
    fn test_around_existing_camera() {
        let mut scene = Scene::new();
        let camera = scene.create_node(
            "loaded",
            NodeKind::Camera(Camera::for_viewport(ProjectionType::Perspective, 4.0, 3.0)),
        );
        scene.set_translation(camera, Vec3::new(0.0, 0.0, 300.0));
        let rig = CameraRig::around(&mut scene, camera, 850.0).unwrap();
        assert_eq!(rig.radius(&scene), 300.0);
        assert_eq!(scene.parent_of(camera), Some(rig.pivot()));

        let plain = scene.create_node("plain", NodeKind::Transform);
        assert!(CameraRig::around(&mut scene, plain, 850.0).is_none());
    }
}
