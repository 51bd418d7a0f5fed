use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::rig::CameraRig;
use crate::gfx::scene::Scene;

/// Turns raw mouse input into orbit and zoom of a [`CameraRig`]
///
/// Dragging with the left button rotates the pivot: vertical motion pitches
/// (`rx -= dy * rotate_speed`), horizontal motion yaws (`ry -= dx * rotate_speed`).
/// The wheel moves the camera along the pivot's Z. `R` resets the rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_radius: f32,
    is_mouse_pressed: bool,
}

impl OrbitController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            min_radius: 0.0,
            is_mouse_pressed: false,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed
    }

    /// Applies one device event. Returns whether the rig moved.
    pub fn process_events(&mut self, event: &DeviceEvent, rig: &CameraRig, scene: &mut Scene) -> bool {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => *scroll as f32,
                };
                self.zoom(rig, scene, scroll_amount);
                true
            }
            DeviceEvent::MouseMotion { delta } => {
                if !self.is_mouse_pressed {
                    return false;
                }
                self.drag(rig, scene, delta.0 as f32, delta.1 as f32);
                true
            }
            _ => false,
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, rig: &CameraRig, scene: &mut Scene) -> bool {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyR),
                state: ElementState::Pressed,
                ..
            } => {
                rig.reset(scene);
                true
            }
            _ => false,
        }
    }

    /// Orbits by a pointer drag of `(dx, dy)` pixels
    pub fn drag(&self, rig: &CameraRig, scene: &mut Scene, dx: f32, dy: f32) {
        rig.rotate(scene, -dy * self.rotate_speed, -dx * self.rotate_speed);
    }

    /// Moves the camera `amount` wheel steps away from the pivot
    pub fn zoom(&self, rig: &CameraRig, scene: &mut Scene, amount: f32) {
        let radius = (rig.radius(scene) + amount * self.zoom_speed).max(self.min_radius);
        rig.set_radius(scene, radius);
    }
}
