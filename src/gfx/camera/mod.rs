pub mod camera_controller;
pub mod camera_utils;
pub mod rig;

// Re-export main types
pub use camera_controller::OrbitController;
pub use camera_utils::{Camera, CameraKind, ProjectionType};
pub use rig::CameraRig;
