//! # Animation
//!
//! Frame-based keyframe playback over the scene graph. An [`Animation`] is a
//! list of [`Frame`]s; each frame pins some transform channels of some nodes,
//! addressed by [`NodeId`](crate::gfx::scene::NodeId). The
//! [`AnimationController`] steps through the frames in real time, either
//! snapping from frame to frame or tweening with an [`Easing`] curve.

pub mod controller;
pub mod easing;
pub mod keyframe;

pub use controller::AnimationController;
pub use easing::Easing;
pub use keyframe::{Animation, Frame, Keyframe};
