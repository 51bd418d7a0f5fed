//! # Configuration
//!
//! Plain settings structs with sensible defaults and builder-style overrides.
//!
//! ```rust
//! use marionette::config::{AnimationSettings, EditorConfig};
//! use marionette::animation::Easing;
//!
//! let config = EditorConfig::default()
//!     .with_camera_radius(1200.0)
//!     .with_animation(AnimationSettings::default().with_fps(30.0).with_easing(Easing::Cubic));
//! assert_eq!(config.animation.fps, 30.0);
//! ```

use crate::{
    animation::easing::Easing,
    gfx::{
        camera::camera_utils::ProjectionType,
        rendering::shaders::{self, ShaderSources},
        resources::color::Color,
    },
};

/// Playback parameters of an [`AnimationController`](crate::animation::AnimationController)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    /// Timeline frames per second
    pub fps: f32,
    /// Multiplier applied on top of `fps`
    pub speed: f32,
    pub reverse: bool,
    pub looping: bool,
    /// `Easing::None` steps discretely between frames
    pub easing: Easing,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            fps: 24.0,
            speed: 0.6,
            reverse: false,
            looping: true,
            easing: Easing::None,
        }
    }
}

impl AnimationSettings {
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Settings of the [`RenderEngine`](crate::gfx::rendering::RenderEngine)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub clear_color: Color,
    /// Depth of the pixel-space projection used when no camera is given
    pub fallback_projection_depth: f32,
    /// Whether a pick target is kept and `pick` answers
    pub picking_enabled: bool,
    pub basic_shader: ShaderSources,
    pub phong_shader: ShaderSources,
    pub pick_shader: ShaderSources,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            fallback_projection_depth: 1000.0,
            picking_enabled: true,
            basic_shader: shaders::BASIC,
            phong_shader: shaders::PHONG,
            pick_shader: shaders::PICK,
        }
    }
}

impl RenderConfig {
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_fallback_projection_depth(mut self, depth: f32) -> Self {
        self.fallback_projection_depth = depth;
        self
    }

    pub fn with_picking(mut self, enabled: bool) -> Self {
        self.picking_enabled = enabled;
        self
    }

    /// Replaces the unlit program sources
    pub fn with_basic_shader(mut self, sources: ShaderSources) -> Self {
        self.basic_shader = sources;
        self
    }

    pub fn with_phong_shader(mut self, sources: ShaderSources) -> Self {
        self.phong_shader = sources;
        self
    }

    pub fn with_pick_shader(mut self, sources: ShaderSources) -> Self {
        self.pick_shader = sources;
        self
    }
}

/// Settings of an [`Editor`](crate::editor::Editor) session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub render: RenderConfig,
    pub animation: AnimationSettings,
    pub projection: ProjectionType,
    /// Distance of the camera from the orbit pivot
    pub camera_radius: f32,
    /// Radians of orbit per pixel of mouse drag
    pub orbit_sensitivity: f32,
    /// Radius change per wheel line
    pub zoom_speed: f32,
    /// Edge length of boxes created by `add_default`
    pub default_box_size: f32,
    pub default_color: Color,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            animation: AnimationSettings::default(),
            projection: ProjectionType::Orthographic,
            camera_radius: 850.0,
            orbit_sensitivity: 0.01,
            zoom_speed: 10.0,
            default_box_size: 150.0,
            default_color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

impl EditorConfig {
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_animation(mut self, animation: AnimationSettings) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_projection(mut self, projection: ProjectionType) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_camera_radius(mut self, radius: f32) -> Self {
        self.camera_radius = radius;
        self
    }

    pub fn with_orbit_sensitivity(mut self, sensitivity: f32) -> Self {
        self.orbit_sensitivity = sensitivity;
        self
    }

    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    pub fn with_default_box_size(mut self, size: f32) -> Self {
        self.default_box_size = size;
        self
    }

    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }
}
