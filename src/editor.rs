//! # Editor Session
//!
//! [`Editor`] ties the pieces together the way the editor front-end drives
//! them: one scene, one renderer, one animation controller, an orbit camera
//! rig, an active light and a selected node. The host calls [`Editor::tick`]
//! once per frame and forwards window and device events.

use std::{fs, path::Path};

use anyhow::Context;
use log::{debug, info, warn};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
};

use crate::{
    animation::{Animation, AnimationController},
    config::EditorConfig,
    document::{animation_from_json, animation_to_json, subtrees_from_json, subtrees_to_json, MeshSubtree, ModelDocument},
    error::Result,
    gfx::{
        camera::{OrbitController, CameraRig, ProjectionType},
        geometry::primitives::box_geometry,
        math::Vec3,
        picking,
        rendering::{render_engine::RenderStats, Rasterizer, RenderEngine},
        resources::material::MaterialKind,
        scene::{Light, MaterialKey, MeshData, NodeKey, NodeKind, Scene},
    },
};

pub const ROOT_NAME: &str = "root";
pub const LIGHT_NAME: &str = "light";
pub const DEFAULT_MESH_NAME: &str = "box";

pub struct Editor<R: Rasterizer> {
    config: EditorConfig,
    scene: Scene,
    engine: RenderEngine<R>,
    animator: AnimationController,
    rig: CameraRig,
    orbit: OrbitController,
    root: NodeKey,
    light: NodeKey,
    selected: NodeKey,
    default_materials: (MaterialKey, MaterialKey),
    cursor: Option<PhysicalPosition<f64>>,
}

impl<R: Rasterizer> Editor<R> {
    /// Starts an empty session drawing through `rasterizer`
    ///
    /// Fails when the built-in programs do not compile or link.
    pub fn new(rasterizer: R, config: EditorConfig) -> Result<Self> {
        let engine = RenderEngine::new(rasterizer, config.render)?;
        let mut scene = Scene::new();
        let root = scene.create_node(ROOT_NAME, NodeKind::Transform);
        let default_materials = scene.add_material_pair(config.default_color);
        let rig = CameraRig::build(&mut scene, config.projection, viewport(&engine), config.camera_radius);
        let light = default_light(&mut scene);

        info!("Editor session started ({} camera)", config.projection);
        Ok(Self {
            animator: AnimationController::new(Animation::default(), config.animation),
            orbit: OrbitController::new(config.orbit_sensitivity, config.zoom_speed),
            config,
            scene,
            engine,
            rig,
            root,
            light,
            selected: root,
            default_materials,
            cursor: None,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn engine(&self) -> &RenderEngine<R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RenderEngine<R> {
        &mut self.engine
    }

    pub fn animator(&self) -> &AnimationController {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut AnimationController {
        &mut self.animator
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Top of the edited model
    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn light(&self) -> NodeKey {
        self.light
    }

    pub fn selected(&self) -> NodeKey {
        self.selected
    }

    /// Selects `key` if it exists
    pub fn select(&mut self, key: NodeKey) -> bool {
        if !self.scene.contains(key) {
            return false;
        }
        self.selected = key;
        true
    }

    /// One frame: advance the animation, then draw
    pub fn tick(&mut self, seconds: f32) -> RenderStats {
        self.animator.update(seconds, &mut self.scene);
        self.render()
    }

    pub fn render(&mut self) -> RenderStats {
        self.engine
            .render(&mut self.scene, Some(self.rig.camera()), Some(self.light))
    }

    /// Selects the mesh under a physical window position. Returns the hit.
    pub fn pointer_down(&mut self, position: PhysicalPosition<f64>) -> Option<NodeKey> {
        let size = self.engine.rasterizer().drawing_buffer_size();
        let (x, y) = picking::physical_to_framebuffer(position, size)?;
        let hit = self.engine.pick(&mut self.scene, Some(self.rig.camera()), x, y)?;
        self.selected = hit;
        Some(hit)
    }

    /// Adapts the camera to a new drawing-buffer size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.rig.resize(&mut self.scene, width as f32, height as f32);
    }

    /// Handles resize and click events. Returns whether a redraw is needed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(*position);
                false
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => match self.cursor {
                Some(position) => self.pointer_down(position).is_some(),
                None => false,
            },
            _ => false,
        }
    }

    /// Orbit and zoom from raw mouse input
    pub fn handle_device_event(&mut self, event: &DeviceEvent) -> bool {
        self.orbit.process_events(event, &self.rig, &mut self.scene)
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        self.orbit.process_keyed_events(event, &self.rig, &mut self.scene)
    }

    /// Adds a default box below the selection and selects it
    pub fn add_default(&mut self) -> NodeKey {
        let size = self.config.default_box_size;
        let (basic, phong) = self.default_materials;
        let name = self.scene.ensure_unique_name(DEFAULT_MESH_NAME);
        let mesh = MeshData::new(box_geometry(size, size, size), basic, phong);
        let key = self.scene.add_mesh(&name, mesh, Some(self.selected));
        debug!("Added '{}'", name);
        self.selected = key;
        key
    }

    /// Removes the selected subtree and selects the root
    ///
    /// The root itself, and anything holding the camera or the light, is
    /// kept. Returns the number of nodes removed.
    pub fn delete_selected(&mut self) -> usize {
        let key = self.selected;
        let protected = key == self.root
            || self.scene.is_ancestor(key, self.rig.camera())
            || self.scene.is_ancestor(key, self.light);
        if protected {
            warn!("Refusing to delete the root, the camera or the light");
            return 0;
        }
        let removed = self.scene.remove_node(key);
        self.selected = self.root;
        removed
    }

    /// Switches which of its two materials the selected mesh draws with
    pub fn set_material_kind(&mut self, kind: MaterialKind) -> bool {
        match self.scene.node_mut(self.selected).and_then(|node| node.as_mesh_mut()) {
            Some(mesh) => {
                mesh.active = kind;
                true
            }
            None => false,
        }
    }

    pub fn switch_projection(&mut self, projection: ProjectionType) {
        let size = viewport(&self.engine);
        self.rig.switch_projection(&mut self.scene, projection, size);
    }

    /// Replaces the active light's parameters
    pub fn set_light(&mut self, light: Light) {
        if let Some(current) = self.scene.node_mut(self.light).and_then(|node| node.as_light_mut()) {
            *current = light;
        }
    }

    /// The model, camera, light and animation as a model document
    pub fn save_json(&self) -> Result<String> {
        ModelDocument::save(
            &self.scene,
            &[self.root],
            &[self.rig.camera(), self.light],
            Some(self.animator.animation()),
        )
        .to_json()
    }

    /// Replaces the session with a saved model
    ///
    /// On error the current session is left as it was.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let loaded = ModelDocument::from_json(json)?.load()?;
        let mut scene = loaded.scene;

        let root = match loaded.roots.first() {
            Some(root) => *root,
            None => scene.create_node(ROOT_NAME, NodeKind::Transform),
        };
        let rig = loaded
            .cameras
            .first()
            .and_then(|camera| CameraRig::around(&mut scene, *camera, self.config.camera_radius))
            .unwrap_or_else(|| {
                CameraRig::build(
                    &mut scene,
                    self.config.projection,
                    viewport(&self.engine),
                    self.config.camera_radius,
                )
            });
        let light = match loaded.lights.first() {
            Some(light) => *light,
            None => default_light(&mut scene),
        };

        self.default_materials = scene.add_material_pair(self.config.default_color);
        self.scene = scene;
        self.root = root;
        self.rig = rig;
        self.light = light;
        self.selected = root;
        self.animator.stop();
        self.animator.set_animation(loaded.animation);
        info!("Loaded model into the editor");
        Ok(())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = self.save_json().context("Failed to serialize the model")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved model to {}", path.display());
        Ok(())
    }

    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.load_json(&json)
            .with_context(|| format!("Failed to load model from {}", path.display()))
    }

    pub fn save_animation_json(&self) -> Result<String> {
        animation_to_json(self.animator.animation())
    }

    /// Replaces the timeline; keyframes address nodes by id
    pub fn load_animation_json(&mut self, json: &str) -> Result<()> {
        let animation = animation_from_json(json)?;
        self.animator.set_animation(animation);
        Ok(())
    }

    /// The selected mesh and its mesh descendants, or `None` when the
    /// selection is not a mesh
    pub fn export_subtree(&self) -> Result<Option<String>> {
        match MeshSubtree::export(&self.scene, self.selected) {
            Some(subtree) => subtrees_to_json(&[subtree]).map(Some),
            None => Ok(None),
        }
    }

    /// Pastes exported subtrees below the selection
    ///
    /// Nothing is added unless every subtree is valid.
    pub fn import_subtree(&mut self, json: &str) -> Result<Vec<NodeKey>> {
        let subtrees = subtrees_from_json(json)?;
        subtrees.iter().try_for_each(MeshSubtree::validate)?;
        subtrees
            .iter()
            .map(|subtree| subtree.import(&mut self.scene, Some(self.selected)))
            .collect()
    }

    /// Loads an OBJ file below the selection using the default materials
    pub fn import_obj(&mut self, path: impl AsRef<Path>) -> anyhow::Result<Vec<NodeKey>> {
        self.scene
            .import_obj(path, Some(self.selected), self.default_materials)
    }
}

fn viewport<R: Rasterizer>(engine: &RenderEngine<R>) -> (f32, f32) {
    let (width, height) = engine.rasterizer().drawing_buffer_size();
    (width as f32, height as f32)
}

fn default_light(scene: &mut Scene) -> NodeKey {
    let light = scene.create_node(LIGHT_NAME, NodeKind::Light(Light::directional()));
    scene.set_translation(light, Vec3::new(0.0, 0.0, 1.0));
    light
}
