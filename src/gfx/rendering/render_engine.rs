//! Rasterizer-backed rendering engine
//!
//! Draws a [`Scene`] through the three built-in programs (basic, Phong and
//! pick) and answers pick queries by reading back the offscreen pick target.

use std::collections::HashSet;

use log::{debug, info, warn};

use super::{
    program::ProgramInfo,
    rasterizer::{BufferHandle, ProgramHandle, Rasterizer, RenderTargetHandle, TextureHandle},
    shaders::ShaderSources,
};
use crate::{
    config::RenderConfig,
    error::Result,
    gfx::{
        math::{self, M4},
        picking::{self, NO_PICK},
        resources::{material::MaterialKind, uniforms::{UniformBag, UniformValue}},
        scene::{NodeKey, Scene},
    },
};

/// Which output a traversal produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Shaded colour into the default framebuffer
    Color,
    /// Pick ids into the offscreen pick target
    Pick,
}

/// Work done by one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: usize,
    pub program_switches: usize,
    pub attribute_binds: usize,
}

/// Per-pass values shared by every mesh
struct PassContext {
    view_projection: M4,
    view_world_position: [f32; 3],
    light: Option<UniformBag>,
}

/// Core rendering engine
///
/// Owns the rasterizer, the linked programs and the pick target. The
/// traversal switches programs and rebinds vertex attributes only when the
/// program or the geometry differs from the previous draw.
///
/// An engine draws one scene at a time: after each pass it deletes the GPU
/// buffers and textures that no attribute or texture of that scene owns
/// any more.
pub struct RenderEngine<R: Rasterizer> {
    rasterizer: R,
    config: RenderConfig,
    basic: ProgramInfo,
    phong: ProgramInfo,
    pick: ProgramInfo,
    pick_target: Option<(RenderTargetHandle, (u32, u32))>,
    resident_buffers: HashSet<BufferHandle>,
    resident_textures: HashSet<TextureHandle>,
}

impl<R: Rasterizer> RenderEngine<R> {
    /// Compiles and links the configured programs
    ///
    /// Any compile or link failure aborts setup with the backend's diagnostic.
    pub fn new(mut rasterizer: R, config: RenderConfig) -> Result<Self> {
        let basic = Self::create_program(&mut rasterizer, config.basic_shader)?;
        let phong = Self::create_program(&mut rasterizer, config.phong_shader)?;
        let pick = Self::create_program(&mut rasterizer, config.pick_shader)?;

        let pick_target = if config.picking_enabled {
            let size = rasterizer.drawing_buffer_size();
            Some((rasterizer.create_render_target(size.0, size.1), size))
        } else {
            None
        };

        info!(
            "Render engine ready ({} basic, {} phong, {} pick uniforms)",
            basic.uniform_setters.len(),
            phong.uniform_setters.len(),
            pick.uniform_setters.len()
        );

        Ok(Self {
            rasterizer,
            config,
            basic,
            phong,
            pick,
            pick_target,
            resident_buffers: HashSet::new(),
            resident_textures: HashSet::new(),
        })
    }

    fn create_program(rasterizer: &mut R, sources: ShaderSources) -> Result<ProgramInfo> {
        ProgramInfo::create(rasterizer, sources.vertex, sources.fragment)
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.config.clear_color = color;
    }

    pub fn program(&self, kind: MaterialKind) -> &ProgramInfo {
        match kind {
            MaterialKind::Basic => &self.basic,
            MaterialKind::Phong => &self.phong,
        }
    }

    pub fn pick_program(&self) -> &ProgramInfo {
        &self.pick
    }

    pub fn pick_target(&self) -> Option<RenderTargetHandle> {
        self.pick_target.map(|(target, _)| target)
    }

    /// Draws the scene into the default framebuffer
    ///
    /// Without a camera, a pixel-space projection of the drawing buffer is
    /// used. `light` feeds the Phong program; without it lighting uniforms
    /// keep whatever they last held.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: Option<NodeKey>,
        light: Option<NodeKey>,
    ) -> RenderStats {
        let (width, height) = self.rasterizer.drawing_buffer_size();
        self.rasterizer.bind_render_target(None);
        self.rasterizer.viewport(width, height);
        self.rasterizer.clear(self.config.clear_color);
        self.draw_scene(scene, camera, light, RenderPass::Color)
    }

    /// Draws every visible mesh's pick id into the pick target
    ///
    /// The target follows the drawing-buffer size. Returns `None` when picking
    /// is disabled.
    pub fn render_pick_pass(&mut self, scene: &mut Scene, camera: Option<NodeKey>) -> Option<RenderStats> {
        let target = self.ensure_pick_target()?;
        let (width, height) = self.rasterizer.drawing_buffer_size();
        self.rasterizer.bind_render_target(Some(target));
        self.rasterizer.viewport(width, height);
        self.rasterizer.clear([0.0; 4]);
        let stats = self.draw_scene(scene, camera, None, RenderPass::Pick);
        self.rasterizer.bind_render_target(None);
        Some(stats)
    }

    /// Mesh under framebuffer pixel `(x, y)` (origin bottom-left)
    pub fn pick(&mut self, scene: &mut Scene, camera: Option<NodeKey>, x: u32, y: u32) -> Option<NodeKey> {
        self.render_pick_pass(scene, camera)?;
        let target = self.pick_target()?;

        self.rasterizer.bind_render_target(Some(target));
        let pixel = self.rasterizer.read_pixel(x, y);
        self.rasterizer.bind_render_target(None);

        let id = picking::decode_pick_id(pixel);
        if id == NO_PICK {
            return None;
        }
        let hit = scene.pickable(id);
        match hit.and_then(|key| scene.node(key)) {
            Some(node) => debug!("Picked '{}' (pick id {}) at ({}, {})", node.name, id, x, y),
            None => debug!("Pick id {} at ({}, {}) has no live mesh", id, x, y),
        }
        hit
    }

    /// Mesh under a pointer given in logical window coordinates
    pub fn pick_at_pointer(
        &mut self,
        scene: &mut Scene,
        camera: Option<NodeKey>,
        position: winit::dpi::LogicalPosition<f64>,
        scale_factor: f64,
    ) -> Option<NodeKey> {
        let size = self.rasterizer.drawing_buffer_size();
        let (x, y) = picking::pointer_to_framebuffer(position, scale_factor, size)?;
        self.pick(scene, camera, x, y)
    }

    /// Deletes every buffer and texture this engine created that `scene` no
    /// longer holds, returning how many were released
    pub fn release_unused(&mut self, scene: &Scene) -> usize {
        let (buffers, textures) = scene_gpu_handles(scene);
        let mut released = 0;
        for buffer in self.resident_buffers.difference(&buffers) {
            self.rasterizer.delete_buffer(*buffer);
            released += 1;
        }
        for texture in self.resident_textures.difference(&textures) {
            self.rasterizer.delete_texture(*texture);
            released += 1;
        }
        if released > 0 {
            debug!("Released {} GPU resource(s)", released);
        }
        self.resident_buffers = buffers;
        self.resident_textures = textures;
        released
    }

    fn ensure_pick_target(&mut self) -> Option<RenderTargetHandle> {
        if !self.config.picking_enabled {
            return None;
        }
        let size = self.rasterizer.drawing_buffer_size();
        match self.pick_target {
            Some((target, current)) if current == size => Some(target),
            Some((target, _)) => {
                debug!("Resizing pick target to {}x{}", size.0, size.1);
                self.rasterizer.resize_render_target(target, size.0, size.1);
                self.pick_target = Some((target, size));
                Some(target)
            }
            None => {
                let target = self.rasterizer.create_render_target(size.0, size.1);
                self.pick_target = Some((target, size));
                Some(target)
            }
        }
    }

    fn pass_context(&self, scene: &mut Scene, camera: Option<NodeKey>, light: Option<NodeKey>) -> PassContext {
        let (width, height) = self.rasterizer.drawing_buffer_size();
        let camera_view = camera.and_then(|key| {
            let view_projection = scene.view_projection(key)?;
            let world = scene.node(key)?.world_matrix();
            Some((view_projection, math::position_of(world)))
        });
        let (view_projection, view_world_position) = match camera_view {
            Some((vp, position)) => (vp, math::vec3_to_array(position)),
            None => {
                if camera.is_some() {
                    warn!("Camera node is missing or not a camera, using pixel projection");
                }
                let depth = self.config.fallback_projection_depth;
                (math::projection(width as f32, height as f32, depth), [0.0; 3])
            }
        };

        let light = light.and_then(|key| {
            let world = scene.world_matrix(key)?;
            let node = scene.node(key)?;
            Some(node.as_light()?.uniforms(node.translation(), &world))
        });

        PassContext {
            view_projection,
            view_world_position,
            light,
        }
    }

    fn draw_scene(
        &mut self,
        scene: &mut Scene,
        camera: Option<NodeKey>,
        light: Option<NodeKey>,
        pass: RenderPass,
    ) -> RenderStats {
        let context = self.pass_context(scene, camera, light);
        let mut stats = RenderStats::default();
        let mut last_program: Option<ProgramHandle> = None;
        let mut last_geometry: Option<NodeKey> = None;

        for key in visible_preorder(scene) {
            let Some((mesh, world, materials, textures)) = scene.draw_parts(key) else {
                continue;
            };
            let Some(material) = materials.get(mesh.active_material()) else {
                warn!("Mesh {:?} references a removed material, skipping", key);
                continue;
            };
            mesh.geometry.ensure_derived();

            let program = match pass {
                RenderPass::Pick => &self.pick,
                RenderPass::Color => match material.kind() {
                    MaterialKind::Basic => &self.basic,
                    MaterialKind::Phong => &self.phong,
                },
            };
            let rasterizer: &mut dyn Rasterizer = &mut self.rasterizer;

            let switched = last_program != Some(program.program);
            if switched {
                rasterizer.use_program(program.program);
                last_program = Some(program.program);
                stats.program_switches += 1;
            }
            if switched || last_geometry != Some(key) {
                let attributes = mesh.geometry.attributes_mut();
                program.set_attributes(rasterizer, attributes);
                for (name, setter) in &program.attribute_setters {
                    let bare = name.trim_start_matches(super::program::ATTRIBUTE_PREFIX);
                    if !attributes.contains_key(bare) {
                        rasterizer.set_constant_attribute(setter.location, &vec![0.0; setter.ty.components()]);
                    }
                }
                last_geometry = Some(key);
                stats.attribute_binds += 1;
            }

            let world_view_projection = context.view_projection * *world;
            program.set_uniform(
                rasterizer,
                "worldViewProjection",
                &UniformValue::Mat4(world_view_projection),
                textures,
            );

            match pass {
                RenderPass::Pick => {
                    let id = UniformValue::Vec4(picking::pick_color(mesh.pick_id()));
                    program.set_uniform(rasterizer, "id", &id, textures);
                }
                RenderPass::Color => {
                    program.set_uniforms(rasterizer, &material.uniforms(), textures);
                    if material.kind() == MaterialKind::Phong {
                        program.set_uniform(rasterizer, "world", &UniformValue::Mat4(*world), textures);
                        program.set_uniform(
                            rasterizer,
                            "viewWorldPosition",
                            &UniformValue::Vec3(context.view_world_position),
                            textures,
                        );
                        if let Some(light) = &context.light {
                            program.set_uniforms(rasterizer, light, textures);
                        }
                    }
                }
            }

            let count = mesh.geometry.vertex_count();
            if count > 0 {
                rasterizer.draw_arrays(0, count);
                stats.draw_calls += 1;
            }
        }

        self.release_unused(scene);
        stats
    }
}

/// GPU handles held by the attributes and textures of `scene`
fn scene_gpu_handles(scene: &Scene) -> (HashSet<BufferHandle>, HashSet<TextureHandle>) {
    let buffers = scene
        .iter()
        .filter_map(|(_, node)| node.as_mesh())
        .flat_map(|mesh| mesh.geometry.attributes().values())
        .filter_map(|attribute| attribute.gpu_buffer)
        .collect();
    let textures = scene
        .textures
        .values()
        .filter_map(|texture| texture.gpu_texture)
        .collect();
    (buffers, textures)
}

/// Scene nodes in depth-first order, skipping hidden nodes and their subtrees
fn visible_preorder(scene: &Scene) -> Vec<NodeKey> {
    let mut order = Vec::new();
    let mut stack: Vec<NodeKey> = scene.roots().iter().rev().copied().collect();
    while let Some(key) = stack.pop() {
        let Some(node) = scene.node(key) else {
            continue;
        };
        if !node.visible {
            continue;
        }
        order.push(key);
        stack.extend(node.children().iter().rev().copied());
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SceneError,
        gfx::{
            camera::camera_utils::{Camera, ProjectionType},
            geometry::primitives,
            math::Vec3,
            rendering::{
                headless::{Call, HeadlessRasterizer},
                rasterizer::{ShaderStage, UniformData},
            },
            resources::material::MaterialKind,
            scene::{Light, MeshData, NodeKind},
        },
    };

    fn engine() -> RenderEngine<HeadlessRasterizer> {
        let _ = env_logger::builder().is_test(true).try_init();
        RenderEngine::new(HeadlessRasterizer::new(200, 100), RenderConfig::default()).unwrap()
    }

    fn add_box(scene: &mut Scene, name: &str, parent: Option<NodeKey>, kind: MaterialKind) -> NodeKey {
        let (basic, phong) = scene.add_material_pair([1.0, 0.0, 0.0, 1.0]);
        let mesh = MeshData::new(primitives::box_geometry(10.0, 10.0, 10.0), basic, phong).with_active(kind);
        scene.add_mesh(name, mesh, parent)
    }

    fn assert_matrix(data: Option<&UniformData>, expected: &M4) {
        let Some(UniformData::Matrix(values)) = data else {
            panic!("expected matrix uniform, got {:?}", data);
        };
        for (a, b) in values.iter().zip(math::to_array(expected)) {
            assert!((a - b).abs() < 1e-4, "{:?} != {:?}", values, expected);
        }
    }

    #[test]
    fn test_broken_shader_aborts_setup() {
        let config = RenderConfig::default().with_phong_shader(ShaderSources {
            vertex: "attribute vec4 a_position;",
            fragment: "void main() {}",
        });
        let result = RenderEngine::new(HeadlessRasterizer::new(10, 10), config);
        assert!(matches!(
            result,
            Err(SceneError::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            })
        ));
    }

    #[test]
    fn test_program_and_geometry_switches_are_minimized() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let root = add_box(&mut scene, "root", None, MaterialKind::Basic);
        add_box(&mut scene, "a", Some(root), MaterialKind::Basic);
        add_box(&mut scene, "b", Some(root), MaterialKind::Phong);

        let stats = engine.render(&mut scene, None, None);
        assert_eq!(stats.draw_calls, 3);
        assert_eq!(stats.program_switches, 2);
        assert_eq!(stats.attribute_binds, 3);
        assert_eq!(
            engine.rasterizer().count_calls(|c| matches!(c, Call::DrawArrays { first: 0, count: 36 })),
            3
        );

        // second frame: buffers are clean, nothing is re-uploaded
        engine.rasterizer_mut().clear_calls();
        engine.render(&mut scene, None, None);
        assert_eq!(engine.rasterizer().count_calls(|c| matches!(c, Call::UploadBuffer { .. })), 0);
    }

    #[test]
    fn test_world_view_projection_with_camera() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let mesh = add_box(&mut scene, "box", None, MaterialKind::Basic);
        scene.set_translation(mesh, Vec3::new(5.0, 0.0, 0.0));
        let camera = scene.add_node(
            "camera",
            NodeKind::Camera(Camera::for_viewport(ProjectionType::Orthographic, 200.0, 100.0)),
            None,
        );
        scene.set_translation(camera, Vec3::new(0.0, 0.0, 850.0));

        engine.render(&mut scene, Some(camera), None);
        let expected = scene.view_projection(camera).unwrap() * *scene.node(mesh).unwrap().world_matrix();
        assert_matrix(engine.rasterizer().last_uniform("u_worldViewProjection"), &expected);
    }

    #[test]
    fn test_fallback_projection_without_camera() {
        let mut engine = engine();
        let mut scene = Scene::new();
        add_box(&mut scene, "box", None, MaterialKind::Basic);

        engine.render(&mut scene, None, None);
        let expected = math::projection(200.0, 100.0, 1000.0);
        assert_matrix(engine.rasterizer().last_uniform("u_worldViewProjection"), &expected);
        assert_eq!(
            engine.rasterizer().last_uniform("u_color"),
            Some(&UniformData::Floats(vec![1.0, 0.0, 0.0, 1.0]))
        );
    }

    #[test]
    fn test_phong_binds_world_view_position_and_light() {
        let mut engine = engine();
        let mut scene = Scene::new();
        add_box(&mut scene, "box", None, MaterialKind::Phong);
        let pivot = scene.create_node("origin", NodeKind::Transform);
        let camera = scene.add_node(
            "camera",
            NodeKind::Camera(Camera::for_viewport(ProjectionType::Perspective, 200.0, 100.0)),
            Some(pivot),
        );
        scene.set_translation(camera, Vec3::new(0.0, 0.0, 850.0));
        let light = scene.add_node("light", NodeKind::Light(Light::directional()), None);
        scene.set_translation(light, Vec3::new(0.0, 2.0, 0.0));

        engine.render(&mut scene, Some(camera), Some(light));
        let raster = engine.rasterizer();
        assert!(raster.last_uniform("u_world").is_some());
        assert_eq!(
            raster.last_uniform("u_viewWorldPosition"),
            Some(&UniformData::Floats(vec![0.0, 0.0, 850.0]))
        );
        assert_eq!(
            raster.last_uniform("u_reverseLightDirection"),
            Some(&UniformData::Floats(vec![0.0, 1.0, 0.0]))
        );
        assert_eq!(raster.last_uniform("u_lightIsDirectional"), Some(&UniformData::Ints(vec![1])));
        // all four maps were created, uploaded with their fallback colour and bound
        assert_eq!(raster.count_calls(|c| matches!(c, Call::UploadTexture { width: 1, height: 1, .. })), 4);
        assert_eq!(raster.count_calls(|c| matches!(c, Call::BindTexture { .. })), 4);
    }

    #[test]
    fn test_hidden_subtrees_are_skipped() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let root = add_box(&mut scene, "root", None, MaterialKind::Basic);
        let hidden = add_box(&mut scene, "hidden", Some(root), MaterialKind::Basic);
        add_box(&mut scene, "below_hidden", Some(hidden), MaterialKind::Basic);
        scene.node_mut(hidden).unwrap().visible = false;

        let stats = engine.render(&mut scene, None, None);
        assert_eq!(stats.draw_calls, 1);
    }

    #[test]
    fn test_pick_resolves_mesh_under_pixel() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let first = add_box(&mut scene, "first", None, MaterialKind::Basic);
        let second = add_box(&mut scene, "second", None, MaterialKind::Phong);
        let second_id = scene.node(second).unwrap().as_mesh().unwrap().pick_id();

        let target = engine.pick_target();
        engine
            .rasterizer_mut()
            .set_pixel(target, 20, 30, picking::encode_pick_id(second_id));

        assert_eq!(engine.pick(&mut scene, None, 20, 30), Some(second));
        assert_eq!(engine.pick(&mut scene, None, 0, 0), None);

        // the pick pass draws ids with the pick program only
        let ids = engine.rasterizer().uniform_history("u_id");
        assert!(ids.contains(&&UniformData::Floats(picking::pick_color(1).to_vec())));

        scene.remove_node(second);
        assert_eq!(engine.pick(&mut scene, None, 20, 30), None);
        assert!(scene.contains(first));
    }

    #[test]
    fn test_pick_target_follows_drawing_buffer() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let target = engine.pick_target().unwrap();
        assert_eq!(engine.rasterizer().render_target_size(target), Some((200, 100)));

        engine.rasterizer_mut().resize(400, 300);
        engine.render_pick_pass(&mut scene, None);
        assert_eq!(engine.rasterizer().render_target_size(target), Some((400, 300)));
        assert_eq!(engine.pick_target(), Some(target));
    }

    fn buffers_of(scene: &Scene, key: NodeKey) -> Vec<BufferHandle> {
        let mesh = scene.node(key).unwrap().as_mesh().unwrap();
        mesh.geometry.attributes().values().filter_map(|a| a.gpu_buffer).collect()
    }

    #[test]
    fn test_removed_mesh_buffers_are_released() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let kept = add_box(&mut scene, "kept", None, MaterialKind::Basic);
        let removed = add_box(&mut scene, "removed", None, MaterialKind::Basic);
        engine.render(&mut scene, None, None);
        let kept_buffers = buffers_of(&scene, kept);
        let removed_buffers = buffers_of(&scene, removed);
        assert!(!removed_buffers.is_empty());

        scene.remove_node(removed);
        engine.rasterizer_mut().clear_calls();
        engine.render(&mut scene, None, None);
        let deleted: Vec<BufferHandle> = engine
            .rasterizer()
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::DeleteBuffer(buffer) => Some(*buffer),
                _ => None,
            })
            .collect();
        assert_eq!(deleted.len(), removed_buffers.len());
        assert!(removed_buffers.iter().all(|b| deleted.contains(b)));
        assert!(kept_buffers.iter().all(|b| !deleted.contains(b)));

        engine.rasterizer_mut().clear_calls();
        engine.render(&mut scene, None, None);
        assert_eq!(engine.rasterizer().count_calls(|c| matches!(c, Call::DeleteBuffer(_))), 0);
    }

    #[test]
    fn test_replaced_scene_is_released() {
        let mut engine = engine();
        let mut old = Scene::new();
        add_box(&mut old, "phong", None, MaterialKind::Phong);
        engine.render(&mut old, None, None);
        let textures = old.textures.values().filter(|t| t.gpu_texture.is_some()).count();
        assert!(textures > 0);

        let mut new = Scene::new();
        engine.rasterizer_mut().clear_calls();
        engine.render(&mut new, None, None);
        assert!(engine.rasterizer().count_calls(|c| matches!(c, Call::DeleteBuffer(_))) > 0);
        assert_eq!(
            engine.rasterizer().count_calls(|c| matches!(c, Call::DeleteTexture(_))),
            textures
        );
        assert_eq!(engine.release_unused(&new), 0);
    }

    #[test]
    fn test_picking_disabled() {
        let mut engine = RenderEngine::new(
            HeadlessRasterizer::new(10, 10),
            RenderConfig::default().with_picking(false),
        )
        .unwrap();
        let mut scene = Scene::new();
        add_box(&mut scene, "box", None, MaterialKind::Basic);
        assert_eq!(engine.pick_target(), None);
        assert_eq!(engine.pick(&mut scene, None, 1, 1), None);
        assert_eq!(engine.rasterizer().count_calls(|c| matches!(c, Call::ReadPixel { .. })), 0);
    }
}
