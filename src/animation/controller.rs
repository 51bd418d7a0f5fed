//! Real-time playback of an [`Animation`] over a [`Scene`]

use std::collections::HashMap;

use log::{debug, error};

use super::{
    easing::Easing,
    keyframe::{Animation, Keyframe},
};
use crate::{
    config::AnimationSettings,
    gfx::{
        math::Vec3,
        scene::{NodeId, Scene},
    },
};

/// Steps a timeline of frames and writes keyframes into the scene graph
///
/// Time accumulates into a fractional frame counter. Every whole frame passed
/// moves the current frame (backwards when reversed, wrapping around the
/// timeline) and applies its keyframes. Between frames, a tweening easing
/// interpolates each keyframe towards the next keyframe of the same node.
#[derive(Debug, Clone, Default)]
pub struct AnimationController {
    animation: Animation,
    /// Sorted frame indices mentioning each node
    index: HashMap<NodeId, Vec<usize>>,
    settings: AnimationSettings,
    playing: bool,
    current_frame: usize,
    delta_frame: f32,
}

impl AnimationController {
    pub fn new(animation: Animation, settings: AnimationSettings) -> Self {
        let index = build_index(&animation);
        Self {
            animation,
            index,
            settings,
            playing: false,
            current_frame: 0,
            delta_frame: 0.0,
        }
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Replaces the timeline and rewinds to its first frame
    pub fn set_animation(&mut self, animation: Animation) {
        self.index = build_index(&animation);
        self.animation = animation;
        self.current_frame = 0;
        self.delta_frame = 0.0;
        debug!("Loaded animation with {} frame(s)", self.animation.len());
    }

    pub fn frame_count(&self) -> usize {
        self.animation.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn delta_frame(&self) -> f32 {
        self.delta_frame
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Pauses playback, keeping the current frame and accumulator
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.settings.fps = fps;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.settings.speed = speed;
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        self.settings.reverse = reverse;
    }

    pub fn toggle_reverse(&mut self) -> bool {
        self.settings.reverse = !self.settings.reverse;
        self.settings.reverse
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.settings.looping = looping;
    }

    pub fn toggle_loop(&mut self) -> bool {
        self.settings.looping = !self.settings.looping;
        self.settings.looping
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.settings.easing = easing;
    }

    /// Advances playback by `seconds`. Returns whether the scene was written.
    pub fn update(&mut self, seconds: f32, scene: &mut Scene) -> bool {
        if !self.playing || self.animation.is_empty() {
            return false;
        }

        self.delta_frame += seconds * self.settings.fps * self.settings.speed;

        if self.delta_frame >= 1.0 {
            let steps = self.delta_frame.floor() as i64;
            let steps = if self.settings.reverse { -steps } else { steps };
            self.current_frame = self.wrap(self.current_frame as i64 + steps);
            self.delta_frame = self.delta_frame.fract();
            self.apply_frame(scene);

            if self.current_frame == 0 && !self.settings.looping {
                self.playing = false;
                debug!("Animation reached its end, stopping");
            }
            return true;
        }

        if self.settings.easing.is_tweening() && self.delta_frame > 0.0 {
            self.tween(scene);
            return true;
        }
        false
    }

    /// Writes the current frame's keyframes into the scene
    pub fn apply_frame(&self, scene: &mut Scene) {
        let Some(frame) = self.animation.frames.get(self.current_frame) else {
            return;
        };
        for keyframe in &frame.keyframes {
            let Some(key) = scene.key_of(keyframe.node_id) else {
                error!("Node with id {} not found", keyframe.node_id);
                continue;
            };
            scene.set_transform(key, keyframe.translation, keyframe.rotation, keyframe.scale);
        }
    }

    /// Jumps to `frame` (wrapped into the timeline) and applies it
    pub fn set_frame(&mut self, frame: i64, scene: &mut Scene) {
        if self.animation.is_empty() {
            return;
        }
        self.current_frame = self.wrap(frame);
        self.apply_frame(scene);
    }

    pub fn next_frame(&mut self, scene: &mut Scene) {
        self.set_frame(self.current_frame as i64 + 1, scene);
    }

    pub fn previous_frame(&mut self, scene: &mut Scene) {
        self.set_frame(self.current_frame as i64 - 1, scene);
    }

    pub fn first_frame(&mut self, scene: &mut Scene) {
        self.set_frame(0, scene);
    }

    pub fn last_frame(&mut self, scene: &mut Scene) {
        self.set_frame(self.animation.len() as i64 - 1, scene);
    }

    /// Index of the next frame after `from` holding a keyframe for `node_id`
    ///
    /// Searches forwards (backwards when reversed), wrapping around the
    /// timeline. Frame `from` itself never matches.
    pub fn next_keyframe(&self, node_id: NodeId, from: usize) -> Option<usize> {
        let frames = self.index.get(&node_id)?;
        let found = if self.settings.reverse {
            let before = frames.partition_point(|&i| i < from);
            before.checked_sub(1).and_then(|i| frames.get(i)).or(frames.last())
        } else {
            let after = frames.partition_point(|&i| i <= from);
            frames.get(after).or(frames.first())
        };
        found.copied().filter(|&i| i != from)
    }

    /// `"Frame: current / last"`, as shown next to the playback buttons
    pub fn frame_label(&self) -> String {
        format!(
            "Frame: {} / {}",
            self.current_frame,
            self.animation.len().saturating_sub(1)
        )
    }

    fn tween(&self, scene: &mut Scene) {
        let Some(frame) = self.animation.frames.get(self.current_frame) else {
            return;
        };
        let easing = self.settings.easing;
        let t = self.delta_frame;

        for keyframe in &frame.keyframes {
            let Some(key) = scene.key_of(keyframe.node_id) else {
                error!("Node with id {} not found", keyframe.node_id);
                continue;
            };
            let Some(next) = self
                .next_keyframe(keyframe.node_id, self.current_frame)
                .and_then(|i| self.animation.frames[i].keyframe_for(keyframe.node_id))
            else {
                continue;
            };
            let (translation, rotation, scale) = interpolate(keyframe, next, easing, t);
            scene.set_transform(key, translation, rotation, scale);
        }
    }

    fn wrap(&self, frame: i64) -> usize {
        frame.rem_euclid(self.animation.len() as i64) as usize
    }
}

fn build_index(animation: &Animation) -> HashMap<NodeId, Vec<usize>> {
    let mut index: HashMap<NodeId, Vec<usize>> = HashMap::new();
    for (i, frame) in animation.frames.iter().enumerate() {
        for keyframe in &frame.keyframes {
            let frames = index.entry(keyframe.node_id).or_default();
            if frames.last() != Some(&i) {
                frames.push(i);
            }
        }
    }
    index
}

type Channels = (Option<Vec3>, Option<Vec3>, Option<Vec3>);

/// Channels present in both keyframes, eased per axis
fn interpolate(from: &Keyframe, to: &Keyframe, easing: Easing, t: f32) -> Channels {
    let channel = |a: Option<Vec3>, b: Option<Vec3>| {
        let (a, b) = (a?, b?);
        Some(Vec3::new(
            easing.ease(a.x, b.x, t),
            easing.ease(a.y, b.y, t),
            easing.ease(a.z, b.z, t),
        ))
    };
    (
        channel(from.translation, to.translation),
        channel(from.rotation, to.rotation),
        channel(from.scale, to.scale),
    )
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::{
        animation::keyframe::Frame,
        gfx::scene::{NodeKey, NodeKind},
    };

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn realtime() -> AnimationSettings {
        AnimationSettings::default().with_fps(1.0).with_speed(1.0)
    }

    fn scene_with_node() -> (Scene, NodeKey, NodeId) {
        let mut scene = Scene::new();
        let key = scene.create_node("puppet", NodeKind::Transform);
        let id = scene.node(key).unwrap().id();
        (scene, key, id)
    }

    /// One frame per x position, all for `id`
    fn walk(id: NodeId, count: usize) -> Animation {
        Animation::new(
            (0..count)
                .map(|i| Frame::new(vec![Keyframe::new(id).with_translation(Vec3::new(i as f32, 0.0, 0.0))]))
                .collect(),
        )
    }

    #[test]
    fn test_forward_wrap() {
        let (mut scene, key, id) = scene_with_node();
        let mut controller = AnimationController::new(walk(id, 4), realtime());
        controller.set_frame(3, &mut scene);
        controller.play();

        assert!(controller.update(2.0, &mut scene));
        assert_eq!(controller.current_frame(), 1);
        assert_eq!(controller.delta_frame(), 0.0);
        assert_eq!(scene.node(key).unwrap().translation().x, 1.0);
    }

    #[test]
    fn test_reverse_wrap_stays_non_negative() {
        let (mut scene, key, id) = scene_with_node();
        let mut controller = AnimationController::new(walk(id, 4), realtime().with_reverse(true));
        controller.set_frame(1, &mut scene);
        controller.play();

        controller.update(2.0, &mut scene);
        assert_eq!(controller.current_frame(), 3);
        assert_eq!(scene.node(key).unwrap().translation().x, 3.0);
    }

    #[test]
    fn test_accumulates_fractional_frames() {
        let (mut scene, _, id) = scene_with_node();
        let mut controller = AnimationController::new(walk(id, 4), AnimationSettings::default());
        controller.play();

        // 24 fps at 0.6 speed: 0.05 s is 0.72 of a frame
        assert!(!controller.update(0.05, &mut scene));
        assert_eq!(controller.current_frame(), 0);
        controller.update(0.05, &mut scene);
        assert_eq!(controller.current_frame(), 1);
        assert!((controller.delta_frame() - 0.44).abs() < 1e-5);
    }

    #[test]
    fn test_stops_at_wrap_without_loop() {
        let (mut scene, _, id) = scene_with_node();
        let mut controller = AnimationController::new(walk(id, 3), realtime().with_looping(false));
        controller.set_frame(2, &mut scene);
        controller.play();

        controller.update(1.0, &mut scene);
        assert_eq!(controller.current_frame(), 0);
        assert!(!controller.is_playing());

        controller.toggle_loop();
        controller.play();
        controller.update(3.0, &mut scene);
        assert!(controller.is_playing());
    }

    #[test]
    fn test_stop_keeps_position() {
        let (mut scene, _, id) = scene_with_node();
        let mut controller = AnimationController::new(walk(id, 4), realtime());
        controller.play();
        controller.update(1.5, &mut scene);
        controller.stop();

        assert!(!controller.update(10.0, &mut scene));
        assert_eq!(controller.current_frame(), 1);
        assert_eq!(controller.delta_frame(), 0.5);
    }

    #[test]
    fn test_partial_keyframe_leaves_other_channels() {
        let (mut scene, key, id) = scene_with_node();
        scene.set_rotation(key, Vec3::new(0.1, 0.2, 0.3));
        scene.set_scale(key, Vec3::new(2.0, 2.0, 2.0));

        let controller = AnimationController::new(walk(id, 1), realtime());
        controller.apply_frame(&mut scene);

        let node = scene.node(key).unwrap();
        assert_eq!(node.rotation(), Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(node.scale(), Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(node.translation(), Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_missing_node_does_not_abort_frame() {
        init();
        let (mut scene, key, id) = scene_with_node();
        let frame = Frame::new(vec![
            Keyframe::new(NodeId(999)).with_translation(Vec3::new(1.0, 1.0, 1.0)),
            Keyframe::new(id).with_scale(Vec3::new(3.0, 3.0, 3.0)),
        ]);
        let controller = AnimationController::new(Animation::new(vec![frame]), realtime());
        controller.apply_frame(&mut scene);
        assert_eq!(scene.node(key).unwrap().scale(), Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_tween_between_keyframes() {
        let (mut scene, key, id) = scene_with_node();
        let animation = Animation::new(vec![
            Frame::new(vec![Keyframe::new(id).with_translation(Vec3::new(0.0, 0.0, 0.0))]),
            Frame::default(),
            Frame::new(vec![Keyframe::new(id).with_translation(Vec3::new(10.0, -4.0, 0.0))]),
        ]);
        let mut controller = AnimationController::new(animation, realtime().with_easing(Easing::Quad));
        controller.play();

        assert!(controller.update(0.5, &mut scene));
        assert_eq!(controller.current_frame(), 0);
        assert_eq!(scene.node(key).unwrap().translation(), Vec3::new(2.5, -1.0, 0.0));
    }

    #[test]
    fn test_tween_skips_channels_missing_from_next() {
        let (mut scene, key, id) = scene_with_node();
        let animation = Animation::new(vec![
            Frame::new(vec![Keyframe::new(id)
                .with_translation(Vec3::new(0.0, 0.0, 0.0))
                .with_scale(Vec3::new(1.0, 1.0, 1.0))]),
            Frame::new(vec![Keyframe::new(id).with_scale(Vec3::new(3.0, 3.0, 3.0))]),
        ]);
        let mut controller = AnimationController::new(animation, realtime().with_easing(Easing::Cubic));
        scene.set_translation(key, Vec3::new(7.0, 7.0, 7.0));
        controller.play();
        controller.update(0.5, &mut scene);

        let node = scene.node(key).unwrap();
        assert_eq!(node.translation(), Vec3::new(7.0, 7.0, 7.0));
        assert_eq!(node.scale(), Vec3::new(1.25, 1.25, 1.25));
    }

    #[test]
    fn test_next_keyframe_lookup() {
        let (_, _, a) = scene_with_node();
        let b = NodeId(a.0 + 1);
        let animation = Animation::new(vec![
            Frame::new(vec![Keyframe::new(a)]),
            Frame::new(vec![Keyframe::new(b)]),
            Frame::new(vec![Keyframe::new(a)]),
            Frame::default(),
        ]);
        let mut controller = AnimationController::new(animation, realtime());

        assert_eq!(controller.next_keyframe(a, 0), Some(2));
        assert_eq!(controller.next_keyframe(a, 1), Some(2));
        assert_eq!(controller.next_keyframe(a, 2), Some(0));
        assert_eq!(controller.next_keyframe(a, 3), Some(0));
        assert_eq!(controller.next_keyframe(b, 1), None);
        assert_eq!(controller.next_keyframe(NodeId(42), 0), None);

        controller.set_reverse(true);
        assert_eq!(controller.next_keyframe(a, 0), Some(2));
        assert_eq!(controller.next_keyframe(a, 1), Some(0));
        assert_eq!(controller.next_keyframe(a, 2), Some(0));
        assert_eq!(controller.next_keyframe(a, 3), Some(2));
    }

    /// Step-by-step scan over the timeline
    fn scan(animation: &Animation, node_id: NodeId, from: usize, reverse: bool) -> Option<usize> {
        let len = animation.len() as i64;
        (1..len)
            .map(|step| {
                let step = if reverse { -step } else { step };
                (from as i64 + step).rem_euclid(len) as usize
            })
            .find(|&i| animation.frames[i].keyframe_for(node_id).is_some())
    }

    #[test]
    fn test_index_matches_linear_scan() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let len = rng.random_range(1..12);
            let frames = (0..len)
                .map(|_| {
                    let keyframes = (0..3)
                        .filter(|_| rng.random_bool(0.3))
                        .map(|n| Keyframe::new(NodeId(n)))
                        .collect();
                    Frame::new(keyframes)
                })
                .collect();
            let animation = Animation::new(frames);
            let mut controller = AnimationController::new(animation.clone(), realtime());

            for reverse in [false, true] {
                controller.set_reverse(reverse);
                for from in 0..len {
                    for n in 0..3 {
                        assert_eq!(
                            controller.next_keyframe(NodeId(n), from),
                            scan(&animation, NodeId(n), from, reverse),
                            "node {} from {} reverse {}",
                            n,
                            from,
                            reverse
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_navigation_wraps() {
        let (mut scene, key, id) = scene_with_node();
        let mut controller = AnimationController::new(walk(id, 5), realtime());

        controller.previous_frame(&mut scene);
        assert_eq!(controller.current_frame(), 4);
        assert_eq!(scene.node(key).unwrap().translation().x, 4.0);
        controller.next_frame(&mut scene);
        assert_eq!(controller.current_frame(), 0);
        controller.last_frame(&mut scene);
        assert_eq!(controller.frame_label(), "Frame: 4 / 4");
        controller.first_frame(&mut scene);
        assert_eq!(scene.node(key).unwrap().translation().x, 0.0);
    }

    #[test]
    fn test_empty_timeline_is_inert() {
        let mut scene = Scene::new();
        let mut controller = AnimationController::new(Animation::default(), realtime());
        controller.play();
        assert!(!controller.update(5.0, &mut scene));
        controller.next_frame(&mut scene);
        assert_eq!(controller.current_frame(), 0);
    }
}
