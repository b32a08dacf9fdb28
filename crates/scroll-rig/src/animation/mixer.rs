//! Action mixer: owns actions and force-applies their blended pose
//!
//! The mixer never advances time on its own. `advance` moves only actions
//! that are playing and unpaused; `apply` evaluates whatever times the
//! actions currently hold and writes the result into the skeleton.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use log::{debug, trace};

use super::action::{Action, ActionId};
use super::clip::AnimationClip;
use super::skeleton::{BoneId, Skeleton, Transform};

/// Weights below this are treated as zero
const WEIGHT_EPSILON: f32 = 1e-6;

/// Track index within a clip, resolved to the bone it drives
#[derive(Debug, Clone, Copy)]
struct Channel {
    bone: BoneId,
    track: usize,
}

#[derive(Debug, Clone)]
struct BoundAction {
    action: Action,
    channels: Vec<Channel>,
}

/// Per-bone accumulator while blending several actions
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    translation: Vec3,
    translation_weight: f32,
    rotation: Quat,
    rotation_weight: f32,
    scale: Vec3,
    scale_weight: f32,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            translation_weight: 0.0,
            rotation: Quat::IDENTITY,
            rotation_weight: 0.0,
            scale: Vec3::ZERO,
            scale_weight: 0.0,
        }
    }
}

impl Accumulator {
    fn add_rotation(&mut self, value: Quat, weight: f32) {
        if self.rotation_weight <= 0.0 {
            self.rotation = value;
            self.rotation_weight = weight;
        } else {
            self.rotation_weight += weight;
            self.rotation = self
                .rotation
                .slerp(value, weight / self.rotation_weight);
        }
    }

    /// Resolve against the rest pose for whatever weight is missing
    fn resolve(&self, rest: &Transform) -> Transform {
        let translation = if self.translation_weight <= WEIGHT_EPSILON {
            rest.translation
        } else if self.translation_weight < 1.0 {
            self.translation + rest.translation * (1.0 - self.translation_weight)
        } else {
            self.translation / self.translation_weight
        };

        let rotation = if self.rotation_weight <= WEIGHT_EPSILON {
            rest.rotation
        } else if self.rotation_weight < 1.0 {
            rest.rotation.slerp(self.rotation, self.rotation_weight)
        } else {
            self.rotation
        };

        let scale = if self.scale_weight <= WEIGHT_EPSILON {
            rest.scale
        } else if self.scale_weight < 1.0 {
            self.scale + rest.scale * (1.0 - self.scale_weight)
        } else {
            self.scale / self.scale_weight
        };

        Transform {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }
}

/// Owns one action per clip and blends them onto a skeleton
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    actions: Vec<BoundAction>,
    by_clip: HashMap<usize, ActionId>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (creating on first use) the action for a clip
    ///
    /// Tracks are bound to bones by name once, here. Tracks that name a
    /// bone the skeleton lacks are dropped.
    pub fn clip_action(
        &mut self,
        clips: &[AnimationClip],
        skeleton: &Skeleton,
        clip_index: usize,
    ) -> Option<ActionId> {
        if let Some(id) = self.by_clip.get(&clip_index) {
            return Some(*id);
        }

        let clip = clips.get(clip_index)?;
        let mut channels = Vec::with_capacity(clip.tracks().len());
        for (track, bone_track) in clip.tracks().iter().enumerate() {
            match skeleton.find(&bone_track.bone) {
                Some(bone) => channels.push(Channel { bone, track }),
                None => debug!(
                    "Clip '{}' targets unknown bone '{}', track dropped",
                    clip.name(),
                    bone_track.bone
                ),
            }
        }

        let id = ActionId(self.actions.len());
        self.actions.push(BoundAction {
            action: Action::new(clip_index, clip.duration()),
            channels,
        });
        self.by_clip.insert(clip_index, id);
        Some(id)
    }

    /// Get number of actions created so far
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0).map(|b| &b.action)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.actions.get_mut(id.0).map(|b| &mut b.action)
    }

    /// Iterate over all actions with their handles
    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &Action)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, b)| (ActionId(i), &b.action))
    }

    /// Advance every playing, unpaused action by wall-clock time
    pub fn advance(&mut self, delta_time: f32) {
        for bound in &mut self.actions {
            bound.action.advance(delta_time);
        }
    }

    /// Evaluate all contributing actions at their current times and write the pose
    ///
    /// Returns false, leaving the skeleton untouched, when no action
    /// contributes any weight: the last applied pose stays on screen.
    pub fn apply(&self, clips: &[AnimationClip], skeleton: &mut Skeleton) -> bool {
        let contributing: Vec<&BoundAction> = self
            .actions
            .iter()
            .filter(|b| b.action.effective_weight() > WEIGHT_EPSILON)
            .collect();

        if contributing.is_empty() {
            trace!("No contributing actions, holding last pose");
            return false;
        }

        let mut accumulators = vec![Accumulator::default(); skeleton.len()];
        for bound in contributing {
            let Some(clip) = clips.get(bound.action.clip_index()) else {
                continue;
            };
            accumulate(
                clip,
                &bound.channels,
                bound.action.time(),
                bound.action.effective_weight(),
                &mut accumulators,
            );
        }

        for (i, acc) in accumulators.iter().enumerate() {
            if let Some(bone) = skeleton.bone_mut(BoneId(i)) {
                bone.local = acc.resolve(&bone.rest);
            }
        }
        true
    }

    /// Pose the skeleton from a single action at `time`, at full weight
    ///
    /// Ignores the action's own time, weight and flags; used to measure a
    /// pose without disturbing playback state.
    pub fn apply_single(
        &self,
        clips: &[AnimationClip],
        skeleton: &mut Skeleton,
        id: ActionId,
        time: f32,
    ) -> bool {
        let Some(bound) = self.actions.get(id.0) else {
            return false;
        };
        let Some(clip) = clips.get(bound.action.clip_index()) else {
            return false;
        };

        let mut accumulators = vec![Accumulator::default(); skeleton.len()];
        accumulate(clip, &bound.channels, time, 1.0, &mut accumulators);

        for (i, acc) in accumulators.iter().enumerate() {
            if let Some(bone) = skeleton.bone_mut(BoneId(i)) {
                bone.local = acc.resolve(&bone.rest);
            }
        }
        true
    }
}

fn accumulate(
    clip: &AnimationClip,
    channels: &[Channel],
    time: f32,
    weight: f32,
    accumulators: &mut [Accumulator],
) {
    for channel in channels {
        let Some(track) = clip.tracks().get(channel.track) else {
            continue;
        };
        let Some(acc) = accumulators.get_mut(channel.bone.0) else {
            continue;
        };

        if let Some(value) = track.translation.as_ref().and_then(|t| t.sample(time)) {
            acc.translation += value * weight;
            acc.translation_weight += weight;
        }
        if let Some(value) = track.rotation.as_ref().and_then(|t| t.sample(time)) {
            acc.add_rotation(value.normalize(), weight);
        }
        if let Some(value) = track.scale.as_ref().and_then(|t| t.sample(time)) {
            acc.scale += value * weight;
            acc.scale_weight += weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::BoneTrack;
    use crate::animation::skeleton::Bone;
    use crate::animation::track::Track;

    fn fixture() -> (Skeleton, Vec<AnimationClip>) {
        let skeleton = Skeleton::new(vec![
            Bone::new("Hips", None, Transform::from_translation(Vec3::Y)),
            Bone::new("Spine", Some(BoneId(0)), Transform::from_translation(Vec3::Y)),
        ])
        .unwrap();
        let up = AnimationClip::new(
            "Up",
            vec![BoneTrack::new("Hips").with_translation(Track::linear(
                vec![0.0, 1.0],
                vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)],
            ))],
        )
        .unwrap();
        let side = AnimationClip::new(
            "Side",
            vec![
                BoneTrack::new("Hips").with_translation(Track::constant(Vec3::X)),
                BoneTrack::new("Tail").with_translation(Track::constant(Vec3::X)),
            ],
        )
        .unwrap();
        (skeleton, vec![up, side])
    }

    fn activate(mixer: &mut Mixer, id: ActionId, weight: f32) {
        let action = mixer.action_mut(id).unwrap();
        action.reset();
        action.set_weight(weight);
        action.play();
    }

    #[test]
    fn test_clip_action_is_cached() {
        let (skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        let a = mixer.clip_action(&clips, &skeleton, 0).unwrap();
        let b = mixer.clip_action(&clips, &skeleton, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!(mixer.len(), 1);
        assert!(mixer.clip_action(&clips, &skeleton, 7).is_none());
    }

    #[test]
    fn test_apply_single_action_full_weight() {
        let (mut skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        let id = mixer.clip_action(&clips, &skeleton, 0).unwrap();
        activate(&mut mixer, id, 1.0);
        mixer.action_mut(id).unwrap().set_time(0.5);

        assert!(mixer.apply(&clips, &mut skeleton));
        let hips = skeleton.bone(BoneId(0)).unwrap().local.translation;
        assert!((hips - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        // Spine has no track and stays at rest
        let spine = skeleton.bone(BoneId(1)).unwrap().local.translation;
        assert_eq!(spine, Vec3::Y);
    }

    #[test]
    fn test_apply_blends_two_actions() {
        let (mut skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        let up = mixer.clip_action(&clips, &skeleton, 0).unwrap();
        let side = mixer.clip_action(&clips, &skeleton, 1).unwrap();
        activate(&mut mixer, up, 0.5);
        activate(&mut mixer, side, 0.5);
        mixer.action_mut(up).unwrap().set_time(1.0);

        mixer.apply(&clips, &mut skeleton);
        let hips = skeleton.bone(BoneId(0)).unwrap().local.translation;
        assert!((hips - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_partial_weight_mixes_with_rest() {
        let (mut skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        let up = mixer.clip_action(&clips, &skeleton, 0).unwrap();
        activate(&mut mixer, up, 0.25);
        mixer.action_mut(up).unwrap().set_time(1.0);

        mixer.apply(&clips, &mut skeleton);
        let hips = skeleton.bone(BoneId(0)).unwrap().local.translation;
        // 0.25 * (0,2,0) + 0.75 * rest (0,1,0)
        assert!((hips - Vec3::new(0.0, 1.25, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_no_contributors_holds_pose() {
        let (mut skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        mixer.clip_action(&clips, &skeleton, 0).unwrap();
        skeleton.bone_mut(BoneId(0)).unwrap().local.translation = Vec3::splat(3.0);

        assert!(!mixer.apply(&clips, &mut skeleton));
        assert_eq!(
            skeleton.bone(BoneId(0)).unwrap().local.translation,
            Vec3::splat(3.0)
        );
    }

    #[test]
    fn test_apply_single_ignores_action_state() {
        let (mut skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        let up = mixer.clip_action(&clips, &skeleton, 0).unwrap();

        assert!(mixer.apply_single(&clips, &mut skeleton, up, 1.0));
        let hips = skeleton.bone(BoneId(0)).unwrap().local.translation;
        assert!((hips - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert_eq!(mixer.action(up).unwrap().time(), 0.0);
    }

    #[test]
    fn test_advance_moves_only_unpaused() {
        let (skeleton, clips) = fixture();
        let mut mixer = Mixer::new();
        let up = mixer.clip_action(&clips, &skeleton, 0).unwrap();
        let side = mixer.clip_action(&clips, &skeleton, 1).unwrap();
        activate(&mut mixer, up, 1.0);
        activate(&mut mixer, side, 1.0);
        mixer.action_mut(side).unwrap().set_paused(true);

        mixer.advance(0.5);
        assert!((mixer.action(up).unwrap().time() - 0.5).abs() < 1e-5);
        assert_eq!(mixer.action(side).unwrap().time(), 0.0);
    }
}
