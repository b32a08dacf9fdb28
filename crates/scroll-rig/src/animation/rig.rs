//! A loaded character: skeleton, clips, mixer and morph targets

use glam::{Quat, Vec3};
use log::debug;

use super::action::{Action, ActionId};
use super::clip::{AnimationClip, BoneTrack};
use super::mixer::Mixer;
use super::skeleton::{Bone, BoneId, Skeleton, Transform};
use crate::error::{Result, RigError};

/// Named morph-target weights of the character mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphTargets {
    names: Vec<String>,
    weights: Vec<f32>,
}

impl MorphTargets {
    pub fn new(names: Vec<String>) -> Self {
        let weights = vec![0.0; names.len()];
        Self { names, weights }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find the first target whose name contains `pattern`, case-insensitively
    pub fn find(&self, pattern: &str) -> Option<usize> {
        let pattern = pattern.to_lowercase();
        self.names
            .iter()
            .position(|name| name.to_lowercase().contains(&pattern))
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn weight(&self, index: usize) -> Option<f32> {
        self.weights.get(index).copied()
    }

    pub fn set_weight(&mut self, index: usize, weight: f32) {
        if let Some(slot) = self.weights.get_mut(index) {
            *slot = if weight.is_finite() {
                weight.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Everything the asset loader delivers for the one character
#[derive(Debug, Clone)]
pub struct Rig {
    skeleton: Skeleton,
    clips: Vec<AnimationClip>,
    mixer: Mixer,
    morphs: MorphTargets,
}

impl Rig {
    pub fn new(skeleton: Skeleton, clips: Vec<AnimationClip>, morphs: MorphTargets) -> Self {
        Self {
            skeleton,
            clips,
            mixer: Mixer::new(),
            morphs,
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Find a clip by exact name, falling back to a case-insensitive match
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips
            .iter()
            .position(|c| c.name() == name)
            .or_else(|| {
                self.clips
                    .iter()
                    .position(|c| c.name().eq_ignore_ascii_case(name))
            })
    }

    /// Get the action bound to a named clip, creating it on first use
    pub fn clip_action(&mut self, name: &str) -> Result<ActionId> {
        let index = self
            .clip_index(name)
            .ok_or_else(|| RigError::MissingClip(name.to_string()))?;
        self.mixer
            .clip_action(&self.clips, &self.skeleton, index)
            .ok_or_else(|| RigError::MissingClip(name.to_string()))
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.mixer.action(id)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.mixer.action_mut(id)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &Action)> {
        self.mixer.actions()
    }

    /// Name of the clip an action plays
    pub fn action_clip_name(&self, id: ActionId) -> Option<&str> {
        let action = self.mixer.action(id)?;
        self.clips.get(action.clip_index()).map(AnimationClip::name)
    }

    /// Advance time-driven actions by wall-clock seconds
    pub fn advance(&mut self, delta_time: f32) {
        self.mixer.advance(delta_time);
    }

    /// Force-apply the blended pose of all actions at their current times
    pub fn apply_pose(&mut self) -> bool {
        self.mixer.apply(&self.clips, &mut self.skeleton)
    }

    /// Pose the skeleton from one action at `time`, leaving playback state alone
    pub fn pose_action_at(&mut self, id: ActionId, time: f32) -> bool {
        self.mixer
            .apply_single(&self.clips, &mut self.skeleton, id, time)
    }

    pub fn morphs(&self) -> &MorphTargets {
        &self.morphs
    }

    pub fn morphs_mut(&mut self) -> &mut MorphTargets {
        &mut self.morphs
    }
}

/// Incremental construction of a rig, resolving parents by name
#[derive(Debug, Default)]
pub struct RigBuilder {
    bones: Vec<(String, Option<String>, Transform)>,
    clips: Vec<AnimationClip>,
    morphs: Vec<String>,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone; its parent must already have been added
    pub fn bone(mut self, name: &str, parent: Option<&str>, rest: Transform) -> Self {
        self.bones
            .push((name.to_string(), parent.map(str::to_string), rest));
        self
    }

    pub fn clip(mut self, clip: AnimationClip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn morph_target(mut self, name: &str) -> Self {
        self.morphs.push(name.to_string());
        self
    }

    pub fn build(self) -> Result<Rig> {
        let mut bones: Vec<Bone> = Vec::with_capacity(self.bones.len());
        for (name, parent, rest) in self.bones {
            let parent = match parent {
                Some(parent_name) => Some(
                    bones
                        .iter()
                        .position(|b| b.name == parent_name)
                        .map(BoneId)
                        .ok_or_else(|| {
                            RigError::InvalidSkeleton(format!(
                                "bone '{name}' names parent '{parent_name}' which was not added before it"
                            ))
                        })?,
                ),
                None => None,
            };
            bones.push(Bone::new(name, parent, rest));
        }

        let skeleton = Skeleton::new(bones)?;
        debug!(
            "Built rig with {} bones, {} clips, {} morph targets",
            skeleton.len(),
            self.clips.len(),
            self.morphs.len()
        );
        Ok(Rig::new(skeleton, self.clips, MorphTargets::new(self.morphs)))
    }
}

/// Serializable description of a bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneDescription {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub translation: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: Quat,
    #[cfg_attr(feature = "serde", serde(default = "unit_scale"))]
    pub scale: Vec3,
}

#[cfg(feature = "serde")]
fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// Serializable description of a clip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipDescription {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<f32>,
    pub tracks: Vec<BoneTrack>,
}

/// Serializable stand-in for a loaded asset
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigDescription {
    pub bones: Vec<BoneDescription>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub clips: Vec<ClipDescription>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub morph_targets: Vec<String>,
}

impl RigDescription {
    /// Validate and build the rig
    pub fn build(&self) -> Result<Rig> {
        let mut builder = RigBuilder::new();
        for bone in &self.bones {
            builder = builder.bone(
                &bone.name,
                bone.parent.as_deref(),
                Transform {
                    translation: bone.translation,
                    rotation: bone.rotation.normalize(),
                    scale: bone.scale,
                },
            );
        }
        for clip in &self.clips {
            let clip = match clip.duration {
                Some(duration) => {
                    AnimationClip::with_duration(&clip.name, duration, clip.tracks.clone())?
                }
                None => AnimationClip::new(&clip.name, clip.tracks.clone())?,
            };
            builder = builder.clip(clip);
        }
        for morph in &self.morph_targets {
            builder = builder.morph_target(morph);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::track::Track;

    fn rig() -> Rig {
        RigBuilder::new()
            .bone("Hips", None, Transform::from_translation(Vec3::Y))
            .bone("Head", Some("Hips"), Transform::from_translation(Vec3::Y))
            .clip(
                AnimationClip::new(
                    "Idle",
                    vec![BoneTrack::new("Hips").with_translation(Track::linear(
                        vec![0.0, 2.0],
                        vec![Vec3::Y, Vec3::new(0.0, 1.1, 0.0)],
                    ))],
                )
                .unwrap(),
            )
            .morph_target("Face.EyeBlink")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_resolves_parents() {
        let rig = rig();
        let head = rig.skeleton().find("Head").unwrap();
        assert_eq!(rig.skeleton().bone(head).unwrap().parent, Some(BoneId(0)));
    }

    #[test]
    fn test_builder_rejects_unknown_parent() {
        let result = RigBuilder::new()
            .bone("Head", Some("Neck"), Transform::IDENTITY)
            .build();
        assert!(matches!(result, Err(RigError::InvalidSkeleton(_))));
    }

    #[test]
    fn test_clip_action_missing_clip() {
        let mut rig = rig();
        assert_eq!(
            rig.clip_action("Dance"),
            Err(RigError::MissingClip("Dance".to_string()))
        );
    }

    #[test]
    fn test_clip_lookup_case_insensitive_fallback() {
        let mut rig = rig();
        let id = rig.clip_action("idle").unwrap();
        assert_eq!(rig.action_clip_name(id), Some("Idle"));
    }

    #[test]
    fn test_morph_targets() {
        let mut rig = rig();
        let blink = rig.morphs().find("blink").unwrap();
        rig.morphs_mut().set_weight(blink, 2.0);
        assert_eq!(rig.morphs().weight(blink), Some(1.0));
        rig.morphs_mut().set_weight(blink, f32::NAN);
        assert_eq!(rig.morphs().weight(blink), Some(0.0));
    }

    #[test]
    fn test_description_builds_rig() {
        let description = RigDescription {
            bones: vec![BoneDescription {
                name: "Hips".to_string(),
                parent: None,
                translation: Vec3::Y,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
            }],
            clips: vec![ClipDescription {
                name: "Idle".to_string(),
                duration: Some(3.0),
                tracks: vec![BoneTrack::new("Hips").with_translation(Track::constant(Vec3::Y))],
            }],
            morph_targets: vec![],
        };
        let rig = description.build().unwrap();
        assert_eq!(rig.clips()[0].duration(), 3.0);
    }
}
