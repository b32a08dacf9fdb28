//! Skeletal animation substrate
//!
//! This module provides the minimal rig the controller drives:
//! - Bone hierarchy with rest/local poses and world matrices
//! - Keyframe tracks with step and linear interpolation
//! - Clips grouping per-bone tracks
//! - Actions (clip playback state) and a mixer that blends them
//! - Morph-target weights
//!
//! # Example
//!
//! ```rust
//! use scroll_rig::animation::{AnimationClip, BoneTrack, RigBuilder, Track, Transform};
//! use scroll_rig::glam::Vec3;
//!
//! let mut rig = RigBuilder::new()
//!     .bone("Hips", None, Transform::from_translation(Vec3::Y))
//!     .clip(AnimationClip::new(
//!         "Rise",
//!         vec![BoneTrack::new("Hips").with_translation(Track::linear(
//!             vec![0.0, 1.0],
//!             vec![Vec3::Y, Vec3::new(0.0, 2.0, 0.0)],
//!         ))],
//!     )?)
//!     .build()?;
//!
//! let rise = rig.clip_action("Rise")?;
//! let action = rig.action_mut(rise).unwrap();
//! action.reset();
//! action.set_weight(1.0);
//! action.play();
//! action.set_time(0.5);
//! rig.apply_pose();
//! # Ok::<(), scroll_rig::RigError>(())
//! ```

mod action;
mod clip;
mod mixer;
mod rig;
mod skeleton;
mod track;

pub use action::{Action, ActionId, LoopMode};
pub use clip::{AnimationClip, BoneTrack};
pub use mixer::Mixer;
pub use rig::{BoneDescription, ClipDescription, MorphTargets, Rig, RigBuilder, RigDescription};
pub use skeleton::{Bone, BoneId, Skeleton, Transform};
pub use track::{Interpolation, Lerp, Track, find_keyframe_index};
