//! Root-motion removal for clips that move the hip
//!
//! The anchor is the hip position relative to the character root's
//! translation, so it follows the camera rail while the phase runs. It is
//! sampled from the pose the character holds on the far side of the seam,
//! which keeps the hip continuous when the compensated phase is entered.

use glam::{Quat, Vec3};
use log::{debug, trace};

use crate::animation::{ActionId, BoneId, Rig, Skeleton};

/// Cached hip anchor and the last correction applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftCompensator {
    anchor: Option<Vec3>,
    correction: Vec3,
}

impl DriftCompensator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    /// Offset added to the root translation on the last compensated frame
    pub fn correction(&self) -> Vec3 {
        self.correction
    }

    /// Drop the anchor; called whenever a compensated phase is left
    pub fn invalidate(&mut self) {
        if self.anchor.take().is_some() {
            debug!("Drift anchor invalidated");
        }
        self.correction = Vec3::ZERO;
    }

    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = Some(anchor);
    }

    /// Sample `action` at `time` with the root yawed to `yaw` and cache
    /// where the hip lands relative to the root
    ///
    /// The root transform and local pose are restored afterwards.
    pub fn capture(
        &mut self,
        rig: &mut Rig,
        hip: BoneId,
        action: ActionId,
        time: f32,
        yaw: f32,
    ) -> Option<Vec3> {
        let saved_root = *rig.skeleton().root();
        let saved_pose = rig.skeleton().local_poses();
        rig.skeleton_mut().root_mut().rotation = Quat::from_rotation_y(yaw);

        let anchor = if rig.pose_action_at(action, time) {
            let skeleton = rig.skeleton_mut();
            skeleton.update_world();
            skeleton
                .world_position(hip)
                .map(|hip_world| hip_world - skeleton.root().translation)
        } else {
            None
        };

        let skeleton = rig.skeleton_mut();
        *skeleton.root_mut() = saved_root;
        skeleton.set_local_poses(&saved_pose);
        skeleton.update_world();

        if let Some(anchor) = anchor {
            debug!("Captured drift anchor {anchor:?}");
            self.anchor = Some(anchor);
        }
        anchor
    }

    /// Shift the root so the hip sits on the anchor, then refresh world matrices
    ///
    /// Returns the correction, or None when no anchor is cached.
    pub fn compensate(&mut self, skeleton: &mut Skeleton, hip: BoneId) -> Option<Vec3> {
        let anchor = self.anchor?;
        skeleton.update_world();
        let hip_world = skeleton.world_position(hip)?;
        let relative = hip_world - skeleton.root().translation;
        let correction = anchor - relative;
        if !correction.is_finite() {
            return None;
        }

        skeleton.root_mut().translation += correction;
        skeleton.update_world();
        self.correction = correction;
        trace!("Drift correction {correction:?}");
        Some(correction)
    }
}
