//! Breathing and idle sway as a function of accumulated time

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::animation::Skeleton;
use crate::controller::BoneRefs;

/// Amplitudes in radians (rotation) or fractions (scale), frequencies in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwayConfig {
    pub breath_frequency: f32,
    /// Peak chest expansion as a fraction of the spine scale
    pub breath_amplitude: f32,
    pub sway_frequency: f32,
    pub head_amplitude: f32,
    pub arm_amplitude: f32,
}

impl Default for SwayConfig {
    fn default() -> Self {
        Self {
            breath_frequency: 0.25,
            breath_amplitude: 0.015,
            sway_frequency: 0.12,
            head_amplitude: 0.035,
            arm_amplitude: 0.04,
        }
    }
}

/// Offsets for one instant of the sway cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwayOffsets {
    pub spine_scale: Vec3,
    pub head: Quat,
    pub left_arm: Quat,
    pub right_arm: Quat,
}

#[derive(Debug, Clone, Default)]
pub struct Sway {
    config: SwayConfig,
    elapsed: f32,
}

impl Sway {
    pub fn new(config: SwayConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn advance(&mut self, delta_time: f32) {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed += delta_time;
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn offsets(&self) -> SwayOffsets {
        let c = &self.config;
        let breath = (self.elapsed * c.breath_frequency * TAU).sin();
        let sway = (self.elapsed * c.sway_frequency * TAU).sin();
        // Arms lag the torso by a quarter cycle
        let arms = (self.elapsed * c.sway_frequency * TAU + TAU / 4.0).sin();

        let expansion = breath * c.breath_amplitude;
        SwayOffsets {
            spine_scale: Vec3::new(1.0 + expansion, 1.0 + expansion * 0.5, 1.0 + expansion),
            head: Quat::from_rotation_z(sway * c.head_amplitude),
            left_arm: Quat::from_rotation_z(arms * c.arm_amplitude),
            right_arm: Quat::from_rotation_z(-arms * c.arm_amplitude),
        }
    }

    /// Layer the current offsets onto the evaluated local pose
    pub fn apply(&self, skeleton: &mut Skeleton, bones: &BoneRefs) {
        let offsets = self.offsets();
        if let Some(bone) = bones.spine.and_then(|id| skeleton.bone_mut(id)) {
            bone.local.scale *= offsets.spine_scale;
        }
        let rotations = [
            (bones.head, offsets.head),
            (bones.left_arm, offsets.left_arm),
            (bones.right_arm, offsets.right_arm),
        ];
        for (id, offset) in rotations {
            if let Some(bone) = id.and_then(|id| skeleton.bone_mut(id)) {
                bone.local.rotation = (bone.local.rotation * offset).normalize();
            }
        }
    }
}
