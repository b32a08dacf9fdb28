//! Pointer-driven head look-at

use glam::{EulerRot, Quat, Vec2};

use crate::animation::Skeleton;
use crate::controller::BoneRefs;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LookAtConfig {
    /// Yaw at the horizontal edge of the viewport, radians
    pub max_yaw: f32,
    /// Pitch at the vertical edge of the viewport, radians
    pub max_pitch: f32,
    /// Share of the rotation given to the neck; the head takes the rest
    pub neck_share: f32,
    /// Exponential smoothing rate per second
    pub smoothing: f32,
}

impl Default for LookAtConfig {
    fn default() -> Self {
        Self {
            max_yaw: 0.5,
            max_pitch: 0.3,
            neck_share: 0.35,
            smoothing: 8.0,
        }
    }
}

/// Clamp a pointer into [-1, 1]^2; non-finite coordinates mean no pointer
pub fn sanitize_pointer(pointer: Option<Vec2>) -> Option<Vec2> {
    pointer
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(Vec2::NEG_ONE, Vec2::ONE))
}

/// Smoothed head orientation following the pointer
///
/// Without a pointer the head eases back to the evaluated pose.
#[derive(Debug, Clone, Default)]
pub struct HeadLookAt {
    config: LookAtConfig,
    target: Option<Vec2>,
    current: Vec2,
}

impl HeadLookAt {
    pub fn new(config: LookAtConfig) -> Self {
        Self {
            config,
            target: None,
            current: Vec2::ZERO,
        }
    }

    /// Pointer in normalized viewport coordinates, +Y up
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.target = sanitize_pointer(pointer);
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.target
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = Vec2::ZERO;
    }

    pub fn update(&mut self, delta_time: f32) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }
        let goal = self.target.unwrap_or(Vec2::ZERO);
        let alpha = 1.0 - (-self.config.smoothing.max(0.0) * delta_time).exp();
        self.current += (goal - self.current) * alpha;
    }

    /// Yaw and pitch in radians for the current smoothed pointer
    pub fn angles(&self) -> (f32, f32) {
        (
            self.current.x * self.config.max_yaw,
            self.current.y * self.config.max_pitch,
        )
    }

    pub fn apply(&self, skeleton: &mut Skeleton, bones: &BoneRefs) {
        if self.current == Vec2::ZERO {
            return;
        }
        let Some(head) = bones.head else {
            return;
        };

        let (yaw, pitch) = self.angles();
        let neck_share = match bones.neck {
            Some(_) => self.config.neck_share.clamp(0.0, 1.0),
            None => 0.0,
        };

        if let Some(neck) = bones.neck.and_then(|id| skeleton.bone_mut(id)) {
            neck.local.rotation = (neck.local.rotation * offset(yaw, pitch, neck_share)).normalize();
        }
        if let Some(bone) = skeleton.bone_mut(head) {
            bone.local.rotation =
                (bone.local.rotation * offset(yaw, pitch, 1.0 - neck_share)).normalize();
        }
    }
}

/// Pitch is about -X so that a pointer above center tilts the face up
fn offset(yaw: f32, pitch: f32, share: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw * share, -pitch * share, 0.0)
}
