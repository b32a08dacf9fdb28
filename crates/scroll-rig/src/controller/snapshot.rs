//! Read-only view of the controller state for debugging and tooling

use std::fmt;

use glam::Vec3;

use super::phase::PhaseKind;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    pub progress: f32,
    pub phase: Option<PhaseKind>,
    pub phase_name: Option<String>,
    pub phase_index: Option<usize>,
    pub local_progress: f32,
    pub clip: Option<String>,
    pub clip_time: Option<f32>,
    pub clip_duration: Option<f32>,
    pub camera_position: Vec3,
    pub camera_tilt: f32,
    pub root_translation: Vec3,
    pub root_yaw: f32,
    pub hip: Option<Vec3>,
    pub drift_anchor: Option<Vec3>,
    pub drift_correction: Vec3,
    pub secondary_active: bool,
    pub transitions: u64,
    pub frames: u64,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p={:.4} phase={} local={:.4}",
            self.progress,
            self.phase_name.as_deref().unwrap_or("-"),
            self.local_progress
        )?;
        if let (Some(clip), Some(time)) = (&self.clip, self.clip_time) {
            write!(f, " clip={clip}@{time:.3}s")?;
        }
        write!(
            f,
            " camera_y={:.3} root=({:.3}, {:.3}, {:.3})",
            self.camera_position.y,
            self.root_translation.x,
            self.root_translation.y,
            self.root_translation.z
        )?;
        if self.drift_anchor.is_some() {
            write!(
                f,
                " drift=({:.3}, {:.3}, {:.3})",
                self.drift_correction.x, self.drift_correction.y, self.drift_correction.z
            )?;
        }
        Ok(())
    }
}
