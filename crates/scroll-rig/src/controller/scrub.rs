//! Pose scrubber: drive a single action by normalized progress

use crate::animation::{ActionId, Rig};

/// Clip time in seconds for normalized `progress`
///
/// Progress 0 is the first frame and progress 1 the last; NaN maps to the
/// first frame.
pub fn clip_time(progress: f32, duration: f32) -> f32 {
    if progress.is_nan() || !duration.is_finite() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0) * duration.max(0.0)
}

/// Sets an action's time from progress instead of letting it advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseScrubber {
    action: ActionId,
}

impl PoseScrubber {
    pub fn new(action: ActionId) -> Self {
        Self { action }
    }

    /// Set the action's time from `progress` without evaluating the pose
    ///
    /// Returns the clip time, or None if the action does not exist.
    pub fn seek(&self, rig: &mut Rig, progress: f32) -> Option<f32> {
        let action = rig.action_mut(self.action)?;
        let time = clip_time(progress, action.duration());
        action.set_time(time);
        Some(time)
    }

    /// Park the action on its last frame
    pub fn hold_end(&self, rig: &mut Rig) -> Option<f32> {
        self.seek(rig, 1.0)
    }
}
