//! Camera rail: progress to camera and character base positions
//!
//! Both mappings are pure functions of progress. Only Y moves for the
//! camera; the character base follows the camera down by a fixed offset
//! and slides from a far to a near Z across the whole scroll.

use glam::Vec3;

use crate::scroll::sanitize_progress;

/// Linear camera path along Y
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraRail {
    /// Camera Y at progress 0
    pub start_y: f32,
    /// Camera Y at progress 1
    pub end_y: f32,
    /// Fixed camera X
    pub x: f32,
    /// Fixed camera Z
    pub z: f32,
    /// Fixed downward tilt in radians
    pub tilt: f32,
    /// Character base sits this far below the camera
    pub vertical_offset: f32,
    /// Character Z at progress 0
    pub character_z_far: f32,
    /// Character Z at progress 1
    pub character_z_near: f32,
}

impl Default for CameraRail {
    fn default() -> Self {
        Self {
            start_y: 1.4,
            end_y: 7.4,
            x: 0.0,
            z: 4.0,
            tilt: -0.08,
            vertical_offset: 1.4,
            character_z_far: -1.0,
            character_z_near: 0.5,
        }
    }
}

impl CameraRail {
    /// Camera position at progress 0
    pub fn start_position(&self) -> Vec3 {
        Vec3::new(self.x, self.start_y, self.z)
    }

    /// Camera position at progress 1
    pub fn end_position(&self) -> Vec3 {
        Vec3::new(self.x, self.end_y, self.z)
    }

    /// Camera world position for `progress`
    pub fn camera_position(&self, progress: f32) -> Vec3 {
        let t = sanitize_progress(progress);
        Vec3::new(self.x, interpolate(self.start_y, self.end_y, t), self.z)
    }

    /// Camera tilt (pitch) in radians; constant along the rail
    pub fn camera_tilt(&self) -> f32 {
        self.tilt
    }

    /// Character root position before drift compensation
    pub fn character_base(&self, progress: f32) -> Vec3 {
        let t = sanitize_progress(progress);
        Vec3::new(
            0.0,
            self.camera_position(t).y - self.vertical_offset,
            interpolate(self.character_z_far, self.character_z_near, t),
        )
    }
}

/// Linear interpolation that hits both ends exactly and never overshoots
fn interpolate(start: f32, end: f32, t: f32) -> f32 {
    if t >= 1.0 {
        return end;
    }
    let value = start + (end - start) * t;
    value.clamp(start.min(end), start.max(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        let rail = CameraRail::default();
        assert_eq!(rail.camera_position(0.0), rail.start_position());
        assert_eq!(rail.camera_position(1.0), rail.end_position());
    }

    #[test]
    fn test_camera_y_is_monotonic() {
        let rail = CameraRail::default();
        let mut previous = rail.camera_position(0.0).y;
        for step in 1..=1000 {
            let y = rail.camera_position(step as f32 / 1000.0).y;
            assert!(y >= previous, "camera Y decreased at step {step}");
            previous = y;
        }
    }

    #[test]
    fn test_only_y_moves() {
        let rail = CameraRail::default();
        let a = rail.camera_position(0.2);
        let b = rail.camera_position(0.7);
        assert_eq!(a.x, b.x);
        assert_eq!(a.z, b.z);
        assert!(b.y > a.y);
    }

    #[test]
    fn test_character_base() {
        let rail = CameraRail::default();
        let start = rail.character_base(0.0);
        assert_eq!(start, Vec3::new(0.0, 0.0, -1.0));
        let end = rail.character_base(1.0);
        assert_eq!(end, Vec3::new(0.0, 7.4 - 1.4, 0.5));
        let mid = rail.character_base(0.5);
        assert!((mid.z - (-0.25)).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_progress_is_clamped() {
        let rail = CameraRail::default();
        assert_eq!(rail.camera_position(f32::NAN), rail.start_position());
        assert_eq!(rail.camera_position(4.0), rail.end_position());
        assert!(rail.character_base(f32::NAN).is_finite());
    }
}
