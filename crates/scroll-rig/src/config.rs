//! Top-level configuration
//!
//! Every field has a hand-tuned default, so an empty YAML or JSON document
//! is a valid configuration when the `serde` feature is enabled.

use crate::camera::CameraRail;
use crate::controller::{Phase, PhaseTable, default_phases};
use crate::error::{Result, RigError};
use crate::scroll::ScrollConfig;
use crate::secondary::SecondaryConfig;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RigConfig {
    pub phases: Vec<Phase>,
    pub camera: CameraRail,
    pub secondary: SecondaryConfig,
    pub scroll: ScrollConfig,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            phases: default_phases(),
            camera: CameraRail::default(),
            secondary: SecondaryConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

impl RigConfig {
    /// Build the validated phase table
    pub fn phase_table(&self) -> Result<PhaseTable> {
        PhaseTable::new(self.phases.clone())
    }

    /// Check every section, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        self.phase_table()?;

        let camera = &self.camera;
        let camera_values = [
            camera.start_y,
            camera.end_y,
            camera.x,
            camera.z,
            camera.tilt,
            camera.vertical_offset,
            camera.character_z_far,
            camera.character_z_near,
        ];
        if camera_values.iter().any(|v| !v.is_finite()) {
            return Err(RigError::InvalidConfig(
                "camera rail has a non-finite value".to_string(),
            ));
        }
        if camera.end_y < camera.start_y {
            return Err(RigError::InvalidConfig(format!(
                "camera end_y {} is below start_y {}",
                camera.end_y, camera.start_y
            )));
        }

        let blink = &self.secondary.blink;
        if !(blink.min_delay >= 0.0 && blink.max_delay >= blink.min_delay) {
            return Err(RigError::InvalidConfig(format!(
                "blink delay range [{}, {}] is invalid",
                blink.min_delay, blink.max_delay
            )));
        }
        if !(blink.duration > 0.0 && blink.duration.is_finite()) {
            return Err(RigError::InvalidConfig(format!(
                "blink duration {} must be positive",
                blink.duration
            )));
        }

        let look_at = &self.secondary.look_at;
        if !(0.0..=1.0).contains(&look_at.neck_share) {
            return Err(RigError::InvalidConfig(format!(
                "look-at neck_share {} outside [0, 1]",
                look_at.neck_share
            )));
        }
        if !(look_at.smoothing >= 0.0 && look_at.smoothing.is_finite()) {
            return Err(RigError::InvalidConfig(format!(
                "look-at smoothing {} must be non-negative",
                look_at.smoothing
            )));
        }

        let interval = self.scroll.min_interval;
        if !(interval >= 0.0 && interval.is_finite()) {
            return Err(RigError::InvalidConfig(format!(
                "scroll min_interval {interval} must be non-negative"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PhaseKind;

    #[test]
    fn test_default_is_valid() {
        RigConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_phases() {
        let config = RigConfig {
            phases: vec![Phase::new(PhaseKind::Idle, 0.0, 0.5)],
            ..RigConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RigError::InvalidPhaseTable(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_blink_range() {
        let mut config = RigConfig::default();
        config.secondary.blink.min_delay = 4.0;
        assert!(matches!(config.validate(), Err(RigError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_descending_camera() {
        let mut config = RigConfig::default();
        config.camera.end_y = 0.0;
        assert!(matches!(config.validate(), Err(RigError::InvalidConfig(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RigConfig = serde_json::from_str(
            r#"{
                "camera": { "end_y": 10.0 },
                "secondary": { "seed": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.camera.end_y, 10.0);
        assert_eq!(config.camera.start_y, CameraRail::default().start_y);
        assert_eq!(config.secondary.seed, Some(3));
        assert_eq!(config.phases, default_phases());
    }
}
