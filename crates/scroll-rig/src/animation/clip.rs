//! Animation clips: named sets of per-bone keyframe tracks

use glam::{Quat, Vec3};

use super::track::Track;
use crate::error::{Result, RigError};

/// Keyframe tracks targeting one bone, addressed by bone name
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneTrack {
    pub bone: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub translation: Option<Track<Vec3>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: Option<Track<Quat>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scale: Option<Track<Vec3>>,
}

impl BoneTrack {
    pub fn new(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            translation: None,
            rotation: None,
            scale: None,
        }
    }

    pub fn with_translation(mut self, track: Track<Vec3>) -> Self {
        self.translation = Some(track);
        self
    }

    pub fn with_rotation(mut self, track: Track<Quat>) -> Self {
        self.rotation = Some(track);
        self
    }

    pub fn with_scale(mut self, track: Track<Vec3>) -> Self {
        self.scale = Some(track);
        self
    }

    fn end_time(&self) -> f32 {
        [
            self.translation.as_ref().map(Track::end_time),
            self.rotation.as_ref().map(Track::end_time),
            self.scale.as_ref().map(Track::end_time),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
    }
}

/// A named animation clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    tracks: Vec<BoneTrack>,
}

impl AnimationClip {
    /// Create a clip whose duration is its last keyframe time
    pub fn new(name: impl Into<String>, tracks: Vec<BoneTrack>) -> Result<Self> {
        let duration = tracks.iter().map(BoneTrack::end_time).fold(0.0, f32::max);
        Self::with_duration(name, duration, tracks)
    }

    /// Create a clip with an explicit duration
    ///
    /// The duration may exceed the last keyframe (the final pose is held),
    /// but never undercut it.
    pub fn with_duration(
        name: impl Into<String>,
        duration: f32,
        tracks: Vec<BoneTrack>,
    ) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| RigError::InvalidClip {
            clip: name.clone(),
            reason,
        };

        if !duration.is_finite() || duration < 0.0 {
            return Err(invalid(format!("duration {duration} is not a valid length")));
        }

        for track in &tracks {
            let checks = [
                track.translation.as_ref().map(Track::check),
                track.rotation.as_ref().map(Track::check),
                track.scale.as_ref().map(Track::check),
            ];
            for check in checks.into_iter().flatten() {
                check.map_err(|reason| invalid(format!("bone '{}': {reason}", track.bone)))?;
            }
            if track.end_time() > duration {
                return Err(invalid(format!(
                    "bone '{}' has keyframes past the clip duration {duration}",
                    track.bone
                )));
            }
        }

        Ok(Self {
            name,
            duration,
            tracks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clip length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }
}
