//! Playback state of a clip bound to the skeleton

/// What happens when playback reaches the end of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoopMode {
    /// Clamp at the last frame
    #[default]
    Once,
    /// Wrap around to the start
    Repeat,
}

/// Handle to an action owned by the mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub(crate) usize);

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A clip bound to the skeleton, with its own time, weight and flags
///
/// Weight only contributes to the pose while the action is both enabled
/// and playing.
#[derive(Debug, Clone)]
pub struct Action {
    clip: usize,
    duration: f32,
    time: f32,
    weight: f32,
    time_scale: f32,
    loop_mode: LoopMode,
    paused: bool,
    enabled: bool,
    playing: bool,
}

impl Action {
    pub(crate) fn new(clip: usize, duration: f32) -> Self {
        Self {
            clip,
            duration,
            time: 0.0,
            weight: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Once,
            paused: false,
            enabled: false,
            playing: false,
        }
    }

    /// Index of the bound clip within the rig
    pub fn clip_index(&self) -> usize {
        self.clip
    }

    /// Length of the bound clip in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Current clip time in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Set clip time directly, clamped to the clip
    pub fn set_time(&mut self, time: f32) {
        self.time = if time.is_finite() {
            time.clamp(0.0, self.duration)
        } else {
            0.0
        };
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = if weight.is_finite() {
            weight.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Weight this action actually contributes to the pose
    pub fn effective_weight(&self) -> f32 {
        if self.enabled && self.playing {
            self.weight
        } else {
            0.0
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        if time_scale.is_finite() {
            self.time_scale = time_scale;
        }
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop(&mut self, loop_mode: LoopMode) {
        self.loop_mode = loop_mode;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start contributing to the pose
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    /// Rewind to the first frame and re-enable
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.enabled = true;
    }

    /// Advance by wall-clock time; no-op while paused, disabled or stopped
    pub(crate) fn advance(&mut self, delta_time: f32) {
        if !self.enabled || !self.playing || self.paused {
            return;
        }
        if !delta_time.is_finite() {
            return;
        }

        let time = self.time + delta_time * self.time_scale;
        self.time = match self.loop_mode {
            LoopMode::Repeat if self.duration > 0.0 => time.rem_euclid(self.duration),
            _ => time.clamp(0.0, self.duration),
        };
    }
}
