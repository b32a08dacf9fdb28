//! Randomized blinking

use glam::Quat;
use log::{debug, trace};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::animation::{BoneId, Rig};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlinkConfig {
    /// Shortest wait between blinks, seconds
    pub min_delay: f32,
    /// Longest wait between blinks, seconds
    pub max_delay: f32,
    /// Length of one blink, seconds
    pub duration: f32,
    /// Eyelid rotation at full closure when no blink morph exists, radians
    pub eyelid_angle: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            min_delay: 1.0,
            max_delay: 3.0,
            duration: 0.18,
            eyelid_angle: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlinkState {
    Disarmed,
    Waiting { remaining: f32 },
    Blinking { elapsed: f32 },
}

/// Eye closure for normalized blink time `t` in [0, 1]
///
/// Rises over the first half and falls over the second, smoothstepped at
/// both ends.
pub fn blink_envelope(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let triangle = 1.0 - (2.0 * t - 1.0).abs();
    triangle * triangle * (3.0 - 2.0 * triangle)
}

/// Schedules blinks at uniformly random intervals
#[derive(Debug, Clone)]
pub struct BlinkScheduler {
    config: BlinkConfig,
    state: BlinkState,
    rng: StdRng,
}

impl BlinkScheduler {
    /// A fixed `seed` makes the delay sequence reproducible
    pub fn new(config: BlinkConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            state: BlinkState::Disarmed,
            rng,
        }
    }

    pub fn state(&self) -> BlinkState {
        self.state
    }

    /// Start waiting for the next blink
    pub fn arm(&mut self) {
        let remaining = self.next_delay();
        trace!("Next blink in {remaining:.2}s");
        self.state = BlinkState::Waiting { remaining };
    }

    pub fn disarm(&mut self) {
        self.state = BlinkState::Disarmed;
    }

    fn next_delay(&mut self) -> f32 {
        let min = self.config.min_delay.max(0.0);
        let max = self.config.max_delay;
        if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        }
    }

    /// Advance by wall-clock time and return the closure weight in [0, 1]
    pub fn advance(&mut self, delta_time: f32) -> f32 {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };

        self.state = match self.state {
            BlinkState::Disarmed => BlinkState::Disarmed,
            BlinkState::Waiting { remaining } => {
                let remaining = remaining - delta_time;
                if remaining <= 0.0 {
                    BlinkState::Blinking { elapsed: 0.0 }
                } else {
                    BlinkState::Waiting { remaining }
                }
            }
            BlinkState::Blinking { elapsed } => {
                let elapsed = elapsed + delta_time;
                if elapsed >= self.config.duration {
                    BlinkState::Waiting {
                        remaining: self.next_delay(),
                    }
                } else {
                    BlinkState::Blinking { elapsed }
                }
            }
        };
        self.weight()
    }

    pub fn weight(&self) -> f32 {
        match self.state {
            BlinkState::Blinking { elapsed } if self.config.duration > 0.0 => {
                blink_envelope(elapsed / self.config.duration)
            }
            _ => 0.0,
        }
    }
}

/// What a blink moves on the character
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BlinkTarget {
    /// Index of a blink morph target
    Morph(usize),
    /// Eyelid bones rotated about X
    Eyelids(Vec<BoneId>),
    #[default]
    None,
}

impl BlinkTarget {
    /// Prefer a morph target whose name contains "blink", else eyelid bones
    pub fn resolve(rig: &Rig, eyelids: &[BoneId]) -> Self {
        let target = if let Some(index) = rig.morphs().find("blink") {
            Self::Morph(index)
        } else if !eyelids.is_empty() {
            Self::Eyelids(eyelids.to_vec())
        } else {
            Self::None
        };
        debug!("Blink target: {target:?}");
        target
    }

    pub fn apply(&self, rig: &mut Rig, weight: f32, eyelid_angle: f32) {
        match self {
            Self::Morph(index) => rig.morphs_mut().set_weight(*index, weight),
            Self::Eyelids(bones) => {
                if weight <= 0.0 {
                    return;
                }
                let offset = Quat::from_rotation_x(weight * eyelid_angle);
                let skeleton = rig.skeleton_mut();
                for id in bones {
                    if let Some(bone) = skeleton.bone_mut(*id) {
                        bone.local.rotation = (bone.local.rotation * offset).normalize();
                    }
                }
            }
            Self::None => {}
        }
    }

    /// Open the eyes; only morph weights persist between frames
    pub fn release(&self, rig: &mut Rig) {
        if let Self::Morph(index) = self {
            rig.morphs_mut().set_weight(*index, 0.0);
        }
    }
}
