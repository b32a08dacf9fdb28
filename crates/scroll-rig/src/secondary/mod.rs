//! Idle-only procedural motion layered over the evaluated pose
//!
//! Breathing/sway, pointer look-at and blinking. The controller calls
//! `update` after the clip pose has been applied, so every offset here is
//! relative to that frame's evaluated pose and nothing accumulates across
//! frames.

mod blink;
mod look_at;
mod sway;

pub use blink::{BlinkConfig, BlinkScheduler, BlinkState, BlinkTarget, blink_envelope};
pub use look_at::{HeadLookAt, LookAtConfig, sanitize_pointer};
pub use sway::{Sway, SwayConfig, SwayOffsets};

use glam::Vec2;
use log::debug;

use crate::animation::Rig;
use crate::controller::BoneRefs;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SecondaryConfig {
    pub sway: SwayConfig,
    pub look_at: LookAtConfig,
    pub blink: BlinkConfig,
    /// Seed for the blink RNG; unset draws from the OS
    pub seed: Option<u64>,
}

/// Sway, look-at and blink state for the one character
#[derive(Debug, Clone)]
pub struct SecondaryMotion {
    config: SecondaryConfig,
    sway: Sway,
    look_at: HeadLookAt,
    blink: BlinkScheduler,
    blink_target: BlinkTarget,
    active: bool,
}

impl SecondaryMotion {
    pub fn new(config: SecondaryConfig) -> Self {
        Self {
            config,
            sway: Sway::new(config.sway),
            look_at: HeadLookAt::new(config.look_at),
            blink: BlinkScheduler::new(config.blink, config.seed),
            blink_target: BlinkTarget::None,
            active: false,
        }
    }

    /// Resolve what blinking drives on this rig
    pub fn bind(&mut self, rig: &Rig, bones: &BoneRefs) {
        self.blink_target = BlinkTarget::resolve(rig, &bones.eyelids);
    }

    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.look_at.set_pointer(pointer);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn blink_target(&self) -> &BlinkTarget {
        &self.blink_target
    }

    pub fn blink_state(&self) -> BlinkState {
        self.blink.state()
    }

    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        debug!("Secondary motion on");
        self.active = true;
        self.blink.arm();
    }

    /// Stop every layer and clear persistent state on the rig
    pub fn deactivate(&mut self, rig: &mut Rig) {
        if !self.active {
            return;
        }
        debug!("Secondary motion off");
        self.active = false;
        self.sway.reset();
        self.look_at.reset();
        self.blink.disarm();
        self.blink_target.release(rig);
    }

    /// Advance all layers and add their offsets to the current local pose
    pub fn update(&mut self, rig: &mut Rig, bones: &BoneRefs, delta_time: f32) {
        if !self.active {
            return;
        }
        self.sway.advance(delta_time);
        self.look_at.update(delta_time);
        let blink = self.blink.advance(delta_time);

        let skeleton = rig.skeleton_mut();
        self.sway.apply(skeleton, bones);
        self.look_at.apply(skeleton, bones);
        self.blink_target
            .apply(rig, blink, self.config.blink.eyelid_angle);
    }
}

impl Default for SecondaryMotion {
    fn default() -> Self {
        Self::new(SecondaryConfig::default())
    }
}
