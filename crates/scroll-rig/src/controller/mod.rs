//! Scroll-driven animation state machine
//!
//! `AnimationController` maps scroll progress to one active phase of the
//! phase table, performs every transition between the previous and the new
//! phase, and writes the resulting pose into the rig:
//!
//! 1. resolve the phase and transition stepwise toward it
//! 2. advance (idle) or scrub (everything else) the phase's action
//! 3. place the root on the camera rail with the phase's yaw
//! 4. apply the blended pose, remove drift, add secondary motion
//! 5. recompute world matrices

mod bones;
mod drift;
mod phase;
mod scrub;
mod snapshot;

pub use bones::BoneRefs;
pub use drift::DriftCompensator;
pub use phase::{DriftMode, Phase, PhaseKind, PhaseTable, YawMode, default_phases};
pub use scrub::{PoseScrubber, clip_time};
pub use snapshot::Snapshot;

use glam::{Quat, Vec2};
use log::{debug, trace, warn};

use crate::animation::{ActionId, Rig};
use crate::camera::CameraRail;
use crate::config::RigConfig;
use crate::error::Result;
use crate::scroll::sanitize_progress;
use crate::secondary::SecondaryMotion;

/// Drives one rig from scroll progress
#[derive(Debug, Clone)]
pub struct AnimationController {
    table: PhaseTable,
    camera: CameraRail,
    /// Action bound to each phase, None when its clip is missing
    bindings: Vec<Option<ActionId>>,
    bones: BoneRefs,
    drift: DriftCompensator,
    secondary: SecondaryMotion,
    current: Option<usize>,
    crossfade_partner: Option<ActionId>,
    progress: f32,
    local_progress: f32,
    root_yaw: f32,
    transitions: u64,
    frames: u64,
}

impl AnimationController {
    /// Validate the configuration and bind every phase to its clip
    ///
    /// Missing clips and bones are logged and disable only what needs them.
    pub fn new(config: &RigConfig, rig: &mut Rig) -> Result<Self> {
        let table = config.phase_table()?;

        let bindings = table
            .phases()
            .iter()
            .map(|phase| match rig.clip_action(&phase.clip) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!("{err}, phase '{}' will hold the last pose", phase.name);
                    None
                }
            })
            .collect();

        let bones = BoneRefs::resolve(rig.skeleton());
        let mut secondary = SecondaryMotion::new(config.secondary);
        secondary.bind(rig, &bones);

        debug!("Animation controller ready with {} phases", table.len());
        Ok(Self {
            table,
            camera: config.camera,
            bindings,
            bones,
            drift: DriftCompensator::new(),
            secondary,
            current: None,
            crossfade_partner: None,
            progress: 0.0,
            local_progress: 0.0,
            root_yaw: 0.0,
            transitions: 0,
            frames: 0,
        })
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    pub fn camera(&self) -> &CameraRail {
        &self.camera
    }

    pub fn bones(&self) -> &BoneRefs {
        &self.bones
    }

    pub fn drift(&self) -> &DriftCompensator {
        &self.drift
    }

    pub fn secondary(&self) -> &SecondaryMotion {
        &self.secondary
    }

    /// Action bound to the phase at `index`
    pub fn binding(&self, index: usize) -> Option<ActionId> {
        self.bindings.get(index).copied().flatten()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.current.and_then(|i| self.table.get(i))
    }

    /// Progress used by the last update, after sanitizing
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn local_progress(&self) -> f32 {
        self.local_progress
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn resolve_phase(&self, progress: f32) -> (usize, &Phase) {
        self.table.resolve(progress)
    }

    /// Pointer for the head look-at, normalized to [-1, 1]; None disables it
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.secondary.set_pointer(pointer);
    }

    /// Advance one frame
    ///
    /// `delta_time` is wall-clock seconds since the last frame and only
    /// moves time-driven phases and secondary motion.
    pub fn update(&mut self, rig: &mut Rig, progress: f32, delta_time: f32) {
        if progress.is_nan() {
            warn!("Scroll progress is NaN, using 0");
        } else if !(0.0..=1.0).contains(&progress) {
            trace!("Scroll progress {progress} clamped");
        }
        let progress = sanitize_progress(progress);
        let delta_time = if delta_time.is_finite() && delta_time > 0.0 {
            delta_time
        } else {
            0.0
        };

        let (target, _) = self.table.resolve(progress);
        self.step_to(rig, target);

        let phase = &self.table.phases()[target];
        let local = phase.local_progress(progress);
        let time_driven = phase.is_time_driven();
        let action = self.binding(target);

        if time_driven {
            rig.advance(delta_time);
        } else if let Some(action) = action {
            PoseScrubber::new(action).seek(rig, local);
        }
        self.update_crossfade(rig, target, local);

        let yaw = self.table.root_yaw(target);
        {
            let root = rig.skeleton_mut().root_mut();
            root.translation = self.camera.character_base(progress);
            root.rotation = Quat::from_rotation_y(yaw);
        }

        let posed = rig.apply_pose();
        if posed {
            if self.table.drift_source(target).is_some() {
                if let Some(hip) = self.bones.hip {
                    self.drift.compensate(rig.skeleton_mut(), hip);
                }
            }
            self.secondary.update(rig, &self.bones, delta_time);
        } else {
            trace!("No pose for phase '{}', holding", self.table.phases()[target].name);
        }
        rig.skeleton_mut().update_world();

        self.progress = progress;
        self.local_progress = local;
        self.root_yaw = yaw;
        self.frames += 1;
    }

    /// Walk one phase at a time toward `target` so every exit and entry runs
    fn step_to(&mut self, rig: &mut Rig, target: usize) {
        let Some(mut current) = self.current else {
            self.transition(rig, None, target);
            return;
        };
        while current != target {
            let next = if target > current {
                current + 1
            } else {
                current - 1
            };
            self.transition(rig, Some(current), next);
            current = next;
        }
    }

    /// Leave `from` and enter `to`
    ///
    /// A no-op when both are the same phase.
    pub fn transition(&mut self, rig: &mut Rig, from: Option<usize>, to: usize) {
        if from == Some(to) || to >= self.table.len() {
            return;
        }
        self.release_crossfade(rig);

        let to_action = self.binding(to);
        let from_action = from.and_then(|i| self.binding(i));
        if let Some(from) = from.and_then(|i| self.table.get(i)) {
            if from_action != to_action {
                if let Some(id) = from_action {
                    deactivate(rig, id);
                }
            }
            if from.drift != DriftMode::None {
                self.drift.invalidate();
            }
            if from.kind.allows_secondary_motion() {
                self.secondary.deactivate(rig);
            }
        }

        let phase = &self.table.phases()[to];
        match to_action.and_then(|id| rig.action_mut(id)) {
            Some(action) => {
                if from_action != to_action {
                    action.reset();
                }
                action.set_loop(phase.loop_mode);
                action.set_time_scale(phase.time_scale);
                action.set_weight(1.0);
                action.set_paused(phase.paused);
                action.set_enabled(true);
                action.play();
            }
            None => warn!("Phase '{}' has no clip, holding the last pose", phase.name),
        }

        debug!(
            "Phase transition {} -> {}",
            from.and_then(|i| self.table.get(i))
                .map_or("none", |p| p.name.as_str()),
            phase.name
        );

        let secondary = phase.kind.allows_secondary_motion();
        if let Some(source) = self.table.drift_source(to) {
            self.capture_anchor(rig, source);
        }
        if secondary {
            self.secondary.activate();
        }
        self.current = Some(to);
        self.transitions += 1;
    }

    /// Cache the hip anchor for the drift-compensated phase `source`
    ///
    /// The anchor is where the preceding scrubbed phase leaves the hip on its
    /// last frame, so entering `source` does not move the hip. Without such a
    /// phase, `source`'s own first frame is used.
    fn capture_anchor(&mut self, rig: &mut Rig, source: usize) {
        let Some(hip) = self.bones.hip else {
            return;
        };
        let preceding = source
            .checked_sub(1)
            .filter(|&i| !self.table.phases()[i].is_time_driven())
            .and_then(|i| self.binding(i).map(|action| (i, action)));

        let (index, action, time) = match preceding {
            Some((index, action)) => {
                let end = rig.action(action).map_or(0.0, |a| a.duration());
                (index, action, end)
            }
            None => match self.binding(source) {
                Some(action) => (source, action, 0.0),
                None => {
                    debug!("Drift source has no clip, skipping compensation");
                    return;
                }
            },
        };
        let yaw = self.table.root_yaw(index);
        self.drift.capture(rig, hip, action, time, yaw);
    }

    /// Weight the previous phase's end pose against this phase inside the
    /// crossfade sub-range
    fn update_crossfade(&mut self, rig: &mut Rig, index: usize, local: f32) {
        let own = self.binding(index);
        let partner = index
            .checked_sub(1)
            .and_then(|i| self.binding(i))
            .filter(|partner| Some(*partner) != own);
        let fraction = self.table.phases()[index].crossfade_in;

        match (fraction, partner) {
            (Some(fraction), Some(partner)) if local < fraction => {
                let t = (local / fraction).clamp(0.0, 1.0);
                if let Some(action) = rig.action_mut(partner) {
                    action.set_enabled(true);
                    action.set_paused(true);
                    action.play();
                    action.set_weight(1.0 - t);
                }
                PoseScrubber::new(partner).hold_end(rig);
                if let Some(action) = own.and_then(|id| rig.action_mut(id)) {
                    action.set_weight(t);
                }
                self.crossfade_partner = Some(partner);
            }
            _ => {
                if self.crossfade_partner.is_some() {
                    self.release_crossfade(rig);
                    if let Some(action) = own.and_then(|id| rig.action_mut(id)) {
                        action.set_weight(1.0);
                    }
                }
            }
        }
    }

    fn release_crossfade(&mut self, rig: &mut Rig) {
        if let Some(partner) = self.crossfade_partner.take() {
            trace!("Crossfade partner released");
            deactivate(rig, partner);
        }
    }

    pub fn snapshot(&self, rig: &Rig) -> Snapshot {
        let phase = self.current_phase();
        let action = self
            .current
            .and_then(|i| self.binding(i))
            .and_then(|id| rig.action(id).map(|a| (id, a)));

        Snapshot {
            progress: self.progress,
            phase: phase.map(|p| p.kind),
            phase_name: phase.map(|p| p.name.clone()),
            phase_index: self.current,
            local_progress: self.local_progress,
            clip: action.and_then(|(id, _)| rig.action_clip_name(id).map(str::to_string)),
            clip_time: action.map(|(_, a)| a.time()),
            clip_duration: action.map(|(_, a)| a.duration()),
            camera_position: self.camera.camera_position(self.progress),
            camera_tilt: self.camera.camera_tilt(),
            root_translation: rig.skeleton().root().translation,
            root_yaw: self.root_yaw,
            hip: self.bones.hip.and_then(|id| rig.skeleton().world_position(id)),
            drift_anchor: self.drift.anchor(),
            drift_correction: self.drift.correction(),
            secondary_active: self.secondary.is_active(),
            transitions: self.transitions,
            frames: self.frames,
        }
    }
}

fn deactivate(rig: &mut Rig, id: ActionId) {
    if let Some(action) = rig.action_mut(id) {
        action.set_weight(0.0);
        action.set_enabled(false);
        action.stop();
    }
}
