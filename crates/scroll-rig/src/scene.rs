//! Scene lifecycle: waits for the rig, then owns it with its controller

use glam::{Vec2, Vec3};
use log::{debug, info, trace};

use crate::animation::Rig;
use crate::config::RigConfig;
use crate::controller::{AnimationController, Snapshot};
use crate::error::{Result, RigError};
use crate::scroll::ScrollSampler;
use crate::secondary::sanitize_pointer;

#[derive(Debug, Clone)]
struct Loaded {
    rig: Rig,
    controller: AnimationController,
}

/// Entry point for a host: feed it scroll, pointer and frame events
///
/// Until `attach_rig` delivers a character, frames only move the camera
/// and `update` is a no-op.
#[derive(Debug, Clone)]
pub struct Scene {
    config: RigConfig,
    loaded: Option<Loaded>,
    sampler: ScrollSampler,
    pointer: Option<Vec2>,
    skipped_updates: u64,
}

impl Scene {
    pub fn new(config: RigConfig) -> Result<Self> {
        config.validate()?;
        let sampler = ScrollSampler::new(config.scroll);
        Ok(Self {
            config,
            loaded: None,
            sampler,
            pointer: None,
            skipped_updates: 0,
        })
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Hand over the loaded character; replaces any previous one
    pub fn attach_rig(&mut self, mut rig: Rig) -> Result<()> {
        let mut controller = AnimationController::new(&self.config, &mut rig)?;
        controller.set_pointer(self.pointer);
        if self.loaded.is_some() {
            debug!("Replacing loaded rig");
        }
        info!(
            "Rig attached: {} bones, {} clips",
            rig.skeleton().len(),
            rig.clips().len()
        );
        self.loaded = Some(Loaded { rig, controller });
        Ok(())
    }

    pub fn detach_rig(&mut self) -> Option<Rig> {
        self.loaded.take().map(|loaded| loaded.rig)
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn rig(&self) -> Option<&Rig> {
        self.loaded.as_ref().map(|l| &l.rig)
    }

    pub fn controller(&self) -> Option<&AnimationController> {
        self.loaded.as_ref().map(|l| &l.controller)
    }

    /// Updates ignored because no rig was attached yet
    pub fn skipped_updates(&self) -> u64 {
        self.skipped_updates
    }

    /// Record a scroll event from raw page geometry
    pub fn on_scroll(&mut self, scroll_top: f32, scroll_height: f32, viewport_height: f32) -> f32 {
        self.sampler.push(scroll_top, scroll_height, viewport_height)
    }

    pub fn on_scroll_progress(&mut self, progress: f32) {
        self.sampler.push_progress(progress);
    }

    /// Pointer in normalized viewport coordinates; None when it leaves
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = sanitize_pointer(pointer);
        if let Some(loaded) = &mut self.loaded {
            loaded.controller.set_pointer(self.pointer);
        }
    }

    /// Run one frame at monotonic time `now` (seconds)
    ///
    /// Uses the newest released scroll progress, or the last one when the
    /// sampler is still coalescing. Returns whether a rig was updated.
    pub fn frame(&mut self, now: f64, delta_time: f32) -> bool {
        let progress = self
            .sampler
            .poll(now)
            .unwrap_or_else(|| self.sampler.latest());
        self.update(progress, delta_time)
    }

    /// Drive the controller directly with `progress`
    pub fn update(&mut self, progress: f32, delta_time: f32) -> bool {
        let Some(loaded) = &mut self.loaded else {
            self.skipped_updates += 1;
            if self.skipped_updates == 1 {
                debug!("{}, skipping update", RigError::NotReady("no rig attached".to_string()));
            } else {
                trace!("Update skipped, rig not loaded");
            }
            return false;
        };
        loaded.controller.update(&mut loaded.rig, progress, delta_time);
        true
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| RigError::NotReady("no rig attached".to_string()))?;
        Ok(loaded.controller.snapshot(&loaded.rig))
    }

    /// Camera position for the latest released progress; valid before load
    pub fn camera_position(&self) -> Vec3 {
        self.config.camera.camera_position(self.sampler.latest())
    }
}
