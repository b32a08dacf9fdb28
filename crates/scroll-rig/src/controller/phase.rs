//! Phase table: named slices of scroll progress bound to clips
//!
//! Phases partition [0, 1] with inclusive lower bounds; the final phase is
//! also closed at 1.0. Per-kind behaviour (time-driven or scrubbed, root
//! yaw, drift compensation, secondary motion) comes from `PhaseKind`
//! defaults, each overridable per phase.

use std::f32::consts::PI;
use std::fmt;

use crate::animation::LoopMode;
use crate::error::{Result, RigError};
use crate::scroll::sanitize_progress;

/// The fixed set of phases the rig moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PhaseKind {
    Idle,
    TurnToWall,
    Climbing,
    Standing,
    TurnAround,
}

impl PhaseKind {
    /// All kinds in scroll order
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::TurnToWall,
        Self::Climbing,
        Self::Standing,
        Self::TurnAround,
    ];

    pub fn default_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TurnToWall => "turn-to-wall",
            Self::Climbing => "climbing",
            Self::Standing => "standing",
            Self::TurnAround => "turn-around",
        }
    }

    /// Clip name expected in the loaded asset
    pub fn default_clip(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::TurnToWall => "TurnToWall",
            Self::Climbing => "Climb",
            Self::Standing => "StandUp",
            Self::TurnAround => "TurnAround",
        }
    }

    /// Idle is the only phase that runs on wall-clock time
    pub fn is_time_driven(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn default_loop(self) -> LoopMode {
        if self.is_time_driven() {
            LoopMode::Repeat
        } else {
            LoopMode::Once
        }
    }

    /// Facing camera for idle, facing the wall while climbing and standing,
    /// clip-driven through both turns
    pub fn default_yaw(self) -> YawMode {
        match self {
            Self::Idle => YawMode::Pinned(0.0),
            Self::Climbing | Self::Standing => YawMode::Pinned(PI),
            Self::TurnToWall | Self::TurnAround => YawMode::ClipDriven,
        }
    }

    pub fn default_drift(self) -> DriftMode {
        match self {
            Self::Standing => DriftMode::Anchor,
            Self::TurnAround => DriftMode::Handoff,
            _ => DriftMode::None,
        }
    }

    /// Breathing, look-at and blinking only run while idle
    pub fn allows_secondary_motion(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// How the root node's yaw is set while a phase is active
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum YawMode {
    /// Root yaw fixed to this many radians
    Pinned(f32),
    /// Root keeps the yaw of the nearest preceding pinned phase; the clip's
    /// bones perform the turn
    ClipDriven,
}

/// Root-motion removal applied while a phase is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DriftMode {
    #[default]
    None,
    /// Anchor the hip where the preceding scrubbed phase leaves it, or
    /// where this phase's clip starts when there is none
    Anchor,
    /// Anchor the hip where the preceding anchored phase leaves it
    Handoff,
}

/// One named slice of scroll progress
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "def::PhaseDef"))]
pub struct Phase {
    pub kind: PhaseKind,
    pub name: String,
    /// Inclusive lower bound of global progress
    pub range_start: f32,
    /// Exclusive upper bound (inclusive for the final phase)
    pub range_end: f32,
    /// Clip name in the loaded asset
    pub clip: String,
    /// Scrubbed phases keep their action paused; time-driven ones do not
    pub paused: bool,
    pub loop_mode: LoopMode,
    /// Playback speed for time-driven phases
    pub time_scale: f32,
    pub yaw: YawMode,
    pub drift: DriftMode,
    /// Leading fraction of this phase that crossfades from the previous
    /// phase's end pose
    pub crossfade_in: Option<f32>,
}

impl Phase {
    /// Phase with the defaults of its kind
    pub fn new(kind: PhaseKind, range_start: f32, range_end: f32) -> Self {
        Self {
            kind,
            name: kind.default_name().to_string(),
            range_start,
            range_end,
            clip: kind.default_clip().to_string(),
            paused: !kind.is_time_driven(),
            loop_mode: kind.default_loop(),
            time_scale: 1.0,
            yaw: kind.default_yaw(),
            drift: kind.default_drift(),
            crossfade_in: None,
        }
    }

    pub fn with_clip(mut self, clip: impl Into<String>) -> Self {
        self.clip = clip.into();
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_yaw(mut self, yaw: YawMode) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_drift(mut self, drift: DriftMode) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_crossfade_in(mut self, fraction: f32) -> Self {
        self.crossfade_in = Some(fraction);
        self
    }

    /// Width of the phase in global progress
    pub fn span(&self) -> f32 {
        self.range_end - self.range_start
    }

    /// Whether `progress` falls in `[range_start, range_end)`
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.range_start && progress < self.range_end
    }

    /// Map global progress to [0, 1] within this phase
    pub fn local_progress(&self, progress: f32) -> f32 {
        let span = self.span();
        if span <= 0.0 || !progress.is_finite() {
            return 0.0;
        }
        ((progress - self.range_start) / span).clamp(0.0, 1.0)
    }

    /// Whether the phase's action runs on wall-clock time
    pub fn is_time_driven(&self) -> bool {
        !self.paused
    }
}

/// Hand-tuned default phase boundaries
pub fn default_phases() -> Vec<Phase> {
    vec![
        Phase::new(PhaseKind::Idle, 0.0, 0.005),
        Phase::new(PhaseKind::TurnToWall, 0.005, 0.08),
        Phase::new(PhaseKind::Climbing, 0.08, 0.58).with_crossfade_in(0.04),
        Phase::new(PhaseKind::Standing, 0.58, 0.90),
        Phase::new(PhaseKind::TurnAround, 0.90, 1.0),
    ]
}

/// Validated, ordered partition of [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    /// Validate and build a table
    pub fn new(phases: Vec<Phase>) -> Result<Self> {
        let invalid = |msg: String| Err(RigError::InvalidPhaseTable(msg));

        let (Some(first), Some(last)) = (phases.first(), phases.last()) else {
            return invalid("table has no phases".to_string());
        };
        if first.range_start != 0.0 {
            return invalid(format!(
                "first phase '{}' starts at {} instead of 0",
                first.name, first.range_start
            ));
        }
        if last.range_end != 1.0 {
            return invalid(format!(
                "last phase '{}' ends at {} instead of 1",
                last.name, last.range_end
            ));
        }

        for (i, phase) in phases.iter().enumerate() {
            if !phase.range_start.is_finite() || !phase.range_end.is_finite() {
                return invalid(format!("phase '{}' has a non-finite bound", phase.name));
            }
            if phase.range_end <= phase.range_start {
                return invalid(format!(
                    "phase '{}' is empty: [{}, {})",
                    phase.name, phase.range_start, phase.range_end
                ));
            }
            if let Some(next) = phases.get(i + 1) {
                if next.range_start != phase.range_end {
                    return invalid(format!(
                        "gap or overlap between '{}' (ends {}) and '{}' (starts {})",
                        phase.name, phase.range_end, next.name, next.range_start
                    ));
                }
            }
            if phases[..i].iter().any(|p| p.kind == phase.kind) {
                return invalid(format!("phase kind '{}' appears twice", phase.kind));
            }
            if !phase.time_scale.is_finite() || phase.time_scale <= 0.0 {
                return invalid(format!(
                    "phase '{}' has time scale {}",
                    phase.name, phase.time_scale
                ));
            }
            if let Some(fraction) = phase.crossfade_in {
                if i == 0 {
                    return invalid(format!(
                        "phase '{}' crossfades in but has no predecessor",
                        phase.name
                    ));
                }
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return invalid(format!(
                        "phase '{}' has crossfade fraction {fraction} outside (0, 1]",
                        phase.name
                    ));
                }
            }
            if let YawMode::Pinned(yaw) = phase.yaw {
                if !yaw.is_finite() {
                    return invalid(format!("phase '{}' has a non-finite yaw", phase.name));
                }
            }
        }

        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Get number of phases
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Resolve progress to the unique phase containing it
    ///
    /// Progress is sanitized first (NaN becomes 0, everything else is
    /// clamped to [0, 1]). A value on a boundary belongs to the phase that
    /// starts there.
    pub fn resolve(&self, progress: f32) -> (usize, &Phase) {
        let progress = sanitize_progress(progress);
        let index = self
            .phases
            .partition_point(|p| p.range_end <= progress)
            .min(self.phases.len() - 1);
        (index, &self.phases[index])
    }

    /// Root yaw in radians for the phase at `index`
    pub fn root_yaw(&self, index: usize) -> f32 {
        self.phases[..=index.min(self.phases.len() - 1)]
            .iter()
            .rev()
            .find_map(|p| match p.yaw {
                YawMode::Pinned(yaw) => Some(yaw),
                YawMode::ClipDriven => None,
            })
            .unwrap_or(0.0)
    }

    /// Phase whose anchor a drift-compensated phase uses
    ///
    /// `Anchor` phases anchor against themselves, `Handoff` phases against
    /// the nearest preceding `Anchor` phase (or themselves if none).
    pub fn drift_source(&self, index: usize) -> Option<usize> {
        let phase = self.phases.get(index)?;
        match phase.drift {
            DriftMode::None => None,
            DriftMode::Anchor => Some(index),
            DriftMode::Handoff => Some(
                self.phases[..index]
                    .iter()
                    .rposition(|p| p.drift == DriftMode::Anchor)
                    .unwrap_or(index),
            ),
        }
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self {
            phases: default_phases(),
        }
    }
}

#[cfg(feature = "serde")]
mod def {
    use super::{DriftMode, LoopMode, Phase, PhaseKind, YawMode};

    /// Phase as written in configuration; omitted fields take the kind's defaults
    #[derive(serde::Deserialize)]
    pub(super) struct PhaseDef {
        kind: PhaseKind,
        range_start: f32,
        range_end: f32,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        clip: Option<String>,
        #[serde(default)]
        paused: Option<bool>,
        #[serde(default)]
        loop_mode: Option<LoopMode>,
        #[serde(default)]
        time_scale: Option<f32>,
        #[serde(default)]
        yaw: Option<YawMode>,
        #[serde(default)]
        drift: Option<DriftMode>,
        #[serde(default)]
        crossfade_in: Option<f32>,
    }

    impl From<PhaseDef> for Phase {
        fn from(def: PhaseDef) -> Self {
            let mut phase = Phase::new(def.kind, def.range_start, def.range_end);
            if let Some(name) = def.name {
                phase.name = name;
            }
            if let Some(clip) = def.clip {
                phase.clip = clip;
            }
            if let Some(paused) = def.paused {
                phase.paused = paused;
            }
            if let Some(loop_mode) = def.loop_mode {
                phase.loop_mode = loop_mode;
            }
            if let Some(time_scale) = def.time_scale {
                phase.time_scale = time_scale;
            }
            if let Some(yaw) = def.yaw {
                phase.yaw = yaw;
            }
            if let Some(drift) = def.drift {
                phase.drift = drift;
            }
            phase.crossfade_in = def.crossfade_in;
            phase
        }
    }
}
