use thiserror::Error;

/// Error types for rig construction and scroll-driven animation
///
/// The controller itself never returns these from its per-frame path; it
/// logs them and degrades the affected feature. They surface only from
/// construction and validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RigError {
    /// A clip the phase table expects is absent from the loaded rig
    #[error("Missing clip: '{0}'")]
    MissingClip(String),

    /// No bone name matched any of the lookup patterns
    #[error("Missing bone: no bone name contains any of {patterns:?}")]
    MissingBone { patterns: Vec<String> },

    /// Scrollable height is zero, negative or not finite
    #[error("Degenerate scroll geometry: scrollable height is {0}")]
    DegenerateScroll(f32),

    /// The phase table does not partition [0, 1]
    #[error("Invalid phase table: {0}")]
    InvalidPhaseTable(String),

    /// Bone hierarchy is malformed
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// Clip keyframe data is malformed
    #[error("Invalid clip '{clip}': {reason}")]
    InvalidClip { clip: String, reason: String },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation needed a loaded rig
    #[error("Rig not ready: {0}")]
    NotReady(String),
}

impl RigError {
    pub(crate) fn missing_bone(patterns: &[&str]) -> Self {
        Self::MissingBone {
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Result type using RigError
pub type Result<T> = std::result::Result<T, RigError>;
