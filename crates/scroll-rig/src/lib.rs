//! Scroll-scrubbed skeletal animation for a single character
//!
//! Scroll progress in [0, 1] selects one phase of a fixed phase table
//! (idle, turn to the wall, climb, stand up, turn around). Every phase but
//! idle scrubs its clip by progress instead of playing it, so scrolling
//! backwards plays the animation backwards. A camera rail moves with the
//! same progress, and root motion baked into the stand-up and turn-around
//! clips is removed so the character stays where the camera expects it.
//!
//! # Example
//!
//! ```rust
//! use scroll_rig::{AnimationController, RigConfig, sample::humanoid_rig};
//!
//! let mut rig = humanoid_rig()?;
//! let mut controller = AnimationController::new(&RigConfig::default(), &mut rig)?;
//!
//! for frame in 0..=100 {
//!     controller.update(&mut rig, frame as f32 / 100.0, 1.0 / 60.0);
//! }
//!
//! let snapshot = controller.snapshot(&rig);
//! assert_eq!(snapshot.phase_name.as_deref(), Some("turn-around"));
//! # Ok::<(), scroll_rig::RigError>(())
//! ```

pub mod animation;
pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod sample;
pub mod scene;
pub mod scroll;
pub mod secondary;

pub use glam;

// Re-export common types
pub use animation::{Rig, RigBuilder, RigDescription};
pub use camera::CameraRail;
pub use config::RigConfig;
pub use controller::{AnimationController, Phase, PhaseKind, PhaseTable, Snapshot};
pub use error::{Result, RigError};
pub use scene::Scene;
pub use scroll::{ScrollConfig, ScrollSampler, progress_from_scroll};
pub use secondary::SecondaryConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
