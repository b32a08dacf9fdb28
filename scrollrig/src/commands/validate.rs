//! Configuration validation

use anyhow::Result;
use std::path::Path;

use scroll_rig::{Rig, RigConfig};

use crate::utils::{load_config, load_rig};

pub fn execute(file: &Path, rig: Option<&Path>) -> Result<()> {
    let config = load_config(Some(file))?;
    println!(
        "{}: {} phases, camera {:.2} -> {:.2}",
        file.display(),
        config.phases.len(),
        config.camera.start_y,
        config.camera.end_y
    );

    let rig = load_rig(rig)?;
    let missing = missing_clips(&config, &rig);
    if missing.is_empty() {
        println!("All phase clips are present in the rig");
    } else {
        for (phase, clip) in &missing {
            println!("Warning: phase '{phase}' expects clip '{clip}', which the rig lacks");
        }
    }

    println!("Configuration is valid");
    Ok(())
}

/// Phases whose clip the rig does not provide; those phases hold the last pose
fn missing_clips(config: &RigConfig, rig: &Rig) -> Vec<(String, String)> {
    config
        .phases
        .iter()
        .filter(|phase| rig.clip_index(&phase.clip).is_none())
        .map(|phase| (phase.name.clone(), phase.clip.clone()))
        .collect()
}
