//! Loading configuration and rig descriptions from disk

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use scroll_rig::sample::humanoid_rig;
use scroll_rig::{Rig, RigConfig, RigDescription};

/// Parse a YAML or JSON document, chosen by file extension
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "yaml" | "yml" => serde_yaml_ng::from_str(&text)
            .with_context(|| format!("Failed to parse YAML in {}", path.display())),
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON in {}", path.display())),
        other => bail!(
            "Unsupported file extension '{other}' for {}, expected .yaml, .yml or .json",
            path.display()
        ),
    }
}

/// Load the configuration, or the built-in defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<RigConfig> {
    let Some(path) = path else {
        log::debug!("No configuration given, using defaults");
        return Ok(RigConfig::default());
    };
    let config: RigConfig = read_document(path)?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Load a rig description, or the procedural sample humanoid
pub fn load_rig(path: Option<&Path>) -> Result<Rig> {
    let Some(path) = path else {
        return humanoid_rig().context("Failed to build the sample humanoid");
    };
    let description: RigDescription = read_document(path)?;
    description
        .build()
        .with_context(|| format!("Invalid rig description in {}", path.display()))
}
