//! Phase table listing

use anyhow::Result;
use std::path::Path;

use scroll_rig::controller::{DriftMode, Phase, YawMode};

use crate::cli::OutputFormat;
use crate::utils::{add_table_row, create_table, format_optional, load_config};

pub fn execute(config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_config(config)?;
    let table = config.phase_table()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(table.phases())?);
        }
        OutputFormat::Table => {
            let mut out = create_table(vec![
                "#", "Name", "Range", "Clip", "Driven", "Yaw", "Drift", "Crossfade",
            ]);
            for (index, phase) in table.phases().iter().enumerate() {
                add_table_row(&mut out, phase_row(index, phase));
            }
            out.printstd();
        }
    }

    Ok(())
}

fn phase_row(index: usize, phase: &Phase) -> Vec<String> {
    let yaw = match phase.yaw {
        YawMode::Pinned(radians) => format!("{:.1}°", radians.to_degrees()),
        YawMode::ClipDriven => "clip".to_string(),
    };
    let drift = match phase.drift {
        DriftMode::None => "-",
        DriftMode::Anchor => "anchor",
        DriftMode::Handoff => "handoff",
    };
    vec![
        index.to_string(),
        phase.name.clone(),
        format!("{:.3}..{:.3}", phase.range_start, phase.range_end),
        phase.clip.clone(),
        if phase.is_time_driven() { "time" } else { "scroll" }.to_string(),
        yaw,
        drift.to_string(),
        format_optional(phase.crossfade_in, |f| format!("{:.0}%", f * 100.0)),
    ]
}
