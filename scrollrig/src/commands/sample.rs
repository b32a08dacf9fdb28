//! Evaluate the rig at a single scroll progress

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use scroll_rig::glam::Vec3;
use scroll_rig::{AnimationController, Rig, Snapshot};

use crate::cli::OutputFormat;
use crate::utils::{add_table_row, create_table, format_optional, format_vec3, load_config, load_rig};

#[derive(Args)]
pub struct SampleArgs {
    /// Scroll progress to evaluate, in [0, 1]
    pub progress: f32,

    /// Progress to start from; the controller walks every phase in between
    #[arg(long, default_value_t = 0.0)]
    pub from: f32,

    /// Rig description (.yaml, .yml or .json); the sample humanoid when omitted
    #[arg(long)]
    pub rig: Option<PathBuf>,

    /// Also print world positions of every bone
    #[arg(long)]
    pub bones: bool,

    /// Seed for the blink scheduler
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct BoneRow {
    name: String,
    position: Vec3,
}

#[derive(Serialize)]
struct SampleOutput {
    #[serde(flatten)]
    snapshot: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    bones: Option<Vec<BoneRow>>,
}

pub fn execute(config: Option<&Path>, args: SampleArgs) -> Result<()> {
    let mut config = load_config(config)?;
    if args.seed.is_some() {
        config.secondary.seed = args.seed;
    }
    let mut rig = load_rig(args.rig.as_deref())?;
    let mut controller =
        AnimationController::new(&config, &mut rig).context("Failed to bind the rig")?;

    log::info!("Sampling {} -> {}", args.from, args.progress);
    controller.update(&mut rig, args.from, 0.0);
    controller.update(&mut rig, args.progress, 0.0);

    let output = SampleOutput {
        snapshot: controller.snapshot(&rig),
        bones: args.bones.then(|| bone_rows(&rig)),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Table => print_table(&output),
    }
    Ok(())
}

fn bone_rows(rig: &Rig) -> Vec<BoneRow> {
    rig.skeleton()
        .bones()
        .iter()
        .map(|bone| BoneRow {
            name: bone.name.clone(),
            position: bone.world_position(),
        })
        .collect()
}

fn print_table(output: &SampleOutput) {
    let snapshot = &output.snapshot;
    let mut table = create_table(vec!["Field", "Value"]);
    let rows = [
        ("Progress", format!("{:.4}", snapshot.progress)),
        (
            "Phase",
            format_optional(snapshot.phase_name.as_deref(), str::to_string),
        ),
        ("Local progress", format!("{:.4}", snapshot.local_progress)),
        ("Clip", format_optional(snapshot.clip.as_deref(), str::to_string)),
        (
            "Clip time",
            match (snapshot.clip_time, snapshot.clip_duration) {
                (Some(time), Some(duration)) => format!("{time:.3}s / {duration:.3}s"),
                _ => "-".to_string(),
            },
        ),
        ("Camera", format_vec3(snapshot.camera_position)),
        ("Camera tilt", format!("{:.3}", snapshot.camera_tilt)),
        ("Root", format_vec3(snapshot.root_translation)),
        ("Root yaw", format!("{:.1}°", snapshot.root_yaw.to_degrees())),
        ("Hip", format_optional(snapshot.hip, format_vec3)),
        ("Drift anchor", format_optional(snapshot.drift_anchor, format_vec3)),
        ("Drift correction", format_vec3(snapshot.drift_correction)),
        ("Secondary motion", snapshot.secondary_active.to_string()),
        ("Transitions", snapshot.transitions.to_string()),
    ];
    for (field, value) in rows {
        add_table_row(&mut table, vec![field.to_string(), value]);
    }
    table.printstd();

    if let Some(bones) = &output.bones {
        let mut table = create_table(vec!["Bone", "World position"]);
        for bone in bones {
            add_table_row(&mut table, vec![bone.name.clone(), format_vec3(bone.position)]);
        }
        table.printstd();
    }
}
