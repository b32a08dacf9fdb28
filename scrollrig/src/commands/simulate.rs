//! Replay a scroll trace through a scene

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};

use scroll_rig::glam::Vec2;
use scroll_rig::{Scene, Snapshot};

use crate::cli::OutputFormat;
use crate::utils::{add_table_row, create_table, format_optional, format_vec3, load_config, load_rig, read_document};

#[derive(Args)]
pub struct SimulateArgs {
    /// Starting progress of the sweep
    #[arg(long, default_value_t = 0.0)]
    pub from: f32,

    /// Final progress of the sweep
    #[arg(long, default_value_t = 1.0)]
    pub to: f32,

    /// Number of frames in the sweep
    #[arg(long, default_value_t = 120)]
    pub frames: usize,

    /// Frame rate used for the wall clock
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Progress values to replay instead of a linear sweep (.yaml, .yml or .json list)
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Print every Nth frame
    #[arg(long, default_value_t = 1)]
    pub every: usize,

    /// Pointer position in normalized viewport coordinates
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub pointer: Option<Vec<f32>>,

    /// Rig description (.yaml, .yml or .json); the sample humanoid when omitted
    #[arg(long)]
    pub rig: Option<PathBuf>,

    /// Seed for the blink scheduler
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn execute(config: Option<&Path>, args: SimulateArgs) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("Frame rate must be positive, got {}", args.fps);
    }
    let every = args.every.max(1);

    let mut config = load_config(config)?;
    if args.seed.is_some() {
        config.secondary.seed = args.seed;
    }
    let trace = match &args.trace {
        Some(path) => read_document::<Vec<f32>>(path)?,
        None => sweep(args.from, args.to, args.frames),
    };

    let mut scene = Scene::new(config)?;
    scene
        .attach_rig(load_rig(args.rig.as_deref())?)
        .context("Failed to attach the rig")?;
    if let Some(&[x, y]) = args.pointer.as_deref() {
        scene.set_pointer(Some(Vec2::new(x, y)));
    }

    let delta_time = 1.0 / args.fps;
    let mut frames = Vec::new();
    for (index, progress) in trace.iter().copied().enumerate() {
        scene.on_scroll_progress(progress);
        let now = index as f64 * f64::from(delta_time);
        scene.frame(now, delta_time);
        if index % every == 0 || index + 1 == trace.len() {
            frames.push((index, now, scene.snapshot()?));
        }
    }

    match args.format {
        OutputFormat::Json => {
            let snapshots: Vec<&Snapshot> = frames.iter().map(|(_, _, s)| s).collect();
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        }
        OutputFormat::Table => {
            let mut table = create_table(vec![
                "Frame", "Time", "Progress", "Phase", "Local", "Clip time", "Camera Y", "Hip",
            ]);
            for (index, now, snapshot) in &frames {
                add_table_row(
                    &mut table,
                    vec![
                        index.to_string(),
                        format!("{now:.3}"),
                        format!("{:.4}", snapshot.progress),
                        format_optional(snapshot.phase_name.as_deref(), str::to_string),
                        format!("{:.3}", snapshot.local_progress),
                        format_optional(snapshot.clip_time, |t| format!("{t:.3}")),
                        format!("{:.3}", snapshot.camera_position.y),
                        format_optional(snapshot.hip, format_vec3),
                    ],
                );
            }
            table.printstd();
            if let Some((_, _, last)) = frames.last() {
                println!("{} frames, {} transitions", trace.len(), last.transitions);
            }
        }
    }
    Ok(())
}

/// Evenly spaced progress values from `from` to `to`, both included
fn sweep(from: f32, to: f32, frames: usize) -> Vec<f32> {
    match frames {
        0 => Vec::new(),
        1 => vec![to],
        n => (0..n)
            .map(|i| from + (to - from) * i as f32 / (n - 1) as f32)
            .collect(),
    }
}
