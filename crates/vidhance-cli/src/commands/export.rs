use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use vidhance_core::pipeline::config::{
    ClaheParams, CropRange, EnhancementSpec, EqualizeMode, ExportConfig, GammaLevel,
};
use vidhance_core::pipeline::{export_videos_reported, CancelToken, ExportReporter, VideoOutcome};

use super::preview::EqualizeArg;
use crate::summary::{print_export_report, print_export_summary};

#[derive(Args)]
pub struct ExportArgs {
    /// Input SER files
    pub inputs: Vec<PathBuf>,

    /// Export config file (TOML); replaces all other options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for the enhanced videos
    #[arg(short, long, default_value = "enhanced")]
    pub output: PathBuf,

    /// Gamma slider level (0-20, 10 = unchanged)
    #[arg(long)]
    pub gamma: Option<u32>,

    /// Histogram equalization mode
    #[arg(long, value_enum, default_value = "none")]
    pub equalize: EqualizeArg,

    /// CLAHE clip limit (adaptive mode)
    #[arg(long, default_value = "40.0")]
    pub clip_limit: f32,

    /// CLAHE tile grid size per axis (adaptive mode)
    #[arg(long, default_value = "8")]
    pub tiles: u32,

    /// Replace each frame with its Canny edge map
    #[arg(long)]
    pub edges: bool,

    /// First frame to keep
    #[arg(long)]
    pub start: Option<usize>,

    /// Number of frames to drop from the end
    #[arg(long)]
    pub end_offset: Option<usize>,
}

/// Drives a progress bar from per-video export progress.
struct BarReporter {
    bar: ProgressBar,
}

impl ExportReporter for BarReporter {
    fn begin_video(&self, _index: usize, _total: usize, input: &Path) {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn finish_video(&self, percent: u8, outcome: &VideoOutcome) {
        if !outcome.status.is_success() {
            self.bar
                .println(format!("  {}: {}", outcome.input.display(), outcome.status));
        }
        self.bar.set_position(percent as u64);
    }
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid export config")?
    } else {
        build_config_from_args(args)
    };

    if config.inputs.is_empty() {
        anyhow::bail!("No input videos given");
    }

    print_export_summary(&config);

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:24} [{bar:40}] {pos}%")?
            .progress_chars("=> "),
    );

    let start = Instant::now();
    let reporter = BarReporter { bar: pb.clone() };
    let report = export_videos_reported(&config, &reporter, &CancelToken::new())
        .with_context(|| format!("Failed to export to {}", config.output_dir.display()))?;
    pb.finish_with_message("Done");

    print_export_report(&report, start.elapsed());

    if !report.all_succeeded() {
        anyhow::bail!(report.message());
    }
    println!("\n{}", report.message());

    Ok(())
}

fn build_config_from_args(args: &ExportArgs) -> ExportConfig {
    let crop = if args.start.is_some() || args.end_offset.is_some() {
        CropRange {
            enabled: true,
            start_frame: args.start.unwrap_or(0),
            end_offset_from_tail: args.end_offset.unwrap_or(0),
        }
    } else {
        CropRange::default()
    };

    ExportConfig {
        output_dir: args.output.clone(),
        inputs: args.inputs.clone(),
        enhancement: EnhancementSpec {
            gamma_enabled: args.gamma.is_some(),
            gamma: args.gamma.map(GammaLevel::new).unwrap_or_default(),
            equalize: EqualizeMode::from(args.equalize),
            clahe: ClaheParams {
                clip_limit: args.clip_limit,
                tiles_x: args.tiles,
                tiles_y: args.tiles,
            },
            edges_enabled: args.edges,
        },
        crop,
    }
}
