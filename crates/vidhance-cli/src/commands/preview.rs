use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use vidhance_core::io::image_io::save_image;
use vidhance_core::pipeline::config::{ClaheParams, EqualizeMode, GammaLevel};
use vidhance_core::preview::PreviewSession;

#[derive(Clone, Copy, ValueEnum)]
pub enum EqualizeArg {
    None,
    Global,
    Adaptive,
}

impl From<EqualizeArg> for EqualizeMode {
    fn from(arg: EqualizeArg) -> Self {
        match arg {
            EqualizeArg::None => EqualizeMode::None,
            EqualizeArg::Global => EqualizeMode::Global,
            EqualizeArg::Adaptive => EqualizeMode::Adaptive,
        }
    }
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Input SER file
    pub file: PathBuf,

    /// Frame to preview (0-based)
    #[arg(long, default_value = "0")]
    pub frame: usize,

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

    /// Replace the frame with its Canny edge map
    #[arg(long)]
    pub edges: bool,

    /// Apply a 3x3 sharpening kernel last
    #[arg(long)]
    pub sharpen: bool,

    /// Output image path (PNG or TIFF)
    #[arg(short, long, default_value = "preview.png")]
    pub output: PathBuf,
}

pub fn run(args: &PreviewArgs) -> Result<()> {
    let mut session = PreviewSession::load(&args.file, args.frame)
        .with_context(|| format!("Failed to load frame {} of {}", args.frame, args.file.display()))?;

    println!(
        "Loaded frame {} of {} ({}x{})",
        session.frame_index(),
        session.total_frames(),
        session.current().width(),
        session.current().height()
    );

    if let Some(level) = args.gamma {
        let level = GammaLevel::new(level);
        println!("Applying gamma: {level}");
        session = session.with_gamma(level);
    }

    let mode = EqualizeMode::from(args.equalize);
    if mode != EqualizeMode::None {
        session = session.compute_histogram()?;
        if let Some(histogram) = session.histogram() {
            println!("Histogram median: {:.1}", histogram.median());
        }
        let params = ClaheParams {
            clip_limit: args.clip_limit,
            tiles_x: args.tiles,
            tiles_y: args.tiles,
        };
        println!("Equalizing: {mode}");
        session = session.equalize(mode, &params)?;
    }

    if args.edges {
        println!("Detecting edges");
        session = session.with_edges()?;
    }

    if args.sharpen {
        println!("Sharpening");
        session = session.sharpened();
    }

    save_image(session.current(), &args.output)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
