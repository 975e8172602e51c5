use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vidhance_core::filters::Histogram;
use vidhance_core::preview::get_frame;

#[derive(Args)]
pub struct HistogramArgs {
    /// Input SER file
    pub file: PathBuf,

    /// Frame to analyse (0-based)
    #[arg(long, default_value = "0")]
    pub frame: usize,

    /// Rendered plot width in pixels
    #[arg(long, default_value = "512")]
    pub width: u32,

    /// Rendered plot height in pixels
    #[arg(long, default_value = "200")]
    pub height: u32,

    /// Output image path
    #[arg(short, long, default_value = "histogram.png")]
    pub output: PathBuf,
}

pub fn run(args: &HistogramArgs) -> Result<()> {
    let (frame, total) = get_frame(&args.file, args.frame)
        .with_context(|| format!("Failed to load frame {} of {}", args.frame, args.file.display()))?;
    let gray = frame.to_gray();
    let histogram = Histogram::of(&gray)?;

    println!("Frame {} of {}", args.frame, total);
    println!("Pixels:  {}", histogram.total());
    println!("Median:  {:.1}", histogram.median());

    histogram
        .render(args.width, args.height)
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
