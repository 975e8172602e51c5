use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vidhance_core::io::ser::SerReader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input SER files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    for (i, file) in args.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let reader = SerReader::open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        let info = reader.source_info(file);

        println!("File:        {}", info.filename.display());
        println!("Frames:      {}", info.total_frames);
        println!("Dimensions:  {}x{}", info.width, info.height);
        println!("Bit depth:   {}", info.bit_depth);
        println!("Color mode:  {:?}", info.color_mode);
        match info.frame_rate {
            Some(fps) => println!("Frame rate:  {fps:.2} fps"),
            None => println!("Frame rate:  unknown"),
        }

        if let Some(ref obs) = info.observer {
            println!("Observer:    {obs}");
        }
        if let Some(ref tel) = info.telescope {
            println!("Telescope:   {tel}");
        }
        if let Some(ref inst) = info.instrument {
            println!("Instrument:  {inst}");
        }

        let frame_bytes = reader.header.frame_byte_size();
        let total_mb = (frame_bytes * info.total_frames) as f64 / (1024.0 * 1024.0);
        println!("Data size:   {total_mb:.1} MB");
    }

    Ok(())
}
