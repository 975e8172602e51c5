use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::{Result, VidhanceError};
use crate::io::ser::SerReader;
use crate::io::ser_writer::SerWriter;

use super::config::{EnhancementSpec, ExportConfig};
use super::helpers::{enhance_frame, output_header, output_path_for};
use super::types::{
    CallbackReporter, CancelToken, ExportReport, ExportReporter, VideoOutcome, VideoStatus,
};

/// Export every input video with a thread-safe progress reporter.
///
/// Videos are processed strictly in input order and frames strictly in
/// source order. A failure in one video is recorded in its outcome and the
/// batch moves on; only failing to create `output_dir` aborts the call.
/// Every video, including those skipped after a cancel, gets a
/// `finish_video` call, so progress always ends at 100. An input whose
/// output name was already written by an earlier input is marked `Failed`
/// rather than overwriting it.
pub fn export_videos_reported(
    config: &ExportConfig,
    reporter: &dyn ExportReporter,
    cancel: &CancelToken,
) -> Result<ExportReport> {
    std::fs::create_dir_all(&config.output_dir)?;

    let total = config.inputs.len();
    info!(
        videos = total,
        output_dir = %config.output_dir.display(),
        "Exporting enhanced videos"
    );
    debug!(enhancement = ?config.enhancement, crop = %config.crop, "Export settings");

    let mut videos = Vec::with_capacity(total);
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    for (index, input) in config.inputs.iter().enumerate() {
        let percent = ((index + 1) * 100 / total) as u8;
        let output = output_path_for(&config.output_dir, input);

        if cancel.is_cancelled() {
            let outcome = VideoOutcome {
                input: input.clone(),
                output: None,
                status: VideoStatus::Skipped,
            };
            reporter.finish_video(percent, &outcome);
            videos.push(outcome);
            continue;
        }

        reporter.begin_video(index, total, input);
        let outcome = if claimed.contains(&output) {
            VideoOutcome {
                input: input.clone(),
                output: None,
                status: VideoStatus::Failed {
                    reason: format!(
                        "output {} is already taken by an earlier input",
                        output.display()
                    ),
                },
            }
        } else {
            export_one(input, output, config, cancel)
        };
        if let Some(written) = &outcome.output {
            claimed.insert(written.clone());
        }

        match &outcome.status {
            VideoStatus::Failed { reason } => {
                warn!(input = %input.display(), %reason, "Video export failed")
            }
            VideoStatus::Empty => {
                warn!(input = %input.display(), "Crop range left no frames, output is empty")
            }
            status => info!(input = %input.display(), %status, "Video exported"),
        }

        reporter.finish_video(percent, &outcome);
        videos.push(outcome);
    }

    Ok(ExportReport {
        output_dir: config.output_dir.clone(),
        videos,
    })
}

/// Export every input video.
///
/// `on_progress` receives `100 * completed / total` after each video.
pub fn export_videos<F>(config: &ExportConfig, on_progress: F) -> Result<ExportReport>
where
    F: FnMut(u8) + Send,
{
    let reporter = CallbackReporter(Mutex::new(on_progress));
    export_videos_reported(config, &reporter, &CancelToken::new())
}

fn export_one(
    input: &Path,
    output: PathBuf,
    config: &ExportConfig,
    cancel: &CancelToken,
) -> VideoOutcome {
    let failed = |output, error: VidhanceError| VideoOutcome {
        input: input.to_path_buf(),
        output,
        status: VideoStatus::Failed {
            reason: error.to_string(),
        },
    };

    let reader = match SerReader::open(input) {
        Ok(reader) => reader,
        Err(e) => {
            let error = VidhanceError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: e.to_string(),
            };
            return failed(None, error);
        }
    };

    let range = config.crop.resolve(reader.frame_count());
    let header = output_header(&reader.header, &config.enhancement);
    debug!(
        input = %input.display(),
        output = %output.display(),
        start = range.start,
        end = range.end,
        "Opened source"
    );

    let mut writer = match SerWriter::create(&output, &header) {
        Ok(writer) => writer,
        Err(e) => return failed(None, e),
    };

    let written = write_range(&reader, &mut writer, range, &config.enhancement, cancel);
    let finalized = writer.finalize();

    let status = match (written, finalized) {
        (Err(e), _) | (Ok(_), Err(e)) => return failed(Some(output), e),
        (Ok(false), Ok(0)) => VideoStatus::Empty,
        (Ok(false), Ok(frames)) => VideoStatus::Written { frames },
        (Ok(true), Ok(frames)) => VideoStatus::Cancelled { frames },
    };

    VideoOutcome {
        input: input.to_path_buf(),
        output: Some(output),
        status,
    }
}

/// Enhance and write frames in `range`. Returns `true` if cancelled.
fn write_range(
    reader: &SerReader,
    writer: &mut SerWriter,
    range: Range<usize>,
    spec: &EnhancementSpec,
    cancel: &CancelToken,
) -> Result<bool> {
    for frame in reader.frames(range.start, range.end) {
        if cancel.is_cancelled() {
            return Ok(true);
        }
        let frame = frame?;
        let enhanced = enhance_frame(&frame, spec)?;
        writer.write_frame(&enhanced)?;
    }
    Ok(false)
}
