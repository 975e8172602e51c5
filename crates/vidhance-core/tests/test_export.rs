mod common;

use std::path::Path;
use std::sync::Mutex;

use common::{build_ser_full, build_ser_with_frames, numbered_frames, write_named_ser};
use vidhance_core::io::ser::{SerReader, SER_COLOR_MONO, SER_COLOR_RGB};
use vidhance_core::pipeline::config::{
    CropRange, EnhancementSpec, EqualizeMode, ExportConfig, GammaLevel,
};
use vidhance_core::pipeline::{
    export_videos, export_videos_reported, output_path_for, CancelToken, ExportReporter,
    NoOpReporter, VideoOutcome, VideoStatus,
};

/// Records progress and trips the cancel token when video `cancel_at` starts.
struct CancellingReporter {
    cancel: CancelToken,
    cancel_at: usize,
    percents: Mutex<Vec<u8>>,
}

impl ExportReporter for CancellingReporter {
    fn begin_video(&self, index: usize, _total: usize, _input: &Path) {
        if index == self.cancel_at {
            self.cancel.cancel();
        }
    }

    fn finish_video(&self, percent: u8, _outcome: &VideoOutcome) {
        self.percents.lock().unwrap().push(percent);
    }
}

fn config(dir: &std::path::Path, inputs: Vec<std::path::PathBuf>) -> ExportConfig {
    ExportConfig {
        output_dir: dir.join("out"),
        inputs,
        enhancement: EnhancementSpec::default(),
        crop: CropRange::default(),
    }
}

#[test]
fn test_crop_writes_exact_frame_range() {
    let dir = tempfile::tempdir().unwrap();
    let frames = numbered_frames(8, 4, 10);
    let input = write_named_ser(dir.path(), "clip.ser", &build_ser_with_frames(8, 4, &frames));

    let mut cfg = config(dir.path(), vec![input.clone()]);
    cfg.crop = CropRange {
        enabled: true,
        start_frame: 2,
        end_offset_from_tail: 3,
    };
    let report = export_videos(&cfg, |_| {}).unwrap();

    assert_eq!(report.videos[0].status, VideoStatus::Written { frames: 5 });
    let output = report.videos[0].output.clone().unwrap();
    assert_eq!(output, dir.path().join("out").join("clip_enh.ser"));

    let reader = SerReader::open(&output).unwrap();
    assert_eq!(reader.frame_count(), 5);
    for (k, src) in (2..7).enumerate() {
        let frame = reader.read_frame(k).unwrap();
        assert_eq!(frame.data.as_slice().unwrap(), frames[src].as_slice());
    }
}

#[test]
fn test_identity_export_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let frames = numbered_frames(6, 5, 3);
    let input = write_named_ser(dir.path(), "raw.ser", &build_ser_with_frames(6, 5, &frames));

    let mut cfg = config(dir.path(), vec![input]);
    cfg.enhancement.gamma_enabled = true;
    cfg.enhancement.gamma = GammaLevel::NEUTRAL;
    let report = export_videos(&cfg, |_| {}).unwrap();
    assert!(report.all_succeeded());

    let reader = SerReader::open(report.videos[0].output.as_ref().unwrap()).unwrap();
    for (i, expected) in frames.iter().enumerate() {
        assert_eq!(
            reader.read_frame(i).unwrap().data.as_slice().unwrap(),
            expected.as_slice()
        );
    }
}

#[test]
fn test_missing_source_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_named_ser(
        dir.path(),
        "good.ser",
        &build_ser_with_frames(4, 4, &numbered_frames(4, 4, 2)),
    );
    let missing = dir.path().join("missing.ser");

    let cfg = config(dir.path(), vec![missing, good]);
    let report = export_videos(&cfg, |_| {}).unwrap();

    assert!(matches!(report.videos[0].status, VideoStatus::Failed { .. }));
    assert!(report.videos[0].output.is_none());
    assert_eq!(report.videos[1].status, VideoStatus::Written { frames: 2 });
    assert_eq!(report.succeeded(), 1);
    assert!(!report.all_succeeded());
}

#[test]
fn test_progress_reported_per_video() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_ser_with_frames(4, 4, &numbered_frames(4, 4, 3));
    let a = write_named_ser(dir.path(), "a.ser", &data);
    let b = write_named_ser(dir.path(), "b.ser", &data);

    let seen = Mutex::new(Vec::new());
    let report = export_videos(&config(dir.path(), vec![a, b]), |p| {
        seen.lock().unwrap().push(p)
    })
    .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![50, 100]);
    assert_eq!(
        report.message(),
        format!(
            "all enhanced videos saved successfully to {}",
            dir.path().join("out").display()
        )
    );
}

#[test]
fn test_empty_crop_gives_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_named_ser(
        dir.path(),
        "short.ser",
        &build_ser_with_frames(4, 4, &numbered_frames(4, 4, 4)),
    );

    let mut cfg = config(dir.path(), vec![input]);
    cfg.crop = CropRange {
        enabled: true,
        start_frame: 3,
        end_offset_from_tail: 2,
    };
    let report = export_videos(&cfg, |_| {}).unwrap();

    assert_eq!(report.videos[0].status, VideoStatus::Empty);
    let reader = SerReader::open(report.videos[0].output.as_ref().unwrap()).unwrap();
    assert_eq!(reader.frame_count(), 0);
}

#[test]
fn test_cancelled_export_skips_videos() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_ser_with_frames(4, 4, &numbered_frames(4, 4, 2));
    let a = write_named_ser(dir.path(), "a.ser", &data);
    let b = write_named_ser(dir.path(), "b.ser", &data);

    let cancel = CancelToken::new();
    cancel.cancel();
    let report =
        export_videos_reported(&config(dir.path(), vec![a, b]), &NoOpReporter, &cancel).unwrap();

    assert!(report.videos.iter().all(|v| v.status == VideoStatus::Skipped));
    assert_eq!(report.succeeded(), 0);
}

#[test]
fn test_cancel_during_video_finalizes_output_and_skips_rest() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_ser_with_frames(4, 4, &numbered_frames(4, 4, 5));
    let a = write_named_ser(dir.path(), "a.ser", &data);
    let b = write_named_ser(dir.path(), "b.ser", &data);
    let c = write_named_ser(dir.path(), "c.ser", &data);

    let cancel = CancelToken::new();
    let reporter = CancellingReporter {
        cancel: cancel.clone(),
        cancel_at: 1,
        percents: Mutex::new(Vec::new()),
    };
    let report =
        export_videos_reported(&config(dir.path(), vec![a, b, c]), &reporter, &cancel).unwrap();

    assert_eq!(report.videos[0].status, VideoStatus::Written { frames: 5 });
    assert_eq!(report.videos[1].status, VideoStatus::Cancelled { frames: 0 });
    assert_eq!(report.videos[2].status, VideoStatus::Skipped);
    assert!(report.videos[2].output.is_none());

    // the interrupted output is a valid, finalized SER file
    let partial = SerReader::open(report.videos[1].output.as_ref().unwrap()).unwrap();
    assert_eq!(partial.frame_count(), 0);

    assert_eq!(*reporter.percents.lock().unwrap(), vec![33, 66, 100]);
}

#[test]
fn test_same_stem_inputs_do_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let first_dir = dir.path().join("night1");
    let second_dir = dir.path().join("night2");
    std::fs::create_dir_all(&first_dir).unwrap();
    std::fs::create_dir_all(&second_dir).unwrap();

    let first_frames = numbered_frames(4, 4, 2);
    let first = write_named_ser(
        &first_dir,
        "clip.ser",
        &build_ser_with_frames(4, 4, &first_frames),
    );
    let second = write_named_ser(
        &second_dir,
        "clip.ser",
        &build_ser_with_frames(4, 4, &numbered_frames(4, 4, 6)),
    );

    let report = export_videos(&config(dir.path(), vec![first, second]), |_| {}).unwrap();

    assert_eq!(report.videos[0].status, VideoStatus::Written { frames: 2 });
    assert!(matches!(report.videos[1].status, VideoStatus::Failed { .. }));
    assert!(report.videos[1].output.is_none());

    let kept = SerReader::open(report.videos[0].output.as_ref().unwrap()).unwrap();
    assert_eq!(kept.frame_count(), 2);
    assert_eq!(
        kept.read_frame(1).unwrap().data.as_slice().unwrap(),
        first_frames[1].as_slice()
    );
}

#[test]
fn test_equalize_turns_color_output_mono() {
    let dir = tempfile::tempdir().unwrap();
    let frames: Vec<Vec<u8>> = (0..2)
        .map(|i| (0..4 * 4 * 3).map(|p| (p * 5 + i) as u8).collect())
        .collect();
    let input = write_named_ser(
        dir.path(),
        "color.ser",
        &build_ser_full(4, 4, SER_COLOR_RGB, &frames, None),
    );

    let mut cfg = config(dir.path(), vec![input.clone()]);
    cfg.enhancement.equalize = EqualizeMode::Global;
    let report = export_videos(&cfg, |_| {}).unwrap();
    let out = SerReader::open(report.videos[0].output.as_ref().unwrap()).unwrap();
    assert_eq!(out.header.color_id, SER_COLOR_MONO);
    assert_eq!(out.read_frame(0).unwrap().channels(), 1);

    let mut cfg = config(dir.path(), vec![input]);
    cfg.enhancement.gamma_enabled = true;
    cfg.enhancement.gamma = GammaLevel::new(13);
    let report = export_videos(&cfg, |_| {}).unwrap();
    let out = SerReader::open(report.videos[0].output.as_ref().unwrap()).unwrap();
    assert_eq!(out.header.color_id, SER_COLOR_RGB);
    assert_eq!(out.read_frame(1).unwrap().channels(), 3);
}

#[test]
fn test_timestamps_follow_cropped_frames() {
    let dir = tempfile::tempdir().unwrap();
    let frames = numbered_frames(4, 2, 5);
    let ts: Vec<u64> = (0..5).map(|i| 1000 + i * 10).collect();
    let input = write_named_ser(
        dir.path(),
        "timed.ser",
        &build_ser_full(4, 2, SER_COLOR_MONO, &frames, Some(&ts)),
    );

    let mut cfg = config(dir.path(), vec![input]);
    cfg.crop = CropRange {
        enabled: true,
        start_frame: 1,
        end_offset_from_tail: 1,
    };
    let report = export_videos(&cfg, |_| {}).unwrap();
    let out = SerReader::open(report.videos[0].output.as_ref().unwrap()).unwrap();
    assert_eq!(out.frame_count(), 3);
    assert_eq!(out.timestamp(0), Some(1010));
    assert_eq!(out.timestamp(2), Some(1030));
}

#[test]
fn test_output_naming() {
    let out = output_path_for(
        std::path::Path::new("/exports"),
        std::path::Path::new("/data/saturn_2024.ser"),
    );
    assert_eq!(out, std::path::PathBuf::from("/exports/saturn_2024_enh.ser"));
}
