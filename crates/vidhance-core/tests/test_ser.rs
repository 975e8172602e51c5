mod common;

use approx::assert_relative_eq;
use common::{build_ser_full, build_ser_header_full, build_ser_with_frames, write_test_ser};
use vidhance_core::error::VidhanceError;
use vidhance_core::frame::{ColorMode, Frame, PixelFormat};
use vidhance_core::io::ser::{SerHeader, SerReader, SER_COLOR_BGR, SER_COLOR_MONO};
use vidhance_core::io::SerWriter;

#[test]
fn test_parse_8bit_mono() {
    let frames = vec![vec![10u8; 12], vec![20u8; 12]];
    let tmp = write_test_ser(&build_ser_with_frames(4, 3, &frames));

    let reader = SerReader::open(tmp.path()).unwrap();
    assert_eq!(reader.frame_count(), 2);
    assert_eq!(reader.header.width, 4);
    assert_eq!(reader.header.height, 3);
    assert_eq!(reader.header.observer, "Tester");

    let frame = reader.read_frame(1).unwrap();
    assert_eq!(frame.data.dim(), (3, 4, 1));
    assert_eq!(frame.format, PixelFormat::Gray);
    assert_eq!(frame.metadata.frame_index, 1);
    assert!(frame.data.iter().all(|&v| v == 20));
}

#[test]
fn test_source_info() {
    let frames = vec![vec![0u8; 4]; 3];
    let tmp = write_test_ser(&build_ser_full(2, 2, SER_COLOR_MONO, &frames, None));
    let reader = SerReader::open(tmp.path()).unwrap();
    let info = reader.source_info(tmp.path());

    assert_eq!(info.total_frames, 3);
    assert_eq!(info.width, 2);
    assert_eq!(info.bit_depth, 8);
    assert_eq!(info.color_mode, ColorMode::Mono);
    assert_eq!(info.observer.as_deref(), Some("Tester"));
    assert!(info.telescope.is_none());
    assert!(info.frame_rate.is_none());
}

#[test]
fn test_timestamps_give_frame_rate() {
    let frames = vec![vec![0u8; 4]; 3];
    // 0.5 s apart in 100 ns ticks
    let ts = [1_000_000u64, 6_000_000, 11_000_000];
    let tmp = write_test_ser(&build_ser_full(2, 2, SER_COLOR_MONO, &frames, Some(&ts)));
    let reader = SerReader::open(tmp.path()).unwrap();

    assert_eq!(reader.timestamp(1), Some(6_000_000));
    assert_eq!(reader.read_frame(2).unwrap().metadata.timestamp, Some(11_000_000));
    assert_relative_eq!(reader.frame_rate().unwrap(), 2.0, epsilon = 1e-9);
}

#[test]
fn test_16bit_narrowed_to_8bit() {
    let mut data = build_ser_header_full(2, 1, 16, 1, SER_COLOR_MONO);
    data.extend_from_slice(&0xABCDu16.to_le_bytes());
    data.extend_from_slice(&0x00FFu16.to_le_bytes());
    let tmp = write_test_ser(&data);

    let frame = SerReader::open(tmp.path()).unwrap().read_frame(0).unwrap();
    assert_eq!(frame.data[[0, 0, 0]], 0xAB);
    assert_eq!(frame.data[[0, 1, 0]], 0x00);
}

#[test]
fn test_12bit_narrowed_by_depth() {
    let mut data = build_ser_header_full(1, 1, 12, 1, SER_COLOR_MONO);
    data.extend_from_slice(&4095u16.to_le_bytes());
    let tmp = write_test_ser(&data);

    let frame = SerReader::open(tmp.path()).unwrap().read_frame(0).unwrap();
    assert_eq!(frame.data[[0, 0, 0]], 255);
}

#[test]
fn test_bgr_frames_keep_channel_order() {
    let frames = vec![vec![1u8, 2, 3, 4, 5, 6]];
    let tmp = write_test_ser(&build_ser_full(2, 1, SER_COLOR_BGR, &frames, None));
    let frame = SerReader::open(tmp.path()).unwrap().read_frame(0).unwrap();

    assert_eq!(frame.format, PixelFormat::Bgr);
    assert_eq!(frame.data.dim(), (1, 2, 3));
    assert_eq!(frame.data[[0, 1, 0]], 4);
}

#[test]
fn test_frame_out_of_range() {
    let tmp = write_test_ser(&build_ser_with_frames(2, 2, &[vec![0u8; 4]]));
    let reader = SerReader::open(tmp.path()).unwrap();

    match reader.read_frame(5) {
        Err(VidhanceError::FrameUnavailable { index, total }) => {
            assert_eq!(index, 5);
            assert_eq!(total, 1);
        }
        other => panic!("expected FrameUnavailable, got {other:?}"),
    }
}

#[test]
fn test_rejects_bad_magic_and_truncation() {
    let mut data = build_ser_with_frames(2, 2, &[vec![0u8; 4]]);
    data[0] = b'X';
    let tmp = write_test_ser(&data);
    assert!(matches!(
        SerReader::open(tmp.path()),
        Err(VidhanceError::InvalidSer(_))
    ));

    let mut data = build_ser_with_frames(2, 2, &[vec![0u8; 4], vec![0u8; 4]]);
    data.truncate(data.len() - 2);
    let tmp = write_test_ser(&data);
    assert!(matches!(
        SerReader::open(tmp.path()),
        Err(VidhanceError::InvalidSer(_))
    ));
}

#[test]
fn test_writer_patches_frame_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ser");

    let mut writer = SerWriter::create(&path, &SerHeader::eight_bit(3, 2, SER_COLOR_MONO)).unwrap();
    for value in [7u8, 8, 9] {
        let frame = Frame::from_gray(ndarray::Array2::from_elem((2, 3), value));
        writer.write_frame(&frame).unwrap();
    }
    assert_eq!(writer.finalize().unwrap(), 3);

    let reader = SerReader::open(&path).unwrap();
    assert_eq!(reader.frame_count(), 3);
    assert_eq!(reader.read_frame(2).unwrap().data[[1, 2, 0]], 9);
    assert_eq!(reader.timestamp(0), None);
}

#[test]
fn test_writer_keeps_timestamps() {
    let frames = vec![vec![1u8; 4], vec![2u8; 4]];
    let ts = [100u64, 200];
    let src = write_test_ser(&build_ser_full(2, 2, SER_COLOR_MONO, &frames, Some(&ts)));
    let reader = SerReader::open(src.path()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.ser");
    let mut writer = SerWriter::create(&path, &SerHeader::eight_bit(2, 2, SER_COLOR_MONO)).unwrap();
    for frame in reader.frames(0, reader.frame_count()) {
        writer.write_frame(&frame.unwrap()).unwrap();
    }
    writer.finalize().unwrap();

    let copy = SerReader::open(&path).unwrap();
    assert_eq!(copy.timestamp(0), Some(100));
    assert_eq!(copy.timestamp(1), Some(200));
}

#[test]
fn test_writer_rejects_wrong_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ser");
    let mut writer = SerWriter::create(&path, &SerHeader::eight_bit(4, 4, SER_COLOR_MONO)).unwrap();

    let small = Frame::from_gray(ndarray::Array2::zeros((2, 2)));
    assert!(matches!(
        writer.write_frame(&small),
        Err(VidhanceError::InvalidDimensions { .. })
    ));
    assert_eq!(writer.frames_written(), 0);
}
