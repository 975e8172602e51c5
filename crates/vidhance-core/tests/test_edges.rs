use ndarray::{Array2, Array3};
use vidhance_core::detection::{canny, detect_edges, CannyThresholds};
use vidhance_core::frame::{Frame, PixelFormat};

#[test]
fn test_uniform_frame_has_no_edges() {
    let frame = Frame::from_gray(Array2::from_elem((20, 20), 140u8));
    let edges = detect_edges(&frame).unwrap();
    assert!(edges.data.iter().all(|&v| v == 0));
}

#[test]
fn test_output_is_binary_gray() {
    let frame = Frame::from_gray(Array2::from_shape_fn((24, 24), |(r, c)| {
        if (r / 6 + c / 6) % 2 == 0 { 30 } else { 220 }
    }));
    let edges = detect_edges(&frame).unwrap();

    assert_eq!(edges.format, PixelFormat::Gray);
    assert_eq!(edges.data.dim(), (24, 24, 1));
    assert!(edges.data.iter().all(|&v| v == 0 || v == 255));
    assert!(edges.data.iter().any(|&v| v == 255));
}

#[test]
fn test_color_frame_reduced_to_gray() {
    let data = Array3::from_shape_fn((16, 16, 3), |(_, c, _)| if c < 8 { 10u8 } else { 240 });
    let edges = detect_edges(&Frame::new(data, PixelFormat::Bgr)).unwrap();
    assert_eq!(edges.channels(), 1);
    assert!(edges.data.iter().any(|&v| v == 255));
}

#[test]
fn test_weak_edges_need_strong_neighbour() {
    // a single isolated ramp too faint for the high threshold
    let plane = Array2::from_shape_fn((10, 10), |(_, c)| if c < 5 { 100u8 } else { 104 });
    let edges = canny(&plane.view(), CannyThresholds { low: 5, high: 200 });
    assert!(edges.iter().all(|&v| v == 0));
}
