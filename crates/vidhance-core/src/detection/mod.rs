pub mod canny;

pub use canny::{canny, detect_edges, CannyThresholds};
