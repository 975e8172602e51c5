/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of intensity levels in an 8-bit sample.
pub const INTENSITY_LEVELS: usize = 256;

/// Slider position of the neutral gamma (exponent 1.0).
pub const GAMMA_NEUTRAL_LEVEL: u8 = 10;

/// Highest slider position (exponent 2.0).
pub const GAMMA_MAX_LEVEL: u8 = 20;

/// Slider steps per unit of gamma exponent.
pub const GAMMA_LEVELS_PER_UNIT: f32 = 10.0;

/// Default CLAHE clip limit.
pub const DEFAULT_CLAHE_CLIP_LIMIT: f32 = 40.0;

/// Default CLAHE tile grid (tiles per axis).
pub const DEFAULT_CLAHE_TILES: u32 = 8;

/// Spread around the median used to derive the Canny thresholds.
pub const CANNY_SIGMA: f64 = 0.33;

/// Binomial 5-tap kernel: [1, 4, 6, 4, 1] / 16.
/// This is the Gaussian a zero sigma resolves to at kernel size 5.
pub const BINOMIAL_KERNEL_5: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

/// Fixed 3x3 sharpening kernel (coefficients sum to 1).
pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 9, -1], [-1, -1, -1]];

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a color frame.
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Suffix appended to the input basename for exported videos.
pub const OUTPUT_SUFFIX: &str = "_enh";

/// Container extension of exported videos.
pub const OUTPUT_EXTENSION: &str = "ser";

/// SER timestamps count 100 ns ticks.
pub const SER_TICKS_PER_SECOND: f64 = 10_000_000.0;
