// THEORY:
// Every fallible operation in the crate reports through one error type. The core
// color math is total over its input domain, so the only core condition is
// `InvalidColorValue`, a local, recoverable rejection of a malformed sample. The
// remaining variants belong to the layers around the core: frame buffers,
// configuration tables, image I/O and the worker pool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HueLensError {
    #[error("Invalid color value {value} for channel {channel}; expected a finite value in [0, 255]")]
    InvalidColorValue { channel: &'static str, value: f64 },
    #[error("Sample ({x}, {y}) lies outside the {width}x{height} frame")]
    SampleOutOfBounds {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
    #[error("Frame buffer holds {actual} bytes but {expected} were expected")]
    FrameSizeMismatch { expected: usize, actual: usize },
    #[error("Hue band table does not tile the hue circle: {0}")]
    InvalidBandTable(String),
    #[error("Correction table is inconsistent: {0}")]
    InvalidCorrectionTable(String),
    #[error("Nearest-palette classification needs at least one palette entry")]
    EmptyPalette,
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image failure: {0}")]
    Image(#[from] image::ImageError),
    #[error("Worker pool unavailable: {0}")]
    WorkerUnavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, HueLensError>;
