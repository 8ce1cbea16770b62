use thiserror::Error;

/// Rejected analysis/detection settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("peak count must be at least 1")]
    ZeroPeakCount,

    #[error("buffer length must be a positive power of two, got {0}")]
    BufferLength(usize),

    #[error("hold window must be a finite non-negative number of milliseconds, got {0}")]
    HoldWindow(f64),

    #[error("smoothing must be in [0, 1), got {0}")]
    Smoothing(f32),

    #[error("min_db ({min_db}) must be below max_db ({max_db})")]
    DecibelRange { min_db: f32, max_db: f32 },

    #[error("fps must be at least 1")]
    ZeroFps,

    #[error("unknown visualization '{name}'. Available: {available}")]
    UnknownVisualization { name: String, available: String },
}
