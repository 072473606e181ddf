//! Error types shared across flowpulse crates.

/// `(rows, cols)` pair used when reporting geometry problems.
pub type Dims = (usize, usize);

/// Top-level error type for flowpulse operations.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    /// A field handed to a fixed-shape consumer does not match its shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch { expected: Dims, actual: Dims },

    /// The thresholded motion mask contained no foreground region.
    #[error("No motion detected in frame")]
    NoMotionDetected,

    /// The frame geometry changed in the middle of a stream.
    #[error("Frame geometry changed: expected {expected:?}, got {actual:?}")]
    GeometryChanged { expected: Dims, actual: Dims },

    #[error("Smoothing factor must lie in [0, 1], got {alpha}")]
    InvalidAlpha { alpha: f64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MotionError.
pub type MotionResult<T> = Result<T, MotionError>;

impl MotionError {
    pub fn shape_mismatch(expected: Dims, actual: Dims) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    pub fn geometry_changed(expected: Dims, actual: Dims) -> Self {
        Self::GeometryChanged { expected, actual }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Per-frame conditions a caller can recover from by skipping the frame
    /// or reusing the previous result.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::NoMotionDetected | Self::GeometryChanged { .. }
        )
    }
}
