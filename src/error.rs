//! Error types for editing operations

use thiserror::Error;

/// Result type alias for editing operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Error types for pixel transforms, history navigation and collaborator calls
#[derive(Error, Debug)]
pub enum EditorError {
    /// Pixel access outside the buffer
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Mask, raw data or buffer sizes disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Undo/redo at a history boundary
    #[error("Nothing to {0}")]
    NoOp(String),

    /// Collaborator (segmentation or detection model) is not available
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Collaborator inference failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Invalid operation parameter (blur radius, adjustment value, mask value)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Another mutating operation is still in flight
    #[error("Session busy: {0} rejected while another operation is in progress")]
    Busy(String),

    /// Operation requires a loaded image
    #[error("No image loaded")]
    NoImage,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration or box list (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EditorError {
    /// Create a new history boundary error
    pub fn no_op<S: Into<String>>(action: S) -> Self {
        Self::NoOp(action.into())
    }

    /// Create a new model unavailable error
    pub fn model_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new busy error naming the rejected operation
    pub fn busy<S: Into<String>>(operation: S) -> Self {
        Self::Busy(operation.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a dimension mismatch error
    #[must_use]
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create inference error with provider context
    pub fn inference_error_with_provider(provider: &str, operation: &str, error: &str) -> Self {
        Self::Inference(format!(
            "{} failed using '{}' provider: {}",
            operation, provider, error
        ))
    }

    /// Whether the session stays usable with `current` untouched after this error.
    ///
    /// Boundary hits, busy rejections and collaborator failures are expected
    /// steady-state outcomes; everything else aborts the single operation.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoOp(_) | Self::Busy(_) | Self::ModelUnavailable(_) | Self::Inference(_)
        )
    }
}
