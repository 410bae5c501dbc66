//! Error types for dominant color extraction

use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, PaletteError>;

#[derive(Error, Debug)]
pub enum PaletteError {
    /// Malformed or empty image buffer, or an unusable cluster count.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing, empty or unparsable reference color table.
    #[error("Reference color table error: {0}")]
    Config(String),

    /// Color conversion received data that is not made of 3-vectors.
    #[error("Expected 3-component color vectors, got {len} components")]
    Shape { len: usize },

    #[error("Unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaletteError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
