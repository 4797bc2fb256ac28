//! Error types for pixelflock.
//!
//! Only session setup can fail. Once a session exists, the per-frame path
//! (`tick`, `resize`, `request_transition`) is infallible.

use thiserror::Error;

/// Errors that can occur while setting up a session.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to open or decode a source image.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Failed to read a file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration JSON could not be parsed.
    #[error("Invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),
    /// Raw RGBA data does not match the declared dimensions.
    #[error("RGBA buffer has {actual} bytes, expected {expected} (width * height * 4)")]
    BufferSize {
        /// Bytes required by the declared dimensions.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },
    /// A configuration value is outside its valid domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_message() {
        let err = Error::BufferSize {
            expected: 16,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "RGBA buffer has 12 bytes, expected 16 (width * height * 4)"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
