//! Error types for serialization and configuration.
//!
//! Parsing itself never fails: malformed markup degrades to readable output.
//! These errors cover the surfaces around the parser (files, serializers,
//! configuration).

use thiserror::Error;

/// Error types raised outside the (infallible) parse pipeline.
///
/// # Examples
///
/// ```rust
/// use texmix_core::TexmixError;
///
/// let err = TexmixError::Config("max_depth must be positive".to_string());
/// assert_eq!(err.to_string(), "Configuration error: max_depth must be positive");
/// ```
#[derive(Error, Debug)]
pub enum TexmixError {
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error bubbled up from a collaborator (typesetter, loader).
    #[error("Parser error: {0}")]
    ParserError(#[from] anyhow::Error),
}

/// Type alias for [`Result<T, TexmixError>`].
pub type Result<T> = std::result::Result<T, TexmixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = TexmixError::Config("unknown format 'xml'".to_string());
        assert_eq!(
            format!("{error}"),
            "Configuration error: unknown format 'xml'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TexmixError = io_err.into();
        assert!(matches!(err, TexmixError::IoError(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TexmixError = json_err.into();
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: TexmixError = anyhow::anyhow!("engine crashed").into();
        assert_eq!(err.to_string(), "Parser error: engine crashed");
    }
}
