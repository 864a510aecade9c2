//! Common error types for addrmatch binaries.

use addrmatch_core::LoadError;
use thiserror::Error;

/// Process-level error for startup, configuration and serving.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus could not be loaded
    #[error("corpus load error: {0}")]
    Load(#[from] LoadError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias using addrmatch Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_converts() {
        let err: Error = LoadError::Task("join failed".to_string()).into();
        assert!(matches!(err, Error::Load(_)));
        assert_eq!(
            err.to_string(),
            "corpus load error: corpus load task failed: join failed"
        );
    }

    #[test]
    fn test_config_message() {
        let err = Error::Config("threshold must be within [0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: threshold must be within [0, 1]"
        );
    }
}
