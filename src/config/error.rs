//! Configuration file error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or has fields of the wrong type.
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Io { .. } => "Check the permissions of the config file",
            Self::Parse { .. } => "Fix the JSON syntax or delete the file to use defaults",
            Self::Invalid(_) => "Use a positive value for every interval",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Invalid("poll_interval_ms must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid config value: poll_interval_ms must be positive"
        );

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::Parse {
            path: PathBuf::from("/tmp/config.json"),
            source,
        };
        assert!(err.to_string().contains("/tmp/config.json"));
        assert!(!err.suggestion().is_empty());
    }
}
