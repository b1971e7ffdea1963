//! Cue playback error types.
//!
//! Audio is never essential to a session, so every error here is expected
//! to be logged and then ignored.

use thiserror::Error;

/// Errors that can occur while playing a cue.
#[derive(Debug, Error)]
pub enum CueError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create a sink on the output stream.
    #[error("failed to open audio stream: {0}")]
    StreamError(String),
}

impl CueError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio device or set \"sound\": false",
            Self::StreamError(_) => "Check the system audio settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CueError::DeviceNotAvailable("no device".to_string());
        assert!(err.to_string().contains("no device"));
        assert!(err.to_string().contains("audio device not available"));

        let err = CueError::StreamError("busy".to_string());
        assert!(err.to_string().contains("busy"));
    }

    #[test]
    fn test_is_device_error() {
        assert!(CueError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(!CueError::StreamError("x".into()).is_device_error());
    }

    #[test]
    fn test_suggestions() {
        assert!(CueError::DeviceNotAvailable("x".into())
            .suggestion()
            .contains("sound"));
        assert!(!CueError::StreamError("x".into()).suggestion().is_empty());
    }
}
