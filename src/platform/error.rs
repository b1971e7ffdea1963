//! Platform call error types.
//!
//! Every desktop operation returns a typed result so the enforcement loop
//! can decide per call whether a window reference is lost or whether the
//! next tick should simply try again.

use thiserror::Error;

use super::types::WindowHandle;

/// Errors returned by the desktop capability traits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The window no longer exists.
    #[error("window {0} is gone")]
    WindowGone(WindowHandle),

    /// The OS refused the call (focus stealing prevention, missing privileges).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The capability is not available on this platform.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    /// Any other failure reported by the OS.
    #[error("platform call failed: {0}")]
    Other(String),
}

/// Result alias for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

impl PlatformError {
    /// Returns true if the referenced window has disappeared.
    #[must_use]
    pub fn is_window_gone(&self) -> bool {
        matches!(self, Self::WindowGone(_))
    }

    /// Returns true if retrying on a later tick may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::Other(_))
    }

    /// Returns a user-facing hint for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::WindowGone(_) => "The application window was closed; it will be relaunched if possible",
            Self::PermissionDenied(_) => "Run focuslock from an interactive desktop session",
            Self::Unsupported(_) => "Window locking is only fully supported on Windows",
            Self::Other(_) => "The call will be retried on the next tick",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlatformError::WindowGone(WindowHandle::new(0x10));
        assert_eq!(err.to_string(), "window 0x10 is gone");

        let err = PlatformError::Unsupported("taskbar control");
        assert!(err.to_string().contains("taskbar control"));

        let err = PlatformError::PermissionDenied("SetForegroundWindow refused".into());
        assert!(err.to_string().contains("SetForegroundWindow"));
    }

    #[test]
    fn test_classification() {
        let gone = PlatformError::WindowGone(WindowHandle::new(1));
        assert!(gone.is_window_gone());
        assert!(!gone.is_transient());

        let denied = PlatformError::PermissionDenied("x".into());
        assert!(denied.is_transient());
        assert!(!denied.is_window_gone());

        assert!(!PlatformError::Unsupported("x").is_transient());

        assert!(PlatformError::Other("x".into()).is_transient());
    }

    #[test]
    fn test_suggestion_not_empty() {
        let errors = [
            PlatformError::WindowGone(WindowHandle::new(1)),
            PlatformError::PermissionDenied("x".into()),
            PlatformError::Unsupported("x"),
            PlatformError::Other("x".into()),
        ];
        for err in errors {
            assert!(!err.suggestion().is_empty());
        }
    }
}
