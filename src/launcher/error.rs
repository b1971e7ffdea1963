//! Process launcher error types.

use std::path::PathBuf;

use thiserror::Error;

use super::App;

/// Errors that can occur while starting an external application.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// None of the known install locations contain the executable.
    #[error("{0} executable not found")]
    ExecutableNotFound(App),

    /// The executable exists but the process could not be started.
    #[error("failed to start {app} from {}: {reason}", path.display())]
    SpawnFailed {
        app: App,
        path: PathBuf,
        reason: String,
    },
}

impl LaunchError {
    /// Returns true if the executable could not be located.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ExecutableNotFound(_))
    }

    /// Returns the application the error refers to.
    #[must_use]
    pub fn app(&self) -> App {
        match self {
            Self::ExecutableNotFound(app) => *app,
            Self::SpawnFailed { app, .. } => *app,
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::ExecutableNotFound(App::PdfViewer) => {
                "Install SumatraPDF or set viewer_path in the config file"
            }
            Self::ExecutableNotFound(App::MusicPlayer) => {
                "Install Spotify or set player_path in the config file"
            }
            Self::SpawnFailed { .. } => "Check that the executable can be started manually",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LaunchError::ExecutableNotFound(App::PdfViewer);
        assert_eq!(err.to_string(), "PDF viewer executable not found");

        let err = LaunchError::SpawnFailed {
            app: App::MusicPlayer,
            path: PathBuf::from("/usr/bin/spotify"),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/usr/bin/spotify"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_classification() {
        let err = LaunchError::ExecutableNotFound(App::MusicPlayer);
        assert!(err.is_not_found());
        assert_eq!(err.app(), App::MusicPlayer);
        assert!(err.suggestion().contains("player_path"));

        let err = LaunchError::SpawnFailed {
            app: App::PdfViewer,
            path: PathBuf::new(),
            reason: String::new(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.app(), App::PdfViewer);
    }
}
