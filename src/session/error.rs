//! Session start error types.
//!
//! These are returned synchronously by [`SessionController::start`]; once a
//! session runs, problems are reported as warning events instead.
//!
//! [`SessionController::start`]: super::SessionController::start

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Variant;

/// Errors that prevent a session from starting.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No PDF path was given.
    #[error("no PDF selected")]
    NoPdfSelected,

    /// The PDF path does not point to a file.
    #[error("PDF not found: {}", .0.display())]
    PdfNotFound(PathBuf),

    /// The duration is not offered for the variant.
    #[error("{minutes} minutes is not a supported {} duration", variant.as_str())]
    UnsupportedDuration { variant: Variant, minutes: u64 },

    /// A session is already running.
    #[error("a session is already active")]
    AlreadyActive,

    /// The session configuration is inconsistent.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// The worker thread could not be spawned.
    #[error("failed to start session worker: {0}")]
    WorkerSpawn(String),
}

impl SessionError {
    /// Returns true for errors caused by user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoPdfSelected | Self::PdfNotFound(_) | Self::UnsupportedDuration { .. }
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoPdfSelected => "Pass a PDF with --pdf or enter its path at the prompt",
            Self::PdfNotFound(_) => "Check the path and that the file exists",
            Self::UnsupportedDuration {
                variant: Variant::Classic,
                ..
            } => "Choose one of 15, 25, 30, 45, 60, 90 or 120 minutes",
            Self::UnsupportedDuration {
                variant: Variant::Pomodoro,
                ..
            } => "Choose one of 45, 60, 90, 120, 150 or 180 minutes",
            Self::AlreadyActive => "Reset the running session first",
            Self::InvalidConfig(_) => "Use positive focus and break lengths",
            Self::WorkerSpawn(_) => "Restart focuslock",
        }
    }
}
