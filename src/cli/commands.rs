//! Command definitions for the focuslock CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::Variant;

// ============================================================================
// CLI Structure
// ============================================================================

/// focuslock - lock the desktop to one PDF and a music player
#[derive(Parser, Debug)]
#[command(
    name = "focuslock",
    version,
    about = "Lock the desktop to a PDF and a music player for a timed focus session",
    long_about = "Opens a PDF fullscreen next to a music player, blocks task-switching \
                  shortcuts, hides the taskbar and pulls focus back until the session \
                  ends.\n\nRun without arguments for an interactive prompt.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// PDF to study; runs one session and exits
    #[arg(short, long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Session length in minutes
    #[arg(short, long, value_name = "MINUTES")]
    pub duration: Option<u64>,

    /// Alternate 25 minute focus blocks with 5 minute breaks
    #[arg(long)]
    pub pomodoro: bool,

    /// Disable break and focus cues
    #[arg(long)]
    pub no_sound: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Session request
// ============================================================================

/// What the user asked for, from flags or from the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub pdf: Option<PathBuf>,
    pub variant: Variant,
    pub minutes: u64,
}

impl Cli {
    /// Variant selected by the flags.
    pub fn variant(&self) -> Variant {
        if self.pomodoro {
            Variant::Pomodoro
        } else {
            Variant::Classic
        }
    }

    /// Returns the request for flag mode, or `None` for the interactive prompt.
    pub fn request(&self) -> Option<SessionRequest> {
        if self.command.is_some() {
            return None;
        }
        let pdf = self.pdf.clone()?;
        let variant = self.variant();
        Some(SessionRequest {
            pdf: Some(pdf),
            variant,
            minutes: self.duration.unwrap_or_else(|| variant.default_minutes()),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
