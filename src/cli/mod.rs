//! CLI module for focuslock.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `prompt`: Interactive prompt on standard input
//! - `frontend`: Event loop that drives the overlay during a session
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod frontend;
pub mod prompt;

pub use commands::{Cli, Commands, SessionRequest};
pub use display::Display;
pub use frontend::{forward_ctrl_c, Frontend, SessionOutcome};
pub use prompt::Prompt;
