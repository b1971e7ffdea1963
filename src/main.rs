//! focuslock - a desktop focus lock
//!
//! Opens a PDF fullscreen next to a music player and keeps the desktop on
//! those two windows for the length of the session:
//! - classic: one uninterrupted focus block
//! - pomodoro: 25 minute focus blocks with 5 minute breaks

use std::io;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use focuslock::cli::{forward_ctrl_c, Cli, Commands, Display, Frontend, Prompt};
use focuslock::display::TerminalOverlay;
use focuslock::platform::{self, Desktop};
use focuslock::sound::{try_create_player, CuePlayer};
use focuslock::{AppConfig, SessionController, SessionError, SystemClock, SystemLauncher};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        match e.downcast_ref::<SessionError>() {
            Some(session_error) => {
                Display::show_error_with_hint(&session_error.to_string(), session_error.suggestion())
            }
            None => Display::show_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so they do not interleave with the countdown line.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;
    if cli.no_sound {
        config.sound = false;
    }

    let desktop = Desktop::native();
    let console = desktop.windows.own_console_window();
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = SessionController::new(
        desktop,
        Arc::new(SystemLauncher::new(config.executable_paths())),
        Arc::new(SystemClock),
        config.timing(),
        tx,
    )
    .with_overlay_window(console);

    let cues = if config.sound {
        try_create_player(false).map(|player| Rc::new(player) as Rc<dyn CuePlayer>)
    } else {
        None
    };

    let overlay = TerminalOverlay::with_escapes(io::stdout(), platform::enable_ansi_output());
    let mut frontend = Frontend::new(controller, rx, overlay, Prompt::new(tokio::io::stdin()))
        .with_cues(cues)
        .with_interrupts(forward_ctrl_c());

    match cli.request() {
        Some(request) => {
            frontend.run_session(request).await?;
        }
        None => frontend.run_interactive().await?,
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_flag_mode() {
        let cli = Cli::parse_from(["focuslock", "--pdf", "a.pdf", "--pomodoro", "-d", "120"]);
        let request = cli.request().unwrap();
        assert_eq!(request.minutes, 120);
        assert!(cli.pomodoro);
    }

    #[test]
    fn test_cli_parse_interactive() {
        let cli = Cli::parse_from(["focuslock", "--verbose"]);
        assert!(cli.request().is_none());
        assert!(cli.verbose);
    }
}
