//! Optional user configuration.
//!
//! Settings live in `<config_dir>/focuslock/config.json`. Every field has a
//! default, so a missing file or a partial file is fine; a malformed file is
//! an error.
//!
//! # Example
//!
//! ```json
//! {
//!   "player_path": "D:\\Apps\\Spotify\\Spotify.exe",
//!   "sound": false
//! }
//! ```

mod error;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::ConfigError;

use crate::launcher::ExecutablePaths;
use crate::session::SessionTiming;

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "focuslock";

/// File name of the configuration file.
pub const CONFIG_FILE: &str = "config.json";

fn default_viewer_title_pattern() -> String {
    ".pdf".to_string()
}

fn default_player_title_pattern() -> String {
    "spotify".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_launch_settle_ms() -> u64 {
    6000
}

fn default_discovery_attempts() -> u32 {
    15
}

fn default_discovery_delay_ms() -> u64 {
    1000
}

fn default_present_delay_ms() -> u64 {
    1100
}

fn default_restore_retry_delay_ms() -> u64 {
    500
}

fn default_sound() -> bool {
    true
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Explicit PDF viewer executable, tried before the install locations.
    #[serde(default)]
    pub viewer_path: Option<PathBuf>,

    /// Explicit music player executable, tried before the install locations.
    #[serde(default)]
    pub player_path: Option<PathBuf>,

    /// Case-insensitive substring identifying the viewer's window title.
    #[serde(default = "default_viewer_title_pattern")]
    pub viewer_title_pattern: String,

    /// Case-insensitive substring identifying the player's window title.
    #[serde(default = "default_player_title_pattern")]
    pub player_title_pattern: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Wait after launching before looking for windows.
    #[serde(default = "default_launch_settle_ms")]
    pub launch_settle_ms: u64,

    #[serde(default = "default_discovery_attempts")]
    pub discovery_attempts: u32,

    #[serde(default = "default_discovery_delay_ms")]
    pub discovery_delay_ms: u64,

    /// Wait between focusing the viewer and sending the presentation key.
    #[serde(default = "default_present_delay_ms")]
    pub present_delay_ms: u64,

    #[serde(default = "default_restore_retry_delay_ms")]
    pub restore_retry_delay_ms: u64,

    /// Whether to play break and focus cues.
    #[serde(default = "default_sound")]
    pub sound: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewer_path: None,
            player_path: None,
            viewer_title_pattern: default_viewer_title_pattern(),
            player_title_pattern: default_player_title_pattern(),
            poll_interval_ms: default_poll_interval_ms(),
            launch_settle_ms: default_launch_settle_ms(),
            discovery_attempts: default_discovery_attempts(),
            discovery_delay_ms: default_discovery_delay_ms(),
            present_delay_ms: default_present_delay_ms(),
            restore_retry_delay_ms: default_restore_retry_delay_ms(),
            sound: default_sound(),
        }
    }
}

impl AppConfig {
    /// Location of the configuration file on this machine.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads the file at the default location, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.viewer_title_pattern.trim().is_empty()
            || self.player_title_pattern.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "title patterns must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Executable overrides for the launcher.
    pub fn executable_paths(&self) -> ExecutablePaths {
        ExecutablePaths {
            viewer: self.viewer_path.clone(),
            player: self.player_path.clone(),
        }
    }

    /// Timing and discovery settings for the session worker.
    pub fn timing(&self) -> SessionTiming {
        SessionTiming {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            launch_settle: Duration::from_millis(self.launch_settle_ms),
            discovery_attempts: self.discovery_attempts,
            discovery_delay: Duration::from_millis(self.discovery_delay_ms),
            present_delay: Duration::from_millis(self.present_delay_ms),
            restore_retry_delay: Duration::from_millis(self.restore_retry_delay_ms),
            viewer_title_pattern: self.viewer_title_pattern.clone(),
            player_title_pattern: self.player_title_pattern.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.viewer_path, None);
        assert_eq!(config.viewer_title_pattern, ".pdf");
        assert_eq!(config.player_title_pattern, "spotify");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.launch_settle_ms, 6000);
        assert_eq!(config.discovery_attempts, 15);
        assert_eq!(config.discovery_delay_ms, 1000);
        assert!(config.sound);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sound": false, "poll_interval_ms": 250 }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(!config.sound);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.discovery_attempts, 15);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "poll_interval_ms": 0 }"#).unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_timing_conversion() {
        let timing = AppConfig::default().timing();
        assert_eq!(timing.poll_interval, Duration::from_millis(500));
        assert_eq!(timing.launch_settle, Duration::from_secs(6));
        assert_eq!(timing.discovery_delay, Duration::from_secs(1));
        assert_eq!(timing.discovery_attempts, 15);
        assert_eq!(timing.present_delay, Duration::from_millis(1100));
        assert_eq!(timing.restore_retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_executable_paths() {
        let config = AppConfig {
            player_path: Some(PathBuf::from("/opt/spotify")),
            ..AppConfig::default()
        };
        let paths = config.executable_paths();
        assert_eq!(paths.player, Some(PathBuf::from("/opt/spotify")));
        assert_eq!(paths.viewer, None);
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        if let Some(path) = AppConfig::default_path() {
            assert!(path.ends_with(Path::new(APP_DIR).join(CONFIG_FILE)));
        }
    }
}
