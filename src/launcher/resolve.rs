//! Executable discovery.
//!
//! Each application has an ordered list of install locations; the first one
//! that exists wins. A path from the config file is tried before the list.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::App;

/// Well-known Windows folders used to build candidate paths.
#[derive(Debug, Clone, Default)]
pub struct WindowsFolders {
    pub program_files: Option<PathBuf>,
    pub program_files_x86: Option<PathBuf>,
    pub local_app_data: Option<PathBuf>,
    pub roaming_app_data: Option<PathBuf>,
}

impl WindowsFolders {
    /// Reads the folders from the environment, falling back to `dirs`.
    pub fn from_env() -> Self {
        Self {
            program_files: env::var_os("ProgramFiles")
                .map(PathBuf::from)
                .or_else(|| Some(PathBuf::from(r"C:\Program Files"))),
            program_files_x86: env::var_os("ProgramFiles(x86)")
                .map(PathBuf::from)
                .or_else(|| Some(PathBuf::from(r"C:\Program Files (x86)"))),
            local_app_data: env::var_os("LOCALAPPDATA")
                .map(PathBuf::from)
                .or_else(dirs::data_local_dir),
            roaming_app_data: env::var_os("APPDATA")
                .map(PathBuf::from)
                .or_else(dirs::config_dir),
        }
    }
}

/// Candidate install paths on Windows, in probe order.
pub fn windows_candidates(app: App, folders: &WindowsFolders) -> Vec<PathBuf> {
    let under = |base: &Option<PathBuf>, dir: &str, exe: &str| {
        base.as_ref().map(|b| b.join(dir).join(exe))
    };
    let candidates = match app {
        App::PdfViewer => [
            under(&folders.program_files, "SumatraPDF", "SumatraPDF.exe"),
            under(&folders.program_files_x86, "SumatraPDF", "SumatraPDF.exe"),
            under(&folders.local_app_data, "SumatraPDF", "SumatraPDF.exe"),
        ],
        App::MusicPlayer => [
            under(&folders.roaming_app_data, "Spotify", "Spotify.exe"),
            under(&folders.local_app_data, "Spotify", "Spotify.exe"),
            under(&folders.program_files_x86, "Spotify", "Spotify.exe"),
        ],
    };
    candidates.into_iter().flatten().collect()
}

/// Candidate install paths for the platform this binary was built for.
pub fn candidate_paths(app: App) -> Vec<PathBuf> {
    if cfg!(windows) {
        return windows_candidates(app, &WindowsFolders::from_env());
    }
    match app {
        App::PdfViewer => Vec::new(),
        App::MusicPlayer if cfg!(target_os = "macos") => vec![PathBuf::from(
            "/Applications/Spotify.app/Contents/MacOS/Spotify",
        )],
        App::MusicPlayer => vec![
            PathBuf::from("/usr/bin/spotify"),
            PathBuf::from("/snap/bin/spotify"),
        ],
    }
}

/// Returns the first existing path among `override_path` and `candidates`.
pub fn first_existing(override_path: Option<&Path>, candidates: &[PathBuf]) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!("Configured executable {} does not exist", path.display());
    }
    candidates.iter().find(|p| p.is_file()).cloned()
}

/// Locates the executable for `app`.
pub fn resolve_executable(app: App, override_path: Option<&Path>) -> Option<PathBuf> {
    let candidates = candidate_paths(app);
    let found = first_existing(override_path, &candidates);
    match &found {
        Some(path) => debug!("{} resolved to {}", app, path.display()),
        None => debug!("{} not found in {} candidate(s)", app, candidates.len()),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folders(root: &Path) -> WindowsFolders {
        WindowsFolders {
            program_files: Some(root.join("pf")),
            program_files_x86: Some(root.join("pf86")),
            local_app_data: Some(root.join("local")),
            roaming_app_data: Some(root.join("roaming")),
        }
    }

    #[test]
    fn test_windows_candidate_order() {
        let root = PathBuf::from("root");
        let viewer = windows_candidates(App::PdfViewer, &folders(&root));
        assert_eq!(
            viewer,
            vec![
                root.join("pf").join("SumatraPDF").join("SumatraPDF.exe"),
                root.join("pf86").join("SumatraPDF").join("SumatraPDF.exe"),
                root.join("local").join("SumatraPDF").join("SumatraPDF.exe"),
            ]
        );

        let player = windows_candidates(App::MusicPlayer, &folders(&root));
        assert_eq!(player[0], root.join("roaming").join("Spotify").join("Spotify.exe"));
        assert_eq!(player.len(), 3);
    }

    #[test]
    fn test_missing_folders_are_skipped() {
        let folders = WindowsFolders {
            local_app_data: Some(PathBuf::from("local")),
            ..Default::default()
        };
        assert_eq!(windows_candidates(App::PdfViewer, &folders).len(), 1);
    }

    #[test]
    fn test_first_existing_prefers_override() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom.exe");
        let probed = dir.path().join("probed.exe");
        fs::write(&custom, b"").unwrap();
        fs::write(&probed, b"").unwrap();

        let found = first_existing(Some(&custom), &[probed.clone()]);
        assert_eq!(found, Some(custom));

        let missing = dir.path().join("missing.exe");
        let found = first_existing(Some(&missing), &[probed.clone()]);
        assert_eq!(found, Some(probed));
    }

    #[test]
    fn test_first_existing_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(first_existing(None, &[dir.path().join("nope")]), None);
        // a directory is not an executable
        assert_eq!(first_existing(None, &[dir.path().to_path_buf()]), None);
    }
}
