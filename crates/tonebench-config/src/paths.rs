//! Platform-specific paths for settings, presets, and recordings.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/tonebench/` (Linux), `~/Library/Application Support/tonebench/` (macOS), `%APPDATA%\tonebench\` (Windows)
//! - **Preset store**: `~/.local/share/tonebench/` (Linux), `~/Library/Application Support/tonebench/` (macOS), `%APPDATA%\tonebench\` (Windows)
//! - **Recordings**: `~/Music/tonebench/` where an audio directory exists, otherwise `<data>/tonebench/recordings/`
//!
//! # Example
//!
//! ```rust,no_run
//! use tonebench_config::paths;
//!
//! let settings = paths::settings_path();
//! println!("Settings: {:?}", settings);
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "tonebench";

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Subdirectory for recordings when no audio directory is known.
const RECORDINGS_SUBDIR: &str = "recordings";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the directory holding the preset store.
pub fn user_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default directory for exported recordings.
pub fn user_recordings_dir() -> PathBuf {
    match dirs::audio_dir() {
        Some(audio) => audio.join(APP_NAME),
        None => user_data_dir().join(RECORDINGS_SUBDIR),
    }
}

/// Returns the default settings file path.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Ensure a directory exists, creating it and any parents.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_user_config_dir() {
        let dir = user_config_dir();
        assert!(dir.to_string_lossy().contains("tonebench"));
    }

    #[test]
    fn test_settings_path_is_toml() {
        let path = settings_path();
        assert_eq!(path.file_name().and_then(|s| s.to_str()), Some(SETTINGS_FILE));
    }

    #[test]
    fn test_recordings_dir_named() {
        assert!(user_recordings_dir().to_string_lossy().contains("tonebench"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_dir(&nested).unwrap();
    }
}
