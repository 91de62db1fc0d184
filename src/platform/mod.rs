// Opacity platform paths.
// Selects the per-OS implementation with `cfg(target_os)`.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as os;

#[cfg(target_os = "macos")]
use macos as os;

#[cfg(target_os = "windows")]
use windows as os;

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/opacity` or `~/.config/opacity`
/// - **macOS**: `~/Library/Application Support/Opacity`
/// - **Windows**: `%APPDATA%/Opacity`
pub fn get_config_dir() -> PathBuf {
    os::get_config_dir()
}

/// Directory holding the history and bookmark database.
///
/// - **Linux**: `$XDG_DATA_HOME/opacity` or `~/.local/share/opacity`
/// - **macOS**: `~/Library/Application Support/Opacity`
/// - **Windows**: `%APPDATA%/Opacity`
pub fn get_data_dir() -> PathBuf {
    os::get_data_dir()
}

/// Path of the SQLite database inside [`get_data_dir`].
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("opacity.db")
}
