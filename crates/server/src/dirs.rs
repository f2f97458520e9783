//! Platform-specific directory utilities

use std::path::PathBuf;

/// Get the platform-specific log directory
///
/// Follows platform conventions:
/// - macOS: `~/Library/Caches/wake-boost/logs`
/// - Linux: `~/.cache/wake-boost/logs` (or `$XDG_CACHE_HOME/wake-boost/logs`)
/// - Windows: `%LOCALAPPDATA%\wake-boost\logs`
/// - Fallback: `/tmp/wake-boost/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "wake-boost")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/wake-boost"))
        .join("logs")
}
