//! Platform data directory resolution.

use std::path::PathBuf;

/// Application directory name under the platform data directory.
pub const APP_NAME: &str = "nobox";

/// Data directory for `app_name`:
///
/// - Linux: `$XDG_DATA_HOME/<app>` or `~/.local/share/<app>`
/// - macOS: `~/Library/Application Support/<app>`
/// - Windows: `%APPDATA%\<app>`
///
/// Returns `None` when the platform offers no data directory (no home).
pub fn resolve_app_data_dir(app_name: &str) -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join(app_name))
}
