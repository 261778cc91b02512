//! Database location.

use std::path::{Path, PathBuf};
use tally_store::{Result, SqliteStore};

/// Get the default data directory path.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/tally/`
/// - macOS: `~/Library/Application Support/tally/`
/// - Windows: `%APPDATA%\tally\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
}

/// Get the default database path.
pub(crate) fn default_db_path() -> PathBuf {
    default_data_dir().join("tally.db")
}

/// Open the database, creating the directory if needed.
pub(crate) fn open_store(path: Option<&Path>) -> Result<SqliteStore> {
    let db_path = path.map_or_else(default_db_path, Path::to_path_buf);

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    tracing::debug!(path = %db_path.display(), "opening database");
    SqliteStore::new(&db_path)
}
