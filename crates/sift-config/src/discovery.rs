//! Locating `.sift.toml` files.
//!
//! Every ancestor of the working directory is a candidate, nearest first. A
//! file with `root = true` closes the search; otherwise the user's
//! `~/.sift.toml` is consulted last.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".sift.toml";

/// Lists the config files that apply to `cwd`, highest precedence first.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    discover_with_global(cwd, global_config_path())
}

/// Like [`discover_config_files`], with the global file given explicitly.
///
/// `global` is appended when it exists, was not already reached by the walk,
/// and no root config was found.
pub fn discover_with_global(cwd: &Path, global: Option<PathBuf>) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for candidate in cwd.ancestors().map(|dir| dir.join(CONFIG_FILENAME)) {
        if !candidate.is_file() {
            continue;
        }
        let closes_search = is_root_config(&candidate);
        found.push(candidate);
        if closes_search {
            debug!(files = found.len(), "root config ends discovery");
            return found;
        }
    }

    if let Some(path) = global.filter(|path| path.is_file() && !found.contains(path)) {
        found.push(path);
    }
    debug!(files = found.len(), "discovered config files");
    found
}

/// `~/.sift.toml`, or `None` without a home directory.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Returns true if `path` is the global config file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}
