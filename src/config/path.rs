//! Path resolution helpers for configuration files.
//!
//! Supports absolute paths, paths relative to the config file, and "~" home
//! directory expansion.

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{ModelsError, Result};

/// Resolve a path from a config file.
///
/// Resolution rules:
/// 1. Absolute paths: used as-is
/// 2. Paths starting with `~`: expanded to home directory
/// 3. Relative paths: resolved relative to the config file's directory
pub fn resolve_path(path: &Path, config_dir: &Path) -> Result<PathBuf> {
    trace!(
        path = %path.display(),
        config_dir = %config_dir.display(),
        "Resolving path"
    );

    let path_str = path.to_string_lossy();

    if path_str == "~" || path_str.starts_with("~/") {
        let home = home_dir()?;
        let rest = path_str.strip_prefix("~/").unwrap_or("");
        let resolved = if rest.is_empty() {
            home
        } else {
            home.join(rest)
        };
        debug!(
            original = %path.display(),
            resolved = %resolved.display(),
            "Expanded home directory path"
        );
        return Ok(resolved);
    }

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let resolved = config_dir.join(path);
    debug!(
        original = %path.display(),
        resolved = %resolved.display(),
        "Resolved relative path"
    );
    Ok(resolved)
}

/// Resolve the user's home directory (cross-platform).
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| ModelsError::ConfigInvalid("Could not determine home directory".to_string()))
}

/// Path resolution context for a config file.
pub struct PathResolver {
    config_dir: PathBuf,
}

impl PathResolver {
    /// Create a resolver for a specific config file path.
    pub fn new(config_path: &Path) -> Result<Self> {
        let config_dir = config_path.parent().ok_or_else(|| {
            ModelsError::ConfigInvalid(format!(
                "Config path has no parent directory: {}",
                config_path.display()
            ))
        })?;

        let canonical = config_dir.canonicalize().unwrap_or_else(|_| {
            warn!(
                config_dir = %config_dir.display(),
                "Failed to canonicalize config directory"
            );
            config_dir.to_path_buf()
        });

        Ok(Self {
            config_dir: canonical,
        })
    }

    /// Resolve a path relative to the config file.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        resolve_path(path, &self.config_dir)
    }

    /// Return the base config directory.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
