//! Configuration discovery and loading.
//!
//! The configuration file is taken from, in order: the `--config` flag, the
//! `UAM_CONFIG` environment variable, or `<config_dir>/uam/config.{yaml,yml,toml}`.
//! With none of them present the built-in defaults are used.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, trace};

use super::path::PathResolver;
use super::schema::{ConfigFormat, ToolConfig};
use crate::error::{ModelsError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "UAM_CONFIG";

const DEFAULT_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config.toml"];

/// Candidate default configuration files, most preferred first.
pub fn default_config_paths() -> Vec<PathBuf> {
    dirs::config_dir()
        .map(|dir| {
            let dir = dir.join("uam");
            DEFAULT_NAMES.iter().map(|name| dir.join(name)).collect()
        })
        .unwrap_or_default()
}

/// Locate the configuration file to use.
///
/// An explicit path, from the flag or the environment, must exist.
///
/// # Errors
///
/// Returns [`ModelsError::ConfigNotFound`] for a missing explicit path.
pub fn find_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let from_env = std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
        trace!(path = %path.display(), "Using explicit config path");
        if !path.is_file() {
            return Err(ModelsError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        return Ok(Some(path));
    }

    let found = default_config_paths().into_iter().find(|p| p.is_file());
    debug!(path = ?found, "Looked up default config file");
    Ok(found)
}

/// Load the effective configuration.
///
/// # Errors
///
/// Returns an error if an explicit config file is missing, or if the file
/// found cannot be read, parsed, or validated.
#[instrument(skip_all, fields(explicit = ?explicit))]
pub fn load(explicit: Option<&Path>) -> Result<ToolConfig> {
    match find_config(explicit)? {
        Some(path) => load_config(&path),
        None => {
            debug!("No config file; using defaults");
            Ok(ToolConfig::default())
        }
    }
}

/// Load a configuration file, resolving its paths against its directory.
///
/// # Errors
///
/// Returns an error if:
/// - The format cannot be detected from the extension
/// - The file cannot be read
/// - The file content cannot be parsed
/// - Validation fails
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<ToolConfig> {
    let format = ConfigFormat::from_extension(path).ok_or_else(|| {
        ModelsError::ConfigParse(format!(
            "Unknown config format for '{}': expected .yaml, .yml, or .toml",
            path.display()
        ))
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ModelsError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            ModelsError::Io(e)
        }
    })?;
    debug!(bytes = content.len(), format = ?format, "Read config file");

    let mut config = load_config_from_str(&content, format)?;

    let resolver = PathResolver::new(path)?;
    config.models = resolver.resolve(&config.models)?;
    config.output = resolver.resolve(&config.output)?;
    config.csv = resolver.resolve(&config.csv)?;
    config.regexes = config
        .regexes
        .map(|p| resolver.resolve(&p))
        .transpose()?;
    config.source = Some(path.to_path_buf());

    info!(
        models = %config.models.display(),
        output = %config.output.display(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Parse and validate configuration text. Paths are left as written.
///
/// # Errors
///
/// Returns an error if parsing or validation fails.
pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<ToolConfig> {
    let config: ToolConfig = match format {
        ConfigFormat::Yaml if content.trim().is_empty() => ToolConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| ModelsError::ConfigParse(format!("YAML: {e}")))?,
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ModelsError::ConfigParse(format!("TOML: {e}")))?
        }
    };
    config.validate()?;
    Ok(config)
}
