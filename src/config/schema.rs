//! Tool configuration schema.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelsError, Result};

/// Default input store.
pub const DEFAULT_MODELS: &str = "models.yaml";
/// Default output store.
pub const DEFAULT_OUTPUT: &str = "models-new.yaml";
/// Default report path.
pub const DEFAULT_CSV: &str = "models.csv";

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml).
    Yaml,
    /// TOML format (.toml).
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        trace!(extension = %ext, "Detecting config format from extension");
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

/// Paths used by a run.
///
/// # Example YAML
///
/// ```yaml
/// models: data/models.yaml
/// output: data/models.yaml
/// csv: ~/reports/models.csv
/// regexes: regexes.yaml
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Store loaded at startup.
    pub models: PathBuf,

    /// Where the consolidated store is written.
    pub output: PathBuf,

    /// Where `report` writes its TSV.
    pub csv: PathBuf,

    /// Parser rules for the extractor; without it nothing is recognized
    /// from raw user agents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regexes: Option<PathBuf>,

    /// File the configuration was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            models: PathBuf::from(DEFAULT_MODELS),
            output: PathBuf::from(DEFAULT_OUTPUT),
            csv: PathBuf::from(DEFAULT_CSV),
            regexes: None,
            source: None,
        }
    }
}

impl ToolConfig {
    /// Check that every required path is set.
    ///
    /// # Errors
    ///
    /// Returns [`ModelsError::ConfigInvalid`] naming the first empty path.
    pub fn validate(&self) -> Result<()> {
        for (field, path) in [
            ("models", &self.models),
            ("output", &self.output),
            ("csv", &self.csv),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ModelsError::ConfigInvalid(format!(
                    "'{field}' must not be empty"
                )));
            }
        }
        if self.regexes.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ModelsError::ConfigInvalid(
                "'regexes' must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
