//! Error types for device model consolidation.

use thiserror::Error;

use crate::models::CommandError;

/// Primary error type for model store operations.
#[derive(Error, Debug)]
pub enum ModelsError {
    // Store errors
    #[error("Model store not found: {path}")]
    StoreNotFound { path: String },

    #[error("Model store parse error in {path}: {reason}")]
    StoreParse { path: String, reason: String },

    #[error("Failed to write model store {path}: {reason}")]
    StoreWrite { path: String, reason: String },

    // Consolidation errors
    #[error("Recursion Issue: \"{brand}\" \"{model}\"")]
    Recursion { brand: String, model: String },

    // Input errors
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Invalid command: {0}")]
    Command(#[from] CommandError),

    // Extractor errors
    #[error("Parser rules not found: {path}")]
    RulesNotFound { path: String },

    #[error("Invalid parser rule '{pattern}': {reason}")]
    InvalidRule { pattern: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ModelsError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StoreNotFound { .. }
                | Self::InputNotFound { .. }
                | Self::RulesNotFound { .. }
                | Self::ConfigNotFound { .. }
                | Self::Recursion { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::StoreNotFound { .. } => Some("Pass the store with --in <FILE>"),
            Self::Recursion { .. } => {
                Some("Check the alias pointers of this entry for a brand/model cycle")
            }
            Self::RulesNotFound { .. } => Some("Pass parser rules with --regexes <FILE>"),
            Self::ConfigNotFound { .. } => Some("Run: uam config --path"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using ModelsError.
pub type Result<T> = std::result::Result<T, ModelsError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| ModelsError::Other(format!("{}: {e}", f().into())))
    }
}
