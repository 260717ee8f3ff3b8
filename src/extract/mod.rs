//! Brand/model extraction from raw user-agent strings.
//!
//! The consolidation engine only needs a best-effort guess of brand, model
//! and type per string; [`AttributeExtractor`] is that seam.

mod rules;

pub use rules::{DeviceRule, RegexExtractor, RulesFile};

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Best-effort device attributes extracted from a raw string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceGuess {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

impl DeviceGuess {
    /// Returns true if nothing was recognized.
    pub fn is_empty(&self) -> bool {
        self.brand.is_none() && self.model.is_none() && self.device_type.is_none()
    }
}

/// Turns a raw identifying string into a device guess.
pub trait AttributeExtractor {
    fn extract(&self, raw: &str) -> DeviceGuess;
}

/// Extractor that recognizes nothing; used when no parser rules are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

impl AttributeExtractor for NoopExtractor {
    fn extract(&self, _raw: &str) -> DeviceGuess {
        DeviceGuess::default()
    }
}

static ANDROID_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android\b.*Mobile Safari/").expect("valid pattern"));
static ANDROID_TABLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android\b.* Safari/").expect("valid pattern"));

/// Fill in a device type for Android browsers when the extractor gave none.
pub fn guess_type(user_agent: &str, device_type: Option<String>) -> Option<String> {
    if device_type.is_some() {
        return device_type;
    }
    if ANDROID_PHONE.is_match(user_agent) {
        Some("smartphone".to_string())
    } else if ANDROID_TABLET.is_match(user_agent) {
        Some("tablet".to_string())
    } else {
        None
    }
}
