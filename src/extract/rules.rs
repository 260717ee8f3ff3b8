//! Rule-based extractor reading `device_parsers` from a YAML rules file.

use std::path::Path;

use regex::{Captures, Regex, RegexBuilder};
use serde::Deserialize;
use tracing::{debug, info, instrument, trace};

use super::{AttributeExtractor, DeviceGuess};
use crate::error::{ModelsError, Result};

/// Top level of a parser rules file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub device_parsers: Vec<DeviceRule>,
}

/// One device rule. Replacements may reference captures as `$1` … `$9`.
///
/// # Example YAML
///
/// ```yaml
/// device_parsers:
///   - regex: '; *(SM-[A-Z0-9]+) Build'
///     brand_replacement: Samsung
///     model_replacement: $1
///     type_replacement: smartphone
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRule {
    pub regex: String,

    /// `i` for case-insensitive matching.
    #[serde(default)]
    pub regex_flag: Option<String>,

    #[serde(default, alias = "brand")]
    pub brand_replacement: Option<String>,

    /// Defaults to the first capture.
    #[serde(default, alias = "model", alias = "device_replacement")]
    pub model_replacement: Option<String>,

    #[serde(default, alias = "type")]
    pub type_replacement: Option<String>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    rule: DeviceRule,
}

/// Extractor applying the first matching rule of a rules file.
#[derive(Debug, Clone, Default)]
pub struct RegexExtractor {
    rules: Vec<CompiledRule>,
}

impl RegexExtractor {
    /// Load and compile rules from a YAML file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModelsError::RulesNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let extractor = Self::from_yaml_str(&content).map_err(|e| match e {
            ModelsError::ConfigParse(reason) => {
                ModelsError::ConfigParse(format!("{}: {reason}", path.display()))
            }
            other => other,
        })?;
        info!(rules = extractor.len(), "Loaded parser rules");
        Ok(extractor)
    }

    /// Compile rules from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: RulesFile = serde_yaml::from_str(content)
            .map_err(|e| ModelsError::ConfigParse(format!("invalid parser rules: {e}")))?;
        Self::from_rules(file.device_parsers)
    }

    /// Compile a list of rules.
    pub fn from_rules(rules: Vec<DeviceRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let insensitive = rule.regex_flag.as_deref() == Some("i");
                let regex = RegexBuilder::new(&rule.regex)
                    .case_insensitive(insensitive)
                    .build()
                    .map_err(|e| ModelsError::InvalidRule {
                        pattern: rule.regex.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(CompiledRule { regex, rule })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(count = rules.len(), "Compiled device rules");
        Ok(Self { rules })
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is loaded.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl AttributeExtractor for RegexExtractor {
    fn extract(&self, raw: &str) -> DeviceGuess {
        for compiled in &self.rules {
            let Some(caps) = compiled.regex.captures(raw) else {
                continue;
            };
            trace!(pattern = %compiled.rule.regex, "Rule matched");

            let rule = &compiled.rule;
            let model = match &rule.model_replacement {
                Some(template) => substitute(template, &caps),
                None => caps.get(1).map(|m| m.as_str().to_string()),
            };
            return DeviceGuess {
                brand: rule
                    .brand_replacement
                    .as_deref()
                    .and_then(|t| substitute(t, &caps)),
                model: model.and_then(non_empty),
                device_type: rule
                    .type_replacement
                    .as_deref()
                    .and_then(|t| substitute(t, &caps)),
            };
        }
        DeviceGuess::default()
    }
}

// `$1`..`$9` only; `$1abc` keeps the literal suffix.
fn substitute(template: &str, caps: &Captures<'_>) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            if let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                chars.next();
                if let Some(m) = caps.get(digit as usize) {
                    out.push_str(m.as_str());
                }
                continue;
            }
        }
        out.push(c);
    }
    non_empty(out)
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}
