//! Device record stored at a single (brand, model) slot.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// Attributes shared between two records that must agree when they carry
/// the same marketing name.
pub const CONSISTENCY_FIELDS: [&str; 3] = ["size", "date", "type"];

/// One (brand, model) slot of the store.
///
/// `brand` and `model` are alias pointer halves. A record carrying both and
/// nothing else is a pure alias; a record carrying neither (or its own slot
/// key) is canonical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub brand: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,

    /// Device category, e.g. "smartphone" or "tablet".
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_type: Option<String>,

    /// Screen size in inches.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<f64>,

    /// Display resolution as "WxH".
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub display: Option<String>,

    /// Canonical marketing name, used as deduplication key.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// Release date.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    /// Attributes this tool does not interpret, carried through as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// Hand-edited stores write `date: 2014` or `model: 6` unquoted.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl DeviceRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pure alias pointing at `(brand, model)`.
    #[must_use]
    pub fn alias(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Returns true if no attribute at all is set.
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.model.is_none()
            && self.device_type.is_none()
            && self.size.is_none()
            && self.display.is_none()
            && self.name.is_none()
            && self.date.is_none()
            && self.extra.is_empty()
    }

    /// Returns true if either pointer half is set.
    pub fn has_pointer(&self) -> bool {
        self.brand.is_some() || self.model.is_some()
    }

    /// Returns true if the record points away from the slot `(brand, model)`.
    pub fn is_alias_at(&self, brand: &str, model: &str) -> bool {
        self.brand.as_deref().is_some_and(|b| b != brand)
            || self.model.as_deref().is_some_and(|m| m != model)
    }

    /// The non-empty marketing name, if any.
    pub fn name_key(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Overwrite fields with every field present in `other`.
    pub fn merge_from(&mut self, other: &Self) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }

        take(&mut self.brand, &other.brand);
        take(&mut self.model, &other.model);
        take(&mut self.device_type, &other.device_type);
        take(&mut self.size, &other.size);
        take(&mut self.display, &other.display);
        take(&mut self.name, &other.name);
        take(&mut self.date, &other.date);
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Keep only the pointer halves.
    #[must_use]
    pub fn pointer_only(&self) -> Self {
        Self {
            brand: self.brand.clone(),
            model: self.model.clone(),
            ..Self::default()
        }
    }

    /// Drop pointer halves that repeat the slot's own key.
    pub fn strip_self_pointer(&mut self, brand: &str, model: &str) {
        if self.brand.as_deref() == Some(brand) {
            self.brand = None;
        }
        if self.model.as_deref() == Some(model) {
            self.model = None;
        }
    }

    /// Consistency fields set on both records but holding different values.
    pub fn mismatches(&self, other: &Self) -> Vec<Mismatch> {
        CONSISTENCY_FIELDS
            .iter()
            .filter_map(|&field| {
                let ours = self.field(field)?;
                let theirs = other.field(field)?;
                (ours != theirs).then(|| Mismatch {
                    field,
                    expected: theirs,
                    found: ours,
                })
            })
            .collect()
    }

    /// Render a named attribute as text, `None` when unset or empty.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "brand" => self.brand.clone(),
            "model" => self.model.clone(),
            "type" => self.device_type.clone(),
            "size" => self.size.filter(|s| *s != 0.0).map(|s| s.to_string()),
            "display" => self.display.clone(),
            "name" => self.name.clone(),
            "date" => self.date.clone(),
            other => self.extra.get(other).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            }),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// One inconsistent attribute between two records sharing a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub field: &'static str,
    /// Value held by the representative record.
    pub expected: String,
    /// Value held by the compared record.
    pub found: String,
}
