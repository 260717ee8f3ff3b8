//! Reading and writing the persisted store.
//!
//! The document holds one top-level `device_models` mapping of
//! brand → model → attributes, as YAML (`.yaml`, `.yml`) or JSON (`.json`).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::{ModelsError, Result};
use crate::models::sorter::sort_tree;
use crate::models::{DeviceRecord, DeviceStore, ModelMap};

/// Top-level key of the store document.
pub const ROOT_KEY: &str = "device_models";

/// Serialization of a store file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Yaml,
    Json,
}

impl StoreFormat {
    /// Detect format from file extension. Anything but `.json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Load a store from disk.
///
/// # Errors
///
/// Returns [`ModelsError::StoreNotFound`] if the file does not exist and
/// [`ModelsError::StoreParse`] if it is not a valid store document.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_store(path: &Path) -> Result<DeviceStore> {
    if !path.exists() {
        return Err(ModelsError::StoreNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let store = parse_store(&content, StoreFormat::from_path(path)).map_err(|reason| {
        ModelsError::StoreParse {
            path: path.display().to_string(),
            reason,
        }
    })?;
    info!(
        brands = store.brand_count(),
        models = store.model_count(),
        "Loaded model store"
    );
    Ok(store)
}

/// Parse store document text.
///
/// Brands or models given as `null` are read as empty.
pub fn parse_store(content: &str, format: StoreFormat) -> std::result::Result<DeviceStore, String> {
    let document: Value = match format {
        StoreFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
        StoreFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
    };

    let root = match document {
        Value::Null => return Ok(DeviceStore::new()),
        Value::Mapping(mut root) => root.remove(ROOT_KEY),
        _ => return Err("document root must be a mapping".to_string()),
    };
    let Some(root) = root else {
        warn!("Store has no '{ROOT_KEY}' key; starting empty");
        return Ok(DeviceStore::new());
    };

    let mut brands: BTreeMap<String, ModelMap> = BTreeMap::new();
    for (brand, models) in into_entries(root, ROOT_KEY)? {
        let mut map = ModelMap::new();
        for (model, attrs) in into_entries(models, &brand)? {
            let record = match attrs {
                Value::Null => DeviceRecord::new(),
                attrs => serde_yaml::from_value(attrs)
                    .map_err(|e| format!("\"{brand}\" \"{model}\": {e}"))?,
            };
            map.insert(model, record);
        }
        if map.is_empty() {
            debug!(%brand, "Skipping brand without models");
            continue;
        }
        brands.entry(brand).or_default().extend(map);
    }
    Ok(DeviceStore::from_brands(brands))
}

fn into_entries(value: Value, at: &str) -> std::result::Result<Vec<(String, Value)>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| Ok((key_string(key, at)?, value)))
            .collect(),
        _ => Err(format!("'{at}' must be a mapping")),
    }
}

// Unquoted keys like `6` or `true` are read back as strings.
fn key_string(key: Value, at: &str) -> std::result::Result<String, String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(format!("unsupported key under '{at}'")),
    }
}

/// Build the sorted store document.
///
/// # Errors
///
/// Fails only if a record cannot be represented as YAML.
pub fn store_document(store: &DeviceStore) -> std::result::Result<Value, String> {
    let mut brands = Mapping::new();
    for (brand, models) in store.brands() {
        let mut entries = Mapping::new();
        for (model, record) in models {
            let value = serde_yaml::to_value(record).map_err(|e| e.to_string())?;
            entries.insert(Value::String(model.clone()), value);
        }
        brands.insert(Value::String(brand.clone()), Value::Mapping(entries));
    }
    let mut root = Mapping::new();
    root.insert(Value::String(ROOT_KEY.to_string()), Value::Mapping(brands));
    Ok(sort_tree(Value::Mapping(root)))
}

/// Render a store as document text.
///
/// # Errors
///
/// Returns [`ModelsError::Other`] if serialization fails.
pub fn render_store(store: &DeviceStore, format: StoreFormat) -> Result<String> {
    let document = store_document(store).map_err(ModelsError::Other)?;
    let text = match format {
        StoreFormat::Yaml => serde_yaml::to_string(&document).map_err(|e| e.to_string()),
        StoreFormat::Json => serde_json::to_string_pretty(&document)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
    };
    text.map_err(ModelsError::Other)
}

/// Write a store to disk, replacing the file atomically.
///
/// # Errors
///
/// Returns [`ModelsError::StoreWrite`] if the file cannot be written.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn save_store(store: &DeviceStore, path: &Path) -> Result<()> {
    let write_err = |reason: String| ModelsError::StoreWrite {
        path: path.display().to_string(),
        reason,
    };

    let text = render_store(store, StoreFormat::from_path(path))?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    file.write_all(text.as_bytes())
        .map_err(|e| write_err(e.to_string()))?;
    file.persist(path).map_err(|e| write_err(e.error.to_string()))?;

    debug!(bytes = text.len(), "Wrote store file");
    info!(
        brands = store.brand_count(),
        models = store.model_count(),
        "Saved model store"
    );
    Ok(())
}
