//! Collapse records describing the same device under one marketing name.
//!
//! Runs on a fully resolved store, where every record carries the brand and
//! model of the canonical record it was copied from.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::record::{DeviceRecord, Mismatch};
use super::store::{DeviceStore, SlotKey};

/// Name representative: the first record seen for a name.
#[derive(Debug, Clone)]
struct Representative {
    at: SlotKey,
    record: DeviceRecord,
}

/// Attributes disagreeing between a record and the representative of its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub brand: String,
    pub model: String,
    pub name: String,
    pub mismatches: Vec<Mismatch>,
}

/// Result of a deduplication pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupReport {
    /// Slots reduced to an alias of their name's representative.
    pub aliased: usize,
    /// Inconsistent records, kept as they were.
    pub diagnostics: Vec<Diagnostic>,
}

/// Reduce every slot sharing a name with an earlier slot to a minimal alias.
///
/// Slots whose `size`, `date` or `type` disagree with the representative are
/// reported and keep their data. Pointer halves repeating a slot's own key
/// are always stripped, and a record still pointing elsewhere keeps only its
/// pointer.
#[instrument(skip_all, fields(slots = store.model_count()))]
pub fn dedup_by_name(store: &mut DeviceStore) -> DedupReport {
    let keys = store.slot_keys();
    let mut found: HashMap<String, Representative> = HashMap::new();

    for key in &keys {
        let Some(record) = store.get(key) else {
            continue;
        };
        if let Some(name) = record.name_key() {
            found.entry(name.to_string()).or_insert_with(|| Representative {
                at: SlotKey::new(
                    record.brand.as_deref().unwrap_or(&key.brand),
                    record.model.as_deref().unwrap_or(&key.model),
                ),
                record: record.clone(),
            });
        }
    }

    let mut report = DedupReport::default();

    for key in &keys {
        let Some(mut data) = store.get(key).cloned() else {
            continue;
        };

        if let Some(rep) = data.name_key().and_then(|name| found.get(name)) {
            let mismatches = data.mismatches(&rep.record);
            if mismatches.is_empty() {
                let brand_differs = rep.at.brand != key.brand;
                let model_differs = rep.at.model != key.model;
                if brand_differs || model_differs {
                    data = DeviceRecord {
                        brand: brand_differs.then(|| rep.at.brand.clone()),
                        model: model_differs.then(|| rep.at.model.clone()),
                        ..DeviceRecord::default()
                    };
                    report.aliased += 1;
                } else {
                    data.brand = None;
                    data.model = None;
                }
            } else {
                for m in &mismatches {
                    warn!(
                        brand = %key.brand,
                        model = %key.model,
                        name = data.name_key().unwrap_or_default(),
                        field = m.field,
                        expected = %m.expected,
                        found = %m.found,
                        "{} differs for {} {} ({} !== {})",
                        m.field, key.brand, key.model, m.expected, m.found
                    );
                }
                report.diagnostics.push(Diagnostic {
                    brand: key.brand.clone(),
                    model: key.model.clone(),
                    name: data.name_key().unwrap_or_default().to_string(),
                    mismatches,
                });
            }
        }

        data.strip_self_pointer(&key.brand, &key.model);
        if data.has_pointer() {
            data = data.pointer_only();
        }
        store.insert_exact(key, data);
    }

    info!(
        names = found.len(),
        aliased = report.aliased,
        diagnostics = report.diagnostics.len(),
        "Deduplicated by name"
    );
    report
}
