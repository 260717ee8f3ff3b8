//! Hierarchical brand → model → record store.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use super::casefold::CaseFoldIndex;
use super::record::DeviceRecord;
use super::sorter::compare_keys;

/// Brand never added from bulk input; the parser reports it for unknown devices.
pub const GENERIC_BRAND: &str = "Generic";

/// Models under one brand.
pub type ModelMap = BTreeMap<String, DeviceRecord>;

/// Address of one slot in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotKey {
    pub brand: String,
    pub model: String,
}

impl SlotKey {
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" \"{}\"", self.brand, self.model)
    }
}

/// How [`DeviceStore::add`] combines new attributes with an existing slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AddMode {
    /// New fields overwrite existing ones; absent fields keep the old value.
    #[default]
    Merge,
    /// The slot is overwritten with the new attributes.
    Replace,
    /// Merge into the same model under another brand.
    Target { brand: String },
}

/// The in-memory device model database.
///
/// Brand and model keys keep one spelling per case-insensitive class; the
/// [`CaseFoldIndex`] is kept in step with every insertion.
#[derive(Debug, Clone, Default)]
pub struct DeviceStore {
    brands: BTreeMap<String, ModelMap>,
    index: CaseFoldIndex,
}

impl DeviceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded snapshot, registering every key spelling.
    #[must_use]
    pub fn from_brands(brands: BTreeMap<String, ModelMap>) -> Self {
        let mut index = CaseFoldIndex::new();
        for (brand, models) in &brands {
            index.brand(brand);
            for model in models.keys() {
                index.model(brand, model);
            }
        }
        debug!(brands = brands.len(), "Built case-fold index");
        Self { brands, index }
    }

    /// Canonical spelling of a (brand, model) pair, registering new spellings.
    pub fn normalize(&mut self, brand: &str, model: &str) -> SlotKey {
        let brand = self.index.brand(brand);
        let model = self.index.model(&brand, model);
        SlotKey { brand, model }
    }

    /// Canonical spelling of a brand, registering it if unseen.
    pub fn normalize_brand(&mut self, brand: &str) -> String {
        self.index.brand(brand)
    }

    /// Canonical spelling of a known (brand, model) pair.
    pub fn lookup(&self, brand: &str, model: &str) -> Option<SlotKey> {
        let brand = self.index.lookup_brand(brand)?;
        let model = self.index.lookup_model(brand, model)?;
        Some(SlotKey::new(brand, model))
    }

    /// Add or merge attributes into the slot named by `(brand, model)`.
    ///
    /// Returns the slot written to, or `None` when the entry was rejected
    /// (missing brand or model, or the generic brand).
    pub fn add(
        &mut self,
        brand: &str,
        model: &str,
        attrs: DeviceRecord,
        mode: AddMode,
    ) -> Option<SlotKey> {
        let dest = match &mode {
            AddMode::Target { brand: target } => target.as_str(),
            _ => brand,
        };
        if brand.is_empty() || model.is_empty() || dest.is_empty() || dest == GENERIC_BRAND {
            trace!(brand, model, dest, "Rejecting entry");
            return None;
        }

        let key = self.normalize(brand, model);
        let key = match &mode {
            AddMode::Target { brand: target } => {
                let target = self.index.brand(target);
                let model = self.index.model(&target, &key.model);
                SlotKey::new(target, model)
            }
            _ => key,
        };
        let attrs = self.normalize_pointer(attrs, &key);

        match mode {
            AddMode::Replace => {
                debug!(slot = %key, "Replacing slot");
                self.insert_exact(&key, attrs);
            }
            AddMode::Merge | AddMode::Target { .. } => {
                trace!(slot = %key, "Merging into slot");
                self.brands
                    .entry(key.brand.clone())
                    .or_default()
                    .entry(key.model.clone())
                    .or_default()
                    .merge_from(&attrs);
            }
        }
        Some(key)
    }

    /// Remove the slot named by `(brand, model)` in any casing.
    ///
    /// Returns false when no such slot exists.
    pub fn delete(&mut self, brand: &str, model: &str) -> bool {
        let Some(key) = self.lookup(brand, model) else {
            return false;
        };
        self.remove_exact(&key).is_some()
    }

    /// Record at the exact key.
    pub fn get(&self, key: &SlotKey) -> Option<&DeviceRecord> {
        self.brands.get(&key.brand)?.get(&key.model)
    }

    /// Record at the exact `(brand, model)` spelling.
    pub fn get_slot(&self, brand: &str, model: &str) -> Option<&DeviceRecord> {
        self.brands.get(brand)?.get(model)
    }

    /// Returns true if a slot exists at the exact key.
    pub fn contains(&self, brand: &str, model: &str) -> bool {
        self.get_slot(brand, model).is_some()
    }

    /// Write a record at an exact key, registering its spelling.
    pub fn insert_exact(&mut self, key: &SlotKey, record: DeviceRecord) {
        self.index.brand(&key.brand);
        self.index.model(&key.brand, &key.model);
        self.brands
            .entry(key.brand.clone())
            .or_default()
            .insert(key.model.clone(), record);
    }

    /// Remove the record at an exact key. Brands left without models are dropped.
    pub fn remove_exact(&mut self, key: &SlotKey) -> Option<DeviceRecord> {
        let models = self.brands.get_mut(&key.brand)?;
        let removed = models.remove(&key.model);
        if models.is_empty() {
            self.brands.remove(&key.brand);
        }
        if removed.is_some() {
            debug!(slot = %key, "Deleted slot");
        }
        removed
    }

    /// Every slot key in sorter order.
    pub fn slot_keys(&self) -> Vec<SlotKey> {
        let mut brands: Vec<&String> = self.brands.keys().collect();
        brands.sort_by(|a, b| compare_keys(a, b));

        let mut keys = Vec::with_capacity(self.model_count());
        for brand in brands {
            let mut models: Vec<&String> = self.brands[brand].keys().collect();
            models.sort_by(|a, b| compare_keys(a, b));
            keys.extend(models.into_iter().map(|m| SlotKey::new(brand.as_str(), m.as_str())));
        }
        keys
    }

    /// All brands with their models.
    pub fn brands(&self) -> &BTreeMap<String, ModelMap> {
        &self.brands
    }

    /// Models registered under an exact brand spelling.
    pub fn models(&self, brand: &str) -> Option<&ModelMap> {
        self.brands.get(brand)
    }

    /// Number of brands.
    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    /// Number of (brand, model) slots.
    pub fn model_count(&self) -> usize {
        self.brands.values().map(BTreeMap::len).sum()
    }

    /// Returns true if the store holds no slot.
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    // Pointer halves spelled like the slot get the slot's canonical casing.
    fn normalize_pointer(&self, mut attrs: DeviceRecord, key: &SlotKey) -> DeviceRecord {
        if let Some(brand) = attrs.brand.as_deref() {
            if brand.to_lowercase() == key.brand.to_lowercase() {
                attrs.brand = Some(key.brand.clone());
            } else if let Some(canonical) = self.index.lookup_brand(brand) {
                attrs.brand = Some(canonical.to_string());
            }
        }
        if let Some(model) = attrs.model.as_deref() {
            let pointed_brand = attrs.brand.as_deref().unwrap_or(&key.brand);
            if pointed_brand == key.brand && model.to_lowercase() == key.model.to_lowercase() {
                attrs.model = Some(key.model.clone());
            } else if let Some(canonical) = self.index.lookup_model(pointed_brand, model) {
                attrs.model = Some(canonical.to_string());
            } else if model.to_lowercase() == key.model.to_lowercase() {
                attrs.model = Some(key.model.clone());
            }
        }
        attrs
    }
}
