//! Case-insensitive lookup of brand and model spellings.
//!
//! The first spelling registered for a case-insensitive brand (or model
//! within a brand) becomes its canonical form and never changes.

use std::collections::HashMap;

use tracing::trace;

/// Maps lowercased brands and models to their first-seen spelling.
#[derive(Debug, Clone, Default)]
pub struct CaseFoldIndex {
    brands: HashMap<String, String>,
    models: HashMap<(String, String), String>,
}

impl CaseFoldIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical spelling of `brand`, registering it if unseen.
    pub fn brand(&mut self, brand: &str) -> String {
        self.brands
            .entry(brand.to_lowercase())
            .or_insert_with(|| {
                trace!(brand, "Registering brand spelling");
                brand.to_string()
            })
            .clone()
    }

    /// Canonical spelling of `model` within `brand`, registering it if unseen.
    ///
    /// `brand` is folded as well, so any spelling of the brand addresses the
    /// same models.
    pub fn model(&mut self, brand: &str, model: &str) -> String {
        self.models
            .entry((brand.to_lowercase(), model.to_lowercase()))
            .or_insert_with(|| {
                trace!(brand, model, "Registering model spelling");
                model.to_string()
            })
            .clone()
    }

    /// Canonical spelling of `brand` without registering anything.
    pub fn lookup_brand(&self, brand: &str) -> Option<&str> {
        self.brands.get(&brand.to_lowercase()).map(String::as_str)
    }

    /// Canonical spelling of `model` within `brand` without registering anything.
    pub fn lookup_model(&self, brand: &str, model: &str) -> Option<&str> {
        self.models
            .get(&(brand.to_lowercase(), model.to_lowercase()))
            .map(String::as_str)
    }

    /// Number of registered brands.
    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }
}
