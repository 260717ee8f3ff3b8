//! Device model consolidation engine.
//!
//! The store maps brand → model → [`DeviceRecord`]. A consolidation run
//! resolves every alias chain ([`resolve_all`]), collapses records sharing a
//! marketing name ([`dedup_by_name`]) and hands the store to the persistence
//! layer, which writes it in [`sorter`] order.

mod casefold;
mod command;
mod dedup;
mod record;
mod resolve;
pub mod sorter;
mod store;

pub use casefold::CaseFoldIndex;
pub use command::{CommandError, Directive, GENERIC_BRAND_PREFIX, apply_directives, parse_commands};
pub use dedup::{DedupReport, Diagnostic, dedup_by_name};
pub use record::{CONSISTENCY_FIELDS, DeviceRecord, Mismatch};
pub use resolve::{MAX_HOPS, Resolution, resolve_all, resolve_slot};
pub use store::{AddMode, DeviceStore, GENERIC_BRAND, ModelMap, SlotKey};

use tracing::instrument;

use crate::error::Result;

/// Resolve every alias, then deduplicate by name.
///
/// # Errors
///
/// Fails on an alias cycle; the store may then be partially resolved and
/// must not be persisted.
#[instrument(skip_all)]
pub fn consolidate(store: &mut DeviceStore) -> Result<ConsolidationReport> {
    let dangling = resolve_all(store)?;
    let dedup = dedup_by_name(store);
    Ok(ConsolidationReport { dangling, dedup })
}

/// Counters from one consolidation run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ConsolidationReport {
    /// Slots whose alias names a missing slot.
    pub dangling: usize,
    #[serde(flatten)]
    pub dedup: DedupReport,
}
