//! Expansion of alias chains into fully materialized records.

use tracing::{debug, info, instrument, trace};

use super::record::DeviceRecord;
use super::store::{DeviceStore, SlotKey};
use crate::error::{ModelsError, Result};

/// Maximum number of hops followed for one slot.
///
/// Rebrand chains in real data are two or three hops deep; running out of
/// hops means the pointers form a cycle.
pub const MAX_HOPS: usize = 5;

/// Outcome of resolving one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The slot now holds the attributes of the canonical record it points to.
    Resolved,
    /// The pointer names a slot that does not exist; the slot was left untouched.
    Dangling,
}

/// Resolve the slot at `key`, replacing its record with a copy of the
/// canonical record at the end of its alias chain.
///
/// Every record visited along the way gets its missing pointer half filled
/// with its own location, so a canonical record resolves to itself with
/// `brand` and `model` set.
///
/// # Errors
///
/// Returns [`ModelsError::Recursion`] when no self-referential record is
/// reached within [`MAX_HOPS`].
pub fn resolve_slot(store: &mut DeviceStore, key: &SlotKey) -> Result<Resolution> {
    let mut at = key.clone();

    for hop in 0..MAX_HOPS {
        let device = store.get(&at).cloned().unwrap_or_default();

        if device.brand.as_deref() == Some(at.brand.as_str())
            && device.model.as_deref() == Some(at.model.as_str())
        {
            trace!(slot = %key, canonical = %at, hop, "Reached canonical record");
            store.insert_exact(key, device);
            return Ok(Resolution::Resolved);
        }

        let next = SlotKey::new(
            device.brand.clone().unwrap_or_else(|| at.brand.clone()),
            device.model.clone().unwrap_or_else(|| at.model.clone()),
        );

        if !store.contains(&next.brand, &next.model) {
            debug!(slot = %key, target = %next, "Alias points to a missing slot");
            return Ok(Resolution::Dangling);
        }

        let filled = DeviceRecord {
            brand: Some(next.brand.clone()),
            model: Some(next.model.clone()),
            ..device
        };
        store.insert_exact(&at, filled);
        at = next;
    }

    Err(ModelsError::Recursion {
        brand: key.brand.clone(),
        model: key.model.clone(),
    })
}

/// Resolve every slot of the store.
///
/// Returns the number of slots whose pointer names a missing slot.
#[instrument(skip_all, fields(slots = store.model_count()))]
pub fn resolve_all(store: &mut DeviceStore) -> Result<usize> {
    let mut dangling = 0;
    for key in store.slot_keys() {
        if resolve_slot(store, &key)? == Resolution::Dangling {
            dangling += 1;
        }
    }
    info!(dangling, "Resolved alias references");
    Ok(dangling)
}
