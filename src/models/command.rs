//! Edit directives carried by the `_command` column of bulk CSV rows.
//!
//! A command cell holds comma-separated directives such as
//! `move Generic_Android, set Acme`. Directives run left to right, and the
//! record produced by one becomes the input of the next.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, instrument};

use super::record::DeviceRecord;
use super::store::{AddMode, DeviceStore};

/// Brand prefix reserved for generic device buckets such as `Generic_Android`.
pub const GENERIC_BRAND_PREFIX: &str = "Generic_";

/// One parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Point the current slot at `brand` while keeping its data.
    Set { brand: String },
    /// Re-parent the current slot under `brand`.
    Move { brand: String },
    /// Remove the current slot.
    Delete,
    /// Overwrite the current slot with the row's attributes.
    Replace,
}

/// Errors parsing a command cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown directive '{0}' (expected set, move, delete or replace)")]
    UnknownVerb(String),

    #[error("directive '{0}' needs a brand argument")]
    MissingArgument(&'static str),
}

impl FromStr for Directive {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let (verb, arg) = match token.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (token, ""),
        };

        let brand = |name: &'static str| {
            if arg.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(arg.to_string())
            }
        };

        match verb.to_lowercase().as_str() {
            "set" => Ok(Self::Set { brand: brand("set")? }),
            "move" => Ok(Self::Move { brand: brand("move")? }),
            "delete" => Ok(Self::Delete),
            "replace" => Ok(Self::Replace),
            _ => Err(CommandError::UnknownVerb(token.to_string())),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { brand } => write!(f, "set {brand}"),
            Self::Move { brand } => write!(f, "move {brand}"),
            Self::Delete => f.write_str("delete"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

/// Parse every directive of a command cell.
///
/// Each token is parsed on its own, so one bad token does not hide the others.
pub fn parse_commands(cell: &str) -> Vec<Result<Directive, CommandError>> {
    cell.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

/// Apply directives in order to the slot named by `opts.brand`/`opts.model`.
///
/// Returns the record produced by the last directive.
#[instrument(skip(store, opts), fields(brand = ?opts.brand, model = ?opts.model))]
pub fn apply_directives(
    store: &mut DeviceStore,
    directives: &[Directive],
    mut opts: DeviceRecord,
) -> DeviceRecord {
    for directive in directives {
        debug!(%directive, "Applying directive");
        opts = apply(store, directive, opts);
    }
    opts
}

fn apply(store: &mut DeviceStore, directive: &Directive, opts: DeviceRecord) -> DeviceRecord {
    let (Some(brand), Some(model)) = (opts.brand.clone(), opts.model.clone()) else {
        debug!(%directive, "Row has no brand/model; directive skipped");
        return opts;
    };

    match directive {
        Directive::Delete => {
            store.delete(&brand, &model);
            opts
        }
        Directive::Replace => {
            store.add(&brand, &model, opts.clone(), AddMode::Replace);
            opts
        }
        Directive::Move { brand: target } => {
            let from = store.normalize(&brand, &model);
            let existing = store.remove_exact(&from);
            let mut moved = existing.clone().unwrap_or_default();
            moved.merge_from(&opts);

            let target = store.normalize_brand(target);
            if !target.starts_with(GENERIC_BRAND_PREFIX) {
                moved.brand = Some(target.clone());
            }
            let mode = AddMode::Target { brand: target };
            match store.add(&from.brand, &from.model, moved.clone(), mode) {
                Some(to) => {
                    debug!(from = %from, to = %to, "Moved slot");
                    store.get(&to).cloned().unwrap_or(moved)
                }
                None => {
                    // the target brand is never stored; the slot stays put
                    if let Some(existing) = existing {
                        store.insert_exact(&from, existing);
                    }
                    moved
                }
            }
        }
        Directive::Set { brand: target } => {
            let mut update = opts;
            update.brand = Some(store.normalize_brand(target));
            match store.add(&brand, &model, update.clone(), AddMode::Merge) {
                Some(at) => store.get(&at).cloned().unwrap_or(update),
                None => update,
            }
        }
    }
}
