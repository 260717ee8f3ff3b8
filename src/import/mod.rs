//! Bulk input: newline-separated user agents or tab-separated rows.
//!
//! Tab-separated input may start with a header row naming its columns
//! (`brand`, `model`, `type`, `size`, `display`, `name`, `date`, `debug`,
//! `string`, `_command`); header cells may carry a leading `#`, as written by
//! the report.

mod decode;
mod display;

pub use decode::decode_user_agent;
pub use display::{named_resolution, normalize_display};

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_yaml::Value;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{ModelsError, Result};
use crate::extract::{AttributeExtractor, guess_type};
use crate::models::{AddMode, DeviceRecord, DeviceStore, apply_directives, parse_commands};

/// Column separator of tabular input and of the report.
pub const CSV_SEPARATOR: u8 = b'\t';

/// Columns that identify a header row.
const HEADER_COLUMNS: [&str; 4] = ["brand", "model", "string", "_command"];

/// One parsed tabular row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Attributes to store.
    pub opts: DeviceRecord,
    /// Raw `_command` cell.
    pub command: Option<String>,
    /// Raw user-agent string; informational.
    pub string: Option<String>,
    /// Informational debug cell.
    pub debug: Option<String>,
}

/// Parsed bulk input.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkInput {
    /// One raw user-agent string per line.
    UserAgents(Vec<String>),
    /// Tab-separated rows.
    Rows(Vec<Row>),
}

impl BulkInput {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::UserAgents(uas) => uas.len(),
            Self::Rows(rows) => rows.len(),
        }
    }

    /// Returns true if there is nothing to import.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters from one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Entries read.
    pub entries: usize,
    /// Slots created or merged into.
    pub added: usize,
    /// Raw strings naming a slot that already exists.
    pub duplicates: usize,
    /// Entries without brand/model, or with the generic brand.
    pub rejected: usize,
    /// Rows carrying a `_command` cell.
    pub commands: usize,
    /// Slots removed by commands.
    pub removed: usize,
    /// Directives that failed to parse.
    pub skipped_directives: usize,
}

/// Import options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Show a progress bar on stderr.
    pub progress: bool,
}

/// Read a bulk input file.
pub fn read_input(path: &Path) -> Result<BulkInput> {
    if !path.exists() {
        return Err(ModelsError::InputNotFound {
            path: path.display().to_string(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    parse_bulk(&text)
}

/// Detect the input kind and parse it.
///
/// Text whose first line contains a tab is tabular; anything else is a list
/// of user agents.
#[instrument(skip_all, fields(bytes = text.len()))]
pub fn parse_bulk(text: &str) -> Result<BulkInput> {
    let first = text.lines().next().unwrap_or_default();
    if !first.contains(char::from(CSV_SEPARATOR)) {
        let uas: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        debug!(count = uas.len(), "Parsed user-agent list");
        return Ok(BulkInput::UserAgents(uas));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(CSV_SEPARATOR)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let mut rows = Vec::new();
    let mut columns: Vec<String> = vec!["string".to_string()];

    if let Some(first) = records.next() {
        let first = first.map_err(|e| ModelsError::Other(format!("Invalid input row: {e}")))?;
        let cells: Vec<String> = first.iter().map(header_name).collect();
        if cells.iter().any(|c| HEADER_COLUMNS.contains(&c.as_str())) {
            trace!(?cells, "Found header row");
            columns = cells;
        } else {
            rows.push(parse_row(&columns, first.iter()));
        }
    }

    for record in records {
        let record = record.map_err(|e| ModelsError::Other(format!("Invalid input row: {e}")))?;
        rows.push(parse_row(&columns, record.iter()));
    }

    debug!(count = rows.len(), columns = columns.len(), "Parsed tabular input");
    Ok(BulkInput::Rows(rows))
}

fn header_name(cell: &str) -> String {
    cell.trim().trim_start_matches('#').to_string()
}

/// Parse one row against its column names.
pub fn parse_row<'a, I>(columns: &[String], cells: I) -> Row
where
    I: IntoIterator<Item = &'a str>,
{
    let mut row = Row::default();
    for (column, cell) in columns.iter().zip(cells) {
        let value = unquote(cell);
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let text = Some(value.to_string());
        match column.as_str() {
            "string" => row.string = text,
            "debug" => row.debug = text,
            "_command" => row.command = text,
            "brand" => row.opts.brand = text,
            "model" => row.opts.model = text,
            "type" => row.opts.device_type = text,
            "name" => row.opts.name = text,
            "date" => row.opts.date = text,
            "size" => {
                row.opts.size = parse_size(value);
                if row.opts.size.is_none() {
                    warn!(size = value, "Ignoring unparsable size");
                }
            }
            "display" => row.opts.display = normalize_display(value),
            "" => {}
            other => {
                row.opts
                    .extra
                    .insert(other.to_string(), Value::String(value.to_string()));
            }
        }
    }
    row
}

/// Strip one pair of surrounding double quotes and unescape `""`.
fn unquote(cell: &str) -> String {
    match cell.strip_prefix('"').and_then(|c| c.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => cell.to_string(),
    }
}

/// Leading decimal number of a cell, e.g. `5.5"` → 5.5.
fn parse_size(value: &str) -> Option<f64> {
    let end = value
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || (c == '.') || (i == 0 && (c == '-' || c == '+')))
        })
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok().filter(|v: &f64| v.is_finite())
}

/// Merge bulk input into the store.
#[instrument(skip_all, fields(entries = input.len()))]
pub fn import_into(
    store: &mut DeviceStore,
    extractor: &dyn AttributeExtractor,
    input: BulkInput,
    options: ImportOptions,
) -> ImportSummary {
    let mut summary = ImportSummary {
        entries: input.len(),
        ..ImportSummary::default()
    };
    let progress = progress_bar(input.len(), options.progress);

    match input {
        BulkInput::UserAgents(uas) => {
            for ua in uas {
                import_user_agent(store, extractor, &ua, &mut summary);
                progress.inc(1);
            }
        }
        BulkInput::Rows(rows) => {
            for row in rows {
                import_row(store, extractor, row, &mut summary);
                progress.inc(1);
            }
        }
    }

    progress.finish_and_clear();
    info!(
        added = summary.added,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        commands = summary.commands,
        removed = summary.removed,
        "Import complete"
    );
    summary
}

fn import_user_agent(
    store: &mut DeviceStore,
    extractor: &dyn AttributeExtractor,
    raw: &str,
    summary: &mut ImportSummary,
) {
    let ua = decode_user_agent(raw);
    let guess = extractor.extract(&ua);
    let (Some(brand), Some(model)) = (guess.brand, guess.model) else {
        trace!(ua = %ua, "No device recognized");
        summary.rejected += 1;
        return;
    };

    if store.lookup(&brand, &model).is_some() {
        debug!(%brand, %model, "Duplicate entry skipped");
        summary.duplicates += 1;
        return;
    }

    match store.add(&brand, &model, DeviceRecord::new(), AddMode::Merge) {
        Some(key) => {
            debug!(slot = %key, "Added device");
            summary.added += 1;
        }
        None => summary.rejected += 1,
    }
}

fn import_row(
    store: &mut DeviceStore,
    extractor: &dyn AttributeExtractor,
    mut row: Row,
    summary: &mut ImportSummary,
) {
    if row.opts.brand.is_none() || row.opts.model.is_none() {
        if let Some(raw) = row.string.as_deref() {
            let ua = decode_user_agent(raw);
            let guess = extractor.extract(&ua);
            row.opts.brand = row.opts.brand.or(guess.brand);
            row.opts.model = row.opts.model.or(guess.model);
            row.opts.device_type = guess_type(&ua, row.opts.device_type.or(guess.device_type));
        }
    }

    if let Some(cell) = row.command.as_deref() {
        summary.commands += 1;
        let mut directives = Vec::new();
        for parsed in parse_commands(cell) {
            match parsed {
                Ok(directive) => directives.push(directive),
                Err(e) => {
                    warn!(command = cell, error = %e, "Skipping directive");
                    summary.skipped_directives += 1;
                }
            }
        }
        let before = store.model_count();
        apply_directives(store, &directives, row.opts);
        summary.removed += before.saturating_sub(store.model_count());
        return;
    }

    let (Some(brand), Some(model)) = (row.opts.brand.clone(), row.opts.model.clone()) else {
        summary.rejected += 1;
        return;
    };
    match store.add(&brand, &model, row.opts, AddMode::Merge) {
        Some(_) => summary.added += 1,
        None => summary.rejected += 1,
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {bar:40} {pos}/{len} entries") {
        bar.set_style(style);
    }
    bar
}
