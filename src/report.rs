//! Tab-separated diagnostic report.
//!
//! Rows carry the columns of bulk row input, so an edited report can be fed
//! back through `uam add`.

use std::io;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::{Result, ResultExt};
use crate::extract::{AttributeExtractor, guess_type};
use crate::import::{CSV_SEPARATOR, decode_user_agent};
use crate::models::DeviceStore;
use crate::models::sorter::compare_keys;

/// Report columns, in output order.
pub const REPORT_COLUMNS: [&str; 10] = [
    "_command", "brand", "model", "type", "size", "name", "display", "date", "debug", "string",
];

type Row = [String; REPORT_COLUMNS.len()];

fn column(name: &str) -> usize {
    REPORT_COLUMNS
        .iter()
        .position(|c| *c == name)
        .unwrap_or_default()
}

/// Rows of a report, kept in key-comparator order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<Row>,
}

impl Report {
    /// One row per user agent with the extractor's guess.
    #[instrument(skip_all, fields(count = user_agents.len()))]
    pub fn from_user_agents<S: AsRef<str>>(
        user_agents: &[S],
        extractor: &dyn AttributeExtractor,
    ) -> Self {
        let mut report = Self::default();
        for raw in user_agents {
            let ua = decode_user_agent(raw.as_ref());
            if ua.is_empty() {
                continue;
            }
            let guess = extractor.extract(&ua);
            let mut row = Row::default();
            row[column("brand")] = guess.brand.unwrap_or_default();
            row[column("model")] = guess.model.unwrap_or_default();
            row[column("type")] = guess_type(&ua, guess.device_type).unwrap_or_default();
            row[column("string")] = ua;
            report.rows.push(row);
        }
        report.sort();
        debug!(rows = report.rows.len(), "Built user-agent report");
        report
    }

    /// One row per data-bearing record of a resolved store.
    ///
    /// Slots still pointing at another slot are left out; brand and model
    /// default to the slot key.
    #[instrument(skip_all, fields(models = store.model_count()))]
    pub fn from_store(store: &DeviceStore) -> Self {
        let mut report = Self::default();
        for (brand, models) in store.brands() {
            for (model, record) in models {
                if record.is_alias_at(brand, model) {
                    continue;
                }
                let mut row = Row::default();
                for (i, name) in REPORT_COLUMNS.iter().enumerate() {
                    row[i] = record.field(name).unwrap_or_default();
                }
                if row[column("brand")].is_empty() {
                    row[column("brand")].clone_from(brand);
                }
                if row[column("model")].is_empty() {
                    row[column("model")].clone_from(model);
                }
                report.rows.push(row);
            }
        }
        report.sort();
        debug!(rows = report.rows.len(), "Built store report");
        report
    }

    fn sort(&mut self) {
        let sep = char::from(CSV_SEPARATOR).to_string();
        let mut keyed: Vec<(String, Row)> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| (row.join(&sep), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
    }

    /// Number of rows, header excluded.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the report has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the header and all rows as tab-separated text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: io::Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(CSV_SEPARATOR)
            .has_headers(false)
            .from_writer(out);

        writer
            .write_record(REPORT_COLUMNS.iter().map(|c| format!("#{c}")))
            .with_context(|| "Failed to write report header")?;
        for row in &self.rows {
            writer
                .write_record(row)
                .with_context(|| "Failed to write report row")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the report as text.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be encoded.
    pub fn to_text(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).with_context(|| "Report is not valid UTF-8")
    }

    /// Write the report to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    #[instrument(skip(self), fields(path = %path.display(), rows = self.rows.len()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(io::BufWriter::new(file))?;
        info!("Wrote report");
        Ok(())
    }
}
