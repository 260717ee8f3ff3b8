//! Ordering of plain user-agent lists.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{ModelsError, Result};
use crate::import::decode_user_agent;
use crate::models::sorter::compare_user_agents;

/// Counters from sorting a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortSummary {
    /// Non-empty lines read.
    pub read: usize,
    /// Lines written.
    pub written: usize,
    /// Lines dropped as repeats.
    pub duplicates: usize,
}

/// Decode and order user agents, optionally dropping repeats.
#[instrument(skip_all, fields(count = lines.len(), uniq))]
pub fn sort_user_agents<S: AsRef<str>>(lines: &[S], uniq: bool) -> (Vec<String>, SortSummary) {
    let mut uas: Vec<String> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .map(decode_user_agent)
        .collect();
    let read = uas.len();

    uas.sort_by(|a, b| compare_user_agents(a, b));
    if uniq {
        uas.dedup();
    }

    let summary = SortSummary {
        read,
        written: uas.len(),
        duplicates: read - uas.len(),
    };
    debug!(?summary, "Sorted user agents");
    (uas, summary)
}

/// Read a user-agent list, one per line.
///
/// # Errors
///
/// Returns [`ModelsError::InputNotFound`] if the file is missing.
pub fn read_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ModelsError::InputNotFound {
            path: path.display().to_string(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Render a list as newline-terminated lines.
pub fn render_list(uas: &[String]) -> String {
    let mut out = uas.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Read, sort and write a user-agent list file.
///
/// # Errors
///
/// Returns [`ModelsError::InputNotFound`] if the input is missing, or an IO
/// error if the output cannot be written.
pub fn sort_file(input: &Path, output: &Path, uniq: bool) -> Result<SortSummary> {
    let lines = read_list(input)?;
    let (sorted, summary) = sort_user_agents(&lines, uniq);
    std::fs::write(output, render_list(&sorted))?;
    Ok(summary)
}
