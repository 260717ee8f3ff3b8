//! Custom assertion helpers for tests.
#![allow(dead_code)]

use tracing::error;

#[must_use]
pub fn assert_json_has_fields(json_str: &str, fields: &[&str]) -> serde_json::Value {
    let value: serde_json::Value =
        serde_json::from_str(json_str).expect("invalid JSON payload");
    for field in fields {
        if value.get(field).is_none() {
            error!(field, json = %value, "Missing expected JSON field");
            panic!("Missing JSON field: {field}");
        }
    }
    value
}

pub fn assert_no_ansi(output: &str) {
    if output.contains("\u{1b}[") {
        error!("ANSI escape sequence detected");
        panic!("Expected no ANSI escape sequences");
    }
}

pub fn assert_contains_all(output: &str, expected: &[&str]) {
    for item in expected {
        if !output.contains(item) {
            error!(expected = %item, "Expected output to contain value");
            panic!("Expected output to contain: {item}");
        }
    }
}

/// Assert each needle occurs in `output`, in the order given.
pub fn assert_in_order(output: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match output[from..].find(needle) {
            Some(at) => from += at + needle.len(),
            None => {
                error!(needle = %needle, "Value missing or out of order");
                panic!("Expected \"{needle}\" after offset {from} in:\n{output}");
            }
        }
    }
}

/// Assert the first line is the `#`-prefixed report header and return the
/// data rows split into cells.
pub fn assert_report_rows(report: &str) -> Vec<Vec<String>> {
    let mut lines = report.lines();
    let header = lines.next().unwrap_or_default();
    if !header.starts_with("#_command\t#brand\t#model") {
        error!(header, "Unexpected report header");
        panic!("Expected report header, got: {header}");
    }
    lines
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
