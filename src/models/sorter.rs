//! Deterministic ordering of keys, stores and nested mapping trees.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

/// Compare two keys case-insensitively, breaking ties so that a lowercase
/// letter sorts before its uppercase form (`"aa" < "AA" < "ab"`).
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.chars().map(invert_case).cmp(b.chars().map(invert_case)))
}

fn invert_case(c: char) -> char {
    if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

/// Sort a list of keys in place with [`compare_keys`].
pub fn sort_keys<S: AsRef<str>>(keys: &mut [S]) {
    keys.sort_by(|a, b| compare_keys(a.as_ref(), b.as_ref()));
}

/// Rebuild every mapping level of a tree with keys in [`compare_keys`] order.
///
/// Sequences keep their element order but their elements are sorted
/// recursively. Non-string keys compare by their YAML rendering.
#[must_use]
pub fn sort_tree(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => {
            let mut entries: Vec<(Value, Value)> = mapping.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| compare_keys(&key_text(a), &key_text(b)));
            let mut sorted = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                sorted.insert(key, sort_tree(value));
            }
            Value::Mapping(sorted)
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(sort_tree).collect()),
        Value::Tagged(mut tagged) => {
            tagged.value = sort_tree(tagged.value);
            Value::Tagged(tagged)
        }
        other => other,
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other).unwrap_or_default(),
    }
}

static USER_AGENT_CLASSES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"^Mozilla/\d\.0 .*(?:AppleWebKit|Chrome|Gecko)").expect("valid pattern"),
        Regex::new(r"^Mozilla/\d").expect("valid pattern"),
        Regex::new(r"^Mozilla").expect("valid pattern"),
        Regex::new(r"Mozilla").expect("valid pattern"),
    ]
});

fn user_agent_class(ua: &str) -> usize {
    USER_AGENT_CLASSES
        .iter()
        .position(|re| re.is_match(ua))
        .unwrap_or(USER_AGENT_CLASSES.len())
}

/// Order user-agent strings: browser-like `Mozilla/5.0` strings first, then
/// other `Mozilla/N`, other strings starting with or containing `Mozilla`,
/// and all others last; plain lexical order within each class.
pub fn compare_user_agents(a: &str, b: &str) -> Ordering {
    user_agent_class(a)
        .cmp(&user_agent_class(b))
        .then_with(|| a.cmp(b))
}
