//! Repair of user-agent strings mangled by URL encoding.

use std::sync::LazyLock;

use regex::Regex;

static URL_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%[0-9a-f]{2}").expect("valid pattern"));
static PLUS_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+.[^+]*\+").expect("valid pattern"));

/// Undo percent-encoding, and `+` standing in for spaces.
///
/// `+` is only replaced when the string has no space at all and contains a
/// `+word+` run, so version tokens like `C++` survive.
pub fn decode_user_agent(raw: &str) -> String {
    let mut ua = if URL_ESCAPE.is_match(raw) {
        urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned())
    } else {
        raw.to_string()
    };

    if !ua.contains(' ') && PLUS_RUN.is_match(&ua) {
        ua = ua.replace('+', " ");
    }
    ua
}
