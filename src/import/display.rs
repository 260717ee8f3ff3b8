//! Display resolution normalization.

/// Marketing names of common display resolutions.
const NAMED_RESOLUTIONS: &[(&str, &str)] = &[
    ("QQVGA", "160x120"),
    ("HQVGA", "240x160"),
    ("QVGA", "320x240"),
    ("WQVGA", "400x240"),
    ("HVGA", "480x320"),
    ("VGA", "640x480"),
    ("WVGA", "768x480"),
    ("FWVGA", "854x480"),
    ("SVGA", "800x600"),
    ("DVGA", "960x640"),
    ("WSVGA", "1024x576"),
    ("XGA", "1024x768"),
    ("WXGA", "1366x768"),
    ("XGA+", "1152x864"),
    ("WXGA+", "1440x900"),
    ("SXGA", "1280x1024"),
    ("SXGA+", "1400x1050"),
    ("WSXGA+", "1680x1050"),
    ("UXGA", "1600x1200"),
    ("WUXGA", "1920x1200"),
    ("QWXGA", "2048x1152"),
    ("QXGA", "2048x1536"),
    ("WQXGA", "2560x1600"),
    ("QSXGA", "2560x2048"),
    ("WQSXGA", "3200x2048"),
    ("QUXGA", "3200x2400"),
    ("WQUXGA", "3840x2400"),
    ("HXGA", "4096x3072"),
    ("WHXGA", "5120x3200"),
    ("HSXGA", "5120x4096"),
    ("WHSXGA", "6400x4096"),
    ("HUXGA", "6400x4800"),
    ("WHUXGA", "7680x4800"),
    ("nHD", "640x360"),
    ("qHD", "960x540"),
    ("HD", "1280x720"),
    ("FHD", "1920x1080"),
    ("QHD", "2560x1440"),
    ("WQXGA+", "3200x1800"),
    ("UHD 4K", "3840x2160"),
    ("UHD+ 5K", "5120x2880"),
    ("FUHD 8K", "7680x4320"),
    ("QUHD 16K", "15360x8640"),
];

/// Resolution for a marketing name such as `FHD`. Names are case-sensitive
/// (`qHD` and `QHD` differ).
pub fn named_resolution(name: &str) -> Option<&'static str> {
    NAMED_RESOLUTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, res)| *res)
}

/// Normalize a display cell to `WxH`.
///
/// Known marketing names map to their resolution. Otherwise whitespace is
/// removed and the first non-digit separator becomes `x`.
pub fn normalize_display(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(res) = named_resolution(raw) {
        return Some(res.to_string());
    }

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut replaced = false;
    let normalized = compact
        .chars()
        .map(|c| {
            if !replaced && !c.is_ascii_digit() {
                replaced = true;
                'x'
            } else {
                c
            }
        })
        .collect();
    Some(normalized)
}
