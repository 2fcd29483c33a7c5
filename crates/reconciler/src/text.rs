//! Text normalization for names and multi-value cells.

/// Fallback technical name when nothing usable remains.
pub const UNNAMED: &str = "unnamed";

/// Default upper bound on technical name length.
pub const DEFAULT_MAX_NAME_LEN: usize = 128;

/// Separator for multi-value cells.
pub const MULTI_VALUE_SEPARATOR: char = ';';

const fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Derive a technical name from a display string.
///
/// Output is non-empty, made only of `[A-Za-z0-9._-]`, free of leading,
/// trailing or repeated underscores (before truncation), and at most
/// `max_len` characters long. `max_len == 0` is treated as 1.
///
/// ```
/// use hostsync_reconciler::text::sanitize_technical_name;
///
/// assert_eq!(sanitize_technical_name("Server Web 01", 128), "Server_Web_01");
/// assert_eq!(sanitize_technical_name("a!!b", 128), "a_b");
/// assert_eq!(sanitize_technical_name("", 128), "unnamed");
/// ```
pub fn sanitize_technical_name(value: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('_');
    let name = if trimmed.is_empty() { UNNAMED } else { trimmed };

    // Every char is ASCII here, so byte and char counts agree.
    let limit = max_len.max(1);
    name.get(..limit).unwrap_or(name).to_string()
}

/// Split a `;`-separated cell into trimmed, non-empty items.
pub fn split_multi(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(MULTI_VALUE_SEPARATOR)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
