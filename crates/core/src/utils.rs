use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as an RFC 3339 string (e.g. "2025-08-04T19:43:53+00:00")
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Converts epoch seconds to an RFC 3339 UTC string.
/// Returns None when the value is outside chrono's representable range.
pub fn format_epoch_seconds(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Same as `format_epoch_seconds` for fractional epochs; the fraction is dropped
pub fn format_epoch_float(secs: f64) -> Option<String> {
    if !secs.is_finite() || secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    format_epoch_seconds(secs.trunc() as i64)
}

/// Keeps at most `max` characters (not bytes) of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Normalizes a roster entry: trims whitespace and a leading '@'
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_string()
}

/// Escapes a value for use inside a single-quoted formula string literal
pub fn escape_formula_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out
}

/// Formula matching rows whose `field` equals `value` exactly
pub fn equals_formula(field: &str, value: &str) -> String {
    format!("{{{}}} = '{}'", field, escape_formula_value(value))
}
