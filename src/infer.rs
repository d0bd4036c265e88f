//! Rule-based conversion of a raw field into a typed [`Value`].
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. strip one leading and one trailing `"` or `'`
//! 2. empty, `null`, `undefined` → [`Value::Null`]
//! 3. `true` / `false` → [`Value::Boolean`]
//! 4. `-?[0-9]+` → [`Value::Integer`] (text when outside ±(2^53 − 1))
//! 5. `-?[0-9]*.[0-9]+` → [`Value::Float`]
//! 6. `[0-9]+(.[0-9]+)?%` → fraction as [`Value::Float`]
//! 7. `$1,234.56` style currency → [`Value::Float`]
//! 8. a leading `YYYY-MM-DD` or `MM/DD/YYYY` that parses → ISO-8601 text
//! 9. anything else → the cleaned text
//!
//! A rule whose pattern matches but whose conversion fails returns the
//! cleaned text; later rules are not retried. Date rules are the exception
//! and fall through to plain text.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::value::Value;

/// Largest magnitude an integer may have and still round-trip through an
/// IEEE-754 double.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Shapes with an explicit offset that RFC 3339 parsing rejects: no
/// seconds, or an offset without a colon (`+0000`).
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

struct Patterns {
    integer: Regex,
    float: Regex,
    percent: Regex,
    currency: Regex,
    iso_date: Regex,
    us_date: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        integer: Regex::new(r"^-?[0-9]+$").expect("integer pattern"),
        float: Regex::new(r"^-?[0-9]*\.[0-9]+$").expect("float pattern"),
        percent: Regex::new(r"^[0-9]+(\.[0-9]+)?%$").expect("percent pattern"),
        currency: Regex::new(r"^\$[0-9,]+(\.[0-9]{2})?$").expect("currency pattern"),
        iso_date: Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("iso date pattern"),
        us_date: Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}").expect("us date pattern"),
    })
}

/// Infers the typed value of an already-trimmed field.
pub fn infer_value(raw: &str) -> Value {
    let cleaned = strip_outer_quotes(raw);
    let patterns = patterns();

    let lowered = cleaned.to_ascii_lowercase();
    if cleaned.is_empty() || lowered == "null" || lowered == "undefined" {
        return Value::Null;
    }
    match lowered.as_str() {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }

    if patterns.integer.is_match(cleaned) {
        return match cleaned.parse::<i64>() {
            Ok(parsed) if parsed.unsigned_abs() <= MAX_SAFE_INTEGER as u64 => {
                Value::Integer(parsed)
            }
            _ => text(cleaned),
        };
    }

    if patterns.float.is_match(cleaned) {
        return finite_or_text(cleaned.parse::<f64>().ok(), cleaned);
    }

    if patterns.percent.is_match(cleaned) {
        let parsed = cleaned
            .trim_end_matches('%')
            .parse::<f64>()
            .ok()
            .map(|number| number / 100.0);
        return finite_or_text(parsed, cleaned);
    }

    if patterns.currency.is_match(cleaned) {
        let digits = cleaned.replace(['$', ','], "");
        return finite_or_text(digits.parse::<f64>().ok(), cleaned);
    }

    if (patterns.iso_date.is_match(cleaned) || patterns.us_date.is_match(cleaned))
        && let Some(timestamp) = normalize_timestamp(cleaned)
    {
        return Value::Text(timestamp);
    }

    text(cleaned)
}

/// Parses a date or date-time and renders it as a UTC ISO-8601 timestamp
/// with millisecond precision (`2024-06-01T00:00:00.000Z`).
///
/// Values without an offset are taken to be UTC.
pub fn normalize_timestamp(value: &str) -> Option<String> {
    parse_utc(value).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, fmt) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

fn strip_outer_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

fn finite_or_text(parsed: Option<f64>, cleaned: &str) -> Value {
    match parsed {
        Some(number) if number.is_finite() => Value::Float(number),
        _ => text(cleaned),
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}
