//! Optional-field lookups over loosely structured upstream JSON.
//!
//! Each helper answers one question ("is there a string here?", "what is the
//! first element of this list?") and returns `None` when the answer is no,
//! whatever the reason: missing key, `null`, or a value of the wrong type.

use serde_json::Value;

/// Follows `path` through nested objects.
pub fn nested<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// The array at `path`, or an empty slice when absent or not an array.
pub fn array_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    match nested(value, path) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// First element of the array at `path`.
pub fn first_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    array_at(value, path).first()
}

/// A string at `path`. Empty strings count as present.
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    nested(value, path)?.as_str()
}

/// A scalar at `path` rendered as text. Strings are taken as-is, numbers are
/// formatted; objects, arrays, booleans and `null` yield `None`.
pub fn scalar_text_at(value: &Value, path: &[&str]) -> Option<String> {
    match nested(value, path)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// An integer at `path`. Integral floats such as `50.0` are accepted;
/// anything else is `None`.
pub fn i64_at(value: &Value, path: &[&str]) -> Option<i64> {
    let number = nested(value, path)?;
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}

/// A float at `path`, coercing numeric strings like `"2.05"`.
pub fn f64_at(value: &Value, path: &[&str]) -> Option<f64> {
    match nested(value, path)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
