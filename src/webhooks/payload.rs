//! Safe lookups into untyped webhook payloads.
//!
//! Payloads are arbitrary JSON trees. A lookup walks a path of object keys and
//! yields `None` as soon as a step is missing, `null`, or not an object, so
//! callers can chain fallbacks without ever failing.

use serde_json::Value;

/// Returns the value at `path`, or `None` if any step is absent.
pub fn value_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |node, key| node.as_object()?.get(*key))
}

/// Returns the string at `path`. Non-string values count as absent.
pub fn str_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(payload, path)?.as_str()
}

/// Like [`str_at`], but an empty string also counts as absent.
pub fn non_empty_str_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    str_at(payload, path).filter(|s| !s.is_empty())
}

/// Returns the boolean at `path`. Non-boolean values count as absent.
pub fn bool_at(payload: &Value, path: &[&str]) -> Option<bool> {
    value_at(payload, path)?.as_bool()
}
