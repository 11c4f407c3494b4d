//! Canonical-JSON equality for policy documents
//!
//! Two documents are equal when their canonical serializations match:
//! object keys sorted lexicographically at every nesting level, compact
//! separators, array order preserved. Rule order is therefore part of
//! equality, matching the provider's interpretation where rule order
//! reflects evaluation concerns downstream.
//!
//! The canonical rendering is written out by hand rather than through
//! `serde_json::to_string`, whose key ordering depends on whether any crate
//! in the build enables the `preserve_order` feature.

use serde_json::Value;

use crate::document::PolicyDocument;

/// Compare two optional policy documents for semantic equality
///
/// Both absent is equal; exactly one absent is not. This is the convergence
/// check used by the reconciliation workflow, both before publishing ("is
/// the stored policy already what we computed?") and after ("did publish
/// produce what we intended?").
pub fn documents_equal(a: Option<&PolicyDocument>, b: Option<&PolicyDocument>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => canonical_json(a.as_value()) == canonical_json(b.as_value()),
        _ => false,
    }
}

/// Render a JSON value in canonical form
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped(key, out);
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
    }
}

fn write_escaped(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
