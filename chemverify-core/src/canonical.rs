//! Canonicalization: the normal form every downstream stage operates on,
//! plus stable JSON serialization used by the run hash chain.

use serde::Serialize;

/// Normalizes line endings to LF, strips trailing horizontal whitespace on
/// each line, and trims trailing whitespace on the whole string. Pure and
/// total; `canonicalize(canonicalize(x)) == canonicalize(x)`.
pub fn canonicalize(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    for line in lines.iter_mut() {
        *line = line.trim_end_matches([' ', '\t']);
    }
    lines.join("\n").trim_end().to_string()
}

/// Serializes `value` to a stable JSON string: camelCase keys (the caller's
/// struct is responsible for `#[serde(rename_all = "camelCase")]`; this
/// function does not rename fields itself), null/None fields omitted, and
/// deterministic key order (insert order for structs, since
/// `serde_json::to_string` preserves struct field declaration order when the
/// `preserve_order` feature is not enabled, and maps are re-sorted below for
/// any `serde_json::Value` input).
pub fn to_stable_json<T: Serialize>(value: &T) -> String {
    let v = serde_json::to_value(value).expect("model types are always serializable");
    let sorted = sort_json_keys(v);
    serde_json::to_string(&sorted).expect("serde_json::Value always serializes")
}

fn sort_json_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(String, serde_json::Value)> = map
                .into_iter()
                .map(|(k, v)| (k, sort_json_keys(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::new();
            for (k, v) in entries {
                out.insert(k, v);
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sort_json_keys).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf_and_cr() {
        assert_eq!(canonicalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn trims_trailing_whitespace_per_line() {
        assert_eq!(canonicalize("a   \nb\t\n"), "a\nb");
    }

    #[test]
    fn idempotent() {
        let cases = ["a\r\n b \t\n\n", "plain text", "  leading kept  \n"];
        for c in cases {
            let once = canonicalize(c);
            let twice = canonicalize(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn stable_json_sorts_keys_and_omits_null() {
        #[derive(Serialize)]
        struct S {
            b: i32,
            a: i32,
            #[serde(skip_serializing_if = "Option::is_none")]
            c: Option<i32>,
        }
        let json = to_stable_json(&S { b: 1, a: 2, c: None });
        assert_eq!(json, r#"{"a":2,"b":1}"#);
    }
}
