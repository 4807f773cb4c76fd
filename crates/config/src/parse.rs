//! `KEY=VALUE` parsing and key normalization.

use std::collections::HashMap;

/// Prefix geo-cli puts on its own keys. Entries are also indexed without it.
pub const KEY_PREFIX: &str = "GEO_CLI_";

/// Upper-cases a key and trims surrounding whitespace.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parses config file contents into a key/value map.
///
/// The first `=` separates key from value; there is no escaping. Blank lines,
/// `#` comments and lines without `=` are skipped. Keys are upper-cased and
/// prefixed keys are additionally indexed without [`KEY_PREFIX`]; an
/// explicit unprefixed key wins over such an alias.
pub fn parse(content: &str) -> HashMap<String, String> {
    let mut full = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            tracing::debug!(line = line_no + 1, "skipping malformed config line");
            continue;
        };
        let key = normalize_key(key);
        if key.is_empty() {
            tracing::debug!(line = line_no + 1, "skipping config line with empty key");
            continue;
        }
        full.push((key, unquote(value.trim()).to_string()));
    }

    let mut values = HashMap::with_capacity(full.len() * 2);
    for (key, value) in &full {
        if let Some(short) = key.strip_prefix(KEY_PREFIX)
            && !short.is_empty()
        {
            values.insert(short.to_string(), value.clone());
        }
    }
    for (key, value) in full {
        values.insert(key, value);
    }
    values
}
