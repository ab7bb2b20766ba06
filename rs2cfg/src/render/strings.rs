//! String and key quoting shared by the TOML and YAML renderers.

/// Render a string value with the simplest quoting its content allows.
///
/// Single-quoted literal form is used unless the string holds quotes or
/// control characters, which switch to the escaped double-quoted form.
pub fn quote_string(s: &str) -> String {
    if needs_escaping(s) {
        escape_double_quoted(s)
    } else {
        format!("'{}'", s)
    }
}

/// Render a mapping key, quoting it when it is not a bare key.
pub fn render_key(key: &str) -> String {
    let key = key.strip_prefix('"').unwrap_or(key);
    let key = key.strip_suffix('"').unwrap_or(key);

    if !key.is_empty() && key.bytes().all(is_bare_key_byte) {
        key.to_string()
    } else {
        quote_string(key)
    }
}

/// Render a YAML mapping key.
///
/// Bare keys that the YAML core schema resolves to null, a boolean or a
/// number are quoted so they read back as strings.
pub fn render_yaml_key(key: &str) -> String {
    let rendered = render_key(key);
    if resolves_to_non_string(&rendered) {
        quote_string(&rendered)
    } else {
        rendered
    }
}

fn resolves_to_non_string(key: &str) -> bool {
    let unsigned = key.strip_prefix('-').unwrap_or(key);
    unsigned.is_empty()
        || unsigned.starts_with(|c: char| c.is_ascii_digit())
        || matches!(
            key,
            "null" | "Null" | "NULL" | "true" | "True" | "TRUE" | "false" | "False" | "FALSE"
        )
}

fn needs_escaping(s: &str) -> bool {
    s.chars().any(|c| matches!(c, '"' | '\'') || c.is_control())
}

fn is_bare_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
