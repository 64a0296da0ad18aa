//! Quoting helpers used by the debug dumps.

/// Characters printed as escape sequences.
const ESCAPES: [(char, &str); 7] = [
    ('\u{8}', "\\b"),
    ('\n', "\\n"),
    ('\t', "\\t"),
    ('\u{c}', "\\f"),
    ('\r', "\\r"),
    ('"', "\\\""),
    ('\\', "\\\\"),
];

fn escape_of(c: char) -> Option<&'static str> {
    ESCAPES.iter().find(|(ch, _)| *ch == c).map(|(_, e)| *e)
}

fn push_string_char(buf: &mut String, c: char) {
    match escape_of(c) {
        Some(e) => buf.push_str(e),
        None => buf.push(c),
    }
}

/// Quote `s` as a double-quoted literal.
pub fn string_literal(s: &str) -> String {
    string_literal_chars(&s.chars().collect::<Vec<_>>())
}

pub fn string_literal_chars(chars: &[char]) -> String {
    let mut buf = String::with_capacity(chars.len() + 2);
    buf.push('"');
    for &c in chars {
        push_string_char(&mut buf, c);
    }
    buf.push('"');
    buf
}

/// Quote `c` as a single-quoted literal.
pub fn char_literal(c: char) -> String {
    format!("'{}'", escaped_char(c))
}

/// Escape `c` for use inside a single-quoted literal. `"` is left alone and `'` is escaped.
pub fn escaped_char(c: char) -> String {
    match c {
        '"' => c.to_string(),
        '\'' => "\\'".to_string(),
        _ => escape_of(c).map_or_else(|| c.to_string(), str::to_string),
    }
}
