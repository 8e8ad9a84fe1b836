/// Escapes control whitespace for single-line display.
///
/// With `escape_spaces`, plain spaces become `·` so token boundaries stay visible.
///
/// # Examples
/// ```
/// use allstar_core::utils::escape_whitespace;
/// assert_eq!(escape_whitespace("a\tb\n", false), "a\\tb\\n");
/// assert_eq!(escape_whitespace("a b", true), "a·b");
/// ```
pub fn escape_whitespace(s: &str, escape_spaces: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' ' if escape_spaces => out.push('·'),
            c => out.push(c),
        }
    }
    out
}

/// Quotes a code point for diagnostics: `'a'`, `'\n'`, `'\u{0}'`.
///
/// Values outside the Unicode range fall back to their number.
pub fn char_literal(code_point: i32) -> String {
    let Some(c) = u32::try_from(code_point).ok().and_then(char::from_u32) else {
        return code_point.to_string();
    };
    match c {
        '\n' => "'\\n'".to_string(),
        '\r' => "'\\r'".to_string(),
        '\t' => "'\\t'".to_string(),
        '\'' => "'\\''".to_string(),
        c if c.is_control() => format!("'\\u{{{:x}}}'", c as u32),
        c => format!("'{c}'"),
    }
}
