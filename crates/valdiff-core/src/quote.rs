//! Quote selection and escaping for rendered strings.

use std::borrow::Cow;

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Picks the quote needing the fewest escapes, preferring `"` then `'`
/// then backtick on ties.
pub(crate) fn choose_quote(text: &str, allow_backtick: bool) -> char {
    let mut counts = [0usize; 3];
    for c in text.chars() {
        if let Some(slot) = QUOTES.iter().position(|q| *q == c) {
            counts[slot] += 1;
        }
    }
    let candidates = if allow_backtick { 3 } else { 2 };
    let mut best = 0;
    for slot in 1..candidates {
        if counts[slot] < counts[best] {
            best = slot;
        }
    }
    QUOTES[best]
}

/// Escapes a piece of string content. Quote-related escapes only apply when
/// the content is rendered between `quote`.
pub(crate) fn escape_fragment(text: &str, quote: Option<char>) -> Cow<'_, str> {
    let needs_escape = text.chars().any(|c| {
        c.is_control() || (quote.is_some() && (c == '\\' || Some(c) == quote))
    });
    if !needs_escape {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\\' if quote.is_some() => escaped.push_str("\\\\"),
            c if Some(c) == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_control() => escaped.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Whether `key` can be written without quotes after a dot.
pub(crate) fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Whether `key` can be written bare as an object literal key.
pub(crate) fn is_bare_key(key: &str) -> bool {
    if is_identifier(key) {
        return true;
    }
    key == "0" || (!key.is_empty() && !key.starts_with('0') && key.bytes().all(|b| b.is_ascii_digit()))
}

/// Quotes `key` without ever using a backtick.
pub(crate) fn quote_key(key: &str) -> String {
    let quote = choose_quote(key, false);
    format!("{quote}{}{quote}", escape_fragment(key, Some(quote)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_double_quote_when_nothing_to_escape() {
        assert_eq!(choose_quote("hello", true), '"');
    }

    #[test]
    fn switches_quote_to_avoid_escapes() {
        assert_eq!(choose_quote("say \"hi\"", true), '\'');
        assert_eq!(choose_quote("it's \"x\"", true), '`');
        assert_eq!(choose_quote("it's \"x\"", false), '\'');
        assert_eq!(choose_quote("it's 'x' \"y\"", false), '"');
    }

    #[test]
    fn escapes_the_selected_quote_and_controls() {
        assert_eq!(escape_fragment("a\"b", Some('"')), "a\\\"b");
        assert_eq!(escape_fragment("a\nb", None), "a\\nb");
        assert_eq!(escape_fragment("a'b", Some('"')), "a'b");
        assert_eq!(escape_fragment("\u{1}", None), "\\x01");
    }

    #[test]
    fn bare_keys_accept_identifiers_and_indices() {
        assert!(is_bare_key("name"));
        assert!(is_bare_key("$ref"));
        assert!(is_bare_key("42"));
        assert!(!is_bare_key("042"));
        assert!(!is_bare_key("first name"));
        assert_eq!(quote_key("first name"), "\"first name\"");
    }
}
