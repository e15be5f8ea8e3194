//! Bracket-, brace- and quote-aware scanning primitives

// ============================================================================
// QUOTE STATE
// ============================================================================

/// Single "current quote char" state machine.
///
/// A `'` or `"` outside any quote opens a span; only the same character closes
/// it. The other quote character is plain text while inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteState {
    open: Option<char>,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character. Returns `true` when the character is structural,
    /// i.e. outside quotes and not itself a quote toggle.
    pub fn step(&mut self, c: char) -> bool {
        match (self.open, c) {
            (None, '"' | '\'') => {
                self.open = Some(c);
                false
            }
            (Some(q), c) if c == q => {
                self.open = None;
                false
            }
            (Some(_), _) => false,
            (None, _) => true,
        }
    }

    pub fn in_quotes(&self) -> bool {
        self.open.is_some()
    }
}

// ============================================================================
// SPLITTING
// ============================================================================

/// Split `text` on `delimiter` at nesting depth 0 only.
///
/// `[`/`]` and `{`/`}` are tracked separately; quoted spans suppress both
/// bracket and delimiter recognition. Fragments are trimmed and empty ones
/// are dropped.
pub fn smart_split(text: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quotes = QuoteState::new();
    let mut brackets: i32 = 0;
    let mut braces: i32 = 0;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if !quotes.step(c) {
            continue;
        }
        match c {
            '[' => brackets += 1,
            ']' => brackets -= 1,
            '{' => braces += 1,
            '}' => braces -= 1,
            c if c == delimiter && brackets == 0 && braces == 0 => {
                push_fragment(&mut parts, &text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    push_fragment(&mut parts, &text[start..]);

    parts
}

fn push_fragment<'a>(parts: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        parts.push(fragment);
    }
}

// ============================================================================
// QUOTES AND ENCLOSURES
// ============================================================================

/// Strip one matching pair of surrounding `"` or `'`. Mismatched or partial
/// quotes are left alone.
pub fn remove_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Trim every leading and trailing quote character.
pub fn strip_quote_chars(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

/// Inner text if `value` is wrapped in `open` ... `close`.
pub fn strip_enclosing(value: &str, open: char, close: char) -> Option<&str> {
    if value.len() >= 2 && value.starts_with(open) && value.ends_with(close) {
        Some(&value[open.len_utf8()..value.len() - close.len_utf8()])
    } else {
        None
    }
}

pub fn is_bracketed(value: &str) -> bool {
    strip_enclosing(value, '[', ']').is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_split_flat() {
        assert_eq!(smart_split("a, b ,c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_smart_split_respects_brackets_and_braces() {
        assert_eq!(
            smart_split("g1=[1,2,3],g2={a:1,b:2},x", ','),
            vec!["g1=[1,2,3]", "g2={a:1,b:2}", "x"]
        );
    }

    #[test]
    fn test_smart_split_respects_quotes() {
        assert_eq!(
            smart_split(r#""a,b",'c,[d',e"#, ','),
            vec![r#""a,b""#, "'c,[d'", "e"]
        );
    }

    #[test]
    fn test_smart_split_other_quote_is_inert() {
        assert_eq!(smart_split(r#""it's, fine",x"#, ','), vec![r#""it's, fine""#, "x"]);
    }

    #[test]
    fn test_smart_split_drops_empty_fragments() {
        assert!(smart_split("", ',').is_empty());
        assert_eq!(smart_split(",a,,b,", ','), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_quotes() {
        assert_eq!(remove_quotes(r#""hello""#), "hello");
        assert_eq!(remove_quotes("'hello'"), "hello");
        assert_eq!(remove_quotes(r#""mixed'"#), r#""mixed'"#);
        assert_eq!(remove_quotes(r#""incomplete"#), r#""incomplete"#);
        assert_eq!(remove_quotes(r#"""#), r#"""#);
        assert_eq!(remove_quotes(""), "");
        assert_eq!(remove_quotes("a"), "a");
    }

    #[test]
    fn test_strip_quote_chars() {
        assert_eq!(strip_quote_chars(r#""'key'""#), "key");
    }

    #[test]
    fn test_strip_enclosing() {
        assert_eq!(strip_enclosing("[1,2]", '[', ']'), Some("1,2"));
        assert_eq!(strip_enclosing("[]", '[', ']'), Some(""));
        assert_eq!(strip_enclosing("[", '[', ']'), None);
        assert_eq!(strip_enclosing("1,2", '[', ']'), None);
    }

    #[test]
    fn test_quote_state() {
        let mut q = QuoteState::new();
        assert!(q.step('a'));
        assert!(!q.step('"'));
        assert!(q.in_quotes());
        assert!(!q.step('\''));
        assert!(q.in_quotes());
        assert!(!q.step('"'));
        assert!(!q.in_quotes());
    }
}
