//! Brace-balance framing for replies that carry no length prefix.
//!
//! This is a completeness heuristic, not a parser. It assumes well formed JSON
//! and only decides whether to keep reading; the decoder has the final word.

/// Incremental brace counter that ignores braces inside quoted strings.
///
/// Bytes can be fed in arbitrary pieces; the scan state survives chunk
/// boundaries, so feeding a text at once or split anywhere gives the same
/// result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Framer {
    depth: i64,
    in_double: bool,
    in_single: bool,
    escaped: bool,
    opened: bool,
    last: Option<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `bytes`, continuing from the current state.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let escaped = core::mem::take(&mut self.escaped);

            match byte {
                b'\\' if !escaped => self.escaped = true,
                b'"' if !escaped && !self.in_single => self.in_double = !self.in_double,
                b'\'' if !escaped && !self.in_double => self.in_single = !self.in_single,
                b'{' if !self.in_string() => {
                    self.depth += 1;
                    self.opened = true;
                }
                b'}' if !self.in_string() => self.depth -= 1,
                _ => (),
            }

            if !byte.is_ascii_whitespace() {
                self.last = Some(byte);
            }
        }
    }

    /// Current nesting depth. Negative after stray closing braces.
    pub fn depth(&self) -> i64 {
        self.depth
    }

    pub fn in_string(&self) -> bool {
        self.in_double || self.in_single
    }

    /// True when the depth is back at zero.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }

    /// True once an object was opened, closed again, and nothing but
    /// whitespace followed its closing brace.
    pub fn is_complete(&self) -> bool {
        self.opened && self.is_balanced() && !self.in_string() && self.last == Some(b'}')
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// True iff the brace depth of `text` ends at exactly zero, not counting braces
/// inside single or double quoted strings.
pub fn is_balanced(text: &str) -> bool {
    let mut framer = Framer::new();

    framer.feed(text.as_bytes());
    framer.is_balanced()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_braces_are_ignored() {
        assert!(is_balanced(r#"{"a":"{not a brace}"}"#));
        assert!(is_balanced(r#"{"a":"}"}"#));
        assert!(is_balanced(r#"{"a":"{{{"}"#));
    }

    #[test]
    fn unclosed_object_is_not_balanced() {
        assert!(!is_balanced(r#"{"a":1"#));
        assert!(!is_balanced(r#"{"a":{"b":1}"#));
        assert!(!is_balanced(r#"{"a":"}""#));
    }

    #[test]
    fn empty_text_is_balanced() {
        assert!(is_balanced(""));
        assert!(!Framer::new().is_complete());
    }

    #[test]
    fn escaped_quotes_do_not_close_strings() {
        assert!(is_balanced(r#"{"a":"say \"}\" twice"}"#));
        assert!(!is_balanced(r#"{"a":"\"}"#));
    }

    #[test]
    fn escaped_backslash_before_closing_quote() {
        // the quote after `\\` closes the string, so the final brace counts
        assert!(is_balanced(r#"{"path":"C:\\"}"#));
    }

    #[test]
    fn quote_kinds_nest_without_toggling_each_other() {
        assert!(is_balanced(r#"{"it's":"{"}"#));
        assert!(is_balanced(r#"{'say "}"':1}"#));
    }

    #[test]
    fn state_survives_chunk_boundaries() {
        let text = br#"{"error":null,"result":{"text":"a } b"}}"#;

        for split in 0..text.len() {
            let mut framer = Framer::new();
            framer.feed(&text[..split]);
            assert!(!framer.is_complete(), "complete too early at {}", split);
            framer.feed(&text[split..]);
            assert!(framer.is_complete(), "incomplete after split at {}", split);
        }
    }

    #[test]
    fn trailing_whitespace_keeps_completion() {
        let mut framer = Framer::new();

        framer.feed(b"{\"result\":1}");
        framer.feed(b"\r\n  ");

        assert!(framer.is_complete());
        assert_eq!(framer.depth(), 0);
    }

    #[test]
    fn scalar_reply_never_completes() {
        let mut framer = Framer::new();

        framer.feed(b"null");

        assert!(framer.is_balanced());
        assert!(!framer.is_complete());

        framer.reset();
        assert_eq!(framer, Framer::new());
    }
}
