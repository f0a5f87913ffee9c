//! Pull parser token types

/// What the last `read()` produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Parsing failed; see `error()`
    Error,
    /// End of document
    Eof,
    /// Character data or a CDATA section
    Text,
    /// `<?target data?>`
    ProcessingInstruction,
    /// `<name attrs...>` or the start half of `<name/>`
    StartElement,
    /// `</name>`, or a synthesized close
    EndElement,
    /// `<!-- ... -->`
    Comment,
    /// `<!DOCTYPE ...>`
    DocType,
}

impl Token {
    /// No further tokens follow
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Token::Error | Token::Eof)
    }
}

/// Borrowed view of one attribute of the current start tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRef<'p> {
    pub name: &'p str,
    pub local_name: &'p str,
    pub namespace: Option<&'p str>,
    pub value: &'p str,
}

/// Element name as reported to push consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName<'p> {
    pub name: &'p str,
    pub local_name: &'p str,
    pub namespace: Option<&'p str>,
}

/// Split a qualified name into (prefix, local) on the first `:`
#[inline]
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("root"), (None, "root"));
        assert_eq!(split_name("ns:root"), (Some("ns"), "root"));
        assert_eq!(split_name("a:b:c"), (Some("a"), "b:c"));
    }

    #[test]
    fn test_terminal_tokens() {
        assert!(Token::Eof.is_terminal());
        assert!(Token::Error.is_terminal());
        assert!(!Token::EndElement.is_terminal());
    }
}
