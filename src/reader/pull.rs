//! Pull parser state machine
//!
//! [`PullParser::read`] produces one [`Token`] per call. Everything the
//! token refers to (names, text, attributes) is read back through accessors
//! and stays valid until the next `read()`.
//!
//! Deferred work is carried between calls:
//! - the frame whose `EndElement` was just reported is popped on the next call
//! - `<x/>` reports `StartElement`, then `EndElement` on the next call
//! - recovering from a mismatched end tag closes one element per call
//!
//! Once an error is reported the parser stays failed and every further
//! `read()` returns [`Token::Error`].

use super::events::{AttributeRef, Token};
use super::options::ParserOptions;
use crate::core::entities;
use crate::core::error::{ErrorKind, Location, Warning, XmlError};
use crate::core::scanner::{is_name_start_char, is_whitespace, Peeked, Scanner};
use crate::dom::element::{Attribute, Element};
use crate::dom::namespace::NamespaceStack;
use crate::dom::strings::{NameId, StringPool};
use std::io::Read;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parser lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Running,
    Finished,
    Failed(XmlError),
}

/// Outcome of one dispatch step; `None` means the construct produced no
/// token (skipped declaration, suppressed end tag, ignorable whitespace)
pub(super) type Step = Result<Option<Token>, XmlError>;

/// Streaming XML/HTML pull parser
pub struct PullParser<'a> {
    pub(super) scanner: Scanner<'a>,
    pub(super) options: ParserOptions,
    pub(super) state: ParseState,
    pub(super) strings: StringPool,
    pub(super) namespaces: NamespaceStack,
    pub(super) elements: Vec<Element>,

    // Current token
    pub(super) token: Option<Token>,
    pub(super) target: NameId,
    pub(super) text: String,
    pub(super) raw: Vec<u8>,
    pub(super) cdata: bool,

    // Work deferred to later calls
    pub(super) pop_pending: bool,
    pub(super) self_close_pending: bool,
    pub(super) pending_pops: usize,
    pub(super) root_seen: bool,

    pub(super) warnings: Vec<Warning>,
    pub(super) xml_prefix: NameId,
    pub(super) xmlns_prefix: NameId,
}

impl<'a> PullParser<'a> {
    /// Parse a complete document held in memory
    pub fn new(input: &'a [u8], options: ParserOptions) -> Self {
        Self::with_scanner(Scanner::new(input), options)
    }

    /// Parse from a reader, pulling input as needed
    pub fn from_reader<R: Read + Send + 'a>(reader: R, options: ParserOptions) -> Self {
        Self::with_scanner(Scanner::from_reader(reader), options)
    }

    fn with_scanner(scanner: Scanner<'a>, options: ParserOptions) -> Self {
        let mut strings = StringPool::new();
        let xml_prefix = strings.intern("xml");
        let xmlns_prefix = strings.intern("xmlns");
        PullParser {
            scanner,
            options,
            state: ParseState::Running,
            strings,
            namespaces: NamespaceStack::new(),
            elements: Vec::with_capacity(16),
            token: None,
            target: NameId::EMPTY,
            text: String::new(),
            raw: Vec::new(),
            cdata: false,
            pop_pending: false,
            self_close_pending: false,
            pending_pops: 0,
            root_seen: false,
            warnings: Vec::new(),
            xml_prefix,
            xmlns_prefix,
        }
    }

    /// Advance to the next token
    pub fn read(&mut self) -> Token {
        let token = match self.advance() {
            Ok(token) => token,
            Err(err) => self.fail(err),
        };
        self.token = Some(token);
        token
    }

    fn advance(&mut self) -> Result<Token, XmlError> {
        match self.state {
            ParseState::Failed(_) => return Ok(Token::Error),
            ParseState::Finished => return Ok(Token::Eof),
            ParseState::Running => {}
        }
        if self.token.is_none() && self.scanner.has_string(UTF8_BOM) {
            self.scanner.skip_chars(UTF8_BOM.len());
        }

        self.text.clear();
        self.raw.clear();
        self.cdata = false;
        self.target = NameId::EMPTY;

        if self.pop_pending {
            self.pop_pending = false;
            self.pop_element();
        }
        if self.self_close_pending {
            self.self_close_pending = false;
            self.pop_pending = true;
            return Ok(Token::EndElement);
        }
        if self.pending_pops > 0 {
            self.pending_pops -= 1;
            self.pop_pending = true;
            return Ok(Token::EndElement);
        }

        loop {
            if let Some(token) = self.next_token()? {
                return Ok(token);
            }
        }
    }

    fn next_token(&mut self) -> Step {
        // Rewinds never reach back past the start of the current token
        self.scanner.commit();
        let Some(b) = self.peek()? else {
            return self.end_of_input();
        };
        if b != b'<' {
            return self.parse_text();
        }
        let next = self.peek_at(1)?;
        if self.in_raw_text() && next != Some(b'/') {
            return self.parse_text();
        }
        match next {
            Some(b'?') => self.parse_processing_instruction(),
            Some(b'!') => self.parse_declaration(),
            Some(b'/') => self.parse_end_tag(),
            _ => self.parse_start_tag(),
        }
    }

    fn end_of_input(&mut self) -> Step {
        if !self.elements.is_empty() {
            if !self.options.is_lenient() {
                return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
            }
            self.warn(ErrorKind::UnexpectedEndOfFile);
            self.pending_pops = self.elements.len() - 1;
            self.pop_pending = true;
            return Ok(Some(Token::EndElement));
        }
        if !self.root_seen && !self.options.is_lenient() {
            return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
        }
        self.state = ParseState::Finished;
        Ok(Some(Token::Eof))
    }

    // ---- error policy ----

    fn fail(&mut self, err: XmlError) -> Token {
        log::debug!("parse failed: {}", err);
        self.state = ParseState::Failed(err);
        Token::Error
    }

    fn fail_with(&mut self, kind: ErrorKind) -> XmlError {
        let err = self.fatal(kind);
        self.fail(err);
        err
    }

    /// The sticky error, or a synthesized end-of-input error
    fn current_error(&self) -> XmlError {
        match self.state {
            ParseState::Failed(err) => err,
            _ => self.fatal(ErrorKind::UnexpectedEndOfFile),
        }
    }

    pub(super) fn fatal(&self, kind: ErrorKind) -> XmlError {
        XmlError::new(kind, self.scanner.location())
    }

    pub(super) fn warn(&mut self, kind: ErrorKind) {
        let warning = XmlError::new(kind, self.scanner.location());
        log::warn!("{}: {}", warning.location, kind);
        self.warnings.push(warning);
    }

    /// Fatal in strict mode, a warning otherwise
    pub(super) fn recoverable(&mut self, kind: ErrorKind) -> Result<(), XmlError> {
        if self.options.is_strict() {
            Err(self.fatal(kind))
        } else {
            self.warn(kind);
            Ok(())
        }
    }

    /// Whether tag-level sloppiness is tolerated
    #[inline]
    pub(super) fn tolerant(&self) -> bool {
        !self.options.is_strict() && (self.options.html || self.options.is_lenient())
    }

    // ---- input helpers ----

    #[inline]
    pub(super) fn peek(&mut self) -> Result<Option<u8>, XmlError> {
        self.peek_at(0)
    }

    pub(super) fn peek_at(&mut self, offset: usize) -> Result<Option<u8>, XmlError> {
        match self.scanner.peek_char(offset) {
            Peeked::Byte(b) => Ok(Some(b)),
            Peeked::Eof => Ok(None),
            Peeked::ReadError => Err(self.fatal(ErrorKind::ReadFailed)),
        }
    }

    /// Consume a line break, folding `\r\n` and `\n\r` pairs into one `\n`
    pub(super) fn push_newline(&mut self, b: u8) -> Result<(), XmlError> {
        self.scanner.skip_char();
        let pair = if b == b'\r' { b'\n' } else { b'\r' };
        if self.peek()? == Some(pair) {
            self.scanner.skip_char();
        }
        self.raw.push(b'\n');
        Ok(())
    }

    /// Decode the reference at the cursor into `raw`, applying recovery
    pub(super) fn decode_reference(&mut self) -> Result<(), XmlError> {
        let table = self.options.entity_table();
        match entities::scan_reference(&mut self.scanner, table, &mut self.raw) {
            Ok(()) => Ok(()),
            Err(ErrorKind::InvalidCharacter) => {
                self.recoverable(ErrorKind::InvalidCharacter)?;
                self.raw.extend_from_slice("\u{FFFD}".as_bytes());
                Ok(())
            }
            Err(kind) => {
                self.recoverable(kind)?;
                self.scanner.skip_char();
                self.raw.push(b'&');
                Ok(())
            }
        }
    }

    /// Move `raw` into `text` as UTF-8
    fn take_raw_text(&mut self) -> Result<(), XmlError> {
        if std::str::from_utf8(&self.raw).is_err() {
            self.recoverable(ErrorKind::InvalidCharacter)?;
        }
        self.text.push_str(&String::from_utf8_lossy(&self.raw));
        self.raw.clear();
        Ok(())
    }

    // ---- text ----

    pub(super) fn in_raw_text(&self) -> bool {
        self.elements.last().is_some_and(|e| e.is_raw_text)
    }

    fn parse_text(&mut self) -> Step {
        self.scan_content()?;
        self.finish_text()
    }

    /// A `<` that does not start markup; keep it as text
    pub(super) fn literal_less_than(&mut self) -> Step {
        self.scanner.skip_char();
        self.raw.push(b'<');
        self.scan_content()?;
        self.finish_text()
    }

    fn scan_content(&mut self) -> Result<(), XmlError> {
        if self.in_raw_text() {
            self.scan_raw_text()
        } else {
            self.scan_text()
        }
    }

    fn finish_text(&mut self) -> Step {
        self.take_raw_text()?;
        if self.elements.is_empty() {
            if self.text.bytes().all(is_whitespace) {
                self.discard_text();
                return Ok(None);
            }
            self.recoverable(ErrorKind::TextOutsideElement)?;
        }
        if self.text.is_empty() && !self.cdata {
            self.discard_text();
            return Ok(None);
        }
        Ok(Some(Token::Text))
    }

    /// Forget text that produced no token
    fn discard_text(&mut self) {
        self.text.clear();
        self.cdata = false;
    }

    fn scan_text(&mut self) -> Result<(), XmlError> {
        while let Some(b) = self.peek()? {
            match b {
                b'<' => break,
                b'&' => self.decode_reference()?,
                b'\r' | b'\n' => self.push_newline(b)?,
                b']' if self.scanner.has_string(b"]]>") => {
                    self.recoverable(ErrorKind::CDATATerminatorInText)?;
                    self.scanner.skip_chars(3);
                    self.raw.extend_from_slice(b"]]>");
                }
                _ => {
                    let available = self.scanner.available();
                    let run = available
                        .iter()
                        .position(|&c| matches!(c, b'<' | b'&' | b'\r' | b'\n' | b']'))
                        .unwrap_or(available.len())
                        .max(1);
                    self.raw.extend_from_slice(&available[..run]);
                    self.scanner.skip_chars(run);
                }
            }
        }
        Ok(())
    }

    /// Content of `script`/`style`: no references, no markup, and `</` only
    /// ends it outside string literals and comments (or when it is the
    /// element's own end tag)
    fn scan_raw_text(&mut self) -> Result<(), XmlError> {
        let end_name = match self.elements.last() {
            Some(e) => self.strings.get(e.name).as_bytes().to_vec(),
            None => return Ok(()),
        };
        let mut quote: Option<u8> = None;
        let mut line_comment = false;
        let mut block_comment = false;

        while let Some(b) = self.peek()? {
            if b == b'<' && self.peek_at(1)? == Some(b'/') {
                let in_code = quote.is_none() && !line_comment && !block_comment;
                if in_code || self.at_closing_tag(&end_name)? {
                    break;
                }
            }
            if b == b'\r' || b == b'\n' {
                self.push_newline(b)?;
                line_comment = false;
                if quote != Some(b'`') {
                    quote = None;
                }
                continue;
            }
            self.scanner.skip_char();
            self.raw.push(b);
            match quote {
                Some(_) if b == b'\\' => {
                    if let Some(next) = self.peek()? {
                        if next != b'\r' && next != b'\n' {
                            self.scanner.skip_char();
                            self.raw.push(next);
                        }
                    }
                }
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None if line_comment => {}
                None if block_comment => {
                    if b == b'*' && self.peek()? == Some(b'/') {
                        self.scanner.skip_char();
                        self.raw.push(b'/');
                        block_comment = false;
                    }
                }
                None => match b {
                    b'"' | b'\'' | b'`' => quote = Some(b),
                    b'/' => match self.peek()? {
                        Some(b'/') => {
                            self.scanner.skip_char();
                            self.raw.push(b'/');
                            line_comment = true;
                        }
                        Some(b'*') => {
                            self.scanner.skip_char();
                            self.raw.push(b'*');
                            block_comment = true;
                        }
                        _ => {}
                    },
                    _ => {}
                },
            }
        }
        Ok(())
    }

    /// `</name` followed by a delimiter, at the cursor
    fn at_closing_tag(&mut self, name: &[u8]) -> Result<bool, XmlError> {
        if !self.scanner.has_string_at(2, name, true) {
            return Ok(false);
        }
        Ok(match self.peek_at(2 + name.len())? {
            None => true,
            Some(b) => is_whitespace(b) || b == b'>' || b == b'/',
        })
    }

    // ---- declarations ----

    fn parse_processing_instruction(&mut self) -> Step {
        match self.peek_at(2)? {
            None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
            Some(b) if !is_name_start_char(b) => {
                self.recoverable(ErrorKind::IllegalName)?;
                return self.literal_less_than();
            }
            Some(_) => {}
        }
        self.scanner.skip_chars(2);
        let Some(range) = self.scanner.read_name() else {
            return Err(self.fatal(ErrorKind::IllegalName));
        };
        self.target = self.strings.intern_bytes(self.scanner.slice(range));
        self.scanner.skip_whitespace();
        let Some(end) = self.scanner.find(b"?>") else {
            return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
        };
        let start = self.scanner.position();
        self.raw.extend_from_slice(self.scanner.slice(start..end));
        self.scanner.set_position(end + 2);
        self.take_raw_text()?;
        Ok(Some(Token::ProcessingInstruction))
    }

    fn parse_declaration(&mut self) -> Step {
        if self.scanner.has_string(b"<!--") {
            return self.parse_comment();
        }
        if self.scanner.has_string(b"<![CDATA[") {
            return self.parse_cdata();
        }
        let doctype = if self.options.html {
            self.scanner.has_string_ignore_case(b"<!DOCTYPE")
        } else {
            self.scanner.has_string(b"<!DOCTYPE")
        };
        if doctype {
            return self.parse_doctype();
        }
        self.recoverable(ErrorKind::InvalidDocType)?;
        match self.scanner.find(b">") {
            Some(end) => {
                self.scanner.set_position(end + 1);
                Ok(None)
            }
            None => Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
        }
    }

    fn parse_comment(&mut self) -> Step {
        self.scanner.skip_chars(4);
        let start = self.scanner.position();
        let Some(end) = self.scanner.find(b"-->") else {
            return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
        };
        let body = self.scanner.slice(start..end);
        let double_dash = memchr::memmem::find(body, b"--").is_some() || body.ends_with(b"-");
        self.raw.extend_from_slice(body);
        self.scanner.set_position(end + 3);
        if double_dash {
            self.recoverable(ErrorKind::IncorrectlyTerminatedComment)?;
        }
        self.take_raw_text()?;
        Ok(Some(Token::Comment))
    }

    fn parse_cdata(&mut self) -> Step {
        self.scanner.skip_chars(9);
        let start = self.scanner.position();
        let Some(end) = self.scanner.find(b"]]>") else {
            return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
        };
        self.raw.extend_from_slice(self.scanner.slice(start..end));
        self.scanner.set_position(end + 3);
        self.cdata = true;
        self.finish_text()
    }

    fn parse_doctype(&mut self) -> Step {
        self.scanner.skip_chars(9);
        if self.root_seen {
            self.recoverable(ErrorKind::InvalidDocType)?;
        }
        self.scanner.skip_whitespace();

        let mut quote: Option<u8> = None;
        let mut subset_depth = 0usize;
        loop {
            let Some(b) = self.peek()? else {
                return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
            };
            self.scanner.skip_char();
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'[' => subset_depth += 1,
                    b']' => subset_depth = subset_depth.saturating_sub(1),
                    b'>' if subset_depth == 0 => break,
                    _ => {}
                },
            }
            self.raw.push(b);
        }
        while self.raw.last().is_some_and(|&b| is_whitespace(b)) {
            self.raw.pop();
        }
        self.take_raw_text()?;
        Ok(Some(Token::DocType))
    }

    // ---- element stack ----

    /// Pop the innermost frame along with the namespaces it declared
    pub(super) fn pop_element(&mut self) {
        if self.elements.pop().is_some() {
            self.namespaces.unwind(self.elements.len() + 1);
        }
    }

    /// Compare an interned name with `name`, honoring case-insensitivity
    pub(super) fn name_matches(&self, id: NameId, name: &str) -> bool {
        let interned = self.strings.get(id);
        interned == name || (self.options.case_insensitive && interned.eq_ignore_ascii_case(name))
    }

    fn str_matches(&self, a: &str, b: &str) -> bool {
        a == b || (self.options.case_insensitive && a.eq_ignore_ascii_case(b))
    }

    // ---- accessors ----

    /// Token returned by the last `read()`
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    fn current_element(&self) -> Option<&Element> {
        match self.token {
            Some(Token::StartElement | Token::EndElement) => self.elements.last(),
            _ => None,
        }
    }

    fn start_element(&self) -> Option<&Element> {
        match self.token {
            Some(Token::StartElement) => self.elements.last(),
            _ => None,
        }
    }

    /// Qualified element name, or the target of a processing instruction
    pub fn name(&self) -> &str {
        match self.token {
            Some(Token::ProcessingInstruction) => self.strings.get(self.target),
            _ => self.current_element().map_or("", |e| self.strings.get(e.name)),
        }
    }

    pub fn local_name(&self) -> &str {
        match self.token {
            Some(Token::ProcessingInstruction) => self.strings.get(self.target),
            _ => self
                .current_element()
                .map_or("", |e| self.strings.get(e.local_name)),
        }
    }

    /// Namespace URI of the current element
    pub fn namespace(&self) -> Option<&str> {
        self.current_element()?
            .namespace
            .map(|ns| self.strings.get(ns))
    }

    /// Text of a Text, Comment or DocType token; data of a processing
    /// instruction
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// The current Text token came from a CDATA section
    pub fn is_cdata(&self) -> bool {
        self.cdata
    }

    pub fn is_whitespace(&self) -> bool {
        self.token == Some(Token::Text) && self.text.bytes().all(is_whitespace)
    }

    pub fn attribute_count(&self) -> usize {
        self.start_element().map_or(0, |e| e.attributes().len())
    }

    pub fn attribute(&self, index: usize) -> Option<AttributeRef<'_>> {
        let element = self.start_element()?;
        let attr = element.attributes().get(index)?;
        Some(self.attribute_ref(element, attr))
    }

    /// Attributes of the current start tag, in document order
    pub fn attributes(&self) -> impl Iterator<Item = AttributeRef<'_>> + '_ {
        self.start_element().into_iter().flat_map(move |element| {
            element
                .attributes()
                .iter()
                .map(move |attr| self.attribute_ref(element, attr))
        })
    }

    fn attribute_ref<'p>(&'p self, element: &'p Element, attr: &Attribute) -> AttributeRef<'p> {
        AttributeRef {
            name: self.strings.get(attr.name),
            local_name: self.strings.get(attr.local_name),
            namespace: attr.namespace.map(|ns| self.strings.get(ns)),
            value: element.value(attr),
        }
    }

    /// Value of the first attribute with this local name
    pub fn attribute_value(&self, local_name: &str) -> Option<&str> {
        self.attributes()
            .find(|a| self.str_matches(a.local_name, local_name))
            .map(|a| a.value)
    }

    /// Value of the attribute with this local name and namespace
    pub fn attribute_value_ns(&self, local_name: &str, namespace: Option<&str>) -> Option<&str> {
        self.attributes()
            .find(|a| a.namespace == namespace && self.str_matches(a.local_name, local_name))
            .map(|a| a.value)
    }

    /// URI currently bound to `prefix` (`""` for the default namespace)
    pub fn find_namespace(&self, prefix: &str) -> Option<&str> {
        let prefix = self.strings.lookup(prefix)?;
        self.namespaces
            .resolve(prefix)
            .map(|uri| self.strings.get(uri))
    }

    /// Number of open elements
    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// The error that stopped the parser
    pub fn error(&self) -> Option<&XmlError> {
        match &self.state {
            ParseState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Recoverable conditions seen so far
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Position of the cursor
    pub fn location(&self) -> Location {
        self.scanner.location()
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    // ---- convenience wrappers ----

    /// `read()` without processing instructions, comments and doctypes
    pub fn next(&mut self) -> Token {
        loop {
            match self.read() {
                Token::ProcessingInstruction | Token::Comment | Token::DocType => continue,
                token => return token,
            }
        }
    }

    /// From a `StartElement`, consume everything through its `EndElement`
    pub fn skip_element(&mut self) -> Result<(), XmlError> {
        if self.token != Some(Token::StartElement) {
            return Ok(());
        }
        let mut depth = 1usize;
        loop {
            match self.read() {
                Token::StartElement => depth += 1,
                Token::EndElement => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Token::Error => return Err(self.current_error()),
                Token::Eof => return Err(self.fail_with(ErrorKind::UnexpectedEndOfFile)),
                _ => {}
            }
        }
    }

    /// From a `StartElement`, require that it has no content
    pub fn skip_empty_element(&mut self) -> Result<(), XmlError> {
        loop {
            match self.read() {
                Token::EndElement => return Ok(()),
                Token::Comment | Token::ProcessingInstruction => {}
                Token::Text if self.is_whitespace() => {}
                Token::Error => return Err(self.current_error()),
                _ => return Err(self.fail_with(ErrorKind::ExpectedEmptyElement)),
            }
        }
    }

    /// From a `StartElement`, collect its text content through the `EndElement`
    pub fn read_whole_text(&mut self) -> Result<String, XmlError> {
        let mut content = String::new();
        loop {
            match self.read() {
                Token::Text => content.push_str(&self.text),
                Token::Comment | Token::ProcessingInstruction => {}
                Token::EndElement => return Ok(content),
                Token::Error => return Err(self.current_error()),
                _ => return Err(self.fail_with(ErrorKind::ExpectedText)),
            }
        }
    }

    pub fn read_whole_text_trimmed(&mut self) -> Result<String, XmlError> {
        let content = self.read_whole_text()?;
        Ok(content
            .trim_matches(|c: char| c.is_ascii() && is_whitespace(c as u8))
            .to_owned())
    }
}

impl PullParser<'static> {
    /// Parse a document the parser takes ownership of
    pub fn from_vec(input: Vec<u8>, options: ParserOptions) -> Self {
        Self::with_scanner(Scanner::from_vec(input), options)
    }
}
