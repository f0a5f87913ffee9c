//! Start and end tags
//!
//! Attribute parsing, namespace declaration and resolution, the empty
//! element check, HTML structural repair and end-tag matching.

use super::events::{split_name, Token};
use super::html;
use super::pull::{PullParser, Step};
use crate::core::error::{ErrorKind, XmlError};
use crate::core::scanner::{is_name_start_char, is_whitespace};
use crate::dom::element::Element;
use crate::dom::strings::NameId;

impl PullParser<'_> {
    pub(super) fn parse_start_tag(&mut self) -> Step {
        match self.peek_at(1)? {
            None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
            Some(b) if is_whitespace(b) => {
                self.recoverable(ErrorKind::UnexpectedWhitespace)?;
                return self.literal_less_than();
            }
            Some(b) if !is_name_start_char(b) => {
                self.recoverable(ErrorKind::IllegalName)?;
                return self.literal_less_than();
            }
            Some(_) => {}
        }

        let tag_start = self.scanner.position();
        self.scanner.skip_char();
        let Some(range) = self.scanner.read_name() else {
            return Err(self.fatal(ErrorKind::IllegalName));
        };
        let name = self.strings.intern_bytes(self.scanner.slice(range));

        if self.options.html {
            let (_, local) = split_name(self.strings.get(name));
            if !html::can_element_be_here(&self.elements, &self.strings, local) {
                // Close the innermost element; the tag is parsed again next call
                self.scanner.set_position(tag_start);
                self.pop_pending = true;
                return Ok(Some(Token::EndElement));
            }
        }

        if self.elements.is_empty() && self.root_seen {
            if self.tolerant() {
                self.warn(ErrorKind::MultipleTopLevelElements);
            } else {
                return Err(self.fatal(ErrorKind::MultipleTopLevelElements));
            }
        }

        let mut element = Element::new(name);
        let self_closing = self.parse_attributes(&mut element)?;
        self.elements.push(element);
        self.root_seen = true;

        self.declare_namespaces();
        self.resolve_names()?;
        self.check_duplicate_attributes()?;

        let (forced_empty, raw_text) = match self.elements.last() {
            Some(element) => {
                let local = self.strings.get(element.local_name);
                let namespace = element.namespace.map(|ns| self.strings.get(ns));
                let forced = self.is_empty_element(local, namespace);
                let raw = self.options.html
                    && !self_closing
                    && !forced
                    && html::is_raw_text_element(local, namespace);
                (forced, raw)
            }
            None => (false, false),
        };
        if let Some(element) = self.elements.last_mut() {
            element.is_raw_text = raw_text;
        }
        if self_closing || forced_empty {
            self.self_close_pending = true;
        }
        Ok(Some(Token::StartElement))
    }

    /// Parse attributes up to `>` or `/>`; returns true for `/>`
    fn parse_attributes(&mut self, element: &mut Element) -> Result<bool, XmlError> {
        loop {
            self.scanner.skip_whitespace();
            match self.peek()? {
                None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
                Some(b'>') => {
                    self.scanner.skip_char();
                    return Ok(false);
                }
                Some(b'/') if self.peek_at(1)? == Some(b'>') => {
                    self.scanner.skip_chars(2);
                    return Ok(true);
                }
                Some(b) if is_name_start_char(b) => self.parse_attribute(element)?,
                Some(_) => self.skip_stray_byte()?,
            }
        }
    }

    fn skip_stray_byte(&mut self) -> Result<(), XmlError> {
        if !self.tolerant() {
            return Err(self.fatal(ErrorKind::ExpectedRightAngleBracket));
        }
        self.warn(ErrorKind::ExpectedRightAngleBracket);
        self.scanner.skip_char();
        Ok(())
    }

    fn parse_attribute(&mut self, element: &mut Element) -> Result<(), XmlError> {
        let Some(range) = self.scanner.read_name() else {
            return Err(self.fatal(ErrorKind::IllegalName));
        };
        let name = self.strings.intern_bytes(self.scanner.slice(range));
        self.scanner.skip_whitespace();

        if self.peek()? != Some(b'=') {
            if self.options.html {
                element.push_attribute(name, "");
                return Ok(());
            }
            return Err(self.fatal(ErrorKind::ExpectedEquals));
        }
        self.scanner.skip_char();
        self.scanner.skip_whitespace();

        self.raw.clear();
        match self.peek()? {
            None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
            Some(b'"') => self.scan_quoted_value(b'"')?,
            Some(b'\'') => {
                if self.options.is_strict() {
                    return Err(self.fatal(ErrorKind::ExpectedQuote));
                }
                self.scan_quoted_value(b'\'')?;
            }
            Some(_) if self.options.html || self.options.is_lenient() => {
                self.scan_unquoted_value()?
            }
            Some(_) => return Err(self.fatal(ErrorKind::ExpectedQuote)),
        }

        if std::str::from_utf8(&self.raw).is_err() {
            self.recoverable(ErrorKind::InvalidCharacter)?;
        }
        element.push_attribute(name, &String::from_utf8_lossy(&self.raw));
        self.raw.clear();
        Ok(())
    }

    fn scan_quoted_value(&mut self, quote: u8) -> Result<(), XmlError> {
        self.scanner.skip_char();
        loop {
            match self.peek()? {
                None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
                Some(b) if b == quote => {
                    self.scanner.skip_char();
                    return Ok(());
                }
                Some(b'&') => self.decode_reference()?,
                Some(b'<') => {
                    self.recoverable(ErrorKind::InvalidAttributeValue)?;
                    self.scanner.skip_char();
                    self.raw.push(b'<');
                }
                Some(b @ (b'\r' | b'\n')) => self.push_newline(b)?,
                Some(b) => {
                    self.scanner.skip_char();
                    self.raw.push(b);
                }
            }
        }
    }

    fn scan_unquoted_value(&mut self) -> Result<(), XmlError> {
        loop {
            match self.peek()? {
                None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
                Some(b) if is_whitespace(b) || b == b'>' => return Ok(()),
                Some(b'&') => self.decode_reference()?,
                Some(b) => {
                    self.scanner.skip_char();
                    self.raw.push(b);
                }
            }
        }
    }

    /// Push the `xmlns` / `xmlns:p` bindings of the innermost element
    fn declare_namespaces(&mut self) {
        let depth = self.elements.len();
        let Some(element) = self.elements.last() else {
            return;
        };
        let mut declarations: Vec<(String, String)> = Vec::new();
        for attr in element.attributes() {
            let name = self.strings.get(attr.name);
            let prefix = if name == "xmlns" {
                ""
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                prefix
            } else {
                continue;
            };
            declarations.push((prefix.to_owned(), element.value(attr).to_owned()));
        }
        for (prefix, uri) in declarations {
            let prefix = self.strings.intern(&prefix);
            let uri = self.strings.intern(&uri);
            self.namespaces.declare(prefix, uri, depth);
        }
    }

    /// Fill in local names and namespaces of the innermost element and its
    /// attributes
    fn resolve_names(&mut self) -> Result<(), XmlError> {
        let Some(element) = self.elements.last() else {
            return Ok(());
        };
        let name = element.name;
        let attr_names: Vec<NameId> = element.attributes().iter().map(|a| a.name).collect();

        let (namespace, local_name) = self.determine_namespace_and_local_name(name)?;
        let mut resolved = Vec::with_capacity(attr_names.len());
        for attr in attr_names {
            resolved.push(self.determine_namespace_and_local_name(attr)?);
        }

        if let Some(element) = self.elements.last_mut() {
            element.namespace = namespace;
            element.local_name = local_name;
            for (attr, (namespace, local_name)) in element.attributes_mut().iter_mut().zip(resolved) {
                attr.namespace = namespace;
                attr.local_name = local_name;
            }
        }
        Ok(())
    }

    /// Split `prefix:local` on the first colon and resolve the prefix;
    /// unprefixed names take the default namespace
    pub(super) fn determine_namespace_and_local_name(
        &mut self,
        name: NameId,
    ) -> Result<(Option<NameId>, NameId), XmlError> {
        if name == self.xmlns_prefix {
            return Ok((None, name));
        }
        let (prefix, local) = match split_name(self.strings.get(name)) {
            (Some(prefix), local) => (prefix.to_owned(), local.to_owned()),
            (None, _) => return Ok((self.namespaces.resolve(NameId::EMPTY), name)),
        };
        let prefix = self.strings.intern(&prefix);
        let local = self.strings.intern(&local);
        Ok((self.find_namespace_id(prefix)?, local))
    }

    fn find_namespace_id(&mut self, prefix: NameId) -> Result<Option<NameId>, XmlError> {
        if let Some(uri) = self.namespaces.resolve(prefix) {
            return Ok(Some(uri));
        }
        if prefix == self.xml_prefix || prefix == self.xmlns_prefix {
            return Ok(None);
        }
        self.recoverable(ErrorKind::UnknownNamespace)?;
        Ok(None)
    }

    fn check_duplicate_attributes(&mut self) -> Result<(), XmlError> {
        let Some(element) = self.elements.last() else {
            return Ok(());
        };
        let attrs = element.attributes();
        let ignore_case = self.options.case_insensitive;
        let mut duplicates = 0;
        for (i, a) in attrs.iter().enumerate() {
            for b in &attrs[i + 1..] {
                if a.namespace == b.namespace
                    && self.strings.names_equal(a.local_name, b.local_name, ignore_case)
                {
                    duplicates += 1;
                }
            }
        }
        for _ in 0..duplicates {
            self.recoverable(ErrorKind::DuplicateAttribute)?;
        }
        Ok(())
    }

    fn is_empty_element(&self, local_name: &str, namespace: Option<&str>) -> bool {
        self.options
            .empty_elements
            .contains(local_name, namespace, self.options.case_insensitive)
            || (self.options.html && html::is_void_element(local_name, namespace))
    }

    pub(super) fn parse_end_tag(&mut self) -> Step {
        match self.peek_at(2)? {
            None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
            Some(b) if is_whitespace(b) => {
                self.recoverable(ErrorKind::UnexpectedWhitespace)?;
                return self.literal_less_than();
            }
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
        let name = String::from_utf8_lossy(self.scanner.slice(range)).into_owned();
        self.scanner.skip_whitespace();
        match self.peek()? {
            Some(b'>') => self.scanner.skip_char(),
            None => return Err(self.fatal(ErrorKind::UnexpectedEndOfFile)),
            Some(_) => {
                if !self.tolerant() {
                    return Err(self.fatal(ErrorKind::ExpectedRightAngleBracket));
                }
                self.warn(ErrorKind::ExpectedRightAngleBracket);
                let Some(end) = self.scanner.find(b">") else {
                    return Err(self.fatal(ErrorKind::UnexpectedEndOfFile));
                };
                self.scanner.set_position(end + 1);
            }
        }

        let Some(top) = self.elements.last() else {
            self.recoverable(ErrorKind::UnexpectedEndElement)?;
            return Ok(None);
        };
        if self.name_matches(top.name, &name) {
            self.pop_pending = true;
            return Ok(Some(Token::EndElement));
        }

        self.recoverable(ErrorKind::MismatchedEndElement)?;
        match self
            .elements
            .iter()
            .rposition(|e| self.name_matches(e.name, &name))
        {
            Some(i) => {
                self.pending_pops = self.elements.len() - i - 1;
                self.pop_pending = true;
                Ok(Some(Token::EndElement))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::error::ErrorKind;
    use crate::reader::options::ParserOptions;
    use crate::reader::pull::tests::trace;
    use crate::reader::{PullParser, Token};

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn warning_kinds(parser: &PullParser<'_>) -> Vec<ErrorKind> {
        parser.warnings().iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_attribute_accessors() {
        let mut parser = PullParser::new(
            br#"<a href="/x?a=1&amp;b=2" title='t'/>"#,
            ParserOptions::default(),
        );
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.attribute_count(), 2);
        let first = parser.attribute(0).unwrap();
        assert_eq!(first.name, "href");
        assert_eq!(first.value, "/x?a=1&b=2");
        assert_eq!(parser.attribute_value("title"), Some("t"));
        assert_eq!(parser.attribute_value("missing"), None);
        assert!(parser.attribute(2).is_none());

        assert_eq!(parser.read(), Token::EndElement);
        assert_eq!(parser.attribute_count(), 0);
    }

    #[test]
    fn test_namespace_scoping() {
        let mut parser = PullParser::new(
            br#"<a xmlns:p="NS1"><b xmlns:p="NS2"/></a>"#,
            ParserOptions::default(),
        );
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.find_namespace("p"), Some("NS1"));
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.find_namespace("p"), Some("NS2"));
        assert_eq!(parser.read(), Token::EndElement);
        assert_eq!(parser.name(), "b");
        assert_eq!(parser.read(), Token::EndElement);
        assert_eq!(parser.name(), "a");
        assert_eq!(parser.find_namespace("p"), Some("NS1"));
        assert_eq!(parser.read(), Token::Eof);
        assert_eq!(parser.find_namespace("p"), None);
    }

    #[test]
    fn test_element_and_attribute_namespaces() {
        let mut parser = PullParser::new(
            br#"<r xmlns="urn:d" xmlns:p="urn:p" a="1" p:b="2"><p:c/></r>"#,
            ParserOptions::default(),
        );
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.namespace(), Some("urn:d"));
        assert_eq!(parser.local_name(), "r");
        assert_eq!(parser.attribute_value_ns("a", Some("urn:d")), Some("1"));
        assert_eq!(parser.attribute_value_ns("b", Some("urn:p")), Some("2"));
        assert_eq!(parser.attribute_value_ns("b", None), None);
        assert_eq!(parser.attribute_value("b"), Some("2"));

        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.name(), "p:c");
        assert_eq!(parser.local_name(), "c");
        assert_eq!(parser.namespace(), Some("urn:p"));
        assert!(parser.warnings().is_empty());
    }

    #[test]
    fn test_xml_prefix_is_silent() {
        let mut parser = PullParser::new(br#"<a xml:lang="en"/>"#, ParserOptions::strict());
        assert_eq!(parser.read(), Token::StartElement);
        let lang = parser.attribute(0).unwrap();
        assert_eq!(lang.local_name, "lang");
        assert_eq!(lang.namespace, None);
        assert!(parser.warnings().is_empty());
    }

    #[test]
    fn test_unknown_prefix() {
        let mut parser = PullParser::new(b"<p:a/>", ParserOptions::default());
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.local_name(), "a");
        assert_eq!(parser.namespace(), None);
        assert_eq!(warning_kinds(&parser), [ErrorKind::UnknownNamespace]);

        assert_eq!(
            trace("<p:a/>", ParserOptions::strict()),
            strs(&["error:Some(UnknownNamespace)"])
        );
    }

    #[test]
    fn test_duplicate_attributes() {
        let mut parser = PullParser::new(br#"<a x="1" x="2"/>"#, ParserOptions::default());
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.attribute_count(), 2);
        assert_eq!(warning_kinds(&parser), [ErrorKind::DuplicateAttribute]);

        let mut lenient = PullParser::new(br#"<a x="1" x="2"/>"#, ParserOptions::lenient());
        assert_eq!(lenient.read(), Token::StartElement);

        assert_eq!(
            trace(r#"<a x="1" x="2"/>"#, ParserOptions::strict()),
            strs(&["error:Some(DuplicateAttribute)"])
        );
    }

    #[test]
    fn test_quote_styles() {
        assert_eq!(
            trace("<a x='1'></a>", ParserOptions::default()),
            strs(&["start:a", "end:a", "eof"])
        );
        assert_eq!(
            trace("<a x='1'></a>", ParserOptions::strict()),
            strs(&["error:Some(ExpectedQuote)"])
        );
        assert_eq!(
            trace("<a x=1></a>", ParserOptions::default()),
            strs(&["error:Some(ExpectedQuote)"])
        );

        let mut parser = PullParser::new(b"<a x=1 y=two></a>", ParserOptions::lenient());
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.attribute_value("x"), Some("1"));
        assert_eq!(parser.attribute_value("y"), Some("two"));
    }

    #[test]
    fn test_missing_equals() {
        assert_eq!(
            trace("<a x></a>", ParserOptions::default()),
            strs(&["error:Some(ExpectedEquals)"])
        );
    }

    #[test]
    fn test_less_than_in_attribute_value() {
        let mut parser = PullParser::new(br#"<a x="1<2"/>"#, ParserOptions::default());
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.attribute_value("x"), Some("1<2"));
        assert_eq!(warning_kinds(&parser), [ErrorKind::InvalidAttributeValue]);
    }

    #[test]
    fn test_whitespace_after_less_than() {
        assert_eq!(
            trace("<r>< a</r>", ParserOptions::default()),
            strs(&["start:r", "text:< a", "end:r", "eof"])
        );
        assert_eq!(
            trace("<r>< a</r>", ParserOptions::strict()),
            strs(&["start:r", "error:Some(UnexpectedWhitespace)"])
        );
    }

    #[test]
    fn test_mismatched_end_tag() {
        assert_eq!(
            trace("<a><b></a>", ParserOptions::lenient()),
            strs(&["start:a", "start:b", "end:b", "end:a", "eof"])
        );
        assert_eq!(
            trace("<a><b></a>", ParserOptions::strict()),
            strs(&["start:a", "start:b", "error:Some(MismatchedEndElement)"])
        );
    }

    #[test]
    fn test_mismatch_closes_several_elements() {
        assert_eq!(
            trace("<a><b><c></a>", ParserOptions::lenient()),
            strs(&["start:a", "start:b", "start:c", "end:c", "end:b", "end:a", "eof"])
        );
        let mut parser = PullParser::new(b"<a><b><c></a>", ParserOptions::lenient());
        while !parser.read().is_terminal() {}
        assert_eq!(parser.token(), Some(Token::Eof));
        assert_eq!(warning_kinds(&parser), [ErrorKind::MismatchedEndElement]);
    }

    #[test]
    fn test_unmatched_end_tags_are_suppressed() {
        assert_eq!(
            trace("<a></b></a>", ParserOptions::default()),
            strs(&["start:a", "end:a", "eof"])
        );
        let mut parser = PullParser::new(b"<a/></a>", ParserOptions::default());
        while !parser.read().is_terminal() {}
        assert_eq!(parser.token(), Some(Token::Eof));
        assert_eq!(warning_kinds(&parser), [ErrorKind::UnexpectedEndElement]);
    }

    #[test]
    fn test_case_insensitive_names() {
        assert_eq!(
            trace("<A></a>", ParserOptions::default()),
            strs(&["start:A", "error:Some(UnexpectedEndOfFile)"])
        );
        assert_eq!(
            trace("<A></a>", ParserOptions::default().case_insensitive(true)),
            strs(&["start:A", "end:A", "eof"])
        );
    }

    #[test]
    fn test_registered_empty_element() {
        let options = ParserOptions::default().register_empty_element("marker", None);
        assert_eq!(
            trace("<r><marker>t</r>", options),
            strs(&["start:r", "start:marker", "end:marker", "text:t", "end:r", "eof"])
        );
    }

    #[test]
    fn test_html_void_elements() {
        assert_eq!(
            trace("<p>a<br>b</p>", ParserOptions::html()),
            strs(&["start:p", "text:a", "start:br", "end:br", "text:b", "end:p", "eof"])
        );
        assert_eq!(
            trace("<div><br></br></div>", ParserOptions::html()),
            strs(&["start:div", "start:br", "end:br", "end:div", "eof"])
        );
    }

    #[test]
    fn test_html_boolean_attributes() {
        let mut parser = PullParser::new(b"<input disabled value=x>", ParserOptions::html());
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.attribute_count(), 2);
        assert_eq!(parser.attribute_value("disabled"), Some(""));
        assert_eq!(parser.attribute_value("VALUE"), Some("x"));
        assert_eq!(parser.read(), Token::EndElement);
    }

    #[test]
    fn test_html_list_items_become_siblings() {
        assert_eq!(
            trace("<ul><li>one<li>two</ul>", ParserOptions::html()),
            strs(&[
                "start:ul", "start:li", "text:one", "end:li", "start:li", "text:two", "end:li",
                "end:ul", "eof"
            ])
        );
    }

    #[test]
    fn test_html_table_repair() {
        assert_eq!(
            trace("<table><tr><td>1<td>2</table>", ParserOptions::html()),
            strs(&[
                "start:table", "start:tr", "start:td", "text:1", "end:td", "start:td", "text:2",
                "end:td", "end:tr", "end:table", "eof"
            ])
        );
    }

    #[test]
    fn test_html_body_closes_head() {
        assert_eq!(
            trace(
                "<html><head><title>t</title><body>x</body></html>",
                ParserOptions::html()
            ),
            strs(&[
                "start:html", "start:head", "start:title", "text:t", "end:title", "end:head",
                "start:body", "text:x", "end:body", "end:html", "eof"
            ])
        );
    }

    #[test]
    fn test_html_raw_text() {
        assert_eq!(
            trace(
                r#"<script>if (a < b) { s = "</p>"; }</script>"#,
                ParserOptions::html()
            ),
            strs(&["start:script", r#"text:if (a < b) { s = "</p>"; }"#, "end:script", "eof"])
        );
        assert_eq!(
            trace("<style>p{}/* </b> */</STYLE>", ParserOptions::html()),
            strs(&["start:style", "text:p{}/* </b> */", "end:style", "eof"])
        );
        assert_eq!(
            trace("<script>x = '&amp;<!--'</script>", ParserOptions::html()),
            strs(&["start:script", "text:x = '&amp;<!--'", "end:script", "eof"])
        );
    }

    #[test]
    fn test_html_doctype_and_entities() {
        let mut parser = PullParser::new(b"<!doctype html><p>&nbsp;&copy;</p>", ParserOptions::html());
        assert_eq!(parser.read(), Token::DocType);
        assert_eq!(parser.text(), "html");
        assert_eq!(parser.read(), Token::StartElement);
        assert_eq!(parser.read_whole_text().unwrap(), "\u{A0}\u{A9}");
    }

    #[test]
    fn test_html_allows_multiple_top_level() {
        let mut parser = PullParser::new(b"<p>a</p><p>b</p>", ParserOptions::html().conformance(
            crate::reader::Conformance::Default,
        ));
        let mut starts = 0;
        while !parser.read().is_terminal() {
            if parser.token() == Some(Token::StartElement) {
                starts += 1;
            }
        }
        assert_eq!(starts, 2);
        assert_eq!(parser.token(), Some(Token::Eof));
        assert_eq!(warning_kinds(&parser), [ErrorKind::MultipleTopLevelElements]);
    }

    #[test]
    fn test_html_table_sections_close_each_other() {
        assert_eq!(
            trace(
                "<table><thead><tr><td>h<tbody><tr><td>1<tfoot><tr><td>f</table>",
                ParserOptions::html()
            ),
            strs(&[
                "start:table", "start:thead", "start:tr", "start:td", "text:h", "end:td",
                "end:tr", "end:thead", "start:tbody", "start:tr", "start:td", "text:1",
                "end:td", "end:tr", "end:tbody", "start:tfoot", "start:tr", "start:td",
                "text:f", "end:td", "end:tr", "end:tfoot", "end:table", "eof"
            ])
        );
    }

    // `param`, `source` and `style` are void or raw text in the HTML
    // namespace, so nesting only happens for foreign elements
    #[test]
    fn test_html_param_does_not_nest() {
        assert_eq!(
            trace(
                r#"<r xmlns:m="urn:m"><m:param><m:param></r>"#,
                ParserOptions::html()
            ),
            strs(&[
                "start:r", "start:m:param", "end:m:param", "start:m:param", "end:m:param",
                "end:r", "eof"
            ])
        );
        assert_eq!(
            trace(
                r#"<r xmlns:m="urn:m"><m:param><m:object><m:param/></m:object></m:param></r>"#,
                ParserOptions::html()
            ),
            strs(&[
                "start:r", "start:m:param", "start:m:object", "start:m:param", "end:m:param",
                "end:m:object", "end:m:param", "end:r", "eof"
            ])
        );
    }

    #[test]
    fn test_html_source_does_not_nest() {
        assert_eq!(
            trace(
                r#"<r xmlns:m="urn:m"><m:source><m:source></r>"#,
                ParserOptions::html()
            ),
            strs(&[
                "start:r", "start:m:source", "end:m:source", "start:m:source", "end:m:source",
                "end:r", "eof"
            ])
        );
        assert_eq!(
            trace(
                r#"<r xmlns:m="urn:m"><m:source><m:video><m:source/></m:video></m:source></r>"#,
                ParserOptions::html()
            ),
            strs(&[
                "start:r", "start:m:source", "start:m:video", "start:m:source", "end:m:source",
                "end:m:video", "end:m:source", "end:r", "eof"
            ])
        );
    }

    #[test]
    fn test_html_style_does_not_nest() {
        assert_eq!(
            trace(
                r#"<r xmlns:s="urn:s"><s:style>a<s:style>b</r>"#,
                ParserOptions::html()
            ),
            strs(&[
                "start:r", "start:s:style", "text:a", "end:s:style", "start:s:style", "text:b",
                "end:s:style", "end:r", "eof"
            ])
        );
    }
}
