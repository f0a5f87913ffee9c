//! Push adapter over the pull parser

use crate::core::error::{ErrorKind, XmlError};
use crate::reader::events::{AttributeRef, QName};
use crate::reader::{PullParser, Token};

/// Receives the document as callbacks
pub trait ContentHandler {
    fn start_element(&mut self, name: QName<'_>, attributes: &[AttributeRef<'_>]);

    fn end_element(&mut self, name: QName<'_>);

    /// Character data; CDATA sections arrive with `cdata` set
    fn characters(&mut self, text: &str, cdata: bool);

    fn comment(&mut self, _text: &str) {}

    fn processing_instruction(&mut self, _target: &str, _data: &str) {}
}

/// Pull every token from `parser` and replay it into `handler`.
///
/// Doctype tokens are dropped. Stops at end of document or at the first
/// fatal error, which is returned.
pub fn drive<H: ContentHandler + ?Sized>(
    parser: &mut PullParser<'_>,
    handler: &mut H,
) -> Result<(), XmlError> {
    loop {
        match parser.read() {
            Token::StartElement => {
                let attributes: Vec<AttributeRef<'_>> = parser.attributes().collect();
                handler.start_element(qname(parser), &attributes);
            }
            Token::EndElement => handler.end_element(qname(parser)),
            Token::Text => handler.characters(parser.text(), parser.is_cdata()),
            Token::Comment => handler.comment(parser.text()),
            Token::ProcessingInstruction => {
                handler.processing_instruction(parser.name(), parser.text())
            }
            Token::DocType => {}
            Token::Eof => return Ok(()),
            Token::Error => {
                let fallback = XmlError::new(ErrorKind::UnexpectedEndOfFile, parser.location());
                return Err(parser.error().copied().unwrap_or(fallback));
            }
        }
    }
}

fn qname<'p>(parser: &'p PullParser<'_>) -> QName<'p> {
    QName {
        name: parser.name(),
        local_name: parser.local_name(),
        namespace: parser.namespace(),
    }
}
