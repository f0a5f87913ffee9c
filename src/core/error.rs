//! Parse error taxonomy
//!
//! Every condition the pull parser can detect has an [`ErrorKind`]. Whether a
//! condition is fatal or only a warning depends on the active conformance
//! level; either way it is reported together with the source [`Location`].

use std::fmt;

/// Line/column position in the input (both 1-based) plus the byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Kinds of parse conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    // I/O
    #[error("reading from the input failed")]
    ReadFailed,

    // Syntax
    #[error("unexpected whitespace")]
    UnexpectedWhitespace,
    #[error("illegal name")]
    IllegalName,
    #[error("expected '='")]
    ExpectedEquals,
    #[error("expected a quoted attribute value")]
    ExpectedQuote,
    #[error("expected '>'")]
    ExpectedRightAngleBracket,

    // Structure
    #[error("end tag without a matching start tag")]
    UnexpectedEndElement,
    #[error("end tag does not match the open element")]
    MismatchedEndElement,
    #[error("unexpected end of input")]
    UnexpectedEndOfFile,
    #[error("more than one top-level element")]
    MultipleTopLevelElements,
    #[error("text outside of the root element")]
    TextOutsideElement,

    // Content
    #[error("unknown entity")]
    UnknownEntity,
    #[error("malformed entity reference")]
    InvalidEntity,
    #[error("invalid character")]
    InvalidCharacter,
    #[error("invalid attribute value")]
    InvalidAttributeValue,
    #[error("']]>' is not allowed in text")]
    CDATATerminatorInText,
    #[error("invalid declaration")]
    InvalidDocType,
    #[error("duplicate attribute")]
    DuplicateAttribute,
    #[error("unknown namespace prefix")]
    UnknownNamespace,
    #[error("'--' is not allowed inside a comment")]
    IncorrectlyTerminatedComment,
    #[error("expected text content")]
    ExpectedText,
    #[error("expected an empty element")]
    ExpectedEmptyElement,
}

impl ErrorKind {
    /// Stable snake_case identifier, used for atoms on the Elixir side
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ReadFailed => "read_failed",
            ErrorKind::UnexpectedWhitespace => "unexpected_whitespace",
            ErrorKind::IllegalName => "illegal_name",
            ErrorKind::ExpectedEquals => "expected_equals",
            ErrorKind::ExpectedQuote => "expected_quote",
            ErrorKind::ExpectedRightAngleBracket => "expected_right_angle_bracket",
            ErrorKind::UnexpectedEndElement => "unexpected_end_element",
            ErrorKind::MismatchedEndElement => "mismatched_end_element",
            ErrorKind::UnexpectedEndOfFile => "unexpected_end_of_file",
            ErrorKind::MultipleTopLevelElements => "multiple_top_level_elements",
            ErrorKind::TextOutsideElement => "text_outside_element",
            ErrorKind::UnknownEntity => "unknown_entity",
            ErrorKind::InvalidEntity => "invalid_entity",
            ErrorKind::InvalidCharacter => "invalid_character",
            ErrorKind::InvalidAttributeValue => "invalid_attribute_value",
            ErrorKind::CDATATerminatorInText => "cdata_terminator_in_text",
            ErrorKind::InvalidDocType => "invalid_doctype",
            ErrorKind::DuplicateAttribute => "duplicate_attribute",
            ErrorKind::UnknownNamespace => "unknown_namespace",
            ErrorKind::IncorrectlyTerminatedComment => "incorrectly_terminated_comment",
            ErrorKind::ExpectedText => "expected_text",
            ErrorKind::ExpectedEmptyElement => "expected_empty_element",
        }
    }
}

/// A located parse condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {location}")]
pub struct XmlError {
    pub kind: ErrorKind,
    pub location: Location,
}

impl XmlError {
    pub fn new(kind: ErrorKind, location: Location) -> Self {
        XmlError { kind, location }
    }
}

/// A recoverable condition that was demoted to a warning.
pub type Warning = XmlError;
