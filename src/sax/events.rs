//! SAX Event Types
//!
//! Owned events recorded from a push-style replay of the token stream.

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Start of an element
    StartElement {
        /// Qualified name as written
        name: String,
        /// Resolved namespace URI
        namespace: Option<String>,
        /// Attributes as (qualified name, value) pairs
        attributes: Vec<(String, String)>,
    },

    /// End of an element
    EndElement { name: String },

    /// Character data; `cdata` marks a CDATA section
    Text { content: String, cdata: bool },

    Comment(String),

    ProcessingInstruction { target: String, data: String },
}

impl SaxEvent {
    /// Element name for start/end events
    pub fn name(&self) -> Option<&str> {
        match self {
            SaxEvent::StartElement { name, .. } | SaxEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }
}
