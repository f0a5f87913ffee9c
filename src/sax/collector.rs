//! SAX Collector
//!
//! Implements ContentHandler to record owned SAX events, for batch return
//! to Elixir or for inspection in tests.

use super::events::SaxEvent;
use super::handler::{drive, ContentHandler};
use crate::core::error::XmlError;
use crate::reader::events::{AttributeRef, QName};
use crate::reader::{ParserOptions, PullParser};

/// Collector that records every callback as a [`SaxEvent`]
#[derive(Debug, Default)]
pub struct SaxCollector {
    events: Vec<SaxEvent>,
    /// Merge adjacent non-CDATA text callbacks into one event
    coalesce_text: bool,
}

impl SaxCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
            coalesce_text: false,
        }
    }

    /// Create a collector that merges adjacent text
    pub fn coalescing() -> Self {
        Self {
            coalesce_text: true,
            ..Self::new()
        }
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl ContentHandler for SaxCollector {
    fn start_element(&mut self, name: QName<'_>, attributes: &[AttributeRef<'_>]) {
        self.events.push(SaxEvent::StartElement {
            name: name.name.to_owned(),
            namespace: name.namespace.map(str::to_owned),
            attributes: attributes
                .iter()
                .map(|a| (a.name.to_owned(), a.value.to_owned()))
                .collect(),
        });
    }

    fn end_element(&mut self, name: QName<'_>) {
        self.events.push(SaxEvent::EndElement {
            name: name.name.to_owned(),
        });
    }

    fn characters(&mut self, text: &str, cdata: bool) {
        if self.coalesce_text && !cdata {
            if let Some(SaxEvent::Text {
                content,
                cdata: false,
            }) = self.events.last_mut()
            {
                content.push_str(text);
                return;
            }
        }
        self.events.push(SaxEvent::Text {
            content: text.to_owned(),
            cdata,
        });
    }

    fn comment(&mut self, text: &str) {
        self.events.push(SaxEvent::Comment(text.to_owned()));
    }

    fn processing_instruction(&mut self, target: &str, data: &str) {
        self.events.push(SaxEvent::ProcessingInstruction {
            target: target.to_owned(),
            data: data.to_owned(),
        });
    }
}

/// Parse `input` completely, returning the recorded events
pub fn collect(input: &[u8], options: ParserOptions) -> Result<Vec<SaxEvent>, XmlError> {
    let mut parser = PullParser::new(input, options);
    let mut collector = SaxCollector::new();
    drive(&mut parser, &mut collector)?;
    Ok(collector.take_events())
}
