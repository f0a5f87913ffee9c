//! SAX (Simple API for XML) Module
//!
//! Push-style access built on the pull parser:
//!
//! ```text
//! PullParser ---> drive() ---> ContentHandler callbacks
//!                                   |
//!                                   v
//!                        SaxCollector -> SaxEvent[] -> Elixir terms
//! ```
//!
//! ## Event Types
//!
//! - `StartElement` - element name, namespace and attributes
//! - `EndElement` - element closing (explicit or synthesized)
//! - `Text` - character data, flagged when it came from CDATA
//! - `Comment` - comment content
//! - `ProcessingInstruction` - PI target and data

pub mod collector;
pub mod events;
pub mod handler;

pub use collector::{collect, SaxCollector};
pub use events::SaxEvent;
pub use handler::{drive, ContentHandler};
