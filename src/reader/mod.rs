//! XML/HTML Pull Reader
//!
//! - PullParser: token-at-a-time state machine with accessor-based results
//! - Options: conformance level, HTML mode, entity tables
//! - Events: token and attribute view types
//! - Tags/Html: start/end tag handling and HTML repair rules

pub mod events;
pub mod html;
pub mod options;
pub mod pull;
mod tags;

pub use events::{AttributeRef, QName, Token};
pub use options::{Conformance, ParserOptions};
pub use pull::{ParseState, PullParser};
