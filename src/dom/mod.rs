//! Parser-side document state
//!
//! The structures the pull parser mutates while it walks a document:
//! - String interning for element/attribute names and namespace URIs
//! - Scoped namespace bindings
//! - Open element frames and the registry of always-empty elements

pub mod element;
pub mod namespace;
pub mod strings;

pub use element::{Attribute, Element, EmptyElementRegistry};
pub use namespace::NamespaceStack;
pub use strings::{NameId, StringPool};
