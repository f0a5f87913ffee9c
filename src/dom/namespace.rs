//! Namespace Resolution
//!
//! Per-prefix stacks of bindings. Each `xmlns`/`xmlns:p` attribute pushes a
//! binding tagged with the depth of the element that declared it; popping
//! an element unwinds every binding declared at or below its depth.

use super::strings::NameId;
use std::collections::HashMap;

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
    pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
}

/// Namespace binding (prefix -> URI) for one scope
#[derive(Debug, Clone, Copy)]
struct NsBinding {
    depth: usize,
    uri: NameId,
}

/// Scoped prefix bindings, keyed by interned prefix (`NameId::EMPTY` is the
/// default namespace)
#[derive(Debug, Default)]
pub struct NamespaceStack {
    bindings: HashMap<NameId, Vec<NsBinding>>,
}

impl NamespaceStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `uri` for the element at `depth` (1 = root).
    /// An empty `uri` undeclares the prefix for that scope.
    pub fn declare(&mut self, prefix: NameId, uri: NameId, depth: usize) {
        self.bindings
            .entry(prefix)
            .or_default()
            .push(NsBinding { depth, uri });
    }

    /// Innermost URI bound to `prefix`
    pub fn resolve(&self, prefix: NameId) -> Option<NameId> {
        self.bindings
            .get(&prefix)?
            .last()
            .map(|b| b.uri)
            .filter(|uri| !uri.is_empty())
    }

    /// Drop every binding declared at `depth` or deeper
    pub fn unwind(&mut self, depth: usize) {
        self.bindings.retain(|_, stack| {
            while stack.last().is_some_and(|b| b.depth >= depth) {
                stack.pop();
            }
            !stack.is_empty()
        });
    }

    /// Number of prefixes with at least one live binding
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::strings::StringPool;

    #[test]
    fn test_declare_and_resolve() {
        let mut strings = StringPool::new();
        let mut stack = NamespaceStack::new();

        let svg_prefix = strings.intern("svg");
        let svg_uri = strings.intern("http://www.w3.org/2000/svg");

        stack.declare(svg_prefix, svg_uri, 1);
        assert_eq!(stack.resolve(svg_prefix), Some(svg_uri));
        assert_eq!(stack.resolve(NameId::EMPTY), None);
    }

    #[test]
    fn test_unwind() {
        let mut strings = StringPool::new();
        let mut stack = NamespaceStack::new();

        let prefix = strings.intern("foo");
        let uri = strings.intern("http://example.com/foo");

        stack.declare(prefix, uri, 2);
        stack.unwind(3);
        assert_eq!(stack.resolve(prefix), Some(uri));
        stack.unwind(2);
        assert_eq!(stack.resolve(prefix), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_shadow_binding() {
        let mut strings = StringPool::new();
        let mut stack = NamespaceStack::new();

        let prefix = strings.intern("ns");
        let uri1 = strings.intern("http://example.com/ns1");
        let uri2 = strings.intern("http://example.com/ns2");

        stack.declare(prefix, uri1, 1);
        stack.declare(prefix, uri2, 2);
        assert_eq!(stack.resolve(prefix), Some(uri2));

        stack.unwind(2);
        assert_eq!(stack.resolve(prefix), Some(uri1));
    }

    #[test]
    fn test_empty_uri_undeclares_default() {
        let mut strings = StringPool::new();
        let mut stack = NamespaceStack::new();

        let uri = strings.intern("urn:default");
        stack.declare(NameId::EMPTY, uri, 1);
        stack.declare(NameId::EMPTY, NameId::EMPTY, 2);
        assert_eq!(stack.resolve(NameId::EMPTY), None);

        stack.unwind(2);
        assert_eq!(stack.resolve(NameId::EMPTY), Some(uri));
    }
}
