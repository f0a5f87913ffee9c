//! Open element frames
//!
//! One [`Element`] per start tag still awaiting its end tag. Attribute
//! values live in the frame's own append-only buffer, NUL-separated, and
//! attributes refer to them by offset.

use super::strings::NameId;

/// Attribute of an open element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written
    pub name: NameId,
    /// Name without prefix
    pub local_name: NameId,
    /// Resolved namespace URI
    pub namespace: Option<NameId>,
    value_start: u32,
    value_len: u32,
}

/// An open element
#[derive(Debug, Clone)]
pub struct Element {
    pub name: NameId,
    pub local_name: NameId,
    pub namespace: Option<NameId>,
    /// Content is raw text (HTML `script`/`style`)
    pub is_raw_text: bool,
    attributes: Vec<Attribute>,
    values: String,
}

impl Element {
    pub fn new(name: NameId) -> Self {
        Element {
            name,
            local_name: name,
            namespace: None,
            is_raw_text: false,
            attributes: Vec::new(),
            values: String::new(),
        }
    }

    /// Append an attribute; name resolution happens later
    pub fn push_attribute(&mut self, name: NameId, value: &str) {
        let value_start = self.values.len() as u32;
        self.values.push_str(value);
        self.values.push('\0');
        self.attributes.push(Attribute {
            name,
            local_name: name,
            namespace: None,
            value_start,
            value_len: value.len() as u32,
        });
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn attributes_mut(&mut self) -> &mut [Attribute] {
        &mut self.attributes
    }

    /// Value of an attribute belonging to this frame
    #[inline]
    pub fn value(&self, attr: &Attribute) -> &str {
        let start = attr.value_start as usize;
        self.values
            .get(start..start + attr.value_len as usize)
            .unwrap_or("")
    }
}

/// `(name, namespace)` pairs that never take an end tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyElementRegistry {
    entries: Vec<(String, Option<String>)>,
}

impl EmptyElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` in `namespace` (`None` = no namespace)
    pub fn register(&mut self, name: impl Into<String>, namespace: Option<&str>) {
        let entry = (name.into(), namespace.map(str::to_owned));
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn contains(&self, local_name: &str, namespace: Option<&str>, ignore_case: bool) -> bool {
        self.entries.iter().any(|(name, ns)| {
            let name_matches = if ignore_case {
                name.eq_ignore_ascii_case(local_name)
            } else {
                name == local_name
            };
            name_matches && ns.as_deref() == namespace
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
