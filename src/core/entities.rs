//! Entity and character reference decoding
//!
//! Handles the reference forms found in text and attribute values:
//! - Named references looked up in an [`EntityTable`]: &lt; &amp; &nbsp; ...
//! - Numeric character references: &#123; &#x7B; &#X7B;
//!
//! Three tables exist: the five XML built-ins, the HTML 4 table, and a
//! caller-supplied table that replaces either of them entirely.

use super::error::ErrorKind;
use super::html_entities::HTML_ENTITIES;
use super::scanner::{is_name_char, Scanner};
use std::sync::OnceLock;

/// Longest named reference considered before giving up (`&...;` included)
const MAX_REFERENCE_LEN: usize = 40;

const XML_ENTITIES: &[(&str, u32)] = &[
    ("amp", 0x26),
    ("apos", 0x27),
    ("gt", 0x3E),
    ("lt", 0x3C),
    ("quot", 0x22),
];

/// One named reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Full token, `&name;`
    pub token: String,
    pub codepoint: u32,
    /// Expansion used instead of `codepoint` when present
    pub replacement: Option<String>,
}

impl Entity {
    pub fn new(name: &str, codepoint: u32) -> Self {
        Entity {
            token: format!("&{};", name),
            codepoint,
            replacement: None,
        }
    }

    /// Entity expanding to arbitrary text
    pub fn with_replacement(name: &str, text: impl Into<String>) -> Self {
        Entity {
            token: format!("&{};", name),
            codepoint: 0,
            replacement: Some(text.into()),
        }
    }

    /// Append the expansion; false if the codepoint is not encodable
    fn expand_into(&self, out: &mut Vec<u8>) -> bool {
        match &self.replacement {
            Some(text) => {
                out.extend_from_slice(text.as_bytes());
                true
            }
            None => push_codepoint(self.codepoint, out),
        }
    }
}

/// Sorted table of named references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    entries: Vec<Entity>,
}

impl EntityTable {
    /// Build a table; later duplicates of a token are dropped
    pub fn new(entries: impl IntoIterator<Item = Entity>) -> Self {
        let mut entries: Vec<Entity> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.token.cmp(&b.token));
        entries.dedup_by(|later, earlier| later.token == earlier.token);
        EntityTable { entries }
    }

    fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        Self::new(pairs.iter().map(|&(name, cp)| Entity::new(name, cp)))
    }

    /// The five predefined XML entities
    pub fn xml() -> &'static EntityTable {
        static TABLE: OnceLock<EntityTable> = OnceLock::new();
        TABLE.get_or_init(|| Self::from_pairs(XML_ENTITIES))
    }

    /// HTML 4 named character references plus `&apos;`
    pub fn html() -> &'static EntityTable {
        static TABLE: OnceLock<EntityTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            Self::new(
                HTML_ENTITIES
                    .iter()
                    .chain(std::iter::once(&("apos", 0x27)))
                    .map(|&(name, cp)| Entity::new(name, cp)),
            )
        })
    }

    /// Look up a full `&name;` token
    pub fn lookup(&self, token: &[u8]) -> Option<&Entity> {
        self.entries
            .binary_search_by(|e| e.token.as_bytes().cmp(token))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.iter()
    }
}

/// Append `cp` as UTF-8. Rejects NUL, surrogates and anything past U+10FFFF.
#[inline]
pub fn push_codepoint(cp: u32, out: &mut Vec<u8>) -> bool {
    match char::from_u32(cp) {
        Some(c) if cp != 0 => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            true
        }
        _ => false,
    }
}

/// Decode the reference under the cursor (which must be on `&`) into `out`.
///
/// On success the reference is consumed. `InvalidCharacter` also consumes
/// it (the caller decides what to substitute). `UnknownEntity` and
/// `InvalidEntity` leave the cursor on the `&`.
pub fn scan_reference(
    scanner: &mut Scanner<'_>,
    table: &EntityTable,
    out: &mut Vec<u8>,
) -> Result<(), ErrorKind> {
    let mut marker = scanner.mark();
    marker.skip_char();

    if marker.peek() == Some(b'#') {
        marker.skip_char();
        let radix = match marker.peek() {
            Some(b'x' | b'X') => {
                marker.skip_char();
                16
            }
            _ => 10,
        };
        let mut value: u32 = 0;
        let mut overflow = false;
        let mut digits = 0;
        loop {
            match marker.peek() {
                Some(b';') => break,
                Some(b) => {
                    let Some(d) = (b as char).to_digit(radix) else {
                        return Err(ErrorKind::InvalidEntity);
                    };
                    match value.checked_mul(radix).and_then(|v| v.checked_add(d)) {
                        Some(v) => value = v,
                        None => overflow = true,
                    }
                    digits += 1;
                    marker.skip_char();
                }
                None => return Err(ErrorKind::InvalidEntity),
            }
        }
        if digits == 0 {
            return Err(ErrorKind::InvalidEntity);
        }
        marker.skip_char();
        marker.release();
        if overflow || !push_codepoint(value, out) {
            return Err(ErrorKind::InvalidCharacter);
        }
        return Ok(());
    }

    let start = marker.start();
    loop {
        match marker.peek() {
            Some(b';') => break,
            Some(b) if is_name_char(b) && marker.position() - start < MAX_REFERENCE_LEN => {
                marker.skip_char();
            }
            _ => return Err(ErrorKind::InvalidEntity),
        }
    }
    if marker.position() == start + 1 {
        return Err(ErrorKind::InvalidEntity);
    }
    marker.skip_char();
    let end = marker.position();
    let entity = table
        .lookup(marker.slice(start..end))
        .ok_or(ErrorKind::UnknownEntity)?;
    marker.release();
    if !entity.expand_into(out) {
        return Err(ErrorKind::InvalidCharacter);
    }
    Ok(())
}
