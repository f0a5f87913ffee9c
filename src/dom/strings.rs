//! String Interning Pool
//!
//! Deduplicated storage for element names, attribute names, namespace
//! prefixes and URIs. Every distinct string is stored once in a shared
//! buffer and handed out as a [`NameId`]; two names are equal exactly when
//! their ids are equal.
//!
//! Uses hash-based lookup to avoid storing duplicate string data.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Handle to an interned string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NameId(pub u32);

impl NameId {
    /// The empty string (also the default namespace prefix)
    pub const EMPTY: NameId = NameId(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// String interning pool
///
/// Memory layout:
/// - `entries`: (offset, len) into `data` for each id
/// - `data`: all interned strings back to back
/// - `hash_index`: hash -> list of ids (handles rare collisions)
#[derive(Debug)]
pub struct StringPool {
    entries: Vec<(u32, u32)>,
    data: String,
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a new pool; id 0 is the empty string
    pub fn new() -> Self {
        let mut pool = StringPool {
            entries: Vec::with_capacity(64),
            data: String::with_capacity(1024),
            hash_index: HashMap::new(),
        };
        pool.entries.push((0, 0));
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Id of `s` if already interned
    pub fn lookup(&self, s: &str) -> Option<NameId> {
        if s.is_empty() {
            return Some(NameId::EMPTY);
        }
        self.hash_index
            .get(&Self::compute_hash(s))?
            .iter()
            .copied()
            .find(|&id| self.get(NameId(id)) == s)
            .map(NameId)
    }

    /// Intern a string, returning the existing id for repeats
    pub fn intern(&mut self, s: &str) -> NameId {
        if s.is_empty() {
            return NameId::EMPTY;
        }

        let hash = Self::compute_hash(s);
        if let Some(ids) = self.hash_index.get(&hash) {
            for &id in ids {
                if self.get(NameId(id)) == s {
                    return NameId(id);
                }
            }
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);
        let id = self.entries.len() as u32;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);
        NameId(id)
    }

    /// Intern raw bytes; invalid UTF-8 is replaced lossily
    pub fn intern_bytes(&mut self, s: &[u8]) -> NameId {
        match std::str::from_utf8(s) {
            Ok(s) => self.intern(s),
            Err(_) => self.intern(&String::from_utf8_lossy(s)),
        }
    }

    /// Resolve an id; unknown ids read as ""
    #[inline]
    pub fn get(&self, id: NameId) -> &str {
        match self.entries.get(id.0 as usize) {
            Some(&(offset, len)) => &self.data[offset as usize..(offset + len) as usize],
            None => "",
        }
    }

    /// Compare two interned names, optionally ignoring ASCII case
    #[inline]
    pub fn names_equal(&self, a: NameId, b: NameId, ignore_case: bool) -> bool {
        a == b || (ignore_case && self.get(a).eq_ignore_ascii_case(self.get(b)))
    }

    /// Number of interned strings (including the empty string)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Bytes of string data held
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}
