//! ResourceArc Wrappers
//!
//! Persistent state for pull parsers driven one token at a time from Elixir.

use crate::reader::{ParserOptions, PullParser};
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for a PullParser that owns its input
pub struct PullParserResource {
    pub inner: Mutex<PullParser<'static>>,
}

impl PullParserResource {
    pub fn new(input: Vec<u8>, options: ParserOptions) -> Self {
        PullParserResource {
            inner: Mutex::new(PullParser::from_vec(input, options)),
        }
    }

    /// Run `f` with exclusive access to the parser.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous holder panicked.
    pub fn with_parser<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut PullParser<'static>) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for PullParserResource {}

/// Type alias for the ResourceArc
pub type PullParserRef = ResourceArc<PullParserResource>;
