//! RustyPull - Streaming XML/HTML pull parsing
//!
//! Entry points:
//! - `parse_tokens`: whole-document token list
//! - `parse_events`: SAX-style event list (comments and PIs, no doctype)
//! - `pull_new` / `pull_read`: one token per call over a parser resource
//! - `parse_plist`: XML property list to Elixir terms
//!
//! Conformance is one of `:strict`, `:default` or `:lenient`; the `html`
//! flag switches on void elements, implicit end tags and HTML entities.

use rustler::{Atom, Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod core;
pub mod dom;
pub mod plist;
pub mod reader;
pub mod resource;
pub mod sax;
pub mod term;

use reader::{Conformance, ParserOptions, PullParser};
use resource::{PullParserRef, PullParserResource};
use term::{error_to_term, events_to_term, plist_error_to_term, token_to_term, value_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Options
// ============================================================================

fn options_from(conformance: Atom, html: bool) -> NifResult<ParserOptions> {
    let level = if conformance == term::strict() {
        Conformance::Strict
    } else if conformance == term::default() {
        Conformance::Default
    } else if conformance == term::lenient() {
        Conformance::Lenient
    } else {
        return Err(rustler::Error::BadArg);
    };
    let options = if html {
        ParserOptions::html()
    } else {
        ParserOptions::new()
    };
    Ok(options.conformance(level))
}

// ============================================================================
// Whole-Document Parsing
// ============================================================================

/// Parse XML and return every token, ending with `:eof` or `{:error, reason}`
#[rustler::nif]
fn parse_tokens<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    conformance: Atom,
    html: bool,
) -> NifResult<Term<'a>> {
    let mut parser = PullParser::new(input.as_slice(), options_from(conformance, html)?);
    let mut tokens = Vec::new();
    loop {
        let token = parser.read();
        tokens.push(token_to_term(env, &parser, token)?);
        if token.is_terminal() {
            break;
        }
    }
    Ok(tokens.encode(env))
}

/// Parse XML into SAX events (returns {:ok, events} or {:error, reason})
#[rustler::nif]
fn parse_events<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    conformance: Atom,
    html: bool,
) -> NifResult<Term<'a>> {
    match sax::collect(input.as_slice(), options_from(conformance, html)?) {
        Ok(events) => Ok((term::ok(), events_to_term(env, events)).encode(env)),
        Err(err) => Ok((term::error(), error_to_term(env, &err)?).encode(env)),
    }
}

// ============================================================================
// Pull Parser Resource
// ============================================================================

/// Create a pull parser over a copy of `input`
#[rustler::nif]
fn pull_new(input: Binary, conformance: Atom, html: bool) -> NifResult<PullParserRef> {
    let options = options_from(conformance, html)?;
    Ok(ResourceArc::new(PullParserResource::new(
        input.as_slice().to_vec(),
        options,
    )))
}

/// Read the next token
#[rustler::nif]
fn pull_read<'a>(env: Env<'a>, parser: PullParserRef) -> NifResult<Term<'a>> {
    parser
        .with_parser(|p| {
            let token = p.read();
            token_to_term(env, p, token)
        })
        .map_err(rustler::Error::Atom)?
}

/// The sticky error, or nil
#[rustler::nif]
fn pull_error<'a>(env: Env<'a>, parser: PullParserRef) -> NifResult<Term<'a>> {
    parser
        .with_parser(|p| match p.error() {
            Some(err) => error_to_term(env, err),
            None => Ok(rustler::types::atom::nil().encode(env)),
        })
        .map_err(rustler::Error::Atom)?
}

/// Warnings recorded so far, oldest first
#[rustler::nif]
fn pull_warnings<'a>(env: Env<'a>, parser: PullParserRef) -> NifResult<Term<'a>> {
    parser
        .with_parser(|p| {
            let mut list = Term::list_new_empty(env);
            for warning in p.warnings().iter().rev() {
                list = list.list_prepend(error_to_term(env, warning)?);
            }
            Ok(list)
        })
        .map_err(rustler::Error::Atom)?
}

// ============================================================================
// Property Lists
// ============================================================================

/// Parse an XML property list (returns {:ok, value} or {:error, reason})
#[rustler::nif]
fn parse_plist<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match plist::parse_plist(input.as_slice()) {
        Ok(value) => Ok((term::ok(), value_to_term(env, &value)?).encode(env)),
        Err(err) => {
            log::debug!("plist rejected: {}", err);
            Ok((term::error(), plist_error_to_term(env, &err)?).encode(env))
        }
    }
}

// ============================================================================
// NIF Initialization
// ============================================================================

// Resource types register themselves through `#[rustler::resource_impl]`
fn load(_env: Env, _info: Term) -> bool {
    true
}

rustler::init!("Elixir.RustyPull.Native", load = load);
