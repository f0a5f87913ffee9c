//! Elixir Term Conversion Utilities
//!
//! Converts tokens, SAX events, property list values and errors to Elixir
//! terms.

use crate::core::error::XmlError;
use crate::plist::{PlistError, Value};
use crate::reader::{PullParser, Token};
use crate::sax::SaxEvent;
use rustler::types::atom::Atom;
use rustler::{Encoder, Env, NewBinary, NifResult, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    eof,
    strict,
    default,
    lenient,
    start_element,
    end_element,
    text,
    cdata,
    comment,
    processing_instruction,
    doctype,
    date,
    data,
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    bytes_to_binary(env, s.as_bytes())
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

#[inline]
fn optional_binary<'a>(env: Env<'a>, s: Option<&str>) -> Term<'a> {
    match s {
        Some(s) => str_to_binary(env, s),
        None => rustler::types::atom::nil().encode(env),
    }
}

/// `{kind, line, column}` with `kind` a snake_case atom
pub fn error_to_term<'a>(env: Env<'a>, err: &XmlError) -> NifResult<Term<'a>> {
    let kind = Atom::from_str(env, err.kind.code())?;
    Ok((kind, err.location.line, err.location.column).encode(env))
}

/// Convert the token the parser just returned.
///
/// - `{:start_element, name, namespace, [{name, value}]}`
/// - `{:end_element, name}`
/// - `{:text, content}` / `{:cdata, content}`
/// - `{:comment, content}` / `{:doctype, content}`
/// - `{:processing_instruction, target, data}`
/// - `:eof` / `{:error, {kind, line, column}}`
pub fn token_to_term<'a>(env: Env<'a>, parser: &PullParser<'_>, token: Token) -> NifResult<Term<'a>> {
    let term = match token {
        Token::StartElement => {
            let mut attrs = Term::list_new_empty(env);
            for i in (0..parser.attribute_count()).rev() {
                if let Some(attr) = parser.attribute(i) {
                    let tuple = (str_to_binary(env, attr.name), str_to_binary(env, attr.value));
                    attrs = attrs.list_prepend(tuple.encode(env));
                }
            }
            (
                start_element(),
                str_to_binary(env, parser.name()),
                optional_binary(env, parser.namespace()),
                attrs,
            )
                .encode(env)
        }
        Token::EndElement => (end_element(), str_to_binary(env, parser.name())).encode(env),
        Token::Text if parser.is_cdata() => (cdata(), str_to_binary(env, parser.text())).encode(env),
        Token::Text => (text(), str_to_binary(env, parser.text())).encode(env),
        Token::Comment => (comment(), str_to_binary(env, parser.text())).encode(env),
        Token::DocType => (doctype(), str_to_binary(env, parser.text())).encode(env),
        Token::ProcessingInstruction => (
            processing_instruction(),
            str_to_binary(env, parser.name()),
            str_to_binary(env, parser.text()),
        )
            .encode(env),
        Token::Eof => eof().encode(env),
        Token::Error => {
            let reason = match parser.error() {
                Some(err) => error_to_term(env, err)?,
                None => rustler::types::atom::nil().encode(env),
            };
            (error(), reason).encode(env)
        }
    };
    Ok(term)
}

/// Convert SAX events to an Elixir list
pub fn events_to_term<'a>(env: Env<'a>, events: Vec<SaxEvent>) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for event in events.into_iter().rev() {
        let event_term = event_to_term(env, event);
        list = list.list_prepend(event_term);
    }
    list
}

/// Convert a single SAX event to an Elixir term
pub fn event_to_term<'a>(env: Env<'a>, event: SaxEvent) -> Term<'a> {
    match event {
        SaxEvent::StartElement {
            name,
            namespace,
            attributes,
        } => {
            let mut attrs = Term::list_new_empty(env);
            for (k, v) in attributes.iter().rev() {
                let tuple = (str_to_binary(env, k), str_to_binary(env, v));
                attrs = attrs.list_prepend(tuple.encode(env));
            }
            (
                start_element(),
                str_to_binary(env, &name),
                optional_binary(env, namespace.as_deref()),
                attrs,
            )
                .encode(env)
        }
        SaxEvent::EndElement { name } => (end_element(), str_to_binary(env, &name)).encode(env),
        SaxEvent::Text {
            content,
            cdata: true,
        } => (cdata(), str_to_binary(env, &content)).encode(env),
        SaxEvent::Text { content, .. } => (text(), str_to_binary(env, &content)).encode(env),
        SaxEvent::Comment(content) => (comment(), str_to_binary(env, &content)).encode(env),
        SaxEvent::ProcessingInstruction { target, data } => (
            processing_instruction(),
            str_to_binary(env, &target),
            str_to_binary(env, &data),
        )
            .encode(env),
    }
}

/// Convert a property list value.
///
/// Dates become `{:date, iso8601}` and data blobs `{:data, binary}` so they
/// stay distinguishable from strings; dictionaries become maps.
pub fn value_to_term<'a>(env: Env<'a>, value: &Value) -> NifResult<Term<'a>> {
    let term = match value {
        Value::Boolean(b) => b.encode(env),
        Value::Integer(i) => i.encode(env),
        Value::Real(f) => f.encode(env),
        Value::String(s) => str_to_binary(env, s),
        Value::Date(d) => (date(), str_to_binary(env, &d.to_string())).encode(env),
        Value::Data(bytes) => (data(), bytes_to_binary(env, bytes)).encode(env),
        Value::Array(items) => {
            let mut list = Term::list_new_empty(env);
            for item in items.iter().rev() {
                list = list.list_prepend(value_to_term(env, item)?);
            }
            list
        }
        Value::Dictionary(entries) => {
            let mut pairs: Vec<(Term, Term)> = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                pairs.push((str_to_binary(env, key), value_to_term(env, item)?));
            }
            Term::map_from_pairs(env, &pairs)?
        }
    };
    Ok(term)
}

/// Reason term for a failed property list parse
pub fn plist_error_to_term<'a>(env: Env<'a>, err: &PlistError) -> NifResult<Term<'a>> {
    match err {
        PlistError::Xml(xml) => error_to_term(env, xml),
        other => Ok(str_to_binary(env, &other.to_string())),
    }
}
