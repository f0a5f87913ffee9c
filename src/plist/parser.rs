//! XML property list interpreter
//!
//! Walks the pull parser's token stream and builds a [`Value`] tree. Only
//! the property list vocabulary is accepted; any other element is an error.

use super::value::{Date, Value};
use super::PlistError;
use crate::reader::{ParserOptions, PullParser, Token};
use base64::Engine;
use std::collections::BTreeMap;

/// Parse a complete XML property list
pub fn parse_plist(input: &[u8]) -> Result<Value, PlistError> {
    let mut parser = PullParser::new(input, ParserOptions::default());
    read_plist(&mut parser)
}

/// Read one property list from `parser`; the `<plist>` wrapper is optional
pub fn read_plist(parser: &mut PullParser<'_>) -> Result<Value, PlistError> {
    if !next_child(parser)? {
        return Err(PlistError::Empty);
    }
    if parser.local_name() != "plist" {
        return read_value(parser);
    }
    if !next_child(parser)? {
        return Err(PlistError::Empty);
    }
    let value = read_value(parser)?;
    if next_child(parser)? {
        return Err(PlistError::UnexpectedElement(parser.local_name().to_owned()));
    }
    Ok(value)
}

/// Advance to the next child element. False once the enclosing element
/// (or the document) ends.
fn next_child(parser: &mut PullParser<'_>) -> Result<bool, PlistError> {
    loop {
        match parser.next() {
            Token::StartElement => return Ok(true),
            Token::EndElement | Token::Eof => return Ok(false),
            Token::Text if parser.is_whitespace() => {}
            Token::Text => return Err(PlistError::UnexpectedText(parser.text().to_owned())),
            Token::Error => {
                let err = parser.error().copied();
                return Err(err.map_or(PlistError::Empty, PlistError::Xml));
            }
            Token::ProcessingInstruction | Token::Comment | Token::DocType => {}
        }
    }
}

/// Read the value whose start tag was just returned
fn read_value(parser: &mut PullParser<'_>) -> Result<Value, PlistError> {
    let element = parser.local_name().to_owned();
    match element.as_str() {
        "true" => {
            parser.skip_empty_element()?;
            Ok(Value::Boolean(true))
        }
        "false" => {
            parser.skip_empty_element()?;
            Ok(Value::Boolean(false))
        }
        "integer" => parse_integer(&parser.read_whole_text_trimmed()?),
        "real" => {
            let text = parser.read_whole_text_trimmed()?;
            text.parse()
                .map(Value::Real)
                .map_err(|_| PlistError::InvalidReal(text))
        }
        "string" => Ok(Value::String(parser.read_whole_text()?)),
        "date" => Ok(Value::Date(parser.read_whole_text_trimmed()?.parse::<Date>()?)),
        "data" => {
            let text = parser.read_whole_text()?;
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map(Value::Data)
                .map_err(|e| PlistError::InvalidData(e.to_string()))
        }
        "array" => {
            let mut items = Vec::new();
            while next_child(parser)? {
                items.push(read_value(parser)?);
            }
            Ok(Value::Array(items))
        }
        "dict" => {
            let mut entries = BTreeMap::new();
            while next_child(parser)? {
                if parser.local_name() != "key" {
                    return Err(PlistError::ExpectedKey(parser.local_name().to_owned()));
                }
                let key = parser.read_whole_text()?;
                if !next_child(parser)? {
                    return Err(PlistError::MissingValue(key));
                }
                let value = read_value(parser)?;
                entries.insert(key, value);
            }
            Ok(Value::Dictionary(entries))
        }
        _ => Err(PlistError::UnexpectedElement(element)),
    }
}

fn parse_integer(text: &str) -> Result<Value, PlistError> {
    let invalid = || PlistError::InvalidInteger(text.to_owned());
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) else {
        return text.parse::<i64>().map(Value::Integer).map_err(|_| invalid());
    };
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let magnitude = u64::from_str_radix(hex, 16).map_err(|_| invalid())?;
    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.map(Value::Integer).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Name</key><string>Widget &amp; Co</string>
    <key>Count</key><integer>42</integer>
    <key>Ratio</key><real>0.5</real>
    <key>Enabled</key><true/>
    <key>Hidden</key><false/>
    <key>Created</key><date>2024-03-01T12:30:00Z</date>
    <key>Blob</key><data>
    aGVs
    bG8=
    </data>
    <!-- a comment -->
    <key>Tags</key><array><string>a</string><string>b</string></array>
    <key>Empty</key><string/>
</dict>
</plist>
"#;

    #[test]
    fn test_full_document() {
        let value = parse_plist(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(value.get("Name").and_then(Value::as_str), Some("Widget & Co"));
        assert_eq!(value.get("Count").and_then(Value::as_i64), Some(42));
        assert_eq!(value.get("Ratio").and_then(Value::as_f64), Some(0.5));
        assert_eq!(value.get("Enabled").and_then(Value::as_bool), Some(true));
        assert_eq!(value.get("Hidden").and_then(Value::as_bool), Some(false));
        assert_eq!(
            value.get("Created").map(|d| match d {
                Value::Date(date) => date.to_string(),
                _ => String::new(),
            }),
            Some("2024-03-01T12:30:00Z".to_string())
        );
        assert_eq!(value.get("Blob"), Some(&Value::Data(b"hello".to_vec())));
        assert_eq!(
            value.get("Tags"),
            Some(&Value::Array(vec![
                Value::String("a".to_string()),
                Value::String("b".to_string())
            ]))
        );
        assert_eq!(value.get("Empty").and_then(Value::as_str), Some(""));
        assert_eq!(value.as_dictionary().map(|d| d.len()), Some(9));
    }

    #[test]
    fn test_bare_value() {
        assert_eq!(
            parse_plist(b"<string>hi</string>").unwrap(),
            Value::String("hi".to_string())
        );
        assert_eq!(
            parse_plist(b"<array/>").unwrap(),
            Value::Array(Vec::new())
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(parse_integer("-5").unwrap(), Value::Integer(-5));
        assert_eq!(parse_integer("0x1F").unwrap(), Value::Integer(31));
        assert_eq!(parse_integer("-0x10").unwrap(), Value::Integer(-16));
        assert_eq!(parse_integer("+0x10").unwrap(), Value::Integer(16));
        assert_eq!(parse_integer("+7").unwrap(), Value::Integer(7));
        assert_eq!(
            parse_integer("-0x8000000000000000").unwrap(),
            Value::Integer(i64::MIN)
        );
        assert!(parse_integer("0x8000000000000000").is_err());
        assert!(parse_integer("-0x8000000000000001").is_err());
        assert!(parse_integer("0x").is_err());
        assert!(parse_integer("0x+5").is_err());
        assert!(parse_integer("--5").is_err());
        assert!(matches!(
            parse_plist(b"<integer>abc</integer>"),
            Err(PlistError::InvalidInteger(text)) if text == "abc"
        ));
    }

    #[test]
    fn test_unknown_element() {
        assert_eq!(
            parse_plist(b"<plist><foo/></plist>"),
            Err(PlistError::UnexpectedElement("foo".to_string()))
        );
    }

    #[test]
    fn test_dictionary_requires_keys() {
        assert_eq!(
            parse_plist(b"<dict><string>x</string></dict>"),
            Err(PlistError::ExpectedKey("string".to_string()))
        );
        assert_eq!(
            parse_plist(b"<dict><key>k</key></dict>"),
            Err(PlistError::MissingValue("k".to_string()))
        );
    }

    #[test]
    fn test_true_must_be_empty() {
        assert!(matches!(
            parse_plist(b"<true>yes</true>"),
            Err(PlistError::Xml(err)) if err.kind == ErrorKind::ExpectedEmptyElement
        ));
    }

    #[test]
    fn test_stray_text() {
        assert_eq!(
            parse_plist(b"<array>x<string/></array>"),
            Err(PlistError::UnexpectedText("x".to_string()))
        );
    }

    #[test]
    fn test_truncated_document() {
        assert!(matches!(
            parse_plist(b"<plist><array><integer>1</integer>"),
            Err(PlistError::Xml(err)) if err.kind == ErrorKind::UnexpectedEndOfFile
        ));
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(
            parse_plist(b"<data>!!!</data>"),
            Err(PlistError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_plist(b"<plist></plist>"), Err(PlistError::Empty));
    }
}
