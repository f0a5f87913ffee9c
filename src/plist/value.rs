//! Property list values

use super::PlistError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A property list value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Date(Date),
    Data(Vec<u8>),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    /// Dictionary lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dictionary()?.get(key)
    }
}

/// UTC timestamp as written in `<date>`: `YYYY-MM-DDTHH:MM:SSZ`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Parse a fixed-width run of ASCII digits
fn digits(field: &str) -> Option<u16> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl FromStr for Date {
    type Err = PlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlistError::InvalidDate(s.to_owned());
        let b = s.as_bytes();
        let separators = [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':'), (19, b'Z')];
        if b.len() != 20 || separators.iter().any(|&(i, c)| b[i] != c) {
            return Err(invalid());
        }
        let field = |start: usize, end: usize| digits(&s[start..end]).ok_or_else(invalid);

        let year = field(0, 4)?;
        let month = field(5, 7)? as u8;
        let day = field(8, 10)? as u8;
        let hour = field(11, 13)? as u8;
        let minute = field(14, 16)? as u8;
        let second = field(17, 19)? as u8;

        if !(1..=12).contains(&month)
            || day == 0
            || day > days_in_month(year, month)
            || hour > 23
            || minute > 59
            || second > 59
        {
            return Err(invalid());
        }
        Ok(Date {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_round_trip_text() {
        let date: Date = "2024-02-29T23:59:07Z".parse().unwrap();
        assert_eq!((date.year, date.month, date.day), (2024, 2, 29));
        assert_eq!(date.to_string(), "2024-02-29T23:59:07Z");
    }

    #[test]
    fn test_invalid_dates() {
        for text in [
            "2023-02-29T00:00:00Z",
            "2024-13-01T00:00:00Z",
            "2024-01-01 00:00:00Z",
            "2024-01-01T24:00:00Z",
            "2024-1-01T00:00:00Z",
            "2024-01-01T00:00:00",
            "+024-01-01T00:00:00Z",
        ] {
            assert!(text.parse::<Date>().is_err(), "{}", text);
        }
    }

    #[test]
    fn test_accessors() {
        let mut entries = BTreeMap::new();
        entries.insert("n".to_string(), Value::Integer(3));
        let dict = Value::Dictionary(entries);
        assert_eq!(dict.get("n").and_then(Value::as_i64), Some(3));
        assert_eq!(dict.get("n").and_then(Value::as_f64), Some(3.0));
        assert_eq!(dict.get("missing"), None);
        assert_eq!(Value::Boolean(true).as_str(), None);
    }
}
