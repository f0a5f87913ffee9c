//! XML Property Lists
//!
//! Value-tree interpreter for Apple-style `.plist` documents built on the
//! pull parser.

pub mod parser;
pub mod value;

pub use parser::{parse_plist, read_plist};
pub use value::{Date, Value};

use crate::core::error::XmlError;

/// Property list interpretation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlistError {
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),
    #[error("unexpected text {0:?}")]
    UnexpectedText(String),
    #[error("expected <key>, found <{0}>")]
    ExpectedKey(String),
    #[error("key {0:?} has no value")]
    MissingValue(String),
    #[error("invalid integer {0:?}")]
    InvalidInteger(String),
    #[error("invalid real {0:?}")]
    InvalidReal(String),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("document contains no value")]
    Empty,
}
