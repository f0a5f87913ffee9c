//! Core parsing primitives
//!
//! The building blocks the pull parser is assembled from:
//! - Scanner: buffered, markable byte source over a slice or a reader
//! - Entities: named and numeric reference decoding
//! - Error: error taxonomy and source locations

pub mod entities;
pub mod error;
pub mod html_entities;
pub mod scanner;
