//! icsedit Core Library
//!
//! This library provides a tolerant ICS engine: a structured parser with a
//! line-based fallback, a document model that keeps unknown structure, event
//! projection, mutation and a folding serializer.

pub mod calendar;
pub mod datetime;
pub mod document;
pub mod error;
pub mod escape;
pub mod fallback;
pub mod import;
pub mod mutation;
pub mod parser;
pub mod projector;
pub mod serializer;
pub mod source;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, ParseError, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        calendar::Calendar,
        document::{CalendarDocument, Component, PropertyValue},
        import::{ImportOutcome, import_ics},
        projector::{CategoryPicker, FixedCategory, RandomCategory},
        serializer::{Serializer, serialize},
        source::{CalendarSink, CalendarSource, FileSink, FileSource, TextSource, UrlSource, open_source},
        types::*,
    };
}
