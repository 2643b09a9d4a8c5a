use thiserror::Error;

/// 结构化解析失败的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input contains no calendar component")]
    Empty,

    #[error("line {line}: END:{found} does not close BEGIN:{expected}")]
    MismatchedEnd {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: END:{found} without matching BEGIN")]
    UnexpectedEnd { line: usize, found: String },

    #[error("component {kind} opened on line {line} is never closed")]
    Unterminated { line: usize, kind: String },

    #[error("top-level component is {0}, expected VCALENDAR")]
    NotACalendar(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Structured parse failed: {0}")]
    StructuredParse(#[from] ParseError),

    #[error("No events could be read from this file. Please check the file format and try again.")]
    NoEventsFound,

    #[error("Cannot decode {property} value '{value}'")]
    DateDecode { property: String, value: String },

    #[error("Event id already exists: {0}")]
    DuplicateId(String),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
