use thiserror::Error;

/// Errors which abort a subsetting run.
///
/// Per-table problems (an unknown subtable format, a table we have no
/// subsetter for) are not errors: the table is dropped with a log message
/// and the run continues.
#[derive(Debug, Error, PartialEq)]
pub enum SubsetError {
    #[error("Invalid glyph identifier: {0}")]
    InvalidGlyphToken(String),

    #[error("Invalid tag: '{0}'")]
    InvalidTag(String),

    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidOptionValue { option: String, value: String },

    #[error("Glyphs not found in font: {0:?}")]
    MissingGlyphs(Vec<String>),

    #[error("No default glyph for Unicode codepoints: {0:04X?}")]
    MissingUnicodes(Vec<u32>),

    #[error("Malformed charstring: {0}")]
    MalformedCharString(String),

    #[error("Subset invariant violated in '{table}': {msg}")]
    InvariantViolation { table: String, msg: String },
}

pub type Result<T, E = SubsetError> = std::result::Result<T, E>;
