/// Crate-level error types for rangelink.
use std::path::PathBuf;

use crate::delimiters::DelimiterIssue;
use crate::types::Position;

/// Every failure carries enough context to explain itself without a debugger.
///
/// Variants fall into three families: configuration (`InvalidDelimiters`,
/// `TomlDe`), selection input (`NoSelection` through `SelectionOutOfBounds`),
/// and link format (`DelimitersRequired`, `MalformedRange`). The rest come
/// from the command-line surface.
#[allow(clippy::error_impl_error, reason = "crate error type, re-exported as rangelink::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Start lies after end.
    #[error("backward selection: start {start} is after end {end}")]
    BackwardSelection {
        /// Zero-based end position.
        end: Position,
        /// Zero-based start position.
        start: Position,
    },

    /// A link's column lies beyond the end of its line.
    #[error("column {character} is past the end of line {line} ({line_length} characters)")]
    ColumnOutOfRange {
        /// One-based column.
        character: u32,
        /// One-based line number.
        line: u32,
        /// Length of that line.
        line_length: u32,
    },

    /// A regular link was decoded without an active delimiter configuration.
    #[error("delimiters required to decode a regular link")]
    DelimitersRequired,

    /// The reference path is empty.
    #[error("empty reference path")]
    EmptyPath,

    /// A referenced file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A command-line coordinate could not be parsed.
    #[error("invalid coordinate `{input}`: {reason}")]
    InvalidCoordinate {
        /// The text as given.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The delimiter configuration failed validation.
    #[error("invalid delimiters: {}", issues.iter().map(|i| return i.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidDelimiters {
        /// Every issue found, in validation order.
        issues: Vec<DelimiterIssue>,
    },

    /// A selection marked rectangular does not form a column block.
    #[error("invalid rectangular selection: {reason}")]
    InvalidRectangularSelection {
        /// Which part of the block invariant failed.
        reason: &'static str,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// A link refers to a line the file does not have.
    #[error("line {line} is past the end of the file ({line_count} lines)")]
    LineOutOfRange {
        /// One-based line number.
        line: u32,
        /// Number of lines in the file.
        line_count: u32,
    },

    /// The candidate commits to the link grammar but does not follow it.
    #[error("malformed range in `{candidate}`: {reason}")]
    MalformedRange {
        /// The text being decoded.
        candidate: String,
        /// What did not parse.
        reason: &'static str,
    },

    /// The reference path ends with the hash character, so its link would not read back.
    #[error("path `{path}` ends with the hash delimiter `{hash}`")]
    PathEndsWithHash {
        /// Hash delimiter in effect.
        hash: String,
        /// The rejected path.
        path: String,
    },

    /// No selections were supplied.
    #[error("no selection")]
    NoSelection,

    /// The text is not a RangeLink at all.
    #[error("not a RangeLink: `{candidate}`")]
    NotARangeLink {
        /// The text that was tried.
        candidate: String,
        /// Hash and line tokens a link must contain, e.g. `#L`.
        expected: String,
    },

    /// Every supplied selection is zero-width.
    #[error("selection is empty")]
    SelectionEmpty,

    /// A selection references a line the document no longer has.
    #[error("selection references line {line}, which no longer exists; reselect and try again")]
    SelectionOutOfBounds {
        /// Zero-based line that could not be read.
        line: u32,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
