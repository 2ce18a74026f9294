/// Core data model shared by the encoder, decoder, and normalizer.
use std::fmt;

use serde::Serialize;

use crate::delimiters::DelimiterConfig;

/// A zero-based line/character coordinate, matching editor convention.
/// Field order matters: positions order by line, then character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset within the line.
    pub character: u32,
}

impl Position {
    /// Build a position from zero-based line and character.
    pub const fn new(line: u32, character: u32) -> Self {
        return Self { line, character };
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.line, self.character);
    }
}

/// Whether a selection spans whole lines or a sub-range of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Coverage {
    /// Every selected line is covered from its first to its last character.
    FullLine,
    /// The selection starts or ends inside a line.
    PartialLine,
}

/// A normalized selection. Constructed by the normalizer or the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Line coverage classification.
    pub coverage: Coverage,
    /// Exclusive end position. For full-line selections only the line is meaningful.
    pub end: Position,
    /// Inclusive start position.
    pub start: Position,
}

impl Selection {
    /// Build a selection from its parts.
    pub const fn new(start: Position, end: Position, coverage: Coverage) -> Self {
        return Self { coverage, end, start };
    }

    /// A zero-width selection: a partial selection whose start and end coincide.
    ///
    /// Full-line selections always cover their lines, even an empty line.
    pub fn is_empty(&self) -> bool {
        return self.coverage == Coverage::PartialLine && self.start == self.end;
    }

    /// Start after end, by line or by character on the same line.
    pub const fn is_backward(&self) -> bool {
        return self.start.line > self.end.line
            || (self.start.line == self.end.line && self.start.character > self.end.character);
    }

    /// Whether this selection addresses the same text as `other` once rendered.
    ///
    /// Full-line selections compare by line bounds only; the text form never
    /// records their end character.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        if self.coverage != other.coverage
            || self.start.line != other.start.line
            || self.end.line != other.end.line
        {
            return false;
        }
        return match self.coverage {
            Coverage::FullLine => true,
            Coverage::PartialLine => {
                self.start.character == other.start.character
                    && self.end.character == other.end.character
            },
        };
    }
}

/// Normal selections use the primary caret only; rectangular selections are column blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SelectionType {
    /// One meaningful selection.
    Normal,
    /// Two or more selections sharing columns on consecutive lines.
    Rectangular,
}

/// The normalized input handed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSelection {
    /// Normal or rectangular.
    pub selection_type: SelectionType,
    /// Selections in ascending line order for rectangular input.
    pub selections: Vec<Selection>,
}

impl InputSelection {
    /// A single-selection normal input.
    pub fn normal(selection: Selection) -> Self {
        return Self {
            selection_type: SelectionType::Normal,
            selections: vec![selection],
        };
    }

    /// Whether two inputs render to the same range.
    ///
    /// Normal inputs compare their primary selection. Rectangular inputs compare
    /// line and column bounds, since the column form records explicit columns
    /// whatever each line's coverage was.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        if self.selection_type != other.selection_type {
            return false;
        }
        return match self.selection_type {
            SelectionType::Normal => match (self.selections.first(), other.selections.first()) {
                (Some(a), Some(b)) => a.is_equivalent(b),
                (None, None) => true,
                _ => false,
            },
            SelectionType::Rectangular => {
                self.selections.len() == other.selections.len()
                    && self
                        .selections
                        .iter()
                        .zip(&other.selections)
                        .all(|(a, b)| return a.start == b.start && a.end == b.end)
            },
        };
    }
}

/// Regular links rely on the reader's delimiter configuration; portable links embed theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkType {
    /// Decodable with a delimiter configuration supplied by the reader.
    Regular,
    /// Carries a self-describing delimiter suffix.
    Portable,
}

/// The encoder's output. Opaque to everything but the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedLink {
    /// The rendered link text.
    pub link: String,
    /// Which grammar produced it.
    pub link_type: LinkType,
}

impl fmt::Display for FormattedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.link);
    }
}

/// The decoder's output: enough to re-select the same range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLink {
    /// Grammar the candidate was written in.
    pub link_type: LinkType,
    /// Path portion preceding the hash token, verbatim.
    pub reference_path: String,
    /// Recovered range.
    pub selections: InputSelection,
    /// Delimiters embedded in a portable link, or those supplied for a regular one.
    pub source_delimiters: Option<DelimiterConfig>,
}

/// A RangeLink found inside a larger text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkMatch {
    /// One-based character column where the link text starts.
    pub column: u32,
    /// One-based line number of the match.
    pub line: u32,
    /// Decoded link.
    pub parsed: ParsedLink,
    /// The matched text, trimmed of surrounding punctuation.
    pub text: String,
}
