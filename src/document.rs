//! A text buffer seen the way an editor sees it.
//!
//! Lines split on `\n` with a trailing `\r` dropped, so a file ending in a
//! newline has a final empty line. Columns count UTF-16 code units, the unit
//! editors report selections in.

use crate::error::Error;
use crate::selection::LineLengths;
use crate::types::{Coverage, ParsedLink, Position, Selection, SelectionType};

/// Lines of a document, ready for length queries and range extraction.
#[derive(Debug, Clone)]
pub struct Document {
    /// Line contents without terminators.
    lines: Vec<String>,
}

impl Document {
    /// Split `text` into editor lines.
    pub fn new(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| return line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        return Self { lines };
    }

    /// Number of lines, counting the empty line after a final newline.
    pub fn line_count(&self) -> u32 {
        return u32::try_from(self.lines.len()).unwrap_or(u32::MAX);
    }

    /// Contents of a zero-based line.
    pub fn line(&self, line: u32) -> Option<&str> {
        let index = usize::try_from(line).ok()?;
        return self.lines.get(index).map(String::as_str);
    }

    /// Verify every line and column a parsed link names exists here.
    ///
    /// Full-line selections are checked by line only.
    ///
    /// # Errors
    ///
    /// Returns `Error::LineOutOfRange` or `Error::ColumnOutOfRange`, with
    /// one-based coordinates.
    pub fn check(&self, parsed: &ParsedLink) -> Result<(), Error> {
        for selection in &parsed.selections.selections {
            self.check_position(selection.start, selection.coverage)?;
            self.check_position(selection.end, selection.coverage)?;
        }
        return Ok(());
    }

    /// Check one endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::LineOutOfRange` or `Error::ColumnOutOfRange`.
    fn check_position(&self, position: Position, coverage: Coverage) -> Result<(), Error> {
        let Some(length) = self.line_length(position.line) else {
            return Err(Error::LineOutOfRange {
                line: position.line.saturating_add(1),
                line_count: self.line_count(),
            });
        };
        if coverage == Coverage::PartialLine && position.character > length {
            return Err(Error::ColumnOutOfRange {
                character: position.character.saturating_add(1),
                line: position.line.saturating_add(1),
                line_length: length,
            });
        }
        return Ok(());
    }

    /// The text a parsed link refers to.
    ///
    /// Full lines come back whole, partial ranges from start column up to the
    /// (exclusive) end column, and column blocks one slice per line. Lines are
    /// joined with `\n`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Document::check`].
    pub fn extract(&self, parsed: &ParsedLink) -> Result<String, Error> {
        self.check(parsed)?;

        let selections = &parsed.selections.selections;
        let pieces: Vec<&str> = match parsed.selections.selection_type {
            SelectionType::Normal => match selections.first() {
                Some(selection) => self.extract_selection(selection),
                None => Vec::new(),
            },
            SelectionType::Rectangular => selections
                .iter()
                .filter_map(|s| return self.slice(s.start.line, s.start.character, Some(s.end.character)))
                .collect(),
        };
        return Ok(pieces.join("\n"));
    }

    /// Line pieces covered by a normal selection.
    fn extract_selection(&self, selection: &Selection) -> Vec<&str> {
        let start = selection.start;
        let end = selection.end;
        return (start.line..=end.line)
            .filter_map(|line| {
                return match selection.coverage {
                    Coverage::FullLine => self.line(line),
                    Coverage::PartialLine => {
                        let from = if line == start.line { start.character } else { 0 };
                        let to = (line == end.line).then_some(end.character);
                        self.slice(line, from, to)
                    },
                };
            })
            .collect();
    }

    /// Part of a line between UTF-16 columns, `to == None` meaning end of line.
    fn slice(&self, line: u32, from: u32, to: Option<u32>) -> Option<&str> {
        let text = self.line(line)?;
        let start = utf16_to_byte_offset(text, from);
        let end = to.map_or(text.len(), |column| return utf16_to_byte_offset(text, column));
        return text.get(start..end.max(start));
    }
}

impl LineLengths for Document {
    fn line_length(&self, line: u32) -> Option<u32> {
        let text = self.line(line)?;
        let units = text.chars().map(char::len_utf16).sum::<usize>();
        return Some(u32::try_from(units).unwrap_or(u32::MAX));
    }
}

/// Byte offset of a UTF-16 column, clamped to the end of the line.
/// A column inside a surrogate pair rounds up to the next character.
fn utf16_to_byte_offset(text: &str, column: u32) -> usize {
    let target = usize::try_from(column).unwrap_or(usize::MAX);
    let mut units: usize = 0;
    for (offset, c) in text.char_indices() {
        if units >= target {
            return offset;
        }
        units = units.saturating_add(c.len_utf16());
    }
    return text.len();
}
