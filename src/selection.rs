//! Normalization of editor-reported selections.
//!
//! Editors report selections with two quirks this module irons out: a
//! selection that includes a line terminator ends at character 0 of the
//! following line, and a column-block selection arrives as several unrelated
//! ranges. The output is an [`InputSelection`] the encoder can render directly.

use crate::error::Error;
use crate::logging::Logger;
use crate::types::{Coverage, InputSelection, Position, Selection, SelectionType};

/// Logging context for this module.
const CONTEXT: &str = "selection";

/// Caller-supplied view of the live document's line lengths.
pub trait LineLengths {
    /// Length of the zero-based `line`, or `None` if the document has no such line.
    fn line_length(&self, line: u32) -> Option<u32>;
}

/// A selection exactly as the editor reported it, ordered so start <= end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    /// Later of anchor and active.
    pub end: Position,
    /// Earlier of anchor and active.
    pub start: Position,
}

impl RawSelection {
    /// Build from the editor's anchor and active (cursor) positions, in either order.
    pub fn new(anchor: Position, active: Position) -> Self {
        if active < anchor {
            return Self { end: anchor, start: active };
        }
        return Self { end: active, start: anchor };
    }

    /// Ends at character 0 of a later line: the editor included the line terminator.
    const fn has_trailing_newline(&self) -> bool {
        return self.end.line > self.start.line && self.end.character == 0;
    }
}

/// Convert editor selections into the canonical model.
///
/// Two or more selections sharing their start and end characters on a run of
/// consecutive lines become one rectangular input. Anything else is normal
/// and only the first (primary) selection is kept.
///
/// # Errors
///
/// Returns `Error::NoSelection` for an empty slice, and
/// `Error::SelectionOutOfBounds` when a referenced line no longer exists in
/// the document (it changed while the selection was captured).
pub fn normalize(
    lines: &dyn LineLengths,
    raw: &[RawSelection],
    logger: &dyn Logger,
) -> Result<InputSelection, Error> {
    let Some(primary) = raw.first() else {
        return Err(Error::NoSelection);
    };

    if !is_rectangular(raw) {
        let selection = classify(lines, primary, logger)?;
        logger.debug(CONTEXT, &format!("normal selection, {} ignored", raw.len().saturating_sub(1)));
        return Ok(InputSelection::normal(selection));
    }

    let mut ordered = raw.to_vec();
    ordered.sort_by_key(|s| return s.start.line);
    let selections = ordered
        .iter()
        .map(|s| return classify(lines, s, logger))
        .collect::<Result<Vec<_>, _>>()?;

    logger.debug(CONTEXT, &format!("rectangular selection over {} lines", selections.len()));
    return Ok(InputSelection {
        selection_type: SelectionType::Rectangular,
        selections,
    });
}

/// Whether the selections form a column block.
pub fn is_rectangular(raw: &[RawSelection]) -> bool {
    let Some((first, rest)) = raw.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let same_columns = rest.iter().all(|s| {
        return s.start.character == first.start.character && s.end.character == first.end.character;
    });
    if !same_columns {
        return false;
    }

    let mut lines: Vec<u32> = raw.iter().map(|s| return s.start.line).collect();
    lines.sort_unstable();
    return lines
        .windows(2)
        .all(|pair| return matches!(pair, [a, b] if a.checked_add(1) == Some(*b)));
}

/// Classify coverage and apply trailing-newline normalization to one selection.
///
/// # Errors
///
/// Returns `Error::SelectionOutOfBounds` if either endpoint's line is missing.
fn classify(
    lines: &dyn LineLengths,
    raw: &RawSelection,
    logger: &dyn Logger,
) -> Result<Selection, Error> {
    line_length_or_out_of_bounds(lines, raw.start.line, logger)?;
    let end_length = line_length_or_out_of_bounds(lines, raw.end.line, logger)?;

    let trailing_newline = raw.has_trailing_newline();
    let full_line = raw.start.character == 0 && (raw.end.character >= end_length || trailing_newline);
    let coverage = if full_line { Coverage::FullLine } else { Coverage::PartialLine };

    let mut end = raw.end;
    if trailing_newline {
        end.line = end.line.saturating_sub(1);
    }

    return Ok(Selection::new(raw.start, end, coverage));
}

/// Query a line length, turning a missing line into a typed error.
///
/// # Errors
///
/// Returns `Error::SelectionOutOfBounds` if the document has no such line.
fn line_length_or_out_of_bounds(
    lines: &dyn LineLengths,
    line: u32,
    logger: &dyn Logger,
) -> Result<u32, Error> {
    return lines.line_length(line).ok_or_else(|| {
        logger.warn(CONTEXT, &format!("line {line} missing; document modified during selection"));
        return Error::SelectionOutOfBounds { line };
    });
}
