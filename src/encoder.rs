//! Rendering of normalized selections as RangeLink text.
//!
//! Coordinates are zero-based in the model and one-based in text. The shape
//! is chosen from the selection type and coverage:
//!
//! | type        | coverage    | lines  | shape                    |
//! |-------------|-------------|--------|--------------------------|
//! | normal      | full line   | single | `path#L3`                |
//! | normal      | full line   | multi  | `path#L3-L7`             |
//! | normal      | partial     | any    | `path#L3C2-L7C9`         |
//! | rectangular | any         | multi  | `path##L3C2-L7C9`        |
//!
//! Portable links append `~<hash>~<line>~<range>~<position>~` so they can be
//! decoded without the producer's configuration.

use std::fmt::Write as _;

use crate::delimiters::DelimiterConfig;
use crate::error::Error;
use crate::types::{Coverage, FormattedLink, InputSelection, LinkType, Selection, SelectionType};

/// Separator around portable suffix fields. Reserved, so no delimiter can contain it.
pub const PORTABLE_SEPARATOR: char = '~';

/// Render a link for `reference_path` covering `input`.
///
/// # Errors
///
/// Returns `Error::EmptyPath` for an empty path, `Error::PathEndsWithHash`
/// when the path's last character is the hash, `Error::NoSelection` when
/// `input` has no selections, `Error::SelectionEmpty` when the rendered
/// selections are all zero-width, `Error::BackwardSelection` when one ends
/// before it starts, and `Error::InvalidRectangularSelection` when a
/// rectangular input is not a column block. Normal inputs are checked on
/// their primary selection only.
pub fn encode(
    reference_path: &str,
    input: &InputSelection,
    delimiters: &DelimiterConfig,
    link_type: LinkType,
) -> Result<FormattedLink, Error> {
    if reference_path.is_empty() {
        return Err(Error::EmptyPath);
    }
    if delimiters.ends_with_hash(reference_path) {
        return Err(Error::PathEndsWithHash {
            hash: delimiters.hash().to_string(),
            path: reference_path.to_string(),
        });
    }
    let Some(primary) = input.selections.first() else {
        return Err(Error::NoSelection);
    };
    // Normal links render the primary only; secondaries are not checked.
    let rendered = match input.selection_type {
        SelectionType::Normal => std::slice::from_ref(primary),
        SelectionType::Rectangular => input.selections.as_slice(),
    };
    if rendered.iter().all(Selection::is_empty) {
        return Err(Error::SelectionEmpty);
    }
    if let Some(backward) = rendered.iter().find(|s| return s.is_backward()) {
        return Err(Error::BackwardSelection {
            end: backward.end,
            start: backward.start,
        });
    }

    let mut link = String::from(reference_path);
    match input.selection_type {
        SelectionType::Normal => render_normal(&mut link, primary, delimiters),
        SelectionType::Rectangular => render_rectangular(&mut link, &input.selections, delimiters)?,
    }

    if link_type == LinkType::Portable {
        append_portable_suffix(&mut link, delimiters);
    }

    return Ok(FormattedLink { link, link_type });
}

/// Render a single normal selection after the path.
fn render_normal(out: &mut String, selection: &Selection, delimiters: &DelimiterConfig) {
    out.push_str(delimiters.hash());

    let start = selection.start;
    let end = selection.end;
    match selection.coverage {
        Coverage::FullLine => {
            push_line(out, delimiters, start.line);
            if end.line != start.line {
                out.push_str(delimiters.range());
                push_line(out, delimiters, end.line);
            }
        },
        Coverage::PartialLine => {
            push_line_and_column(out, delimiters, start.line, start.character);
            out.push_str(delimiters.range());
            push_line_and_column(out, delimiters, end.line, end.character);
        },
    }
}

/// Render a column block with the doubled hash.
///
/// # Errors
///
/// Returns `Error::InvalidRectangularSelection` unless the selections share
/// their columns and sit on consecutive ascending lines.
fn render_rectangular(
    out: &mut String,
    selections: &[Selection],
    delimiters: &DelimiterConfig,
) -> Result<(), Error> {
    let (Some(first), Some(last)) = (selections.first(), selections.last()) else {
        return Err(Error::NoSelection);
    };
    if selections.len() < 2 {
        return Err(Error::InvalidRectangularSelection {
            reason: "a column block needs at least two lines",
        });
    }
    let columns_match = selections.iter().all(|s| {
        return s.start.character == first.start.character && s.end.character == first.end.character;
    });
    if !columns_match {
        return Err(Error::InvalidRectangularSelection {
            reason: "lines do not share the same columns",
        });
    }
    let consecutive = selections.windows(2).all(|pair| {
        return matches!(pair, [a, b] if a.start.line.checked_add(1) == Some(b.start.line));
    });
    if !consecutive {
        return Err(Error::InvalidRectangularSelection {
            reason: "lines are not consecutive and ascending",
        });
    }

    out.push_str(delimiters.hash());
    out.push_str(delimiters.hash());
    push_line_and_column(out, delimiters, first.start.line, first.start.character);
    out.push_str(delimiters.range());
    push_line_and_column(out, delimiters, last.start.line, first.end.character);
    return Ok(());
}

/// Append `<LINE><n>` with a one-based line.
fn push_line(out: &mut String, delimiters: &DelimiterConfig, line: u32) {
    out.push_str(delimiters.line());
    push_one_based(out, line);
}

/// Append `<LINE><n><POSITION><m>` with one-based line and column.
fn push_line_and_column(out: &mut String, delimiters: &DelimiterConfig, line: u32, character: u32) {
    push_line(out, delimiters, line);
    out.push_str(delimiters.position());
    push_one_based(out, character);
}

/// Append a zero-based coordinate as one-based decimal.
fn push_one_based(out: &mut String, zero_based: u32) {
    // Widen first so u32::MAX still renders.
    let _ = write!(out, "{}", u64::from(zero_based).saturating_add(1));
}

/// Append the self-describing delimiter suffix.
fn append_portable_suffix(out: &mut String, delimiters: &DelimiterConfig) {
    for token in [delimiters.hash(), delimiters.line(), delimiters.range(), delimiters.position()] {
        out.push(PORTABLE_SEPARATOR);
        out.push_str(token);
    }
    out.push(PORTABLE_SEPARATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiters::RawDelimiters;
    use crate::types::Position;

    fn full(start: (u32, u32), end: (u32, u32)) -> Selection {
        return Selection::new(Position::new(start.0, start.1), Position::new(end.0, end.1), Coverage::FullLine);
    }

    fn partial(start: (u32, u32), end: (u32, u32)) -> Selection {
        return Selection::new(
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
            Coverage::PartialLine,
        );
    }

    fn block(lines: std::ops::RangeInclusive<u32>, start: u32, end: u32) -> InputSelection {
        return InputSelection {
            selection_type: SelectionType::Rectangular,
            selections: lines.map(|line| partial((line, start), (line, end))).collect(),
        };
    }

    fn regular(path: &str, input: &InputSelection) -> String {
        return encode(path, input, &DelimiterConfig::default(), LinkType::Regular).unwrap().link;
    }

    #[test]
    fn single_full_line() {
        let input = InputSelection::normal(full((0, 0), (0, 19)));
        assert_eq!(regular("src/foo.ts", &input), "src/foo.ts#L1");
    }

    #[test]
    fn multi_line_full_range() {
        let input = InputSelection::normal(full((9, 0), (19, 0)));
        assert_eq!(regular("src/foo.ts", &input), "src/foo.ts#L10-L20");
    }

    #[test]
    fn single_line_partial() {
        let input = InputSelection::normal(partial((9, 4), (9, 15)));
        assert_eq!(regular("file.ts", &input), "file.ts#L10C5-L10C16");
    }

    #[test]
    fn multi_line_partial() {
        let input = InputSelection::normal(partial((2, 3), (6, 0)));
        assert_eq!(regular("a.rs", &input), "a.rs#L3C4-L7C1");
    }

    #[test]
    fn rectangular_doubles_hash() {
        assert_eq!(regular("file.ts", &block(1..=3, 5, 9)), "file.ts##L2C6-L4C10");
    }

    #[test]
    fn custom_delimiters_substituted_verbatim() {
        let delimiters = DelimiterConfig::new(&RawDelimiters::new("Line", "Pos", "@", "thru"));
        // `@` is reserved, so this configuration must be rejected.
        assert!(delimiters.is_err());

        let delimiters = DelimiterConfig::new(&RawDelimiters::new("Line", "Pos", "!", "thru")).unwrap();
        let input = InputSelection::normal(partial((0, 0), (1, 4)));
        let link = encode("x.py", &input, &delimiters, LinkType::Regular).unwrap();
        assert_eq!(link.link, "x.py!Line1Pos1thruLine2Pos5");

        let link = encode("x.py", &block(0..=1, 2, 3), &delimiters, LinkType::Regular).unwrap();
        assert_eq!(link.link, "x.py!!Line1Pos3thruLine2Pos4");
    }

    #[test]
    fn portable_appends_delimiter_suffix() {
        let input = InputSelection::normal(full((9, 0), (19, 0)));
        let link = encode("src/foo.ts", &input, &DelimiterConfig::default(), LinkType::Portable).unwrap();
        assert_eq!(link.link, "src/foo.ts#L10-L20~#~L~-~C~");
        assert_eq!(link.link_type, LinkType::Portable);
    }

    #[test]
    fn secondary_selections_ignored_for_normal() {
        let input = InputSelection {
            selection_type: SelectionType::Normal,
            selections: vec![full((4, 0), (4, 0)), partial((8, 1), (8, 2))],
        };
        assert_eq!(regular("a.rs", &input), "a.rs#L5");
    }

    #[test]
    fn secondary_selections_not_validated_for_normal() {
        let input = InputSelection {
            selection_type: SelectionType::Normal,
            selections: vec![partial((2, 1), (2, 6)), partial((9, 4), (7, 0))],
        };
        assert_eq!(regular("a.rs", &input), "a.rs#L3C2-L3C7");

        let input = InputSelection {
            selection_type: SelectionType::Normal,
            selections: vec![partial((4, 0), (4, 0)), partial((8, 1), (8, 2))],
        };
        let result = encode("a.rs", &input, &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::SelectionEmpty)));
    }

    #[test]
    fn full_line_with_matching_ends_is_not_empty() {
        // An empty line, or a full line as the decoder rebuilds it.
        let input = InputSelection::normal(full((6, 0), (6, 0)));
        assert_eq!(regular("a.rs", &input), "a.rs#L7");
    }

    #[test]
    fn path_ending_in_hash_rejected() {
        let result = encode("lang/C#", &block(1..=3, 0, 3), &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::PathEndsWithHash { ref path, .. }) if path == "lang/C#"));

        let letters = DelimiterConfig::new(&RawDelimiters::new("Line", "Pos", "A", "thru")).unwrap();
        let input = InputSelection::normal(full((0, 0), (0, 5)));
        let result = encode("db/schema", &input, &letters, LinkType::Portable);
        assert!(matches!(result, Err(Error::PathEndsWithHash { ref hash, .. }) if hash == "A"));

        assert_eq!(regular("lang/C#/intro.md", &input), "lang/C#/intro.md#L1");
    }

    #[test]
    fn empty_selection_list_rejected() {
        let input = InputSelection {
            selection_type: SelectionType::Normal,
            selections: Vec::new(),
        };
        let result = encode("a.rs", &input, &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::NoSelection)));
    }

    #[test]
    fn all_zero_width_rejected() {
        let input = InputSelection::normal(partial((3, 4), (3, 4)));
        let result = encode("a.rs", &input, &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::SelectionEmpty)));
    }

    #[test]
    fn backward_selection_rejected() {
        let input = InputSelection::normal(partial((5, 0), (3, 4)));
        let result = encode("a.rs", &input, &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::BackwardSelection { .. })));
    }

    #[test]
    fn empty_path_rejected() {
        let input = InputSelection::normal(full((0, 0), (0, 3)));
        let result = encode("", &input, &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::EmptyPath)));
    }

    #[test]
    fn gapped_block_rejected() {
        let input = InputSelection {
            selection_type: SelectionType::Rectangular,
            selections: vec![partial((1, 0), (1, 2)), partial((3, 0), (3, 2))],
        };
        let result = encode("a.rs", &input, &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::InvalidRectangularSelection { .. })));
    }

    #[test]
    fn single_line_block_rejected() {
        let result = encode("a.rs", &block(1..=1, 0, 2), &DelimiterConfig::default(), LinkType::Regular);
        assert!(matches!(result, Err(Error::InvalidRectangularSelection { .. })));
    }
}
