use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::delimiters::DelimiterIssue;
use crate::error::Error;

/// Bold on.
const BOLD: &str = "\x1b[1m";
/// Attributes off.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::InvalidDelimiters { issues } => render_delimiter_issues(issues),
        Error::SelectionOutOfBounds { line } => render_out_of_bounds(*line),
        Error::MalformedRange { candidate, reason } => render_malformed(candidate, reason),
        Error::NotARangeLink { candidate, expected } => render_not_a_link(candidate, expected),
        Error::BackwardSelection { start, end } => format!(
            "\
# Error: Backward Selection

The range starts at {start} and ends at {end} (zero-based line:column).

## Fix

Give the start before the end.
"
        ),
        Error::LineOutOfRange { line, line_count } => format!(
            "\
# Error: Line Out Of Range

Line {line} does not exist; the file has {line_count} lines.
"
        ),
        Error::ColumnOutOfRange { character, line, line_length } => format!(
            "\
# Error: Column Out Of Range

Column {character} is past the end of line {line}, which has {line_length} characters.
"
        ),
        _ => render_generic(e),
    };
}

/// Variants with a fixed explanation.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::NoSelection => "\
# Error: No Selection

Nothing was selected, so there is nothing to link to.
"
        .to_string(),

        Error::SelectionEmpty => "\
# Error: Empty Selection

The selection is zero-width. Give an end position, or omit the column to link whole lines.
"
        .to_string(),

        Error::DelimitersRequired => "\
# Error: Delimiters Required

A regular RangeLink can only be read with a delimiter configuration.
Portable links (ending in `~#~L~-~C~` or similar) carry their own.
"
        .to_string(),

        Error::EmptyPath => "\
# Error: Empty Path

A RangeLink needs a file path before the hash.
"
        .to_string(),

        Error::PathEndsWithHash { hash, path } => format!(
            "\
# Error: Path Ends With Hash

`{path}` ends with `{hash}`, so its link would read back as a column block on a
shorter path.

## Fix

Link through another path to the same file, or choose a different `hash` in
`{CONFIG_FILE}`.
"
        ),

        Error::FileNotFound { path } => format!(
            "\
# Error: File Not Found

`{}` does not exist.
",
            path.display()
        ),

        Error::InvalidCoordinate { input, reason } => format!(
            "\
# Error: Invalid Coordinate

`{input}`: {reason}.

Coordinates are one-based `LINE` or `LINE:COLUMN`, for example `10` or `10:5`.
"
        ),

        Error::InvalidRectangularSelection { reason } => format!(
            "\
# Error: Invalid Column Block

{reason}.
"
        ),

        Error::TomlDe(e) => format!(
            "\
# Error: Invalid TOML

{e}

## Fix

Correct `{CONFIG_FILE}`, or delete it to use the defaults.
"
        ),

        // Already handled in render_error, but need exhaustive match.
        _ => format!(
            "\
# Error

{e}
"
        ),
    };
}

/// List every delimiter issue with the key to change.
fn render_delimiter_issues(issues: &[DelimiterIssue]) -> String {
    let mut out = String::from("# Error: Invalid Delimiters\n\n");
    for issue in issues {
        let _ = writeln!(out, "- `{}` {}", issue.field, issue.kind.describe());
    }
    let _ = write!(
        out,
        "\
\n## Fix

Edit the `[delimiters]` table in `{CONFIG_FILE}`. Invalid fields fall back to
their defaults (`L`, `C`, `#`, `-`) until corrected.
"
    );
    return out;
}

/// The document changed under the selection.
fn render_out_of_bounds(line: u32) -> String {
    return format!(
        "\
# Error: Selection Out Of Bounds

Line {line} (zero-based) no longer exists; the document was modified.

## Fix

Reselect and try again.
"
    );
}

/// The candidate looked like a RangeLink but did not parse.
fn render_malformed(candidate: &str, reason: &str) -> String {
    return format!(
        "\
# Error: Malformed RangeLink

`{candidate}`: {reason}.

## Expected

    path#L10
    path#L10-L20
    path#L10C5-L12C3
    path##L10C5-L12C3
"
    );
}

/// The candidate is not a RangeLink under the active delimiters.
fn render_not_a_link(candidate: &str, expected: &str) -> String {
    return format!(
        "\
# Error: Not A RangeLink

`{candidate}` has no `{expected}<line>` range after a path.
"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiters::{DelimiterErrorKind, DelimiterField};

    #[test]
    fn delimiter_issues_listed_together() {
        let rendered = render_error(&Error::InvalidDelimiters {
            issues: vec![
                DelimiterIssue { field: DelimiterField::Line, kind: DelimiterErrorKind::Empty },
                DelimiterIssue { field: DelimiterField::Range, kind: DelimiterErrorKind::NotUnique },
            ],
        });
        assert!(rendered.starts_with("# Error: Invalid Delimiters"));
        assert!(rendered.contains("- `line` must not be empty"));
        assert!(rendered.contains("- `range` must differ"));
    }

    #[test]
    fn malformed_shows_candidate_and_reason() {
        let rendered = render_error(&Error::MalformedRange {
            candidate: "a.rs#L0".to_string(),
            reason: "coordinates are one-based with no leading zeros",
        });
        assert!(rendered.contains("`a.rs#L0`: coordinates are one-based"));
    }

    #[test]
    fn not_a_link_names_active_tokens() {
        let rendered = render_error(&Error::NotARangeLink {
            candidate: "a.rs#L3".to_string(),
            expected: "!Line".to_string(),
        });
        assert!(rendered.contains("`a.rs#L3` has no `!Line<line>` range"));
        assert!(!rendered.contains("#L<line>"));
    }

    #[test]
    fn unknown_kind_still_renders() {
        let rendered = render_error(&Error::InvalidDelimiters {
            issues: vec![DelimiterIssue { field: DelimiterField::Hash, kind: DelimiterErrorKind::Unknown }],
        });
        assert!(rendered.contains("- `hash` is invalid"));
    }
}
