//! Parsing RangeLink text back into a path and a range.
//!
//! Decoding is speculative: callers hand it arbitrary editor text, so
//! "this is not a RangeLink" is `Ok(None)`, not an error. A candidate only
//! fails with `MalformedRange` once it has committed to the grammar by
//! following a hash with a line token and a digit.
//!
//! Delimiters are matched case-insensitively, which is why validation
//! rejects configurations that collide under case folding.

use crate::delimiters::{DelimiterConfig, RawDelimiters, chars_eq_ci};
use crate::encoder::PORTABLE_SEPARATOR;
use crate::error::Error;
use crate::types::{Coverage, InputSelection, LinkMatch, LinkType, ParsedLink, Position, Selection, SelectionType};

/// Decode a candidate string.
///
/// Portable links are decoded with their embedded delimiters and `active`
/// is ignored. Anything else is a regular link and needs `active`.
///
/// # Errors
///
/// Returns `Error::DelimitersRequired` when the candidate is not portable and
/// `active` is `None`, and `Error::MalformedRange` when the candidate starts
/// like a RangeLink but does not parse.
pub fn decode(candidate: &str, active: Option<&DelimiterConfig>) -> Result<Option<ParsedLink>, Error> {
    if let Some((body, embedded)) = split_portable_suffix(candidate) {
        return parse_body(candidate, body, embedded, LinkType::Portable);
    }
    let Some(delimiters) = active else {
        return Err(Error::DelimitersRequired);
    };
    return parse_body(candidate, candidate, delimiters.clone(), LinkType::Regular);
}

/// Find every RangeLink in free text, such as a markdown document.
///
/// Text is split on whitespace and bracket or quote characters, and each
/// piece loses trailing characters that cannot end a link (links end in a
/// digit, or `~` when portable). Pieces that fail to decode are skipped.
pub fn find_links(text: &str, delimiters: &DelimiterConfig) -> Vec<LinkMatch> {
    let mut found = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = u32::try_from(index).map_or(u32::MAX, |n| return n.saturating_add(1));
        for (column, token) in split_tokens(line) {
            let trimmed = token.trim_end_matches(|c: char| return !(c.is_ascii_digit() || c == PORTABLE_SEPARATOR));
            let Ok(Some(parsed)) = decode(trimmed, Some(delimiters)) else {
                continue;
            };
            found.push(LinkMatch {
                column,
                line: line_number,
                parsed,
                text: trimmed.to_string(),
            });
        }
    }
    return found;
}

/// Characters that end a token in free text.
fn is_token_boundary(c: char) -> bool {
    return c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '<' | '>' | '{' | '}' | '"' | '\'' | '`');
}

/// Split a line into tokens with their one-based character columns.
fn split_tokens(line: &str) -> Vec<(u32, &str)> {
    let mut tokens = Vec::new();
    let mut start: Option<(usize, u32)> = None;
    let mut column: u32 = 0;

    for (offset, c) in line.char_indices() {
        column = column.saturating_add(1);
        if is_token_boundary(c) {
            if let Some((begin, begin_column)) = start.take()
                && let Some(token) = line.get(begin..offset)
            {
                tokens.push((begin_column, token));
            }
        } else if start.is_none() {
            start = Some((offset, column));
        }
    }
    if let Some((begin, begin_column)) = start
        && let Some(token) = line.get(begin..)
    {
        tokens.push((begin_column, token));
    }
    return tokens;
}

/// Split `<body>~<hash>~<line>~<range>~<position>~` into body and validated delimiters.
///
/// Returns `None` when the suffix is absent or its delimiters are invalid;
/// such text is then treated as a regular candidate.
fn split_portable_suffix(candidate: &str) -> Option<(&str, DelimiterConfig)> {
    let inner = candidate.strip_suffix(PORTABLE_SEPARATOR)?;
    let mut parts = inner.rsplitn(5, PORTABLE_SEPARATOR);
    let position = parts.next()?;
    let range = parts.next()?;
    let line = parts.next()?;
    let hash = parts.next()?;
    let body = parts.next()?;
    if [body, hash, line, range, position].iter().any(|part| return part.is_empty()) {
        return None;
    }
    let config = DelimiterConfig::new(&RawDelimiters::new(line, position, hash, range)).ok()?;
    return Some((body, config));
}

/// Parse `<path><hash>[<hash>]<range>` with the given delimiters.
///
/// # Errors
///
/// Returns `Error::MalformedRange` once the body has committed to the grammar.
fn parse_body(
    candidate: &str,
    body: &str,
    delimiters: DelimiterConfig,
    link_type: LinkType,
) -> Result<Option<ParsedLink>, Error> {
    let Some(hash) = delimiters.hash().chars().next() else {
        return Ok(None);
    };

    // From the right: paths may contain the hash character, ranges never do.
    let Some((hash_offset, _)) = body.char_indices().rev().find(|(_, c)| return chars_eq_ci(*c, hash)) else {
        return Ok(None);
    };
    let Some((prefix, hash_and_fragment)) = body.split_at_checked(hash_offset) else {
        return Ok(None);
    };
    let fragment = skip_first_char(hash_and_fragment);

    let (reference_path, selection_type) = match strip_last_char_if(prefix, hash) {
        Some(path) => (path, SelectionType::Rectangular),
        None => (prefix, SelectionType::Normal),
    };
    if reference_path.is_empty() || !commits_to_grammar(fragment, &delimiters) {
        return Ok(None);
    }

    let mut scanner = Scanner { candidate, delimiters: &delimiters, rest: fragment };
    let (start, end) = scanner.range()?;
    let selections = match selection_type {
        SelectionType::Normal => build_normal(&scanner, start, end)?,
        SelectionType::Rectangular => build_rectangular(&scanner, start, end)?,
    };

    return Ok(Some(ParsedLink {
        link_type,
        reference_path: reference_path.to_string(),
        selections,
        source_delimiters: Some(delimiters),
    }));
}

/// A fragment commits to the grammar with `<LINE><digit>`.
fn commits_to_grammar(fragment: &str, delimiters: &DelimiterConfig) -> bool {
    return strip_prefix_ci(fragment, delimiters.line())
        .and_then(|rest| return rest.chars().next())
        .is_some_and(|c| return c.is_ascii_digit());
}

/// One side of a range, zero-based.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    /// Column, when the text carried one.
    character: Option<u32>,
    /// Line.
    line: u32,
}

/// Left-to-right scanner over the range fragment.
struct Scanner<'a> {
    /// Full candidate, for error context.
    candidate: &'a str,
    /// Active tokens.
    delimiters: &'a DelimiterConfig,
    /// Unconsumed input.
    rest: &'a str,
}

impl Scanner<'_> {
    /// `<LINE>n[<POSITION>m][<RANGE><LINE>n[<POSITION>m]]` to the end of input.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedRange` on any deviation.
    fn range(&mut self) -> Result<(Endpoint, Option<Endpoint>), Error> {
        let delimiters = self.delimiters;
        let start = self.endpoint()?;
        if self.rest.is_empty() {
            return Ok((start, None));
        }
        if !self.eat(delimiters.range()) {
            return Err(self.malformed("expected range delimiter"));
        }
        let end = self.endpoint()?;
        if !self.rest.is_empty() {
            return Err(self.malformed("unexpected characters after range"));
        }
        return Ok((start, Some(end)));
    }

    /// `<LINE>n[<POSITION>m]`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedRange` if the line token or a number is missing.
    fn endpoint(&mut self) -> Result<Endpoint, Error> {
        let delimiters = self.delimiters;
        if !self.eat(delimiters.line()) {
            return Err(self.malformed("expected line delimiter"));
        }
        let line = self.number("expected line number")?;
        let character = if self.eat(delimiters.position()) {
            Some(self.number("expected column number")?)
        } else {
            None
        };
        return Ok(Endpoint { character, line });
    }

    /// Consume `token` if the input starts with it, ignoring case.
    fn eat(&mut self, token: &str) -> bool {
        let Some(rest) = strip_prefix_ci(self.rest, token) else {
            return false;
        };
        self.rest = rest;
        return true;
    }

    /// Consume a one-based decimal and return it zero-based.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedRange` for missing digits, zero, leading
    /// zeros, or values that do not fit.
    fn number(&mut self, missing: &'static str) -> Result<u32, Error> {
        let len = self.rest.bytes().take_while(u8::is_ascii_digit).count();
        let Some((digits, rest)) = self.rest.split_at_checked(len) else {
            return Err(self.malformed(missing));
        };
        if digits.is_empty() {
            return Err(self.malformed(missing));
        }
        if digits.starts_with('0') {
            return Err(self.malformed("coordinates are one-based with no leading zeros"));
        }
        let zero_based = digits
            .parse::<u64>()
            .ok()
            .and_then(|n| return n.checked_sub(1))
            .and_then(|n| return u32::try_from(n).ok());
        let Some(value) = zero_based else {
            return Err(self.malformed("coordinate out of range"));
        };
        self.rest = rest;
        return Ok(value);
    }

    /// Build a `MalformedRange` for the current candidate.
    fn malformed(&self, reason: &'static str) -> Error {
        return Error::MalformedRange {
            candidate: self.candidate.to_string(),
            reason,
        };
    }
}

/// Recover a normal selection from its endpoints.
///
/// # Errors
///
/// Returns `Error::MalformedRange` for backward ranges or mixed forms.
fn build_normal(scanner: &Scanner<'_>, start: Endpoint, end: Option<Endpoint>) -> Result<InputSelection, Error> {
    let selection = match (start.character, end) {
        (None, None) => full_lines(start.line, start.line),
        (None, Some(Endpoint { character: None, line })) => {
            if line < start.line {
                return Err(scanner.malformed("range ends before it starts"));
            }
            full_lines(start.line, line)
        },
        (Some(character), None) => {
            let at = Position::new(start.line, character);
            Selection::new(at, at, Coverage::PartialLine)
        },
        (Some(start_character), Some(Endpoint { character: Some(end_character), line })) => {
            let selection = Selection::new(
                Position::new(start.line, start_character),
                Position::new(line, end_character),
                Coverage::PartialLine,
            );
            if selection.is_backward() {
                return Err(scanner.malformed("range ends before it starts"));
            }
            selection
        },
        (None, Some(_)) | (Some(_), Some(_)) => {
            return Err(scanner.malformed("both ends must use the same form"));
        },
    };
    return Ok(InputSelection::normal(selection));
}

/// Expand a column block into one selection per line.
///
/// # Errors
///
/// Returns `Error::MalformedRange` unless both ends carry columns, the block
/// spans two or more lines, and the columns are in order.
fn build_rectangular(
    scanner: &Scanner<'_>,
    start: Endpoint,
    end: Option<Endpoint>,
) -> Result<InputSelection, Error> {
    let (Some(start_character), Some(Endpoint { character: Some(end_character), line: end_line })) =
        (start.character, end)
    else {
        return Err(scanner.malformed("column block needs a column on both ends"));
    };
    if end_line <= start.line {
        return Err(scanner.malformed("column block needs at least two lines"));
    }
    if end_character < start_character {
        return Err(scanner.malformed("column block ends before it starts"));
    }

    let selections = (start.line..=end_line)
        .map(|line| {
            return Selection::new(
                Position::new(line, start_character),
                Position::new(line, end_character),
                Coverage::PartialLine,
            );
        })
        .collect();
    return Ok(InputSelection {
        selection_type: SelectionType::Rectangular,
        selections,
    });
}

/// A full-line selection; the text form carries no characters.
const fn full_lines(start: u32, end: u32) -> Selection {
    return Selection::new(Position::new(start, 0), Position::new(end, 0), Coverage::FullLine);
}

/// `str::strip_prefix`, ignoring case.
fn strip_prefix_ci<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    let mut chars = text.chars();
    for expected in token.chars() {
        let actual = chars.next()?;
        if !chars_eq_ci(actual, expected) {
            return None;
        }
    }
    return Some(chars.as_str());
}

/// Drop the first character.
fn skip_first_char(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    return chars.as_str();
}

/// Drop the last character if it matches `c`, ignoring case.
fn strip_last_char_if(text: &str, c: char) -> Option<&str> {
    let mut chars = text.chars();
    let last = chars.next_back()?;
    return chars_eq_ci(last, c).then_some(chars.as_str());
}
