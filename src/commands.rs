use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rangelink::config::Config;
use rangelink::document::Document;
use rangelink::error::Error;
use rangelink::logging::TracingLogger;
use rangelink::scanner::{self, FoundLink};
use rangelink::selection::{LineLengths as _, RawSelection};
use rangelink::types::{Coverage, LinkType, ParsedLink, Position, SelectionType};

// ── Shared helpers ────────────────────────────────────────────────────

/// Load `.rangelink.toml` from the working directory, warning about fallbacks.
///
/// # Errors
///
/// Returns config loading errors.
fn load_config(root: &Path) -> Result<Config, Error> {
    let config = Config::load(root)?;
    for issue in &config.delimiter_issues {
        tracing::warn!(field = %issue.field, "delimiter {issue}; using default");
    }
    return Ok(config);
}

/// Read a file, mapping a missing file to `Error::FileNotFound`.
///
/// # Errors
///
/// Returns `Error::FileNotFound` or `Error::Io`.
fn read_document(path: &Path) -> Result<Document, Error> {
    return match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Io(e)),
        Ok(text) => Ok(Document::new(&text)),
    };
}

/// A one-based `LINE[:COLUMN]` coordinate, converted to zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    /// Zero-based column, if one was given.
    pub character: Option<u32>,
    /// Zero-based line.
    pub line: u32,
}

/// Parse `LINE` or `LINE:COLUMN`, both one-based.
///
/// # Errors
///
/// Returns `Error::InvalidCoordinate` for non-numeric or zero parts.
pub fn parse_coordinate(input: &str) -> Result<Coordinate, Error> {
    let (line, character) = match input.split_once(':') {
        Some((line, column)) => (line, Some(column)),
        None => (input, None),
    };
    let line = parse_one_based(input, line)?;
    let character = character.map(|c| return parse_one_based(input, c)).transpose()?;
    return Ok(Coordinate { character, line });
}

/// Parse a one-based number into its zero-based value.
///
/// # Errors
///
/// Returns `Error::InvalidCoordinate` if `part` is not a positive integer.
fn parse_one_based(input: &str, part: &str) -> Result<u32, Error> {
    let invalid = |reason| {
        return Error::InvalidCoordinate {
            input: input.to_string(),
            reason,
        };
    };
    let value: u32 = part.parse().map_err(|_err| return invalid("not a positive integer"))?;
    return value.checked_sub(1).ok_or_else(|| return invalid("lines and columns start at 1"));
}

// ── link ──────────────────────────────────────────────────────────────

/// Options for `rangelink link`.
#[derive(Debug)]
pub struct LinkRequest {
    /// Optional end coordinate; defaults to the end of the start line.
    pub end: Option<Coordinate>,
    /// Print JSON instead of the bare link.
    pub json: bool,
    /// Reference path, as it should appear in the link.
    pub path: String,
    /// Append the portable delimiter suffix.
    pub portable: bool,
    /// Treat the range as a column block.
    pub rectangular: bool,
    /// Start coordinate.
    pub start: Coordinate,
}

/// Build a link for a range of a file on disk.
///
/// # Errors
///
/// Returns file, coordinate, selection, or encoding errors.
pub fn cmd_link(request: &LinkRequest) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = load_config(&root)?;
    let document = read_document(&root.join(&request.path))?;

    let raw = raw_selections(&document, request)?;
    let input = rangelink::normalize(&document, &raw, &TracingLogger)?;
    let link_type = if request.portable { LinkType::Portable } else { LinkType::Regular };
    let link = rangelink::encode(&request.path, &input, &config.delimiters, link_type)?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&link)?);
    } else {
        println!("{link}");
    }
    return Ok(ExitCode::SUCCESS);
}

/// Turn command-line coordinates into editor-style selections.
///
/// A start without a column begins at column 1; an end without a column runs
/// to the end of its line. Column blocks need explicit columns.
///
/// # Errors
///
/// Returns `Error::LineOutOfRange` for lines past the end of the file and
/// `Error::InvalidCoordinate` for a column block without columns.
fn raw_selections(document: &Document, request: &LinkRequest) -> Result<Vec<RawSelection>, Error> {
    let start = request.start;
    let end = request.end.unwrap_or(Coordinate { character: None, line: start.line });
    for line in [start.line, end.line] {
        if document.line_length(line).is_none() {
            return Err(Error::LineOutOfRange {
                line: line.saturating_add(1),
                line_count: document.line_count(),
            });
        }
    }

    if request.rectangular {
        let (Some(from), Some(to)) = (start.character, end.character) else {
            return Err(Error::InvalidCoordinate {
                input: format!("{}..{}", start.line.saturating_add(1), end.line.saturating_add(1)),
                reason: "a column block needs a column on both ends",
            });
        };
        let (first, last) = (start.line.min(end.line), start.line.max(end.line));
        return Ok((first..=last)
            .map(|line| return RawSelection::new(Position::new(line, from), Position::new(line, to)))
            .collect());
    }

    let start_position = Position::new(start.line, start.character.unwrap_or(0));
    let end_character = match end.character {
        Some(character) => character,
        None => document.line_length(end.line).unwrap_or(0),
    };
    let end_position = Position::new(end.line, end_character);
    return Ok(vec![RawSelection::new(start_position, end_position)]);
}

// ── parse / show ──────────────────────────────────────────────────────

/// Decode a candidate with the configured delimiters, or fail if it is not a link.
///
/// # Errors
///
/// Returns `Error::NotARangeLink`, `Error::MalformedRange`, or config errors.
fn decode_or_fail(root: &Path, candidate: &str) -> Result<ParsedLink, Error> {
    let config = load_config(root)?;
    let parsed = rangelink::decode(candidate, Some(&config.delimiters))?;
    return parsed.ok_or_else(|| {
        return Error::NotARangeLink {
            candidate: candidate.to_string(),
            expected: format!("{}{}", config.delimiters.hash(), config.delimiters.line()),
        };
    });
}

/// Print the structure of a RangeLink.
///
/// # Errors
///
/// Returns decoding or serialization errors.
pub fn cmd_parse(candidate: &str, json: bool) -> Result<ExitCode, Error> {
    let parsed = decode_or_fail(Path::new("."), candidate)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("path:      {}", parsed.reference_path);
    println!("link type: {:?}", parsed.link_type);
    println!("selection: {:?}", parsed.selections.selection_type);
    for selection in &parsed.selections.selections {
        let start = selection.start;
        let end = selection.end;
        match selection.coverage {
            Coverage::FullLine => println!(
                "  lines {}-{} (full)",
                start.line.saturating_add(1),
                end.line.saturating_add(1)
            ),
            Coverage::PartialLine => println!(
                "  {}:{} to {}:{}",
                start.line.saturating_add(1),
                start.character.saturating_add(1),
                end.line.saturating_add(1),
                end.character.saturating_add(1)
            ),
        }
    }
    if let Some(delimiters) = &parsed.source_delimiters
        && parsed.link_type == LinkType::Portable
    {
        println!(
            "delimiters: line `{}`, position `{}`, hash `{}`, range `{}`",
            delimiters.line(),
            delimiters.position(),
            delimiters.hash(),
            delimiters.range()
        );
    }
    return Ok(ExitCode::SUCCESS);
}

/// Print the text a RangeLink refers to.
///
/// # Errors
///
/// Returns decoding, file, or bounds errors.
pub fn cmd_show(candidate: &str) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let parsed = decode_or_fail(&root, candidate)?;
    let document = read_document(&root.join(&parsed.reference_path))?;
    println!("{}", document.extract(&parsed)?);
    return Ok(ExitCode::SUCCESS);
}

// ── validate ──────────────────────────────────────────────────────────

/// Validate the configured delimiters, reporting every issue.
///
/// # Errors
///
/// Returns `Error::InvalidDelimiters` listing all issues, or config errors.
pub fn cmd_validate() -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    if !config.delimiter_issues.is_empty() {
        return Err(Error::InvalidDelimiters {
            issues: config.delimiter_issues,
        });
    }

    let d = &config.delimiters;
    println!(
        "Delimiters valid: line `{}`, position `{}`, hash `{}`, range `{}`",
        d.line(),
        d.position(),
        d.hash(),
        d.range()
    );
    return Ok(ExitCode::SUCCESS);
}

// ── check ─────────────────────────────────────────────────────────────

/// Scan markdown for RangeLinks and verify each one's target and range.
///
/// # Errors
///
/// Returns errors from config loading or scanning. Broken links are reported,
/// not returned.
pub fn cmd_check() -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = load_config(&root)?;
    let grouped = scanner::scan(&root, &config)?;

    let mut total = 0usize;
    let mut broken = 0usize;
    for (target, links) in &grouped {
        total = total.saturating_add(links.len());
        let document = match read_document(&root.join(target)) {
            Ok(document) => document,
            Err(e) => {
                broken = broken.saturating_add(links.len());
                for link in links {
                    print_broken(link, &e);
                }
                continue;
            },
        };
        for link in links {
            if let Err(e) = document.check(&link.found.parsed) {
                broken = broken.saturating_add(1);
                print_broken(link, &e);
            }
        }
    }

    if broken > 0 {
        println!("{broken} of {total} links broken");
        return Ok(ExitCode::from(1));
    }
    println!("All {total} links valid");
    return Ok(ExitCode::SUCCESS);
}

/// One line per broken link: where it is, what it says, why it is broken.
fn print_broken(link: &FoundLink, reason: &Error) {
    let kind = match link.found.parsed.selections.selection_type {
        SelectionType::Normal => "",
        SelectionType::Rectangular => " (column block)",
    };
    println!(
        "BROKEN  {}:{}:{}  {}{kind}  ({reason})",
        link.source.display(),
        link.found.line,
        link.found.column,
        link.found.text
    );
}
