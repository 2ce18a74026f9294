//! Delimiter configuration and its validation.
//!
//! The four tokens are concatenated directly against coordinate digits
//! (`L10C5-L12C1`), so the rules here are what keeps the link grammar
//! unambiguous: no digits, no reserved path characters, pairwise distinct and
//! substring-free under case-insensitive comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default line token.
pub const DEFAULT_LINE: &str = "L";
/// Default position (column) token.
pub const DEFAULT_POSITION: &str = "C";
/// Default hash token.
pub const DEFAULT_HASH: &str = "#";
/// Default range token.
pub const DEFAULT_RANGE: &str = "-";

/// Characters reserved for paths and the portable suffix.
const RESERVED_CHARACTERS: [char; 7] = ['~', '|', '/', '\\', ':', ',', '@'];

/// Unvalidated delimiter strings, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDelimiters {
    /// Hash token separating path from range.
    pub hash: String,
    /// Line token.
    pub line: String,
    /// Position (column) token.
    pub position: String,
    /// Range token separating start from end.
    pub range: String,
}

impl RawDelimiters {
    /// Build raw delimiters from string slices.
    pub fn new(line: &str, position: &str, hash: &str, range: &str) -> Self {
        return Self {
            hash: hash.to_string(),
            line: line.to_string(),
            position: position.to_string(),
            range: range.to_string(),
        };
    }

    /// The value for one field.
    pub fn get(&self, field: DelimiterField) -> &str {
        return match field {
            DelimiterField::Line => &self.line,
            DelimiterField::Position => &self.position,
            DelimiterField::Hash => &self.hash,
            DelimiterField::Range => &self.range,
        };
    }

    /// Fields paired with their values, in validation order.
    fn fields(&self) -> [(DelimiterField, &str); 4] {
        return DelimiterField::ALL.map(|field| return (field, self.get(field)));
    }
}

impl Default for RawDelimiters {
    fn default() -> Self {
        return Self::new(DEFAULT_LINE, DEFAULT_POSITION, DEFAULT_HASH, DEFAULT_RANGE);
    }
}

/// One of the four configurable tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DelimiterField {
    /// Hash token.
    Hash,
    /// Line token.
    Line,
    /// Position token.
    Position,
    /// Range token.
    Range,
}

impl DelimiterField {
    /// Validation order.
    pub const ALL: [Self; 4] = [Self::Line, Self::Position, Self::Hash, Self::Range];

    /// Configuration key for this field.
    pub const fn key(self) -> &'static str {
        return match self {
            Self::Hash => "hash",
            Self::Line => "line",
            Self::Position => "position",
            Self::Range => "range",
        };
    }

    /// Built-in default for this field.
    pub const fn default_value(self) -> &'static str {
        return match self {
            Self::Hash => DEFAULT_HASH,
            Self::Line => DEFAULT_LINE,
            Self::Position => DEFAULT_POSITION,
            Self::Range => DEFAULT_RANGE,
        };
    }
}

impl fmt::Display for DelimiterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.key());
    }
}

/// Why a delimiter value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DelimiterErrorKind {
    /// Digits are reserved for coordinates.
    ContainsDigits,
    /// Whitespace anywhere in the value.
    ContainsWhitespace,
    /// Empty string.
    Empty,
    /// Hash must be exactly one character.
    HashNotSingleCharacter,
    /// Equal to another value, ignoring case.
    NotUnique,
    /// Contains one of `~ | / \ : , @`.
    ReservedCharacter,
    /// Contained in, or contains, another value, ignoring case.
    SubstringConflict,
    /// Not produced by any check.
    Unknown,
}

impl DelimiterErrorKind {
    /// Human-readable description.
    pub const fn describe(self) -> &'static str {
        return match self {
            Self::ContainsDigits => "must not contain digits",
            Self::ContainsWhitespace => "must not contain whitespace",
            Self::Empty => "must not be empty",
            Self::HashNotSingleCharacter => "must be exactly one character",
            Self::NotUnique => "must differ from every other delimiter (case-insensitive)",
            Self::ReservedCharacter => "must not contain any of ~ | / \\ : , @",
            Self::SubstringConflict => {
                "must not contain, or be contained in, another delimiter (case-insensitive)"
            },
            Self::Unknown => "is invalid",
        };
    }
}

/// A single validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DelimiterIssue {
    /// Field the finding is reported on.
    pub field: DelimiterField,
    /// What is wrong with it.
    pub kind: DelimiterErrorKind,
}

impl fmt::Display for DelimiterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{} {}", self.field, self.kind.describe());
    }
}

/// Validate a delimiter configuration, collecting every issue.
///
/// Per-field checks run first, in field order, stopping at each field's first
/// failure. Cross-field checks follow: equality, then substring containment,
/// each reported on the later field of the offending pair.
///
/// # Errors
///
/// Returns every issue found, in the order described above.
pub fn validate(raw: &RawDelimiters) -> Result<(), Vec<DelimiterIssue>> {
    let mut issues: Vec<DelimiterIssue> = raw
        .fields()
        .into_iter()
        .filter_map(|(field, value)| {
            return check_field(field, value).map(|kind| return DelimiterIssue { field, kind });
        })
        .collect();

    collect_cross_field_issues(raw, &mut issues);

    if issues.is_empty() {
        return Ok(());
    }
    return Err(issues);
}

/// Whether any pair of non-empty values has one inside the other, ignoring case.
///
/// Equal values count: each is trivially a substring of the other.
pub fn has_substring_conflicts(raw: &RawDelimiters) -> bool {
    let lowered = lowered_values(raw);
    return pairs(&lowered).any(|(a, b)| return overlaps(&a.1, &b.1));
}

/// Run the per-field checks on a single value.
fn check_field(field: DelimiterField, value: &str) -> Option<DelimiterErrorKind> {
    if value.is_empty() {
        return Some(DelimiterErrorKind::Empty);
    }
    if value.chars().any(char::is_whitespace) {
        return Some(DelimiterErrorKind::ContainsWhitespace);
    }
    if value.chars().any(|c| return c.is_ascii_digit()) {
        return Some(DelimiterErrorKind::ContainsDigits);
    }
    if value.chars().any(|c| return RESERVED_CHARACTERS.contains(&c)) {
        return Some(DelimiterErrorKind::ReservedCharacter);
    }
    if field == DelimiterField::Hash && value.chars().count() != 1 {
        return Some(DelimiterErrorKind::HashNotSingleCharacter);
    }
    return None;
}

/// Append uniqueness and substring findings, at most one per field and kind.
fn collect_cross_field_issues(raw: &RawDelimiters, issues: &mut Vec<DelimiterIssue>) {
    let lowered = lowered_values(raw);

    for ((_, a), (field, b)) in pairs(&lowered) {
        if !a.is_empty() && a == b {
            push_unique(issues, DelimiterIssue { field, kind: DelimiterErrorKind::NotUnique });
        }
    }

    for ((_, a), (field, b)) in pairs(&lowered) {
        if a != b && overlaps(&a, &b) {
            push_unique(issues, DelimiterIssue {
                field,
                kind: DelimiterErrorKind::SubstringConflict,
            });
        }
    }
}

/// Lowercased field values, in validation order.
fn lowered_values(raw: &RawDelimiters) -> Vec<(DelimiterField, String)> {
    return raw
        .fields()
        .into_iter()
        .map(|(field, value)| return (field, value.to_lowercase()))
        .collect();
}

/// Every unordered pair `(earlier, later)` of entries.
fn pairs<T: Clone>(items: &[T]) -> impl Iterator<Item = (T, T)> + '_ {
    return items.iter().enumerate().flat_map(move |(i, a)| {
        return items.iter().skip(i.saturating_add(1)).map(move |b| return (a.clone(), b.clone()));
    });
}

/// Substring containment in either direction, skipping empty operands.
fn overlaps(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    return a.contains(b) || b.contains(a);
}

/// Push an issue unless an identical one is already recorded.
fn push_unique(issues: &mut Vec<DelimiterIssue>, issue: DelimiterIssue) {
    if !issues.contains(&issue) {
        issues.push(issue);
    }
}

/// A validated delimiter configuration. Immutable once built.
///
/// Only obtainable through [`DelimiterConfig::new`], [`DelimiterConfig::with_fallback`],
/// or `Default`, so encode and decode never see invalid tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelimiterConfig {
    /// Hash token.
    hash: String,
    /// Line token.
    line: String,
    /// Position token.
    position: String,
    /// Range token.
    range: String,
}

impl DelimiterConfig {
    /// Validate raw delimiters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDelimiters` carrying every issue found.
    pub fn new(raw: &RawDelimiters) -> Result<Self, Error> {
        validate(raw).map_err(|issues| return Error::InvalidDelimiters { issues })?;
        return Ok(Self::from_valid(raw));
    }

    /// Validate raw delimiters, falling back to defaults instead of failing.
    ///
    /// Each field with an issue is replaced by its default. If the repaired
    /// set is still invalid (a user value colliding with a restored default),
    /// the full default configuration is used. All original issues are returned.
    pub fn with_fallback(raw: &RawDelimiters) -> (Self, Vec<DelimiterIssue>) {
        let issues = match validate(raw) {
            Ok(()) => return (Self::from_valid(raw), Vec::new()),
            Err(issues) => issues,
        };

        let mut repaired = raw.clone();
        for issue in &issues {
            let default = issue.field.default_value().to_string();
            match issue.field {
                DelimiterField::Hash => repaired.hash = default,
                DelimiterField::Line => repaired.line = default,
                DelimiterField::Position => repaired.position = default,
                DelimiterField::Range => repaired.range = default,
            }
        }

        let config = match validate(&repaired) {
            Ok(()) => Self::from_valid(&repaired),
            Err(_) => Self::default(),
        };
        return (config, issues);
    }

    /// Copy values that are already known to be valid.
    fn from_valid(raw: &RawDelimiters) -> Self {
        return Self {
            hash: raw.hash.clone(),
            line: raw.line.clone(),
            position: raw.position.clone(),
            range: raw.range.clone(),
        };
    }

    /// Hash token.
    pub fn hash(&self) -> &str {
        return &self.hash;
    }

    /// Line token.
    pub fn line(&self) -> &str {
        return &self.line;
    }

    /// Position token.
    pub fn position(&self) -> &str {
        return &self.position;
    }

    /// Range token.
    pub fn range(&self) -> &str {
        return &self.range;
    }

    /// The configuration as raw strings.
    pub fn to_raw(&self) -> RawDelimiters {
        return RawDelimiters::new(&self.line, &self.position, &self.hash, &self.range);
    }

    /// Whether `path` ends with the hash character, ignoring case.
    ///
    /// A link for such a path would read back as a column block on a shorter path.
    pub fn ends_with_hash(&self, path: &str) -> bool {
        let (Some(last), Some(hash)) = (path.chars().next_back(), self.hash.chars().next()) else {
            return false;
        };
        return chars_eq_ci(last, hash);
    }
}

/// Case-insensitive character comparison, the way tokens are matched in link text.
pub(crate) fn chars_eq_ci(a: char, b: char) -> bool {
    return a == b || a.to_lowercase().eq(b.to_lowercase());
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        return Self::from_valid(&RawDelimiters::default());
    }
}
