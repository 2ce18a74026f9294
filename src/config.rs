use std::path::Path;

use crate::delimiters::{DelimiterConfig, DelimiterIssue, RawDelimiters};
use crate::error::Error;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".rangelink.toml";

/// Project configuration loaded from `.rangelink.toml`.
/// Include/exclude patterns are path prefixes applied to markdown files during `check`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Validated delimiters, with defaults substituted for any invalid field.
    pub delimiters: DelimiterConfig,
    /// Problems found in the configured delimiters. Empty when all were valid.
    pub delimiter_issues: Vec<DelimiterIssue>,
    /// Path prefixes excluded from scanning.
    exclude: Vec<String>,
    /// Path prefixes to scan; empty means everything.
    include: Vec<String>,
    /// Delimiters exactly as written in the file.
    pub raw_delimiters: RawDelimiters,
}

/// Raw TOML structure for `.rangelink.toml`.
#[derive(serde::Deserialize)]
struct RangelinkTomlConfig {
    /// Delimiter overrides; missing keys take their defaults.
    #[serde(default)]
    delimiters: RawDelimiters,
    /// Excluded path prefixes.
    #[serde(default)]
    exclude: Vec<String>,
    /// Included path prefixes.
    #[serde(default)]
    include: Vec<String>,
}

impl Config {
    /// Load config from `.rangelink.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file. Invalid
    /// delimiter values are the one exception: they fall back per field and
    /// are reported through `delimiter_issues`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: RangelinkTomlConfig = toml::from_str(content)?;
        let (delimiters, delimiter_issues) = DelimiterConfig::with_fallback(&raw.delimiters);
        return Ok(Self {
            delimiters,
            delimiter_issues,
            exclude: raw.exclude,
            include: raw.include,
            raw_delimiters: raw.delimiters,
        });
    }

    /// Check whether a markdown file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

impl Default for Config {
    /// Default delimiters, scanning everything and excluding nothing.
    fn default() -> Self {
        return Self {
            delimiters: DelimiterConfig::default(),
            delimiter_issues: Vec::new(),
            exclude: Vec::new(),
            include: Vec::new(),
            raw_delimiters: RawDelimiters::default(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiters::{DelimiterErrorKind, DelimiterField};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.delimiters, DelimiterConfig::default());
        assert!(config.should_scan("anything.md"));
    }

    #[test]
    fn partial_delimiter_table_keeps_other_defaults() {
        let config = Config::parse("[delimiters]\nrange = \"to\"\n").unwrap();
        assert_eq!(config.delimiters.range(), "to");
        assert_eq!(config.delimiters.line(), "L");
        assert!(config.delimiter_issues.is_empty());
    }

    #[test]
    fn invalid_delimiter_falls_back_and_is_reported() {
        let config = Config::parse("[delimiters]\nline = \"Line\"\nhash = \"##\"\n").unwrap();
        assert_eq!(config.delimiters.line(), "Line");
        assert_eq!(config.delimiters.hash(), "#");
        assert_eq!(config.delimiter_issues, vec![DelimiterIssue {
            field: DelimiterField::Hash,
            kind: DelimiterErrorKind::HashNotSingleCharacter,
        }]);
        assert_eq!(config.raw_delimiters.hash, "##");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(Config::parse("[delimiters\n"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn include_and_exclude_prefixes() {
        let config = Config::parse("include = [\"docs/\"]\nexclude = [\"docs/archive/\"]\n").unwrap();
        assert!(config.should_scan("docs/guide.md"));
        assert!(!config.should_scan("docs/archive/old.md"));
        assert!(!config.should_scan("README.md"));
    }
}
