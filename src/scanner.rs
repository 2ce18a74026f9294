use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::decoder::find_links;
use crate::error::Error;
use crate::types::LinkMatch;

/// A RangeLink found in a markdown file.
#[derive(Debug, Clone)]
pub struct FoundLink {
    /// Decoded link with its location in the markdown file.
    pub found: LinkMatch,
    /// Markdown file containing the link, relative to the scan root.
    pub source: PathBuf,
}

/// Scan all markdown files under `root` and extract RangeLinks.
/// Applies the config's include/exclude filters and its delimiters.
/// Returns links grouped by normalized target path, so each target is read once.
///
/// # Errors
///
/// Returns `Error::Io` if any markdown file cannot be read.
pub fn scan(root: &Path, config: &Config) -> Result<BTreeMap<PathBuf, Vec<FoundLink>>, Error> {
    let mut grouped: BTreeMap<PathBuf, Vec<FoundLink>> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "md"))
    {
        let md_path = entry.path();
        let relative_source = md_path.strip_prefix(root).unwrap_or(md_path).to_path_buf();

        let relative_str = relative_source.to_string_lossy();
        if !config.should_scan(&relative_str) {
            continue;
        }

        let content = std::fs::read_to_string(md_path)?;
        for found in find_links(&content, &config.delimiters) {
            let target = normalize_path(Path::new(&found.parsed.reference_path));
            grouped.entry(target).or_default().push(FoundLink {
                found,
                source: relative_source.clone(),
            });
        }
    }

    return Ok(grouped);
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            let can_pop = matches!(components.last(), Some(c) if !matches!(c, Component::ParentDir));
            if can_pop {
                components.pop();
            } else {
                components.push(component);
            }
        },
        other => components.push(other),
    }
}
