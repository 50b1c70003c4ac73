//! Lazy recursive search by name, optionally by content.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::EntryKind;
use super::error::{FsError, FsResult};
use crate::core::security::{Intent, ResolvedPath};

/// What to look for.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Glob (`*.rs`) or plain substring, matched case-insensitively
    /// against entry names.
    pub pattern: String,
    /// Also match files whose text contains `pattern`.
    pub content: bool,
    pub max_depth: usize,
    /// Files larger than this are not opened for content matching.
    pub max_file_size: u64,
}

/// Which part of an entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Name,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SearchMatch {
    /// Path relative to the search root, `/`-separated.
    pub path: String,
    pub kind: EntryKind,
    pub matched_on: MatchSource,
}

/// Start a search under `root`. Entries are produced on demand, so callers
/// cap the work with `Iterator::take`.
pub fn search(root: &ResolvedPath, query: SearchQuery) -> FsResult<SearchIter> {
    let path = root.require(Intent::List)?;

    let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat search root", e))?;
    if !metadata.is_dir() {
        return Err(FsError::NotADirectory);
    }

    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(query.max_depth.max(1))
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Ok(SearchIter {
        root: path.to_path_buf(),
        walker,
        matcher: NameMatcher::new(&query.pattern),
        needle: query.pattern,
        content: query.content,
        max_file_size: query.max_file_size,
    })
}

/// Iterator over search matches.
pub struct SearchIter {
    root: PathBuf,
    walker: walkdir::IntoIter,
    matcher: NameMatcher,
    needle: String,
    content: bool,
    max_file_size: u64,
}

impl Iterator for SearchIter {
    type Item = SearchMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let kind = EntryKind::from_file_type(entry.file_type());
            let name = entry.file_name().to_string_lossy();

            let matched_on = if self.matcher.matches(&name) {
                MatchSource::Name
            } else if self.content && kind == EntryKind::File && self.content_matches(entry.path()) {
                MatchSource::Content
            } else {
                continue;
            };

            return Some(SearchMatch {
                path: relative_name(&self.root, entry.path()),
                kind,
                matched_on,
            });
        }
    }
}

impl SearchIter {
    fn content_matches(&self, path: &Path) -> bool {
        let too_large = fs::metadata(path)
            .map(|m| m.len() > self.max_file_size)
            .unwrap_or(true);
        if too_large {
            return false;
        }
        match fs::read(path) {
            Ok(bytes) => std::str::from_utf8(&bytes)
                .map(|text| text.contains(&self.needle))
                .unwrap_or(false),
            Err(e) => {
                debug!("Cannot read {} for content search: {}", path.display(), e);
                false
            }
        }
    }
}

struct NameMatcher {
    glob: Option<Pattern>,
    needle: String,
}

impl NameMatcher {
    fn new(pattern: &str) -> Self {
        let is_glob = pattern.contains(['*', '?', '[']);
        Self {
            glob: is_glob.then(|| Pattern::new(pattern).ok()).flatten(),
            needle: pattern.to_lowercase(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        if let Some(glob) = &self.glob {
            if glob.matches_with(name, options) {
                return true;
            }
        }
        name.to_lowercase().contains(&self.needle)
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::{SecurityPolicy, authorize};
    use tempfile::TempDir;

    fn query(pattern: &str, content: bool) -> SearchQuery {
        SearchQuery {
            pattern: pattern.to_string(),
            content,
            max_depth: 10,
            max_file_size: 1024,
        }
    }

    fn run(dir: &TempDir, query: SearchQuery) -> Vec<SearchMatch> {
        let policy =
            SecurityPolicy::new(vec![dir.path().to_path_buf()], 1024, Vec::<String>::new()).unwrap();
        let root = authorize(&dir.path().to_string_lossy(), &policy, Intent::List).unwrap();
        search(&root, query).unwrap().collect()
    }

    fn populate(root: &Path) {
        fs::write(root.join("Report.md"), "quarterly numbers").unwrap();
        fs::create_dir_all(root.join("src/deep")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() { report(); }").unwrap();
        fs::write(root.join("src/deep/lib.rs"), "pub fn nothing() {}").unwrap();
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        let found = run(&temp_dir, query("report", false));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "Report.md");
        assert_eq!(found[0].matched_on, MatchSource::Name);
    }

    #[test]
    fn test_glob_recurses() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        let paths: Vec<String> = run(&temp_dir, query("*.rs", false))
            .into_iter()
            .map(|m| m.path)
            .collect();
        assert_eq!(paths, vec!["src/deep/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn test_content_matching() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        let found = run(&temp_dir, query("report", true));
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].path, "src/main.rs");
        assert_eq!(found[1].matched_on, MatchSource::Content);
    }

    #[test]
    fn test_depth_limit() {
        let temp_dir = TempDir::new().unwrap();
        populate(temp_dir.path());

        let mut shallow = query("*.rs", false);
        shallow.max_depth = 2;
        let found = run(&temp_dir, shallow);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "src/main.rs");
    }

    #[test]
    fn test_search_is_lazy() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(temp_dir.path().join(format!("f{i:02}.txt")), "").unwrap();
        }
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 1024, Vec::<String>::new())
                .unwrap();
        let root = authorize(&temp_dir.path().to_string_lossy(), &policy, Intent::List).unwrap();

        let mut iter = search(&root, query("*.txt", false)).unwrap();
        let first: Vec<SearchMatch> = iter.by_ref().take(5).collect();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].path, "f00.txt");
        assert!(iter.next().is_some());
    }
}
