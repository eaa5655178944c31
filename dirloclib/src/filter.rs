//! Path exclusion.
//!
//! Exclusion works on path strings, not on the filesystem. A pattern ending
//! with a separator (`node_modules/`) is a directory pattern and matches
//! any path that contains its components as a contiguous run. Any other
//! pattern is a suffix pattern and matches paths that end with it
//! literally (`.test.js` matches `foo.test.js`, not `foo.test.jsx`).

use std::path::{Path, PathBuf};

/// One exclusion pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Component sequence to look for anywhere in a path
    Directory(Vec<String>),
    /// Literal string a path must end with
    Suffix(String),
}

impl PathPattern {
    /// Parse a pattern string. Returns `None` for an empty pattern.
    pub fn parse(pattern: &str) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        if let Some(dir) = pattern
            .strip_suffix('/')
            .or_else(|| pattern.strip_suffix('\\'))
        {
            let components: Vec<String> = split_components(dir)
                .into_iter()
                .map(str::to_string)
                .collect();
            if components.iter().all(|c| c.is_empty()) {
                return None;
            }
            return Some(PathPattern::Directory(components));
        }
        Some(PathPattern::Suffix(pattern.to_string()))
    }

    /// Whether `path` falls under this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Suffix(suffix) => path.ends_with(suffix.as_str()),
            PathPattern::Directory(pattern) => {
                let components = split_components(path);
                // Only the first occurrence of the leading component is tried.
                let Some(start) = components.iter().position(|c| *c == pattern[0]) else {
                    return false;
                };
                let candidate = &components[start..];
                candidate.len() >= pattern.len()
                    && pattern.iter().zip(candidate).all(|(p, c)| p == c)
            }
        }
    }
}

/// Split a path on `/`, or on `\` when there is no `/` to split on.
fn split_components(path: &str) -> Vec<&str> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() > 1 {
        parts
    } else {
        path.split('\\').collect()
    }
}

/// Whether `path` is matched by any of `patterns`.
pub fn is_excluded(path: &str, patterns: &[PathPattern]) -> bool {
    patterns.iter().any(|p| p.matches(path))
}

/// Strip `root` from `path`, plus a leading `./`, so paths reached through
/// different spellings of the same root compare equal.
pub fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.strip_prefix(".").unwrap_or(relative)
}

/// A set of exclusion rules.
///
/// Holds parsed patterns, matched against path strings, and concrete paths
/// found by glob expansion, which exclude themselves and everything below.
/// Both are meant to be checked against paths relative to the directory
/// the search started from, so the location of that directory never
/// affects what gets excluded inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet {
    patterns: Vec<PathPattern>,
    paths: Vec<PathBuf>,
}

impl ExcludeSet {
    /// Create an empty set (nothing is excluded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from pattern strings; empty strings are ignored.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for pattern in patterns {
            set.insert(pattern.as_ref());
        }
        set
    }

    /// Add a pattern, skipping duplicates.
    pub fn insert(&mut self, pattern: &str) {
        if let Some(parsed) = PathPattern::parse(pattern) {
            if !self.patterns.contains(&parsed) {
                self.patterns.push(parsed);
            }
        }
    }

    /// Add a concrete path, relative to the search root.
    pub fn insert_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !path.as_os_str().is_empty() && !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Whether an already relative path is excluded.
    pub fn is_excluded(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        is_excluded(&path.to_string_lossy(), &self.patterns)
            || self.paths.iter().any(|p| path.starts_with(p))
    }

    /// Whether `path`, found while searching `root`, is excluded.
    pub fn is_excluded_in(&self, path: &Path, root: &Path) -> bool {
        self.is_excluded(relative_to(path, root))
    }

    /// Whether the path string is excluded.
    pub fn is_excluded_str(&self, path: &str) -> bool {
        self.is_excluded(Path::new(path))
    }

    /// Number of patterns and concrete paths.
    pub fn len(&self) -> usize {
        self.patterns.len() + self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.paths.is_empty()
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}
