//! Input options for LOC counting.
//!
//! This module contains the knobs that control which lines are counted and
//! which files a directory walk picks up.

use serde::{Deserialize, Serialize};

/// Options shared by the file counter and the directory aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Do not count comment lines (needs a comment rule for the file type)
    pub exclude_comments: bool,
    /// Do not count whitespace-only lines
    pub exclude_empty_lines: bool,
    /// Only count files with these extensions (without the leading dot)
    pub file_types: Option<Vec<String>>,
}

impl CountOptions {
    /// Create new default options: every line counts, no recursion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Builder: skip comment lines
    pub fn exclude_comments(mut self, exclude: bool) -> Self {
        self.exclude_comments = exclude;
        self
    }

    /// Builder: skip blank lines
    pub fn exclude_empty_lines(mut self, exclude: bool) -> Self {
        self.exclude_empty_lines = exclude;
        self
    }

    /// Builder: restrict directory walks to the given extensions.
    ///
    /// A leading dot is accepted and stripped, so `".rs"` and `"rs"` are
    /// equivalent.
    pub fn file_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let types = types
            .into_iter()
            .map(|t| {
                let t = t.as_ref();
                t.strip_prefix('.').unwrap_or(t).to_string()
            })
            .collect();
        self.file_types = Some(types);
        self
    }

    /// Whether a file with the given extension passes the type filter.
    pub fn accepts_extension(&self, extension: Option<&str>) -> bool {
        match &self.file_types {
            None => true,
            Some(types) => {
                let ext = extension.unwrap_or("");
                types.iter().any(|t| t == ext)
            }
        }
    }
}
