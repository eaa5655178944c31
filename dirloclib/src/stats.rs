//! Core data structures for count results

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::DirlocError;

/// Counts for one directory, with its subdirectories nested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirStats {
    /// Base name with a trailing `/`
    pub name: String,
    /// Path the directory was reached through
    pub path: PathBuf,
    /// Lines in direct files plus all counted subdirectories
    pub total_count: u64,
    /// Lines in direct files only
    pub non_rec_count: u64,
    /// Direct files, in listing order
    pub file_counts: IndexMap<String, u64>,
    /// Subdirectories by name, in listing order
    pub dir_counts: IndexMap<String, DirStats>,
}

impl DirStats {
    /// Create an empty node for a directory.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Record a direct file.
    pub fn add_file(&mut self, name: impl Into<String>, count: u64) {
        self.file_counts.insert(name.into(), count);
        self.non_rec_count += count;
        self.total_count += count;
    }

    /// Attach a counted subdirectory. Only the total grows.
    pub fn add_dir(&mut self, name: impl Into<String>, child: DirStats) {
        self.total_count += child.total_count;
        self.dir_counts.insert(name.into(), child);
    }

    /// Lines contributed by subdirectories.
    pub fn subdir_count(&self) -> u64 {
        self.total_count - self.non_rec_count
    }

    /// Number of files counted in this tree.
    pub fn file_count(&self) -> usize {
        self.file_counts.len()
            + self
                .dir_counts
                .values()
                .map(DirStats::file_count)
                .sum::<usize>()
    }

    /// Every counted file under this node, keyed by its `/`-joined path
    /// relative to the node. Direct files come first, then each
    /// subdirectory depth-first.
    pub fn iter_files(&self) -> Vec<(String, u64)> {
        let mut out = Vec::new();
        self.collect_files("", &mut out);
        out
    }

    fn collect_files(&self, prefix: &str, out: &mut Vec<(String, u64)>) {
        for (name, count) in &self.file_counts {
            out.push((format!("{}{}", prefix, name), *count));
        }
        for (name, child) in &self.dir_counts {
            child.collect_files(&format!("{}{}/", prefix, name), out);
        }
    }

    /// Look up a nested subdirectory by a `/`-separated relative path.
    pub fn subdir(&self, relative: &str) -> Option<&DirStats> {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |node, part| node.dir_counts.get(part))
    }
}

/// Count for a single requested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStats {
    /// File base name
    pub name: String,
    /// Path as requested
    pub path: PathBuf,
    /// Counted lines
    pub count: u64,
}

impl FileStats {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, count: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            count,
        }
    }
}

/// A requested target that could not be counted.
#[derive(Debug, Serialize)]
pub struct TargetFailure {
    /// The directory or file that failed
    pub path: PathBuf,
    /// What went wrong
    #[serde(serialize_with = "serialize_error")]
    pub error: DirlocError,
}

fn serialize_error<S: Serializer>(error: &DirlocError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Result of a whole query.
#[derive(Debug, Default, Serialize)]
pub struct QueryResult {
    /// One node per counted directory target, in request order
    pub dirs: Vec<DirStats>,
    /// One entry per counted file target, in request order
    pub files: Vec<FileStats>,
    /// Targets that failed, in request order
    pub failures: Vec<TargetFailure>,
}

impl QueryResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all directory totals and file counts.
    pub fn total(&self) -> u64 {
        self.dirs.iter().map(|d| d.total_count).sum::<u64>()
            + self.files.iter().map(|f| f.count).sum::<u64>()
    }

    /// True when every target was counted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
