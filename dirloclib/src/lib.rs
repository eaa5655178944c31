//! # dirloclib
//!
//! A line-of-code counting library: counts lines per file, optionally
//! skipping blank and comment lines, and aggregates counts per directory.
//!
//! ## Overview
//!
//! Comment detection is deliberately simple: a trimmed line is a comment if
//! it starts with one of the language's line-comment tokens, or if it opens
//! or closes (or sits inside) a block comment. Languages are looked up by
//! file extension in a [`CommentStyleTable`], loaded from JSON.
//!
//! The pipeline is:
//!
//! - **Classifier**: one line in, "counts or not" out, with the block
//!   comment state threaded through a file
//! - **Counter**: streams one file through the classifier
//! - **Filter**: excludes paths by directory component or by suffix
//! - **Directory**: walks a directory (optionally recursive) into a nested
//!   [`DirStats`] tree with total and non-recursive counts
//! - **Query**: expands include/exclude globs and counts every target
//!
//! ## Example
//!
//! ```rust
//! use dirloclib::{CommentStyleTable, CountOptions, Query};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("main.py"), "# entry point\nprint('hi')\n\nexit(0)\n").unwrap();
//! fs::create_dir(dir.path().join("lib")).unwrap();
//! fs::write(dir.path().join("lib/util.py"), "def f():\n    return 1\n").unwrap();
//!
//! let table = CommentStyleTable::builtin().unwrap();
//! let options = CountOptions::new()
//!     .recursive(true)
//!     .exclude_comments(true)
//!     .exclude_empty_lines(true);
//!
//! let result = Query::new().dir(dir.path()).options(options).run(&table).unwrap();
//! let root = &result.dirs[0];
//! assert_eq!(root.non_rec_count, 2);
//! assert_eq!(root.total_count, 4);
//! assert_eq!(root.dir_counts["lib"].total_count, 2);
//! ```

pub mod classifier;
pub mod config;
pub mod counter;
pub mod directory;
pub mod error;
pub mod filter;
pub mod options;
pub mod query;
pub mod stats;
pub mod styles;

pub use classifier::{classify_line, LineClassifier, LineVerdict};
pub use config::{
    default_excludes, expand_pattern_args, load_comment_styles, load_patterns,
    parse_comment_styles, parse_patterns,
};
pub use counter::{count_file, count_reader};
pub use directory::count_dir;
pub use error::DirlocError;
pub use filter::{is_excluded, ExcludeSet, PathPattern};
pub use options::CountOptions;
pub use query::{count, Query};
pub use stats::{DirStats, FileStats, QueryResult, TargetFailure};
pub use styles::{BlockComment, CommentRule, CommentStyleTable};

/// Result type for dirloclib operations
pub type Result<T> = std::result::Result<T, DirlocError>;
