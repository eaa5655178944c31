//! Directory aggregation.
//!
//! Each directory is listed one level deep, in file-name order. Files are
//! counted into the node; subdirectories recurse through [`count_dir`] and
//! are nested under their name. Symlinks and other non-regular entries are
//! skipped, which also keeps symlink cycles out of the walk.

use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::counter::count_file;
use crate::error::DirlocError;
use crate::filter::ExcludeSet;
use crate::options::CountOptions;
use crate::stats::DirStats;
use crate::styles::CommentStyleTable;
use crate::Result;

/// Count a directory.
///
/// Files must pass the extension filter and the exclusion set. Entries are
/// checked against the exclusion set by their path relative to `path`, so
/// a target that itself lives under an excluded name (`~/build/proj`) is
/// still counted. With `options.recursive`, non-excluded subdirectories are
/// counted too and add to `total_count` only. Any unreadable entry fails
/// the whole call.
///
/// # Example
///
/// ```rust,ignore
/// use dirloclib::{count_dir, CommentStyleTable, CountOptions, ExcludeSet};
///
/// let excludes = ExcludeSet::from_patterns(["node_modules/", ".min.js"]);
/// let options = CountOptions::new().recursive(true).exclude_empty_lines(true);
/// let stats = count_dir("web", &excludes, &CommentStyleTable::builtin()?, &options)?;
/// println!("{} lines, {} outside subdirectories", stats.total_count, stats.non_rec_count);
/// ```
pub fn count_dir(
    path: impl AsRef<Path>,
    excludes: &ExcludeSet,
    table: &CommentStyleTable,
    options: &CountOptions,
) -> Result<DirStats> {
    let path = path.as_ref();

    let metadata = std::fs::metadata(path).map_err(|e| DirlocError::dir_read(path, e))?;
    if !metadata.is_dir() {
        return Err(DirlocError::NotADirectory(path.to_path_buf()));
    }

    walk(path, path, excludes, table, options)
}

fn walk(
    root: &Path,
    path: &Path,
    excludes: &ExcludeSet,
    table: &CommentStyleTable,
    options: &CountOptions,
) -> Result<DirStats> {
    let (files, subdirs) = list_entries(path)?;
    let mut stats = DirStats::new(display_name(path), path);

    for (name, file_path) in files {
        let extension = file_path.extension().map(|e| e.to_string_lossy());
        if !options.accepts_extension(extension.as_deref()) {
            continue;
        }
        if excludes.is_excluded_in(&file_path, root) {
            debug!("excluded file {}", file_path.display());
            continue;
        }
        let count = count_file(&file_path, table, options)?;
        stats.add_file(name, count);
    }

    if options.recursive {
        for (name, dir_path) in subdirs {
            if excludes.is_excluded_in(&dir_path, root) {
                debug!("excluded directory {}", dir_path.display());
                continue;
            }
            let child = walk(root, &dir_path, excludes, table, options)?;
            stats.add_dir(name, child);
        }
    }

    Ok(stats)
}

type Entries = Vec<(String, PathBuf)>;

/// List the direct children of `path`, split into files and directories.
fn list_entries(path: &Path) -> Result<(Entries, Entries)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_file() {
            files.push((name, entry.into_path()));
        } else if file_type.is_dir() {
            dirs.push((name, entry.into_path()));
        } else {
            debug!("skipping non-regular entry {}", entry.path().display());
        }
    }

    Ok((files, dirs))
}

fn walk_error(root: &Path, err: walkdir::Error) -> DirlocError {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(io) => DirlocError::dir_read(&path, io),
        None => DirlocError::DirRead {
            path,
            source: std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"),
        },
    }
}

/// Base name of a directory with a trailing `/`.
///
/// Paths without a final component (`.`, `..`, `/`) are resolved first so
/// the name stays meaningful.
pub fn display_name(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            std::fs::canonicalize(path)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| {
            path.to_string_lossy()
                .trim_end_matches(['/', '\\'])
                .to_string()
        });
    format!("{}/", base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::CommentRule;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn py_table() -> CommentStyleTable {
        CommentStyleTable::empty().with_extensions(["py"], Some(CommentRule::line_only(["#"])))
    }

    /// a.py (3 code lines), b.py (5), sub/c.py (2), each with noise lines
    fn create_tree(root: &Path) {
        write(&root.join("a.py"), "# header\nx = 1\n\ny = 2\nz = 3\n");
        write(
            &root.join("b.py"),
            "import os\n\ndef f():\n    # inner\n    pass\nf()\nprint(1)\n",
        );
        write(&root.join("sub/c.py"), "a = 1\n# tail\nb = 2\n\n");
    }

    fn strict() -> CountOptions {
        CountOptions::new()
            .exclude_comments(true)
            .exclude_empty_lines(true)
    }

    #[test]
    fn test_recursive_totals() {
        let temp = tempdir().unwrap();
        create_tree(temp.path());

        let stats = count_dir(
            temp.path(),
            &ExcludeSet::new(),
            &py_table(),
            &strict().recursive(true),
        )
        .unwrap();

        assert_eq!(stats.non_rec_count, 8);
        assert_eq!(stats.total_count, 10);
        assert_eq!(stats.dir_counts["sub"].total_count, 2);
        assert_eq!(stats.dir_counts["sub"].name, "sub/");
        assert_eq!(stats.file_counts["a.py"], 3);
        assert_eq!(stats.file_counts["b.py"], 5);
    }

    #[test]
    fn test_non_recursive_totals() {
        let temp = tempdir().unwrap();
        create_tree(temp.path());

        let stats = count_dir(temp.path(), &ExcludeSet::new(), &py_table(), &strict()).unwrap();

        assert_eq!(stats.non_rec_count, 8);
        assert_eq!(stats.total_count, 8);
        assert!(stats.dir_counts.is_empty());
    }

    #[test]
    fn test_listing_order_is_by_name() {
        let temp = tempdir().unwrap();
        for name in ["zeta.txt", "alpha.txt", "mid.txt"] {
            write(&temp.path().join(name), "x\n");
        }
        for name in ["z", "a"] {
            write(&temp.path().join(name).join("f.txt"), "x\n");
        }

        let stats = count_dir(
            temp.path(),
            &ExcludeSet::new(),
            &CommentStyleTable::empty(),
            &CountOptions::new().recursive(true),
        )
        .unwrap();

        let files: Vec<&str> = stats.file_counts.keys().map(String::as_str).collect();
        assert_eq!(files, vec!["alpha.txt", "mid.txt", "zeta.txt"]);
        let dirs: Vec<&str> = stats.dir_counts.keys().map(String::as_str).collect();
        assert_eq!(dirs, vec!["a", "z"]);
    }

    #[test]
    fn test_file_type_filter() {
        let temp = tempdir().unwrap();
        create_tree(temp.path());
        write(&temp.path().join("notes.md"), "one\ntwo\n");
        write(&temp.path().join("Makefile"), "all:\n");

        let stats = count_dir(
            temp.path(),
            &ExcludeSet::new(),
            &py_table(),
            &CountOptions::new().file_types(["md"]),
        )
        .unwrap();

        assert_eq!(stats.file_counts.len(), 1);
        assert_eq!(stats.total_count, 2);
    }

    #[test]
    fn test_excluded_files_and_dirs() {
        let temp = tempdir().unwrap();
        create_tree(temp.path());
        write(&temp.path().join("node_modules/pkg/index.py"), "x = 1\n");
        write(&temp.path().join("sub/node_modules/deep.py"), "x = 1\n");
        write(&temp.path().join("a_test.py"), "x = 1\n");

        let excludes = ExcludeSet::from_patterns(["node_modules/", "_test.py"]);
        let stats = count_dir(temp.path(), &excludes, &py_table(), &strict().recursive(true))
            .unwrap();

        assert_eq!(stats.total_count, 10);
        assert!(!stats.dir_counts.contains_key("node_modules"));
        assert!(!stats.dir_counts["sub"].dir_counts.contains_key("node_modules"));
        assert!(!stats.file_counts.contains_key("a_test.py"));
    }

    #[test]
    fn test_target_under_excluded_name_is_counted() {
        let temp = tempdir().unwrap();
        let proj = temp.path().join("build/proj");
        write(&proj.join("a.rs"), "fn main() {\n}\n");
        write(&proj.join("src/lib.rs"), "pub fn f() {}\n");
        write(&proj.join("target/debug/gen.rs"), "x\n");

        let excludes = ExcludeSet::from_patterns(crate::config::default_excludes().unwrap());
        let stats = count_dir(
            &proj,
            &excludes,
            &CommentStyleTable::empty(),
            &CountOptions::new().recursive(true),
        )
        .unwrap();

        assert_eq!(stats.file_counts["a.rs"], 2);
        assert_eq!(stats.dir_counts["src"].total_count, 1);
        assert!(!stats.dir_counts.contains_key("target"));
        assert_eq!(stats.total_count, 3);
    }

    #[test]
    fn test_concrete_excluded_paths_are_relative_to_target() {
        let temp = tempdir().unwrap();
        create_tree(temp.path());

        let mut excludes = ExcludeSet::new();
        excludes.insert_path("sub/c.py");
        excludes.insert_path("b.py");
        let stats = count_dir(temp.path(), &excludes, &py_table(), &strict().recursive(true))
            .unwrap();

        assert_eq!(stats.file_counts.keys().collect::<Vec<_>>(), vec!["a.py"]);
        assert!(stats.dir_counts["sub"].file_counts.is_empty());
        assert_eq!(stats.total_count, 3);
    }

    #[test]
    fn test_empty_subdirectory_is_kept() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();

        let stats = count_dir(
            temp.path(),
            &ExcludeSet::new(),
            &CommentStyleTable::empty(),
            &CountOptions::new().recursive(true),
        )
        .unwrap();

        assert_eq!(stats.dir_counts["empty"].total_count, 0);
        assert_eq!(stats.total_count, 0);
    }

    #[test]
    fn test_missing_directory() {
        let temp = tempdir().unwrap();
        let result = count_dir(
            temp.path().join("missing"),
            &ExcludeSet::new(),
            &CommentStyleTable::empty(),
            &CountOptions::new(),
        );
        assert!(matches!(result, Err(DirlocError::PathNotFound(_))));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("f.txt");
        write(&file, "x\n");

        let result = count_dir(
            &file,
            &ExcludeSet::new(),
            &CommentStyleTable::empty(),
            &CountOptions::new(),
        );
        assert!(matches!(result, Err(DirlocError::NotADirectory(_))));
    }

    #[test]
    fn test_repeated_counts_are_identical() {
        let temp = tempdir().unwrap();
        create_tree(temp.path());
        let options = strict().recursive(true);

        let first = count_dir(temp.path(), &ExcludeSet::new(), &py_table(), &options).unwrap();
        let second = count_dir(temp.path(), &ExcludeSet::new(), &py_table(), &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("src/core")), "core/");
        assert_eq!(display_name(Path::new("src/core/")), "core/");
        assert!(display_name(Path::new(".")).ends_with('/'));
        assert_ne!(display_name(Path::new(".")), "./");
    }
}
