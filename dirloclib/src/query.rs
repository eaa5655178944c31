//! Query orchestration: from patterns and targets to a [`QueryResult`].
//!
//! A query
//! 1. makes include/exclude patterns recursive (`**/` prefix) when counting
//!    recursively,
//! 2. keeps literal exclude patterns as-is and expands glob exclude
//!    patterns under each directory target into an [`ExcludeSet`],
//! 3. expands include patterns into extra directory and file targets,
//! 4. counts every directory and file target in request order.
//!
//! Exclusion is always decided on paths relative to the directory being
//! searched: a directory target for walked entries, the query root for
//! include matches. Explicit file targets are checked by file name against
//! literal patterns.
//!
//! A failing target is recorded in [`QueryResult::failures`] and does not
//! stop the others. Invalid glob syntax fails the query up front.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use log::{debug, info, warn};

use crate::counter::count_file;
use crate::directory::count_dir;
use crate::error::DirlocError;
use crate::filter::{relative_to, ExcludeSet};
use crate::options::CountOptions;
use crate::stats::{FileStats, QueryResult, TargetFailure};
use crate::styles::CommentStyleTable;
use crate::Result;

const RECURSIVE_PREFIX: &str = "**/";

/// A counting request.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Directory targets, in request order
    pub dirs: Vec<PathBuf>,
    /// File targets, in request order
    pub files: Vec<PathBuf>,
    /// Glob patterns adding targets
    pub include: Vec<String>,
    /// Glob patterns removing paths
    pub exclude: Vec<String>,
    /// Counting knobs
    pub options: CountOptions,
    /// Directory that relative glob patterns are resolved against
    /// (current directory when unset)
    pub root: Option<PathBuf>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory target.
    pub fn dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.push(path.into());
        self
    }

    /// Add a file target.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Add include patterns.
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add exclude patterns.
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Set counting options.
    pub fn options(mut self, options: CountOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve relative glob patterns against `root`.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Run the query.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use dirloclib::{CommentStyleTable, CountOptions, Query};
    ///
    /// let result = Query::new()
    ///     .dir("src")
    ///     .exclude(["generated/", ".pb.rs"])
    ///     .options(CountOptions::new().recursive(true).exclude_comments(true))
    ///     .run(&CommentStyleTable::builtin()?)?;
    /// println!("{} lines", result.total());
    /// ```
    pub fn run(&self, table: &CommentStyleTable) -> Result<QueryResult> {
        let recursive = self.options.recursive;
        let root = self.root.as_deref().unwrap_or(Path::new(""));

        let plan = self.plan_excludes()?;
        debug!(
            "{} literal and {} glob exclude patterns",
            plan.literals.len(),
            plan.globs.len()
        );

        let mut dirs = dedup(self.dirs.iter().cloned());
        let mut files = dedup(self.files.iter().cloned());

        let mut root_hits = ExcludeSet::new();
        if !self.include.is_empty() || !files.is_empty() {
            plan.expand_into(&mut root_hits, root)?;
        }

        for pattern in &self.include {
            let pattern = make_recursive(pattern, recursive);
            for hit in expand_glob(&pattern, root)? {
                let path = hit.path;
                if plan.literals.is_excluded_in(&path, root)
                    || root_hits.is_excluded_in(&path, root)
                {
                    debug!("include match {} is excluded", path.display());
                    continue;
                }
                let list = if hit.is_dir { &mut dirs } else { &mut files };
                if !list.contains(&path) {
                    list.push(path);
                }
            }
        }

        info!(
            "counting {} directories and {} files",
            dirs.len(),
            files.len()
        );

        let mut result = QueryResult::new();

        for dir in dirs {
            let counted = plan
                .for_dir(&dir)
                .and_then(|excludes| count_dir(&dir, &excludes, table, &self.options));
            match counted {
                Ok(stats) => result.dirs.push(stats),
                Err(error) => result.failures.push(TargetFailure { path: dir, error }),
            }
        }

        for file in files {
            let name = base_name(&file);
            let excluded = plan.literals.is_excluded(Path::new(&name))
                || root_hits.is_excluded_in(&file, root);
            if excluded {
                debug!("excluded file target {}", file.display());
                continue;
            }
            match count_file(&file, table, &self.options) {
                Ok(count) => result.files.push(FileStats::new(name, file, count)),
                Err(error) => result.failures.push(TargetFailure { path: file, error }),
            }
        }

        info!(
            "counted {} lines ({} failed targets)",
            result.total(),
            result.failures.len()
        );
        Ok(result)
    }

    /// Split exclude patterns into literals and globs, rejecting bad globs.
    fn plan_excludes(&self) -> Result<ExcludePlan> {
        let mut plan = ExcludePlan::default();
        for raw in &self.exclude {
            if is_literal(raw) {
                plan.literals.insert(raw);
                continue;
            }
            let pattern = make_recursive(raw, self.options.recursive);
            Pattern::new(pattern.trim_end_matches(['/', '\\'])).map_err(|e| {
                DirlocError::InvalidGlob {
                    pattern: raw.clone(),
                    message: e.to_string(),
                }
            })?;
            if !plan.globs.contains(&pattern) {
                plan.globs.push(pattern);
            }
        }
        Ok(plan)
    }
}

/// Exclude patterns, split by how they are applied.
///
/// Literal patterns already match at any depth, so only glob patterns are
/// expanded, and only under the directory being searched.
#[derive(Debug, Clone, Default)]
struct ExcludePlan {
    literals: ExcludeSet,
    /// Glob patterns, already made recursive when counting recursively
    globs: Vec<String>,
}

impl ExcludePlan {
    /// Add the matches of every glob pattern under `root`, relative to it.
    fn expand_into(&self, set: &mut ExcludeSet, root: &Path) -> Result<()> {
        for pattern in &self.globs {
            for hit in expand_glob(pattern, root)? {
                set.insert_path(relative_to(&hit.path, root).to_path_buf());
            }
        }
        Ok(())
    }

    /// The exclusion set for one directory target.
    fn for_dir(&self, dir: &Path) -> Result<ExcludeSet> {
        let mut set = self.literals.clone();
        self.expand_into(&mut set, dir)?;
        Ok(set)
    }
}

/// Count with the flat argument list of the classic interface.
#[allow(clippy::too_many_arguments)]
pub fn count(
    dirs: &[PathBuf],
    files: &[PathBuf],
    include: &[String],
    exclude: &[String],
    recursive: bool,
    file_types: Option<&[String]>,
    exclude_empty_lines: bool,
    exclude_comments: bool,
    table: &CommentStyleTable,
) -> Result<QueryResult> {
    let mut options = CountOptions::new()
        .recursive(recursive)
        .exclude_empty_lines(exclude_empty_lines)
        .exclude_comments(exclude_comments);
    if let Some(types) = file_types {
        options = options.file_types(types);
    }

    let query = Query {
        dirs: dirs.to_vec(),
        files: files.to_vec(),
        include: include.to_vec(),
        exclude: exclude.to_vec(),
        options,
        root: None,
    };
    query.run(table)
}

/// Prefix a pattern with `**/` unless it already is recursive or absolute.
pub fn make_recursive(pattern: &str, recursive: bool) -> String {
    if !recursive
        || pattern.starts_with("**")
        || pattern.starts_with('/')
        || Path::new(pattern).is_absolute()
    {
        pattern.to_string()
    } else {
        format!("{}{}", RECURSIVE_PREFIX, pattern)
    }
}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '['])
}

/// One filesystem match of a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GlobHit {
    path: PathBuf,
    is_dir: bool,
}

/// Expand a pattern against the filesystem, case-insensitively.
///
/// A trailing separator restricts matches to directories.
fn expand_glob(pattern: &str, root: &Path) -> Result<Vec<GlobHit>> {
    let (body, dirs_only) = match pattern
        .strip_suffix('/')
        .or_else(|| pattern.strip_suffix('\\'))
    {
        Some(body) => (body, true),
        None => (pattern, false),
    };
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let full = if root.as_os_str().is_empty() || Path::new(body).is_absolute() {
        body.to_string()
    } else {
        let root = Pattern::escape(&root.to_string_lossy());
        format!("{}/{}", root.trim_end_matches('/'), body)
    };

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let paths = glob::glob_with(&full, options).map_err(|e| DirlocError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut hits = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("skipping unreadable glob match: {}", e);
                continue;
            }
        };
        let is_dir = path.is_dir();
        if dirs_only && !is_dir {
            continue;
        }
        hits.push(GlobHit { path, is_dir });
    }
    Ok(hits)
}

fn dedup(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for path in paths {
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
