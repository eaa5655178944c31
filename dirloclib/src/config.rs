//! Configuration loading.
//!
//! Comment-style tables and pattern lists are JSON. Both have a baked-in
//! default; user-supplied files replace it. Everything here runs before any
//! counting starts, so a malformed file never yields partial results.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::DirlocError;
use crate::styles::CommentStyleTable;
use crate::Result;

const BUILTIN_COMMENT_STYLES: &str = include_str!("../config/comment_styles.json");
const BUILTIN_EXCLUDES: &str = include_str!("../config/default_excludes.json");

impl CommentStyleTable {
    /// The comment-style table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        parse_comment_styles(BUILTIN_COMMENT_STYLES, "built-in comment styles")
    }
}

/// Parse a comment-style table from JSON text.
pub fn parse_comment_styles(json: &str, origin: &str) -> Result<CommentStyleTable> {
    let table: CommentStyleTable =
        serde_json::from_str(json).map_err(|e| DirlocError::config(origin, e))?;
    table
        .validate()
        .map_err(|message| DirlocError::config(origin, message))?;
    Ok(table)
}

/// Load a comment-style table from a JSON file.
pub fn load_comment_styles(path: impl AsRef<Path>) -> Result<CommentStyleTable> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| DirlocError::file_read(path, e))?;
    parse_comment_styles(&json, &path.display().to_string())
}

/// The exclude patterns used when the caller gives none.
pub fn default_excludes() -> Result<Vec<String>> {
    parse_patterns(BUILTIN_EXCLUDES, "built-in exclude list")
}

/// Parse a pattern list: a JSON array of strings, nested arrays flattened
/// in order.
pub fn parse_patterns(json: &str, origin: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(json).map_err(|e| DirlocError::config(origin, e))?;
    if !value.is_array() {
        return Err(DirlocError::config(origin, "expected an array of patterns"));
    }
    let mut patterns = Vec::new();
    flatten_patterns(&value, origin, &mut patterns)?;
    Ok(patterns)
}

fn flatten_patterns(value: &Value, origin: &str, out: &mut Vec<String>) -> Result<()> {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                flatten_patterns(item, origin, out)?;
            }
        }
        other => {
            return Err(DirlocError::config(
                origin,
                format!("expected a pattern string, found {}", other),
            ))
        }
    }
    Ok(())
}

/// Load a pattern list from a JSON file.
pub fn load_patterns(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| DirlocError::file_read(path, e))?;
    parse_patterns(&json, &path.display().to_string())
}

/// Resolve pattern arguments: an argument ending in `.json` that names an
/// existing file is replaced by the patterns it contains; anything else is
/// kept as a literal pattern. Order is preserved.
pub fn expand_pattern_args<I, S>(args: I, base: &Path) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut patterns = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        let is_json = Path::new(arg)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file = base.join(arg);
        if is_json && file.is_file() {
            patterns.extend(load_patterns(&file)?);
        } else {
            patterns.push(arg.to_string());
        }
    }
    Ok(patterns)
}
