//! Single-file line counting.
//!
//! Files are streamed line by line through a [`LineClassifier`]; the whole
//! file is never held in memory. `\n`, `\r\n` and a lone `\r` each end a
//! line, and a final line without a terminator still counts.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::trace;

use crate::classifier::LineClassifier;
use crate::error::DirlocError;
use crate::options::CountOptions;
use crate::styles::{CommentRule, CommentStyleTable};
use crate::Result;

/// Count the lines of a file that pass the options.
///
/// The comment rule is looked up once from the file's extension.
///
/// # Example
///
/// ```rust,ignore
/// use dirloclib::{count_file, CommentStyleTable, CountOptions};
///
/// let table = CommentStyleTable::builtin()?;
/// let options = CountOptions::new().exclude_comments(true).exclude_empty_lines(true);
/// let lines = count_file("src/main.rs", &table, &options)?;
/// ```
pub fn count_file(
    path: impl AsRef<Path>,
    table: &CommentStyleTable,
    options: &CountOptions,
) -> Result<u64> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy())
        .unwrap_or_default();
    let rule = table.resolve(&extension);

    let file = File::open(path).map_err(|e| DirlocError::file_read(path, e))?;
    let count = count_reader(BufReader::new(file), rule, options)
        .map_err(|e| DirlocError::file_read(path, e))?;

    trace!("{}: {} lines", path.display(), count);
    Ok(count)
}

/// Count the lines of any buffered reader with an already resolved rule.
///
/// Invalid UTF-8 is replaced rather than rejected. A read error midway
/// fails the whole count; no partial total is returned.
pub fn count_reader<R: BufRead>(
    mut reader: R,
    rule: Option<&CommentRule>,
    options: &CountOptions,
) -> std::io::Result<u64> {
    let mut classifier = LineClassifier::new(rule, options);
    let mut buf = Vec::with_capacity(256);
    let mut after_cr = false;
    let mut count = 0;

    loop {
        buf.clear();
        if !read_line(&mut reader, &mut buf, &mut after_cr)? {
            break;
        }
        if classifier.counts(&String::from_utf8_lossy(&buf)) {
            count += 1;
        }
    }

    Ok(count)
}

/// Read one line into `buf`, without its terminator. Returns `false` at
/// end of input. `after_cr` carries a `\r` seen at the end of the previous
/// line so that a following `\n` is swallowed as part of `\r\n`.
fn read_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    after_cr: &mut bool,
) -> std::io::Result<bool> {
    let mut read_any = false;
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(read_any);
        }
        if std::mem::take(after_cr) && available[0] == b'\n' {
            reader.consume(1);
            continue;
        }
        read_any = true;
        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                buf.extend_from_slice(&available[..end]);
                *after_cr = available[end] == b'\r';
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}
