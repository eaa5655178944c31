//! Text and JSON rendering of query results

use console::Style;
use dirloclib::{DirStats, QueryResult};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn from_arg(value: &str) -> Self {
        match value {
            "json" => OutputMode::Json,
            _ => OutputMode::Text,
        }
    }
}

struct Styles {
    heading: Style,
    dir: Style,
    subdir: Style,
    file: Style,
    count: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            heading: Style::new().cyan().bold().underlined(),
            dir: Style::new().blue().bold(),
            subdir: Style::new().blue().bold().italic(),
            file: Style::new().green().italic(),
            count: Style::new().yellow().italic(),
        }
    }
}

/// Render a result as text.
///
/// Verbosity 0 prints one total per target, 1 adds the non-recursive count
/// of each directory, 2 and above print the whole tree with file counts.
pub fn render_text(result: &QueryResult, verbosity: u8) -> String {
    let styles = Styles::new();
    let mut out = String::new();

    if !result.dirs.is_empty() {
        out.push_str(&format!("\n{}\n", styles.heading.apply_to("Directories:")));
    }
    for dir in &result.dirs {
        match verbosity {
            0 => out.push_str(&format!(
                "{}: {}\n",
                styles.dir.apply_to(&dir.name),
                styles.count.apply_to(dir.total_count)
            )),
            1 => {
                out.push_str(&format!("{}:\n", styles.dir.apply_to(&dir.name)));
                out.push_str(&format!(
                    "\tTotal Count: {}\n",
                    styles.count.apply_to(dir.total_count)
                ));
                out.push_str(&format!(
                    "\tNon-Recursive Count: {}\n",
                    styles.count.apply_to(dir.non_rec_count)
                ));
            }
            _ => {
                out.push_str(&format!(
                    "{}: {}\n",
                    styles.dir.apply_to(&dir.name),
                    dir_counts(dir, &styles)
                ));
                render_tree(dir, 1, &styles, &mut out);
            }
        }
    }

    if !result.files.is_empty() {
        out.push_str(&format!("\n{}\n", styles.heading.apply_to("Files:")));
    }
    for file in &result.files {
        out.push_str(&format!(
            "{}: {}\n",
            styles.dir.apply_to(&file.name),
            styles.count.apply_to(file.count)
        ));
    }

    out
}

/// `total` or `total (non-recursive)` when the two differ
fn dir_counts(dir: &DirStats, styles: &Styles) -> String {
    if dir.total_count == dir.non_rec_count {
        styles.count.apply_to(dir.total_count).to_string()
    } else {
        format!(
            "{} ({})",
            styles.count.apply_to(dir.total_count),
            styles.count.apply_to(dir.non_rec_count)
        )
    }
}

fn render_tree(dir: &DirStats, depth: usize, styles: &Styles, out: &mut String) {
    let indent = "\t".repeat(depth);
    for child in dir.dir_counts.values() {
        out.push_str(&format!(
            "{}{}: {}\n",
            indent,
            styles.subdir.apply_to(&child.name),
            dir_counts(child, styles)
        ));
        render_tree(child, depth + 1, styles, out);
    }
    for (name, count) in &dir.file_counts {
        out.push_str(&format!(
            "{}{}: {}\n",
            indent,
            styles.file.apply_to(format!("File {}", name)),
            styles.count.apply_to(count)
        ));
    }
}

/// Render a result as pretty JSON.
pub fn render_json(result: &QueryResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// One line per failed target, for stderr.
pub fn render_failures(result: &QueryResult) -> String {
    result
        .failures
        .iter()
        .map(|f| format!("Error: {}: {}\n", f.path.display(), f.error))
        .collect()
}
