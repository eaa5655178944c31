//! Per-line classification: does a line count as code?
//!
//! Comment detection is prefix/suffix matching on the trimmed line, not a
//! lexer. The only state carried between lines of a file is whether we are
//! inside a block comment.
//!
//! ## Block comment rules
//!
//! Pairs are tried in configured order. For each pair, a line starting
//! with the open token enters the block; while inside a block, a line
//! ending with the close token leaves it. The first pair that fires decides
//! the line and the new state. A line that opens and closes on the same
//! line (`/* note */`) is a comment line, and so is a line closing a block
//! even if code follows the close token.
//!
//! Lines inside an open block that fire neither token are comment lines.

use crate::options::CountOptions;
use crate::styles::{BlockComment, CommentRule};

/// Result of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineVerdict {
    /// Whether the line is counted
    pub counts: bool,
    /// Block comment state after this line
    pub in_block_comment: bool,
}

impl LineVerdict {
    fn code(in_block_comment: bool) -> Self {
        Self {
            counts: true,
            in_block_comment,
        }
    }

    fn skip(in_block_comment: bool) -> Self {
        Self {
            counts: false,
            in_block_comment,
        }
    }
}

/// Classify a single line.
///
/// `line_comments` and `block_comments` are the tokens of the file's
/// language; `in_block_comment` is the state left by the previous line.
pub fn classify_line(
    line: &str,
    line_comments: &[String],
    block_comments: &[BlockComment],
    in_block_comment: bool,
    exclude_comments: bool,
    exclude_empty_lines: bool,
) -> LineVerdict {
    let trimmed = line.trim();

    if exclude_empty_lines && trimmed.is_empty() {
        return LineVerdict::skip(in_block_comment);
    }
    if !exclude_comments {
        return LineVerdict::code(in_block_comment);
    }

    if line_comments.iter().any(|t| trimmed.starts_with(t.as_str())) {
        return LineVerdict::skip(in_block_comment);
    }

    let mut in_block = in_block_comment;
    for pair in block_comments {
        let mut fired = false;
        if trimmed.starts_with(pair.start.as_str()) {
            fired = true;
            in_block = true;
        }
        if in_block && trimmed.ends_with(pair.end.as_str()) {
            fired = true;
            in_block = false;
        }
        if fired {
            return LineVerdict::skip(in_block);
        }
    }

    if in_block {
        LineVerdict::skip(true)
    } else {
        LineVerdict::code(false)
    }
}

/// Stateful classifier for the lines of one file.
///
/// Create one per file; the block comment state never leaks across files.
#[derive(Debug, Clone)]
pub struct LineClassifier<'a> {
    line_comments: &'a [String],
    block_comments: &'a [BlockComment],
    exclude_comments: bool,
    exclude_empty_lines: bool,
    in_block_comment: bool,
}

impl<'a> LineClassifier<'a> {
    /// Build a classifier for a file whose language resolved to `rule`.
    ///
    /// With no rule, comment exclusion is off whatever the options say.
    pub fn new(rule: Option<&'a CommentRule>, options: &CountOptions) -> Self {
        let (line_comments, block_comments): (&[String], &[BlockComment]) = match rule {
            Some(rule) => (rule.line.as_slice(), rule.block.as_slice()),
            None => (&[], &[]),
        };
        Self {
            line_comments,
            block_comments,
            exclude_comments: options.exclude_comments && rule.is_some(),
            exclude_empty_lines: options.exclude_empty_lines,
            in_block_comment: false,
        }
    }

    /// Classify the next line, advancing the block comment state.
    pub fn counts(&mut self, line: &str) -> bool {
        let verdict = classify_line(
            line,
            self.line_comments,
            self.block_comments,
            self.in_block_comment,
            self.exclude_comments,
            self.exclude_empty_lines,
        );
        self.in_block_comment = verdict.in_block_comment;
        verdict.counts
    }

    /// Whether the last line left a block comment open.
    pub fn in_block_comment(&self) -> bool {
        self.in_block_comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_rule() -> CommentRule {
        CommentRule::line_only(["//"]).with_block("/*", "*/")
    }

    fn both() -> CountOptions {
        CountOptions::new()
            .exclude_comments(true)
            .exclude_empty_lines(true)
    }

    fn count_lines(lines: &[&str], rule: Option<&CommentRule>, options: &CountOptions) -> usize {
        let mut classifier = LineClassifier::new(rule, options);
        lines.iter().filter(|l| classifier.counts(l)).count()
    }

    const SAMPLE: [&str; 8] = [
        "// a",
        "",
        "code",
        "  ",
        "/* b",
        "still b",
        "end b */",
        "more code",
    ];

    #[test]
    fn test_sample_with_all_exclusions() {
        let rule = c_rule();
        assert_eq!(count_lines(&SAMPLE, Some(&rule), &both()), 2);
    }

    #[test]
    fn test_sample_without_exclusions() {
        let rule = c_rule();
        assert_eq!(count_lines(&SAMPLE, Some(&rule), &CountOptions::new()), 8);
    }

    #[test]
    fn test_whitespace_only_never_counts_when_excluded() {
        let rule = c_rule();
        let only_empty = CountOptions::new().exclude_empty_lines(true);
        for line in ["", " ", "\t", " \t  ", "\u{a0}"] {
            assert!(!LineClassifier::new(Some(&rule), &both()).counts(line));
            assert!(!LineClassifier::new(None, &only_empty).counts(line));
        }
    }

    #[test]
    fn test_blank_line_keeps_block_state() {
        let rule = c_rule();
        let mut classifier = LineClassifier::new(Some(&rule), &both());
        assert!(!classifier.counts("/* open"));
        assert!(!classifier.counts(""));
        assert!(classifier.in_block_comment());
        assert!(!classifier.counts("close */"));
        assert!(!classifier.in_block_comment());
    }

    #[test]
    fn test_same_line_block_is_comment() {
        let rule = c_rule();
        let mut classifier = LineClassifier::new(Some(&rule), &both());
        assert!(!classifier.counts("/* one liner */"));
        assert!(!classifier.in_block_comment());
        assert!(classifier.counts("x = 1;"));
    }

    #[test]
    fn test_code_after_block_close_is_not_counted() {
        let rule = c_rule();
        let mut classifier = LineClassifier::new(Some(&rule), &both());
        assert!(!classifier.counts("/*"));
        assert!(!classifier.counts("*/ let x = 1; /* tail */"));
        assert!(!classifier.in_block_comment());
    }

    #[test]
    fn test_close_token_outside_block_counts() {
        let rule = c_rule();
        let mut classifier = LineClassifier::new(Some(&rule), &both());
        assert!(classifier.counts("a = b */"));
        assert!(!classifier.in_block_comment());
    }

    #[test]
    fn test_line_comment_checked_before_blocks() {
        let rule = CommentRule::line_only(["--"]).with_block("--[[", "]]");
        let mut classifier = LineClassifier::new(Some(&rule), &both());
        // "--[[" starts with "--", so the line token wins and no block opens
        assert!(!classifier.counts("--[[ lua block"));
        assert!(!classifier.in_block_comment());
        assert!(classifier.counts("print(1)"));
    }

    #[test]
    fn test_first_firing_pair_wins() {
        let rule = CommentRule::default()
            .with_block("<!--", "-->")
            .with_block("/*", "*/");
        let mut classifier = LineClassifier::new(Some(&rule), &both());
        assert!(!classifier.counts("/* opened by second pair"));
        assert!(classifier.in_block_comment());
        // any pair's close token ends the single block state
        assert!(!classifier.counts("closed by first pair -->"));
        assert!(!classifier.in_block_comment());
    }

    #[test]
    fn test_no_rule_disables_comment_exclusion() {
        let lines = ["# not a comment without a rule", "// neither", ""];
        assert_eq!(count_lines(&lines, None, &both()), 2);
    }

    #[test]
    fn test_comments_counted_when_not_excluded() {
        let rule = c_rule();
        let opts = CountOptions::new().exclude_empty_lines(true);
        let lines = ["// c", "/* d", "e */", ""];
        assert_eq!(count_lines(&lines, Some(&rule), &opts), 3);
    }

    #[test]
    fn test_classify_line_is_pure() {
        let line_tokens = vec!["#".to_string()];
        let verdict = classify_line("  # note", &line_tokens, &[], true, true, false);
        assert_eq!(
            verdict,
            LineVerdict {
                counts: false,
                in_block_comment: true
            }
        );

        let verdict = classify_line("x", &line_tokens, &[], false, true, false);
        assert!(verdict.counts);
    }
}
