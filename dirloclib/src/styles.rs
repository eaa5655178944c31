//! Comment syntax per file type.
//!
//! A [`CommentStyleTable`] maps file extensions to a [`CommentRule`]: the
//! line-comment prefixes and block-comment delimiter pairs of a language.
//! The JSON shape is
//!
//! ```json
//! {
//!   "default": null,
//!   "extensions": [
//!     [["js", "ts"], ["//", ["/*", "*/"]]],
//!     [["py"], "#"]
//!   ]
//! }
//! ```
//!
//! where a rule is a single line token, `null`, or an array mixing line
//! tokens and `[start, end]` block pairs.

use serde::Deserialize;

/// A block comment delimiter pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct BlockComment {
    pub start: String,
    pub end: String,
}

impl BlockComment {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl From<(String, String)> for BlockComment {
    fn from((start, end): (String, String)) -> Self {
        Self { start, end }
    }
}

/// One entry of a rule array in the JSON form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TokenRepr {
    Line(String),
    Block(BlockComment),
}

/// The accepted JSON forms of a rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RuleRepr {
    Single(String),
    Tokens(Vec<TokenRepr>),
}

/// Comment syntax of one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RuleRepr")]
pub struct CommentRule {
    /// Prefixes that mark a whole line as a comment, in match order
    pub line: Vec<String>,
    /// Block delimiter pairs, in match order
    pub block: Vec<BlockComment>,
}

impl From<RuleRepr> for CommentRule {
    fn from(repr: RuleRepr) -> Self {
        match repr {
            RuleRepr::Single(token) => CommentRule::line_only([token]),
            RuleRepr::Tokens(tokens) => {
                let mut rule = CommentRule::default();
                for token in tokens {
                    match token {
                        TokenRepr::Line(t) => rule.line.push(t),
                        TokenRepr::Block(b) => rule.block.push(b),
                    }
                }
                rule
            }
        }
    }
}

impl CommentRule {
    /// A rule with only line-comment prefixes.
    pub fn line_only<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line: tokens.into_iter().map(Into::into).collect(),
            block: Vec::new(),
        }
    }

    /// Builder: append a block delimiter pair.
    pub fn with_block(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.block.push(BlockComment::new(start, end));
        self
    }

    /// True when the rule has no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.line.is_empty() && self.block.is_empty()
    }

    /// First empty token, if any. An empty prefix would match every line.
    fn find_empty_token(&self) -> Option<&'static str> {
        if self.line.iter().any(|t| t.is_empty()) {
            return Some("line comment token");
        }
        if self
            .block
            .iter()
            .any(|b| b.start.is_empty() || b.end.is_empty())
        {
            return Some("block comment delimiter");
        }
        None
    }
}

/// Mapping from file extensions to comment rules.
///
/// Immutable once loaded; pass it by reference into every count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentStyleTable {
    /// Rule for files with no extension or no matching entry
    #[serde(default)]
    pub default: Option<CommentRule>,
    /// Extension sets and their rule, searched in order
    #[serde(default)]
    pub extensions: Vec<(Vec<String>, Option<CommentRule>)>,
}

impl CommentStyleTable {
    /// A table with no comment awareness at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder: set the fallback rule
    pub fn with_default(mut self, rule: Option<CommentRule>) -> Self {
        self.default = rule;
        self
    }

    /// Builder: add an extension entry
    pub fn with_extensions<I, S>(mut self, extensions: I, rule: Option<CommentRule>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions
            .push((extensions.into_iter().map(Into::into).collect(), rule));
        self
    }

    /// Find the rule that applies to a file extension.
    ///
    /// The extension may carry a leading dot. Matching ignores ASCII case.
    /// `None` means comment exclusion is disabled for the file.
    pub fn resolve(&self, extension: &str) -> Option<&CommentRule> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        if ext.is_empty() {
            return self.default.as_ref();
        }

        self.extensions
            .iter()
            .find(|(exts, _)| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .map_or(self.default.as_ref(), |(_, rule)| rule.as_ref())
    }

    /// Reject rules that would make every line a comment.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(kind) = self.default.as_ref().and_then(CommentRule::find_empty_token) {
            return Err(format!("empty {} in default rule", kind));
        }
        for (exts, rule) in &self.extensions {
            if exts.is_empty() {
                return Err("extension entry with no extensions".to_string());
            }
            if let Some(kind) = rule.as_ref().and_then(CommentRule::find_empty_token) {
                return Err(format!("empty {} in rule for [{}]", kind, exts.join(", ")));
            }
        }
        Ok(())
    }
}
