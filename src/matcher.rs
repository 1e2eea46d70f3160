//! Wildcard include/exclude matching for module names.

use crate::error::{AuditError, Result};
use regex::{Regex, RegexBuilder};

/// Translate a glob-style pattern into an anchored regular expression.
///
/// `*` matches any run of characters; every other character is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let parts: Vec<String> = pattern.split('*').map(|p| regex::escape(p)).collect();
    format!("^{}$", parts.join(".*"))
}

/// A set of wildcard patterns compiled once per traversal.
///
/// Matching is case-insensitive and anchored: the whole candidate string
/// must match, partial matches do not count.
#[derive(Debug)]
pub struct WildcardMatcher {
    patterns: Vec<Regex>,
}

impl WildcardMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                RegexBuilder::new(&wildcard_to_regex(p.as_ref()))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        AuditError::config(format!("Invalid pattern \"{}\": {e}", p.as_ref()))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any pattern matches the candidate.
    pub fn matches(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(candidate))
    }
}
