//! IRC-style glob matching for conversation names.
//!
//! Permitted wildcards are * (match zero or more characters) and ? (match exactly one character)

use std::fmt::Display;
use std::ops::Deref;

use wildmatch::WildMatch;

/// A wildcard pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    folded: String,
}

impl Deref for Pattern {
    type Target = str;

    fn deref(&self) -> &str {
        &self.source
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.source.fmt(f)
    }
}

impl Pattern {
    /// Construct a `Pattern`
    pub fn new(s: impl Into<String>) -> Self {
        let source = s.into();
        let folded = source.to_ascii_lowercase();
        Self { source, folded }
    }

    /// Split a comma-separated list of patterns, skipping empty entries
    pub fn split_list(list: &str) -> Vec<Pattern> {
        list.split(',')
            .filter(|fragment| !fragment.is_empty())
            .map(Pattern::new)
            .collect()
    }

    /// Test whether the given name matches this pattern. Matching ignores ASCII case,
    /// as channel names do.
    pub fn matches(&self, name: &str) -> bool {
        WildMatch::new(&self.folded).matches(&name.to_ascii_lowercase())
    }
}
