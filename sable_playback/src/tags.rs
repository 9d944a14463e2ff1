//! Parsing and serialisation of the IRCv3 message-tag prefix of a protocol line.
//!
//! A tagged line looks like `@name=value;other :source COMMAND args`. Tags are
//! optional metadata, so anything that doesn't look like a well-formed prefix is
//! treated as though the line carried no tags at all.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

/// The tags attached to a single line, keyed by tag name.
///
/// Iteration and serialisation are in name order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageTagSet(BTreeMap<String, String>);

impl MessageTagSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set a tag, returning the value it replaced
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MessageTagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Formats the tag list without the leading `@`. Tags with an empty value are
/// written as a bare name.
impl Display for MessageTagSet {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let entries = self.0.iter().format_with(";", |(name, value), f| {
            if value.is_empty() {
                f(name)
            } else {
                f(&format_args!("{}={}", name, value))
            }
        });
        write!(f, "{}", entries)
    }
}

/// Split a line into its tag token (without the `@`) and the remainder of the line.
///
/// Returns `None` for lines without a tag prefix, and for a prefix that isn't
/// followed by whitespace.
fn split_tag_prefix(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('@')?;
    let end = rest.find(char::is_whitespace)?;
    Some((&rest[..end], rest[end..].trim_start()))
}

/// Read the tags at the start of `line`.
///
/// Each `;`-separated entry is split at its first `=`; an entry without one has an
/// empty value. A prefix with an empty tag name in it is malformed, and yields an
/// empty set.
pub fn parse_tags(line: &str) -> MessageTagSet {
    let Some((token, _)) = split_tag_prefix(line) else {
        return MessageTagSet::new();
    };

    let mut tags = MessageTagSet::new();
    for entry in token.split(';').filter(|e| !e.is_empty()) {
        let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
        if name.is_empty() {
            tracing::debug!("Ignoring malformed tag prefix {:?}", token);
            return MessageTagSet::new();
        }
        tags.set(name, value);
    }
    tags
}

/// The part of `line` after any tag prefix
pub fn strip_tags(line: &str) -> &str {
    match split_tag_prefix(line) {
        Some((_, rest)) => rest,
        None if line.starts_with('@') => "",
        None => line,
    }
}

/// Replace the tag prefix of `line` with `tags`.
///
/// An empty tag set removes the prefix entirely.
pub fn serialize_tags(line: &str, tags: &MessageTagSet) -> String {
    let body = strip_tags(line);
    if tags.is_empty() {
        body.to_string()
    } else {
        format!("@{} {}", tags, body)
    }
}

/// Make sure `line` carries the tag `name`.
///
/// If the tag is absent it is added with the value produced by `value`, keeping
/// every other tag the line already had; if `overwrite` is set an existing value
/// is replaced instead of kept. Returns whether the line was changed.
pub fn ensure_tag(
    line: &mut String,
    name: &str,
    overwrite: bool,
    value: impl FnOnce() -> String,
) -> bool {
    let mut tags = parse_tags(line);
    if tags.has(name) && !overwrite {
        return false;
    }
    tags.set(name, value());
    *line = serialize_tags(line, &tags);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_line() {
        assert!(parse_tags(":nick!u@h PRIVMSG #x :hi").is_empty());
    }

    #[test]
    fn tags_with_and_without_values() {
        let tags = parse_tags("@time=2014-05-13T16:53:20.000Z;znc.in/flag :n PRIVMSG #x :hi");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("time"), Some("2014-05-13T16:53:20.000Z"));
        assert_eq!(tags.get("znc.in/flag"), Some(""));
    }

    #[test]
    fn value_split_at_first_equals() {
        let tags = parse_tags("@a=b=c :n PRIVMSG #x :hi");
        assert_eq!(tags.get("a"), Some("b=c"));
    }

    #[test]
    fn malformed_prefix_is_empty() {
        assert!(parse_tags("@=oops;a=b :n PRIVMSG #x :hi").is_empty());
        assert!(parse_tags("@a=b").is_empty());
        assert!(parse_tags("@ PRIVMSG #x :hi").is_empty());
    }

    #[test]
    fn serialize_replaces_existing_prefix() {
        let tags: MessageTagSet = [("b", "2"), ("a", "1")].into_iter().collect();
        let line = serialize_tags("@old=x :n PRIVMSG #x :hi", &tags);
        assert_eq!(line, "@a=1;b=2 :n PRIVMSG #x :hi");
    }

    #[test]
    fn serialize_empty_set_strips_prefix() {
        let line = serialize_tags("@old=x :n PRIVMSG #x :hi", &MessageTagSet::new());
        assert_eq!(line, ":n PRIVMSG #x :hi");
        assert_eq!(serialize_tags(":n PING", &MessageTagSet::new()), ":n PING");
    }

    #[test]
    fn valueless_tag_written_bare() {
        let tags: MessageTagSet = [("draft/bare", "")].into_iter().collect();
        assert_eq!(serialize_tags("PING x", &tags), "@draft/bare PING x");
    }

    #[test]
    fn round_trip() {
        let sets: [&[(&str, &str)]; 3] = [
            &[("time", "2014-05-13T16:53:20.000Z")],
            &[("a", "1"), ("b", ""), ("c", "xyz")],
            &[],
        ];
        for line in [":nick!u@h PRIVMSG #x :hi", "@stale=1 :n NOTICE #x :yo", ""] {
            for set in sets {
                let tags: MessageTagSet = set.iter().copied().collect();
                assert_eq!(parse_tags(&serialize_tags(line, &tags)), tags);
            }
        }
    }

    #[test]
    fn ensure_tag_keeps_or_overwrites() {
        let mut line = ":nick!u@h PRIVMSG #x :hi".to_string();
        assert!(ensure_tag(&mut line, "time", false, || "one".to_string()));
        assert_eq!(line, "@time=one :nick!u@h PRIVMSG #x :hi");

        assert!(!ensure_tag(&mut line, "time", false, || "two".to_string()));
        assert_eq!(line, "@time=one :nick!u@h PRIVMSG #x :hi");

        assert!(ensure_tag(&mut line, "time", true, || "three".to_string()));
        assert_eq!(line, "@time=three :nick!u@h PRIVMSG #x :hi");
    }
}
