use crate::tags::{self, MessageTagSet};

/// A tokenised, but not yet processed, line from a client
#[derive(Debug)]
pub struct InboundCommand {
    /// The command, as sent
    pub command: String,
    /// The list of arguments
    pub args: Vec<String>,
    /// The tags attached to the line
    pub tags: MessageTagSet,
}

impl InboundCommand {
    /// Split a raw client line into tags, command and arguments
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim_start();
        let tags = tags::parse_tags(raw);
        let raw = tags::strip_tags(raw).trim_start();
        if raw.is_empty() {
            return None;
        }

        let (command, mut rest) = match raw.split_once(' ') {
            Some((command, rest)) => (command, rest),
            None => (raw, ""),
        };

        let mut args = Vec::new();
        loop {
            if let Some(arg) = rest.strip_prefix(':') {
                args.push(arg.to_string());
                break;
            }

            match rest.split_once(' ') {
                Some((arg, remainder)) => {
                    if !arg.is_empty() {
                        args.push(arg.to_string());
                    }
                    rest = remainder;
                }
                None => {
                    if !rest.is_empty() {
                        args.push(rest.to_string());
                    }
                    break;
                }
            }
        }

        Some(Self {
            command: command.to_string(),
            args,
            tags,
        })
    }

    /// Whether this is the given command, ignoring case
    pub fn is(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args() {
        let msg = InboundCommand::parse("PLAYBACK").unwrap();
        assert_eq!(msg.command, "PLAYBACK");
        assert_eq!(msg.args.len(), 0);
    }

    #[test]
    fn simple_args() {
        let msg = InboundCommand::parse("PRIVMSG #x :hello there").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.args, &["#x", "hello there"]);
    }

    #[test]
    fn double_space() {
        let msg = InboundCommand::parse("playback #a,#b  1400000000").unwrap();
        assert!(msg.is("PLAYBACK"));
        assert_eq!(msg.args, &["#a,#b", "1400000000"]);
    }

    #[test]
    fn ending_colon() {
        let msg = InboundCommand::parse("PRIVMSG #x :").unwrap();
        assert_eq!(msg.args, &["#x", ""]);
    }

    #[test]
    fn empty() {
        assert!(InboundCommand::parse("").is_none());
        assert!(InboundCommand::parse("   ").is_none());
        assert!(InboundCommand::parse("@label=1 ").is_none());
    }

    #[test]
    fn tags() {
        let msg = InboundCommand::parse("@label=abc;draft/flag PLAYBACK #x").unwrap();
        assert_eq!(msg.command, "PLAYBACK");
        assert_eq!(msg.args, &["#x"]);
        assert_eq!(msg.tags.get("label"), Some("abc"));
        assert_eq!(msg.tags.get("draft/flag"), Some(""));
    }
}
