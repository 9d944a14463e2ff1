//! Echo of a client's own messages back to it, for `echo-message`.

use crate::capability::server_time::add_server_time;
use crate::capability::{CapabilityRegistry, ClientCapability};
use crate::errors::SendError;
use crate::host::{ClientId, ReplaySink};
use crate::messages;
use crate::utils::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Privmsg,
    Notice,
    Action,
}

impl MessageKind {
    /// Classify an outgoing PRIVMSG or NOTICE, unwrapping a CTCP ACTION
    pub fn classify<'a>(command: &str, text: &'a str) -> Option<(Self, &'a str)> {
        if command.eq_ignore_ascii_case("NOTICE") {
            return Some((MessageKind::Notice, text));
        }
        if !command.eq_ignore_ascii_case("PRIVMSG") {
            return None;
        }
        match text.strip_prefix("\x01ACTION ") {
            Some(action) => Some((MessageKind::Action, action.strip_suffix('\x01').unwrap_or(action))),
            None => Some((MessageKind::Privmsg, text)),
        }
    }
}

/// Send `client` a copy of a message it just sent, if it asked for echoes.
///
/// `source` is the client's own `nick!user@host`. Returns whether an echo was sent.
pub fn relay_own_message(
    sink: &mut dyn ReplaySink,
    registry: &CapabilityRegistry,
    client: ClientId,
    source: &str,
    kind: MessageKind,
    target: &str,
    text: &str,
) -> Result<bool, SendError> {
    if !registry.is_enabled(client, ClientCapability::EchoMessage) {
        return Ok(false);
    }

    let mut line: String = match kind {
        MessageKind::Privmsg => messages::Privmsg::new(source, target, text).into(),
        MessageKind::Notice => messages::Notice::new(source, target, text).into(),
        MessageKind::Action => messages::Action::new(source, target, text).into(),
    };
    if registry.wants_server_time(client) {
        add_server_time(&mut line, Timestamp::now(), false);
    }

    sink.put_client(client, &line)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify() {
        assert_eq!(MessageKind::classify("privmsg", "hi"), Some((MessageKind::Privmsg, "hi")));
        assert_eq!(MessageKind::classify("NOTICE", "hi"), Some((MessageKind::Notice, "hi")));
        assert_eq!(
            MessageKind::classify("PRIVMSG", "\x01ACTION waves\x01"),
            Some((MessageKind::Action, "waves"))
        );
        assert_eq!(MessageKind::classify("JOIN", "#x"), None);
    }
}
