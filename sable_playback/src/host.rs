//! The narrow interfaces this crate needs from the bouncer or server hosting it.
//!
//! Connection management, channel state and backlog storage all belong to the
//! host. The playback logic only reads buffers, asks for them to be cleared, and
//! writes lines to clients; the host in turn calls the [`BufferPlaybackHooks`] at
//! each step of its own backlog flush so that flush can be suppressed.

use std::fmt::{Display, Formatter};

use crate::backlog::{BufferedLine, ConversationBuffer};
use crate::errors::SendError;
use crate::gate::ReplayGuard;

/// Stable identifier for a connected client, assigned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the host should do after consulting a hook
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookAction {
    /// Carry on with the default behaviour
    Continue,
    /// Skip the default behaviour for this step
    Halt,
}

/// Somewhere replayed lines can be written
pub trait ReplaySink {
    /// Render a buffered line as it should appear to `client`
    fn render_line(&self, line: &BufferedLine, client: ClientId) -> String;

    /// Write a complete protocol line to `client`
    fn put_client(&mut self, client: ClientId, line: &str) -> Result<(), SendError>;
}

/// Checkpoints the host calls while sending a conversation's backlog to a client
pub trait BufferPlaybackHooks {
    /// Held by the host for the whole of a backlog send
    fn begin_send(&self) -> Option<ReplayGuard<'_>> {
        None
    }

    /// Before anything from the buffer is sent
    fn on_buffer_starting(&self, conversation: &str, client: ClientId) -> HookAction;

    /// For each line, after rendering; the hook may modify `rendered`
    fn on_buffer_play_line(
        &self,
        conversation: &str,
        client: ClientId,
        line: &BufferedLine,
        rendered: &mut String,
    ) -> HookAction;

    /// After every line has been offered. `lines` is the full set the host was
    /// sending, and `sink` lets the hook write its own replacement output.
    fn on_buffer_ending(
        &self,
        conversation: &str,
        client: ClientId,
        lines: &[BufferedLine],
        sink: &mut dyn ReplaySink,
    ) -> Result<HookAction, SendError>;
}

/// Everything the playback module needs from its host
pub trait PlaybackHost: ReplaySink {
    /// Names of all conversations with a backlog, channels and queries alike
    fn conversations(&self) -> Vec<String>;

    fn buffer(&self, conversation: &str) -> Option<&ConversationBuffer>;

    /// Erase a conversation's backlog. Returns false if there was no such conversation.
    fn clear_buffer(&mut self, conversation: &str) -> bool;

    /// Send a reply from the module itself to `client`
    fn put_module(&mut self, client: ClientId, text: &str) -> Result<(), SendError>;

    /// Line the host sends before a backlog, if it marks one
    fn buffer_start_line(&self, _conversation: &str, _client: ClientId) -> Option<String> {
        None
    }

    /// Line the host sends after a backlog, if it marks one
    fn buffer_end_line(&self, _conversation: &str, _client: ClientId) -> Option<String> {
        None
    }

    /// The host's backlog send path: offer `lines` to `client`, consulting `hooks`
    /// at each checkpoint.
    fn send_buffer(
        &mut self,
        conversation: &str,
        client: ClientId,
        lines: &[BufferedLine],
        hooks: &dyn BufferPlaybackHooks,
    ) -> Result<(), SendError>
    where
        Self: Sized,
    {
        let _sending = hooks.begin_send();

        if hooks.on_buffer_starting(conversation, client) == HookAction::Continue {
            if let Some(start) = self.buffer_start_line(conversation, client) {
                self.put_client(client, &start)?;
            }
        }

        for line in lines {
            let mut rendered = self.render_line(line, client);
            if hooks.on_buffer_play_line(conversation, client, line, &mut rendered) == HookAction::Continue {
                self.put_client(client, &rendered)?;
            }
        }

        if hooks.on_buffer_ending(conversation, client, lines, &mut *self)? == HookAction::Continue {
            if let Some(end) = self.buffer_end_line(conversation, client) {
                self.put_client(client, &end)?;
            }
        }

        Ok(())
    }

    /// Send a conversation's whole backlog, as the host does when a client attaches
    fn flush_buffer(
        &mut self,
        conversation: &str,
        client: ClientId,
        hooks: &dyn BufferPlaybackHooks,
    ) -> Result<(), SendError>
    where
        Self: Sized,
    {
        let lines: Vec<BufferedLine> = match self.buffer(conversation) {
            Some(buffer) if !buffer.is_empty() => buffer.iter().cloned().collect(),
            _ => return Ok(()),
        };
        self.send_buffer(conversation, client, &lines, hooks)
    }

    /// Flush every conversation's backlog, as the host does when a client attaches
    fn flush_all(&mut self, client: ClientId, hooks: &dyn BufferPlaybackHooks) -> Result<(), SendError>
    where
        Self: Sized,
    {
        for conversation in self.conversations() {
            self.flush_buffer(&conversation, client, hooks)?;
        }
        Ok(())
    }
}
