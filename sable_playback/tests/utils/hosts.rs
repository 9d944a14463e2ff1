use std::io::{Error as IoError, ErrorKind};

use sable_playback::gate::ReplayGate;
use sable_playback::memory_host::MemoryHost;
use sable_playback::prelude::*;

/// Fails every write after the first `budget`
pub struct FailingHost {
    pub inner: MemoryHost,
    pub budget: usize,
}

impl ReplaySink for FailingHost {
    fn render_line(&self, line: &BufferedLine, client: ClientId) -> String {
        self.inner.render_line(line, client)
    }

    fn put_client(&mut self, client: ClientId, line: &str) -> Result<(), SendError> {
        if self.budget == 0 {
            return Err(IoError::new(ErrorKind::BrokenPipe, "connection reset").into());
        }
        self.budget -= 1;
        self.inner.put_client(client, line)
    }
}

impl PlaybackHost for FailingHost {
    fn conversations(&self) -> Vec<String> {
        self.inner.conversations()
    }

    fn buffer(&self, conversation: &str) -> Option<&ConversationBuffer> {
        self.inner.buffer(conversation)
    }

    fn clear_buffer(&mut self, conversation: &str) -> bool {
        self.inner.clear_buffer(conversation)
    }

    fn put_module(&mut self, client: ClientId, text: &str) -> Result<(), SendError> {
        self.inner.put_module(client, text)
    }
}

/// Records, for every line written, whether a replay was in progress at the time
pub struct ObservingHost<'a> {
    pub inner: MemoryHost,
    pub gate: &'a ReplayGate,
    pub replaying: Vec<bool>,
}

impl ReplaySink for ObservingHost<'_> {
    fn render_line(&self, line: &BufferedLine, client: ClientId) -> String {
        self.inner.render_line(line, client)
    }

    fn put_client(&mut self, client: ClientId, line: &str) -> Result<(), SendError> {
        self.replaying.push(self.gate.is_replaying());
        self.inner.put_client(client, line)
    }
}

impl PlaybackHost for ObservingHost<'_> {
    fn conversations(&self) -> Vec<String> {
        self.inner.conversations()
    }

    fn buffer(&self, conversation: &str) -> Option<&ConversationBuffer> {
        self.inner.buffer(conversation)
    }

    fn clear_buffer(&mut self, conversation: &str) -> bool {
        self.inner.clear_buffer(conversation)
    }

    fn put_module(&mut self, client: ClientId, text: &str) -> Result<(), SendError> {
        self.inner.put_module(client, text)
    }

    fn buffer_start_line(&self, conversation: &str, _client: ClientId) -> Option<String> {
        Some(format!(":host.test NOTICE {} :Backlog starts", conversation))
    }

    fn buffer_end_line(&self, conversation: &str, _client: ClientId) -> Option<String> {
        Some(format!(":host.test NOTICE {} :Backlog ends", conversation))
    }
}

/// Passes every line through the module's outbound interception as it is written
pub struct InterceptingHost<'a> {
    pub inner: MemoryHost,
    pub module: &'a PlaybackModule,
}

impl ReplaySink for InterceptingHost<'_> {
    fn render_line(&self, line: &BufferedLine, client: ClientId) -> String {
        self.inner.render_line(line, client)
    }

    fn put_client(&mut self, client: ClientId, line: &str) -> Result<(), SendError> {
        let mut line = line.to_string();
        self.module.on_send_to_client(client, &mut line);
        self.inner.put_client(client, &line)
    }
}

impl PlaybackHost for InterceptingHost<'_> {
    fn conversations(&self) -> Vec<String> {
        self.inner.conversations()
    }

    fn buffer(&self, conversation: &str) -> Option<&ConversationBuffer> {
        self.inner.buffer(conversation)
    }

    fn clear_buffer(&mut self, conversation: &str) -> bool {
        self.inner.clear_buffer(conversation)
    }

    fn put_module(&mut self, client: ClientId, text: &str) -> Result<(), SendError> {
        self.inner.put_module(client, text)
    }
}
