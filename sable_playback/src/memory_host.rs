//! A host that keeps everything in memory, for the command-line driver and tests.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::backlog::{BufferedLine, ConversationBuffer};
use crate::config::ConfigError;
use crate::errors::SendError;
use crate::host::{ClientId, PlaybackHost, ReplaySink};
use crate::messages::Privmsg;

/// Mask the module's own replies come from
pub const MODULE_SOURCE: &str = "*playback!znc@znc.in";

/// Backlog contents as stored on disk
#[derive(Debug, Default, Deserialize)]
pub struct BacklogSnapshot {
    /// Maximum number of lines kept per conversation
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub conversations: BTreeMap<String, Vec<BufferedLine>>,
}

impl BacklogSnapshot {
    pub fn load_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(filename)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    limit: Option<usize>,
    buffers: BTreeMap<String, ConversationBuffer>,
    nicks: HashMap<ClientId, String>,
    sent: Vec<(ClientId, String)>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: BacklogSnapshot) -> Self {
        let mut host = Self {
            limit: snapshot.limit,
            ..Self::default()
        };
        for (conversation, lines) in snapshot.conversations {
            for line in lines {
                host.append(&conversation, line);
            }
        }
        host
    }

    /// Register a connected client under `nick`
    pub fn connect(&mut self, client: ClientId, nick: impl Into<String>) {
        self.nicks.insert(client, nick.into());
    }

    pub fn disconnect(&mut self, client: ClientId) {
        self.nicks.remove(&client);
    }

    /// Add a line to a conversation's backlog, creating the buffer if needed
    pub fn append(&mut self, conversation: &str, line: BufferedLine) {
        let limit = self.limit;
        self.buffers
            .entry(conversation.to_string())
            .or_insert_with(|| match limit {
                Some(limit) => ConversationBuffer::with_limit(limit),
                None => ConversationBuffer::new(),
            })
            .push(line);
    }

    /// Everything written to clients so far, in order
    pub fn sent(&self) -> &[(ClientId, String)] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<(ClientId, String)> {
        std::mem::take(&mut self.sent)
    }

    /// The lines written to one client
    pub fn lines_for(&self, client: ClientId) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(to, _)| *to == client)
            .map(|(_, line)| line.as_str())
            .collect()
    }

    fn nick(&self, client: ClientId) -> &str {
        self.nicks.get(&client).map(String::as_str).unwrap_or("*")
    }
}

impl ReplaySink for MemoryHost {
    fn render_line(&self, line: &BufferedLine, client: ClientId) -> String {
        line.render(self.nick(client))
    }

    fn put_client(&mut self, client: ClientId, line: &str) -> Result<(), SendError> {
        if !self.nicks.contains_key(&client) {
            return Err(SendError::Closed(client));
        }
        self.sent.push((client, line.to_string()));
        Ok(())
    }
}

impl PlaybackHost for MemoryHost {
    fn conversations(&self) -> Vec<String> {
        self.buffers.keys().cloned().collect()
    }

    fn buffer(&self, conversation: &str) -> Option<&ConversationBuffer> {
        self.buffers.get(conversation)
    }

    fn clear_buffer(&mut self, conversation: &str) -> bool {
        match self.buffers.get_mut(conversation) {
            Some(buffer) => {
                buffer.clear();
                true
            }
            None => false,
        }
    }

    fn put_module(&mut self, client: ClientId, text: &str) -> Result<(), SendError> {
        let line = Privmsg::new(MODULE_SOURCE, self.nick(client), text);
        self.put_client(client, line.as_str())
    }
}
