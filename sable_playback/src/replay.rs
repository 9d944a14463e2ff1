//! Replay of buffered history on request.

use itertools::Itertools;

use crate::backlog::{BufferedLine, TimeFilter};
use crate::capability::server_time::add_server_time;
use crate::capability::CapabilityRegistry;
use crate::config::PlaybackConfig;
use crate::errors::SendError;
use crate::gate::{DefaultReplayGate, ReplayGate};
use crate::host::{ClientId, PlaybackHost, ReplaySink};
use crate::messages::Privmsg;
use crate::utils::Pattern;

/// Selects buffered history, frames it, and sends it to a client.
///
/// Every replay holds the engine's [`ReplayGate`] open while it writes, so the
/// host's flush hooks let the replayed lines through.
#[derive(Debug)]
pub struct ReplayEngine {
    gate: ReplayGate,
    sender: String,
    start_notice: String,
    end_notice: String,
}

impl ReplayEngine {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            gate: ReplayGate::new(),
            sender: config.sender.clone(),
            start_notice: config.start_notice.clone(),
            end_notice: config.end_notice.clone(),
        }
    }

    pub fn gate(&self) -> &ReplayGate {
        &self.gate
    }

    /// Find the conversations named by a comma-separated list of wildcard patterns.
    ///
    /// Results are in pattern order, each conversation at most once.
    pub fn resolve_targets<H: PlaybackHost + ?Sized>(host: &H, pattern: &str) -> Vec<String> {
        let all_names = host.conversations();
        let names = &all_names;

        Pattern::split_list(pattern)
            .into_iter()
            .flat_map(|pattern| names.iter().filter(move |name| pattern.matches(name)))
            .unique()
            .cloned()
            .collect()
    }

    /// Replay the lines of `conversation` selected by `filter` to `client`.
    ///
    /// Nothing at all is sent when no line matches. Returns the number of history
    /// lines replayed; a write failure abandons the rest of the replay.
    #[tracing::instrument(skip(self, host, registry))]
    pub fn replay<H: PlaybackHost>(
        &self,
        host: &mut H,
        registry: &CapabilityRegistry,
        client: ClientId,
        conversation: &str,
        filter: TimeFilter,
    ) -> Result<usize, SendError> {
        let lines = match host.buffer(conversation) {
            Some(buffer) => filter.apply(buffer.iter()),
            None => return Ok(0),
        };
        if lines.is_empty() {
            tracing::debug!("Nothing to replay");
            return Ok(0);
        }

        let _replaying = self.gate.begin_replay();
        host.put_client(client, self.start_line(conversation).as_str())?;
        host.send_buffer(conversation, client, &lines, &DefaultReplayGate::new(self, registry))?;
        host.put_client(client, self.end_line(conversation).as_str())?;

        tracing::info!("Replayed {} lines", lines.len());
        Ok(lines.len())
    }

    /// Replay every conversation matching `pattern`, returning the total number of
    /// lines sent
    pub fn replay_matching<H: PlaybackHost>(
        &self,
        host: &mut H,
        registry: &CapabilityRegistry,
        client: ClientId,
        pattern: &str,
        filter: TimeFilter,
    ) -> Result<usize, SendError> {
        let mut total = 0;
        for conversation in Self::resolve_targets(host, pattern) {
            total += self.replay(host, registry, client, &conversation, filter)?;
        }
        Ok(total)
    }

    /// Replay the lines from `lines` newer than `watermark` straight to `sink`,
    /// for a smart-playback client at the end of the host's flush
    pub(crate) fn replay_since(
        &self,
        sink: &mut dyn ReplaySink,
        registry: &CapabilityRegistry,
        client: ClientId,
        conversation: &str,
        lines: &[BufferedLine],
        watermark: i64,
    ) -> Result<usize, SendError> {
        let lines = TimeFilter::Since(watermark).apply(lines);
        if lines.is_empty() {
            return Ok(0);
        }

        let _replaying = self.gate.begin_replay();
        sink.put_client(client, self.start_line(conversation).as_str())?;
        for line in &lines {
            let mut rendered = sink.render_line(line, client);
            if registry.wants_server_time(client) {
                add_server_time(&mut rendered, line.timestamp, false);
            }
            sink.put_client(client, &rendered)?;
        }
        sink.put_client(client, self.end_line(conversation).as_str())?;

        tracing::info!(
            "Replayed {} lines of {} to client {} since {}",
            lines.len(),
            conversation,
            client,
            watermark
        );
        Ok(lines.len())
    }

    /// Erase the history of every conversation matching `pattern`. Returns how many
    /// were cleared.
    pub fn clear<H: PlaybackHost>(&self, host: &mut H, pattern: &str) -> usize {
        let cleared = Self::resolve_targets(host, pattern)
            .into_iter()
            .filter(|conversation| host.clear_buffer(conversation))
            .count();
        tracing::info!("Cleared {} buffers matching {}", cleared, pattern);
        cleared
    }

    fn start_line(&self, conversation: &str) -> Privmsg {
        Privmsg::new(&self.sender, conversation, &self.start_notice)
    }

    fn end_line(&self, conversation: &str) -> Privmsg {
        Privmsg::new(&self.sender, conversation, &self.end_notice)
    }
}
