//! Suppression of the host's own backlog flush for clients that replay history
//! through this module instead.
//!
//! A client with `znc.in/playback` asks for history explicitly, and one with
//! `znc.in/smartplayback` has it replayed from its watermark at the end of the
//! host's flush; either way the host's default flush must not also deliver the
//! same lines. The module's own replays travel through that same flush path, so
//! while one is in progress (see [`ReplayGuard`]) every checkpoint lets lines through.

use std::cell::Cell;

use crate::backlog::BufferedLine;
use crate::capability::server_time::add_server_time;
use crate::capability::{CapabilityRegistry, ClientCapability};
use crate::errors::SendError;
use crate::host::{BufferPlaybackHooks, ClientId, HookAction, ReplaySink};
use crate::replay::ReplayEngine;

/// Records whether a programmatic replay, or any backlog send at all, is under way
#[derive(Debug, Default)]
pub struct ReplayGate {
    replaying: Cell<bool>,
    sending: Cell<bool>,
}

impl ReplayGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying.get()
    }

    /// Whether buffered lines are being sent, by a replay or by the host's own flush.
    /// Their `time` tags carry the buffered time and must be left alone.
    pub fn is_sending_backlog(&self) -> bool {
        self.replaying.get() || self.sending.get()
    }

    /// Mark a replay as in progress until the returned guard is dropped
    pub fn begin_replay(&self) -> ReplayGuard<'_> {
        ReplayGuard::hold(&self.replaying)
    }

    /// Mark a backlog send as in progress until the returned guard is dropped
    pub fn begin_send(&self) -> ReplayGuard<'_> {
        ReplayGuard::hold(&self.sending)
    }
}

/// Holds one of the gate's flags set. Dropping it, on any exit path, restores
/// the flag to the state it was in before.
#[must_use]
#[derive(Debug)]
pub struct ReplayGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> ReplayGuard<'a> {
    fn hold(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// The hooks a host consults while flushing a backlog to a client
pub struct DefaultReplayGate<'a> {
    engine: &'a ReplayEngine,
    registry: &'a CapabilityRegistry,
}

impl<'a> DefaultReplayGate<'a> {
    pub fn new(engine: &'a ReplayEngine, registry: &'a CapabilityRegistry) -> Self {
        Self { engine, registry }
    }

    /// The capability on whose behalf the host's flush is being suppressed, if any
    fn suppressed_by(&self, client: ClientId) -> Option<ClientCapability> {
        if self.engine.gate().is_replaying() {
            return None;
        }
        let caps = self.registry.caps(client);
        if caps.has(ClientCapability::Playback) {
            Some(ClientCapability::Playback)
        } else if caps.has(ClientCapability::SmartPlayback) {
            Some(ClientCapability::SmartPlayback)
        } else {
            None
        }
    }
}

impl BufferPlaybackHooks for DefaultReplayGate<'_> {
    fn begin_send(&self) -> Option<ReplayGuard<'_>> {
        Some(self.engine.gate().begin_send())
    }

    fn on_buffer_starting(&self, conversation: &str, client: ClientId) -> HookAction {
        match self.suppressed_by(client) {
            Some(cap) => {
                tracing::debug!("Suppressing backlog of {} for client {} ({})", conversation, client, cap.name());
                HookAction::Halt
            }
            None => HookAction::Continue,
        }
    }

    fn on_buffer_play_line(
        &self,
        _conversation: &str,
        client: ClientId,
        line: &BufferedLine,
        rendered: &mut String,
    ) -> HookAction {
        if self.suppressed_by(client).is_some() {
            return HookAction::Halt;
        }
        if self.registry.wants_server_time(client) {
            add_server_time(rendered, line.timestamp, false);
        }
        HookAction::Continue
    }

    fn on_buffer_ending(
        &self,
        conversation: &str,
        client: ClientId,
        lines: &[BufferedLine],
        sink: &mut dyn ReplaySink,
    ) -> Result<HookAction, SendError> {
        match self.suppressed_by(client) {
            Some(ClientCapability::SmartPlayback) => {
                let watermark = self.registry.watermark(client);
                self.engine
                    .replay_since(sink, self.registry, client, conversation, lines, watermark)?;
                Ok(HookAction::Halt)
            }
            Some(_) => Ok(HookAction::Halt),
            None => Ok(HookAction::Continue),
        }
    }
}
