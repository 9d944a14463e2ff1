//! The hook surface a host calls into.

use std::collections::BTreeSet;

use crate::backlog::TimeFilter;
use crate::capability::server_time::add_server_time;
use crate::capability::{CapabilityRegistry, ClientCapability};
use crate::command::{help_text, ModuleCommand, PlaybackRequest};
use crate::config::PlaybackConfig;
use crate::echo::{self, MessageKind};
use crate::errors::{HandleResult, HandlerError};
use crate::gate::DefaultReplayGate;
use crate::host::{ClientId, HookAction, PlaybackHost, ReplaySink};
use crate::inbound::InboundCommand;
use crate::messages;
use crate::replay::ReplayEngine;
use crate::utils::Timestamp;

/// Backlog playback for a bouncer.
///
/// Owns the per-client capability state and the replay engine. The host calls the
/// `on_*` methods as the corresponding events happen, all from one thread, and
/// passes [`buffer_hooks`](Self::buffer_hooks) into its own backlog flush.
#[derive(Debug)]
pub struct PlaybackModule {
    config: PlaybackConfig,
    registry: CapabilityRegistry,
    engine: ReplayEngine,
}

impl PlaybackModule {
    pub fn new(config: PlaybackConfig) -> Self {
        let registry = CapabilityRegistry::new(config.offered_capabilities());
        let engine = ReplayEngine::new(&config);
        Self {
            config,
            registry,
            engine,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }

    pub fn is_replaying(&self) -> bool {
        self.engine.gate().is_replaying()
    }

    /// Hooks for the host's backlog flush
    pub fn buffer_hooks(&self) -> DefaultReplayGate<'_> {
        DefaultReplayGate::new(&self.engine, &self.registry)
    }

    pub fn on_client_attach(&mut self, client: ClientId) {
        tracing::debug!("Client {} attached", client);
        self.registry.attach(client);
    }

    pub fn on_client_login(&mut self, client: ClientId) {
        self.registry.login(client);
    }

    pub fn on_client_disconnect(&mut self, client: ClientId) {
        tracing::debug!("Client {} disconnected", client);
        self.registry.detach(client);
    }

    /// Add our capabilities to a `CAP LS` reply
    pub fn on_client_cap_ls(&self, caps: &mut BTreeSet<String>) {
        self.registry.advertise(caps);
    }

    pub fn is_client_cap_supported(&self, cap: &str, _state: bool) -> bool {
        self.registry.is_supported(cap)
    }

    pub fn on_client_cap_request(&mut self, client: ClientId, cap: &str, state: bool) {
        if self.registry.negotiate(client, cap, state) {
            tracing::debug!("Client {} capabilities now {}", client, self.registry.caps(client));
        }
    }

    /// Handle a command addressed to the module. Usage problems are reported to the
    /// client, never returned as errors.
    pub fn on_module_command<H: PlaybackHost>(&self, host: &mut H, client: ClientId, line: &str) -> HandleResult {
        match ModuleCommand::parse(line) {
            Ok(ModuleCommand::Help) => {
                for text in help_text() {
                    host.put_module(client, &text)?;
                }
            }
            Ok(ModuleCommand::Play { pattern, from }) => {
                self.engine.replay_matching(host, &self.registry, client, &pattern, TimeFilter::starting_at(from))?;
            }
            Ok(ModuleCommand::Clear { pattern }) => {
                let cleared = self.engine.clear(host, &pattern);
                host.put_module(
                    client,
                    &format!(
                        "The playback buffer for [{}] channels matching [{}] has been cleared.",
                        cleared, pattern
                    ),
                )?;
            }
            Err(e) => host.put_module(client, &e.to_string())?,
        }
        Ok(())
    }

    /// Inspect a raw line from a client, handling `PLAYBACK` for clients that
    /// negotiated `znc.in/playback`. Everything else continues to the host.
    pub fn on_user_raw<H: PlaybackHost>(
        &self,
        host: &mut H,
        client: ClientId,
        line: &str,
    ) -> Result<HookAction, HandlerError> {
        let Some(msg) = InboundCommand::parse(line) else {
            return Ok(HookAction::Continue);
        };
        let Some(request) = PlaybackRequest::from_inbound(&msg) else {
            return Ok(HookAction::Continue);
        };
        if !self.registry.is_enabled(client, ClientCapability::Playback) {
            return Ok(HookAction::Continue);
        }

        match request {
            Ok(request) => {
                self.engine.replay_matching(
                    host,
                    &self.registry,
                    client,
                    &request.pattern,
                    TimeFilter::starting_at(request.since),
                )?;
            }
            Err(e) => {
                let fail = messages::Fail::new("PLAYBACK", "NEED_MORE_PARAMS", &msg.command, &e.to_string());
                host.put_client(client, fail.as_str())?;
            }
        }
        Ok(HookAction::Halt)
    }

    /// Outbound interception: give lines to clients that want them a `time` tag.
    ///
    /// An existing tag is overwritten in place if the config asks for that, except
    /// while a backlog is being sent: buffered lines keep the time they were buffered.
    pub fn on_send_to_client(&self, client: ClientId, line: &mut String) -> HookAction {
        if !line.is_empty() && self.registry.is_attached(client) && self.registry.wants_server_time(client) {
            let overwrite = self.config.overwrite_time_tags && !self.engine.gate().is_sending_backlog();
            add_server_time(line, Timestamp::now(), overwrite);
        }
        HookAction::Continue
    }

    /// A client sent a message of its own; echo it back if it asked for that
    pub fn on_user_message(
        &self,
        sink: &mut dyn ReplaySink,
        client: ClientId,
        source: &str,
        kind: MessageKind,
        target: &str,
        text: &str,
    ) -> Result<bool, HandlerError> {
        Ok(echo::relay_own_message(sink, &self.registry, client, source, kind, target, text)?)
    }
}
