use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::util::SubscriberInitExt;

use sable_playback::echo::MessageKind;
use sable_playback::inbound::InboundCommand;
use sable_playback::memory_host::{BacklogSnapshot, MemoryHost};
use sable_playback::prelude::*;
use sable_playback::tracing_config;

#[derive(Debug, Parser)]
struct Opts {
    /// Module config file location
    #[arg(short, long)]
    config: PathBuf,

    /// Backlog snapshot to replay from
    #[arg(short, long)]
    backlog: PathBuf,

    /// Nickname of the attaching client
    #[arg(short, long, default_value = "user")]
    nick: String,

    /// Capabilities the client requests, comma separated
    #[arg(long, value_delimiter = ',')]
    caps: Vec<String>,

    /// Commands to send to the module. Lines starting with `/` are sent as raw
    /// protocol lines instead.
    commands: Vec<String>,
}

/// Prints each line as it is sent, after the module's outbound interception
struct Console<'a> {
    host: MemoryHost,
    module: &'a PlaybackModule,
}

impl Console<'_> {
    fn emit(&mut self) {
        for (client, mut line) in self.host.take_sent() {
            self.module.on_send_to_client(client, &mut line);
            println!("{}", line);
        }
    }
}

impl ReplaySink for Console<'_> {
    fn render_line(&self, line: &BufferedLine, client: ClientId) -> String {
        self.host.render_line(line, client)
    }

    fn put_client(&mut self, client: ClientId, line: &str) -> Result<(), SendError> {
        self.host.put_client(client, line)?;
        self.emit();
        Ok(())
    }
}

impl PlaybackHost for Console<'_> {
    fn conversations(&self) -> Vec<String> {
        self.host.conversations()
    }

    fn buffer(&self, conversation: &str) -> Option<&ConversationBuffer> {
        self.host.buffer(conversation)
    }

    fn clear_buffer(&mut self, conversation: &str) -> bool {
        self.host.clear_buffer(conversation)
    }

    fn put_module(&mut self, client: ClientId, text: &str) -> Result<(), SendError> {
        self.host.put_module(client, text)?;
        self.emit();
        Ok(())
    }
}

fn run_command(console: &mut Console, client: ClientId, source: &str, command: &str) -> Result<(), anyhow::Error> {
    let module = console.module;

    let Some(raw) = command.strip_prefix('/') else {
        module.on_module_command(console, client, command)?;
        return Ok(());
    };

    if module.on_user_raw(console, client, raw)? == HookAction::Halt {
        return Ok(());
    }

    let Some(msg) = InboundCommand::parse(raw) else {
        return Ok(());
    };
    if let [target, text] = msg.args.as_slice() {
        if let Some((kind, text)) = MessageKind::classify(&msg.command, text) {
            module.on_user_message(console, client, source, kind, target, text)?;
            return Ok(());
        }
    }
    tracing::info!("Not handled: {}", raw);
    Ok(())
}

pub fn main() -> Result<(), anyhow::Error> {
    let opts = Opts::parse();

    let config = PlaybackConfig::load_file(&opts.config)
        .with_context(|| format!("Couldn't load config from {}", opts.config.display()))?;
    tracing_config::build_subscriber(config.log.clone())?.init();

    let snapshot = BacklogSnapshot::load_file(&opts.backlog)
        .with_context(|| format!("Couldn't load backlog from {}", opts.backlog.display()))?;
    let mut host = MemoryHost::from_snapshot(snapshot);
    let mut module = PlaybackModule::new(config);

    let client = ClientId(1);
    let source = format!("{}!{}@sable.playback", opts.nick, opts.nick);
    host.connect(client, &opts.nick);
    module.on_client_attach(client);
    module.on_client_login(client);

    for cap in &opts.caps {
        if module.is_client_cap_supported(cap, true) {
            module.on_client_cap_request(client, cap, true);
        } else {
            tracing::warn!("Capability {} not supported", cap);
        }
    }

    {
        let mut console = Console { host, module: &module };
        console.flush_all(client, &module.buffer_hooks())?;

        for command in &opts.commands {
            run_command(&mut console, client, &source, command)?;
        }
        host = console.host;
    }

    module.on_client_disconnect(client);
    host.disconnect(client);

    Ok(())
}
