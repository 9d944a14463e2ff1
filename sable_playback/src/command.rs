//! Parsing of the commands clients use to drive playback.
//!
//! `PLAY`, `CLEAR` and `HELP` are addressed to the module itself; `PLAYBACK`
//! arrives as a raw protocol line.

use std::iter;

use thiserror::Error;

use crate::backlog::TimeBound;
use crate::inbound::InboundCommand;

/// A command sent to the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleCommand {
    Help,
    /// `PLAY <#chan(s)> [timestamp]`
    Play {
        pattern: String,
        from: Option<TimeBound>,
    },
    /// `CLEAR <#chan(s)>`
    Clear { pattern: String },
}

/// A command couldn't be understood. The message is what the client is told.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: Play <#chan(s)> [timestamp]")]
    PlayUsage,
    #[error("Usage: Clear <#chan(s)>")]
    ClearUsage,
    #[error("Usage: PLAYBACK <#chan(s)> [since]")]
    PlaybackUsage,
    #[error("Unknown command [{0}]. Try HELP.")]
    UnknownCommand(String),
}

impl ModuleCommand {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        match command.to_ascii_uppercase().as_str() {
            "HELP" => Ok(ModuleCommand::Help),
            "PLAY" => match args.as_slice() {
                [pattern] => Ok(ModuleCommand::Play {
                    pattern: pattern.to_string(),
                    from: None,
                }),
                [pattern, timestamp] => Ok(ModuleCommand::Play {
                    pattern: pattern.to_string(),
                    from: TimeBound::parse(timestamp),
                }),
                _ => Err(CommandError::PlayUsage),
            },
            "CLEAR" => match args.as_slice() {
                [pattern] => Ok(ModuleCommand::Clear {
                    pattern: pattern.to_string(),
                }),
                _ => Err(CommandError::ClearUsage),
            },
            _ => Err(CommandError::UnknownCommand(command.to_string())),
        }
    }
}

/// A raw `PLAYBACK <#chan(s)> [since]` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub pattern: String,
    pub since: Option<TimeBound>,
}

impl PlaybackRequest {
    /// Interpret an inbound line as a playback request. `None` if it's some other command.
    pub fn from_inbound(msg: &InboundCommand) -> Option<Result<Self, CommandError>> {
        if !msg.is("PLAYBACK") {
            return None;
        }

        Some(match msg.args.as_slice() {
            [pattern] => Ok(Self {
                pattern: pattern.clone(),
                since: None,
            }),
            [pattern, since] => Ok(Self {
                pattern: pattern.clone(),
                since: TimeBound::parse(since),
            }),
            _ => Err(CommandError::PlaybackUsage),
        })
    }
}

const COMMAND_HELP: &[(&str, &str)] = &[
    ("Clear <#chan(s)>", "Clear playback buffers for given channels."),
    ("Play <#chan(s)> [timestamp]", "Send playback buffers for given channels."),
];

const ARGUMENT_HELP: &[(&str, &str)] = &[
    ("#chan(s)", "A comma-separated list of channels (supports wildcards)."),
    ("timestamp", "The number of seconds elapsed since January 1, 1970."),
];

fn format_table(header: (&str, &str), rows: &[(&str, &str)]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(left, _)| left.len())
        .chain(iter::once(header.0.len()))
        .max()
        .unwrap_or_default();

    iter::once(header)
        .chain(rows.iter().copied())
        .map(|(left, right)| format!("{:<width$}  {}", left, right, width = width))
        .collect()
}

/// The reply to `HELP`, one line per element
pub fn help_text() -> Vec<String> {
    iter::once("Available commands:".to_string())
        .chain(format_table(("Command", "Description"), COMMAND_HELP))
        .chain(iter::once("Command arguments:".to_string()))
        .chain(format_table(("Argument", "Description"), ARGUMENT_HELP))
        .collect()
}
