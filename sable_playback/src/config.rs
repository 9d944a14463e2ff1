use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs::File, io::Read};

use serde::Deserialize;
use thiserror::Error;
use tracing_core::LevelFilter;

use crate::capability::{ClientCapability, ClientCapabilitySet};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Format(#[from] json5::Error),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinLogTarget {
    Stdout,
    Stderr,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum LogTarget {
    File { filename: PathBuf },
    Builtin(BuiltinLogTarget),
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogEntry {
    pub target: LogTarget,
    #[serde(default)]
    pub modules: Vec<String>,
    pub level: Option<LogLevel>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    pub default_level: Option<LogLevel>,
    #[serde(default)]
    pub module_levels: HashMap<String, LogLevel>,
    #[serde(default = "default_log_targets")]
    pub targets: Vec<LogEntry>,
}

/// Settings for the playback module
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlaybackConfig {
    /// Mask of the pseudo-user that frames replayed history
    pub sender: String,
    /// Text of the line sent before a replayed block
    pub start_notice: String,
    /// Text of the line sent after a replayed block
    pub end_notice: String,
    /// Offer `znc.in/smartplayback`
    pub smart_playback: bool,
    /// Offer `echo-message`
    pub echo_message: bool,
    /// Replace an existing `time` tag on outbound lines in place instead of keeping it
    pub overwrite_time_tags: bool,
    pub log: LoggingConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sender: "***!znc@znc.in".to_string(),
            start_notice: "Buffer Playback...".to_string(),
            end_notice: "Playback Complete.".to_string(),
            smart_playback: true,
            echo_message: true,
            overwrite_time_tags: true,
            log: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            default_level: None,
            module_levels: HashMap::new(),
            targets: default_log_targets(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_log_targets() -> Vec<LogEntry> {
    vec![LogEntry {
        target: LogTarget::Builtin(BuiltinLogTarget::Stderr),
        modules: Vec::new(),
        level: Some(LogLevel::Warn),
    }]
}

impl PlaybackConfig {
    /// Load configuration from a file
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, ConfigError> {
        let mut file = File::open(filename)?;
        let mut config = String::new();
        file.read_to_string(&mut config)?;
        Self::from_json5(&config)
    }

    pub fn from_json5(config: &str) -> Result<Self, ConfigError> {
        Ok(json5::from_str(config)?)
    }

    /// The capabilities this configuration allows clients to negotiate
    pub fn offered_capabilities(&self) -> ClientCapabilitySet {
        use ClientCapability::*;

        let mut caps: ClientCapabilitySet = [Playback, ServerTime].into_iter().collect();
        if self.smart_playback {
            caps.set(SmartPlayback);
        }
        if self.echo_message {
            caps.set(EchoMessage);
        }
        caps
    }
}

impl LoggingConfig {
    pub fn prefix_file(&self, filename: impl AsRef<Path>) -> PathBuf {
        let mut path = self.dir.clone();
        path.push(filename);
        path
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(arg: LogLevel) -> LevelFilter {
        match arg {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}
