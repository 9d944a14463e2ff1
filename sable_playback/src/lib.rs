//! Backlog playback for IRC bouncers.
//!
//! A bouncer keeps a backlog of each channel and query while its users are away,
//! and normally dumps the whole lot at every client that attaches. This crate
//! lets a client take over that process: with the `znc.in/playback` capability it
//! asks for history explicitly, with the `PLAYBACK` command or the module's `PLAY`
//! command, and with `znc.in/smartplayback` it is sent only what is newer than a
//! timestamp it supplied when negotiating.
//!
//! # Hosting
//!
//! The host owns connections and backlog storage, and implements
//! [`PlaybackHost`](host::PlaybackHost). It calls the `on_*` methods of
//! [`PlaybackModule`](module::PlaybackModule) as the corresponding events happen,
//! and consults [`buffer_hooks`](module::PlaybackModule::buffer_hooks) at each step
//! of its own backlog flush, which lets the module suppress the flush for clients
//! that replay history themselves.
//!
//! Replays requested through the module travel through the host's own flush
//! path. While one is running the module's [`ReplayGate`](gate::ReplayGate) is
//! held open, so the flush hooks let the replayed lines through instead of
//! suppressing them.
//!
//! # Time tags
//!
//! Clients that negotiated `server-time`, or either playback capability, get a
//! `time` tag on every line. Replayed lines carry the time they were buffered;
//! everything else is tagged with the current time when the host passes it
//! through [`on_send_to_client`](module::PlaybackModule::on_send_to_client).
//!
//! [`MemoryHost`](memory_host::MemoryHost) is a complete in-memory host, used by
//! the `sable_playback` binary and the integration tests.

pub mod backlog;
pub mod capability;
pub mod command;
pub mod config;
pub mod echo;
pub mod errors;
pub mod gate;
pub mod host;
pub mod inbound;
pub mod memory_host;
pub mod messages;
pub mod module;
pub mod prelude;
pub mod replay;
pub mod tags;
pub mod tracing_config;
pub mod utils;
