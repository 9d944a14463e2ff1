#![allow(dead_code)]

use sable_playback::memory_host::MemoryHost;
use sable_playback::prelude::*;
use sable_playback::tags;
use sable_playback::utils::format_server_time;

pub mod hosts;

pub const ALICE: ClientId = ClientId(1);

pub const START: &str = ":***!znc@znc.in PRIVMSG #x :Buffer Playback...";
pub const END: &str = ":***!znc@znc.in PRIVMSG #x :Playback Complete.";

/// A history line in `conversation`, as sent by bob
pub fn line(conversation: &str, secs: i64, text: &str) -> BufferedLine {
    BufferedLine::new(
        Timestamp::from_secs(secs),
        format!(":bob!b@host PRIVMSG {} :{{text}}", conversation),
        text,
    )
}

/// A host holding `#x` = `[10:"a", 20:"b", 30:"c"]`, with alice connected
pub fn host() -> MemoryHost {
    let mut host = MemoryHost::new();
    for (secs, text) in [(10, "a"), (20, "b"), (30, "c")] {
        host.append("#x", line("#x", secs, text));
    }
    host.connect(ALICE, "alice");
    host
}

pub fn module() -> PlaybackModule {
    PlaybackModule::new(PlaybackConfig::default())
}

/// A module with alice attached and `caps` negotiated
pub fn module_with(caps: &[&str]) -> PlaybackModule {
    let mut module = module();
    module.on_client_attach(ALICE);
    module.on_client_login(ALICE);
    for cap in caps {
        assert!(module.is_client_cap_supported(cap, true), "{} not supported", cap);
        module.on_client_cap_request(ALICE, cap, true);
    }
    module
}

/// The line bob sent to `#x` at `secs`, as it should be replayed to a client
/// that wants time tags
pub fn replayed(secs: i64, text: &str) -> String {
    format!(
        "@time={} :bob!b@host PRIVMSG #x :{}",
        format_server_time(Timestamp::from_secs(secs)),
        text
    )
}

/// Lines sent to alice, without their tags
pub fn untagged(host: &MemoryHost) -> Vec<&str> {
    host.lines_for(ALICE).into_iter().map(tags::strip_tags).collect()
}
