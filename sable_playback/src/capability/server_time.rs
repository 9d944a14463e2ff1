use crate::tags;
use crate::utils::{format_server_time, Timestamp};

/// Name of the IRCv3 server-time message tag
pub const SERVER_TIME_TAG: &str = "time";

/// Tag `line` with the time `ts`.
///
/// An existing `time` tag is kept unless `overwrite` is set, so a line never
/// ends up with two. Returns whether the line changed.
pub fn add_server_time(line: &mut String, ts: Timestamp, overwrite: bool) -> bool {
    tags::ensure_tag(line, SERVER_TIME_TAG, overwrite, || format_server_time(ts))
}
