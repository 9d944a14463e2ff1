use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, SystemTimeError, UNIX_EPOCH};

const MICROS_PER_SEC: u32 = 1_000_000;

/// A point in time, in seconds since the Unix epoch with microsecond resolution.
///
/// Serialised as a fractional number of seconds, which is how backlog snapshots
/// and client-supplied replay arguments express it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Timestamp {
    secs: i64,
    micros: u32,
}

impl Timestamp {
    pub fn new(secs: i64, micros: u32) -> Self {
        Self {
            secs: secs + i64::from(micros / MICROS_PER_SEC),
            micros: micros % MICROS_PER_SEC,
        }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self { secs, micros: 0 }
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn micros(&self) -> u32 {
        self.micros
    }

    /// The current wall-clock time.
    ///
    /// A clock set before the epoch gives a coarse, whole-second reading rather
    /// than an error.
    pub fn now() -> Self {
        Self::from_clock(SystemTime::now().duration_since(UNIX_EPOCH))
    }

    fn from_clock(reading: Result<Duration, SystemTimeError>) -> Self {
        match reading {
            Ok(elapsed) => Self::new(elapsed.as_secs() as i64, elapsed.subsec_micros()),
            Err(e) => {
                tracing::warn!("System clock is before the epoch ({}); using coarse time", e);
                Self::from_secs(-(e.duration().as_secs() as i64))
            }
        }
    }
}

impl From<f64> for Timestamp {
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let secs = value.floor();
        let micros = ((value - secs) * f64::from(MICROS_PER_SEC)).round() as u32;
        Self::new(secs as i64, micros)
    }
}

impl From<Timestamp> for f64 {
    fn from(ts: Timestamp) -> f64 {
        ts.secs as f64 + f64::from(ts.micros) / f64::from(MICROS_PER_SEC)
    }
}

/// Render `ts` in the form used by the IRCv3 `time` tag: `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Always UTC; milliseconds are truncated, not rounded. Leap seconds are not
/// modelled.
pub fn format_server_time(ts: Timestamp) -> String {
    match Utc.timestamp_opt(ts.secs, ts.micros * 1000).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        None => {
            tracing::warn!("Timestamp {:?} is out of range; formatting as the epoch", ts);
            format_server_time(Timestamp::default())
        }
    }
}
