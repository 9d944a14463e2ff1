use super::*;
use crate::host::ClientId;

use std::collections::{BTreeSet, HashMap};

/// Tracks which capabilities each connected client has enabled, together with the
/// smart-playback watermark some of them negotiate.
///
/// Entries are keyed by [`ClientId`] and must be purged through
/// [`detach`](Self::detach) when the client goes away, so that a later client
/// reusing the same id starts clean.
#[derive(Debug)]
pub struct CapabilityRegistry {
    offered: ClientCapabilitySet,
    clients: HashMap<ClientId, ClientCapabilitySet>,
    watermarks: HashMap<ClientId, i64>,
}

impl CapabilityRegistry {
    /// Construct a registry that advertises and accepts the capabilities in `offered`
    pub fn new(offered: ClientCapabilitySet) -> Self {
        Self {
            offered,
            clients: HashMap::new(),
            watermarks: HashMap::new(),
        }
    }

    pub fn offered(&self) -> ClientCapabilitySet {
        self.offered
    }

    /// Start tracking a newly attached client
    pub fn attach(&mut self, client: ClientId) {
        self.clients.entry(client).or_default();
    }

    pub fn is_attached(&self, client: ClientId) -> bool {
        self.clients.contains_key(&client)
    }

    /// A client finished logging in; any watermark left from before is stale
    pub fn login(&mut self, client: ClientId) {
        self.watermarks.remove(&client);
    }

    /// Forget everything about a client
    pub fn detach(&mut self, client: ClientId) {
        self.clients.remove(&client);
        self.watermarks.remove(&client);
    }

    /// Add the names of all offered capabilities to a `CAP LS` reply under construction
    pub fn advertise(&self, caps: &mut BTreeSet<String>) {
        caps.extend(self.offered.iter().map(|cap| cap.name().to_string()));
    }

    /// Whether a client may request (or drop) the capability named `requested`
    pub fn is_supported(&self, requested: &str) -> bool {
        matches!(ClientCapability::from_request(requested), Some((cap, _)) if self.offered.has(cap))
    }

    /// Apply a client's request to enable or disable a capability.
    ///
    /// A parameterised capability enabled with a parameter records it as the
    /// client's watermark; text that isn't a non-negative integer counts as 0.
    /// Disabling it erases the watermark. Returns false, without changing
    /// anything, if the capability isn't one we offer.
    pub fn negotiate(&mut self, client: ClientId, requested: &str, enable: bool) -> bool {
        let Some((cap, param)) = ClientCapability::from_request(requested) else {
            tracing::debug!("Client {} requested unknown capability {:?}", client, requested);
            return false;
        };
        if !self.offered.has(cap) {
            tracing::debug!("Client {} requested unavailable capability {}", client, cap.name());
            return false;
        }

        let caps = self.clients.entry(client).or_default();
        if enable {
            caps.set(cap);
        } else {
            caps.unset(cap);
        }

        if cap.is_parameterised() {
            match (enable, param) {
                (true, Some(param)) => {
                    let watermark = parse_watermark(param);
                    tracing::debug!("Client {} watermark set to {}", client, watermark);
                    self.watermarks.insert(client, watermark);
                }
                (true, None) => (),
                (false, _) => {
                    self.watermarks.remove(&client);
                }
            }
        }

        true
    }

    pub fn caps(&self, client: ClientId) -> ClientCapabilitySet {
        self.clients.get(&client).copied().unwrap_or_default()
    }

    pub fn is_enabled(&self, client: ClientId, cap: ClientCapability) -> bool {
        self.caps(client).has(cap)
    }

    /// Whether lines sent to this client should carry a `time` tag
    pub fn wants_server_time(&self, client: ClientId) -> bool {
        use ClientCapability::*;

        let time_caps: ClientCapabilitySet = [ServerTime, Playback, SmartPlayback].into_iter().collect();
        self.caps(client).has_any(time_caps)
    }

    /// The last timestamp, in whole seconds, this client has told us it has seen.
    /// Zero if it never said.
    pub fn watermark(&self, client: ClientId) -> i64 {
        self.watermarks.get(&client).copied().unwrap_or(0)
    }
}

/// Read the leading integer of a watermark parameter, so `20.5` means 20.
/// Anything without one, or a negative value, is 0.
fn parse_watermark(param: &str) -> i64 {
    let param = param.trim_start();
    let sign_len = usize::from(param.starts_with(['+', '-']));
    let digits_end = param[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(param.len(), |end| end + sign_len);

    match param[..digits_end].parse::<i64>() {
        Ok(watermark) if watermark >= 0 => watermark,
        _ => {
            tracing::warn!("Ignoring malformed playback watermark {:?}", param);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new(ClientCapabilitySet::all())
    }

    #[test]
    fn negotiate_enable_disable() {
        let mut reg = registry();
        let client = ClientId(1);
        reg.attach(client);

        assert!(reg.negotiate(client, "znc.in/playback", true));
        assert!(reg.is_enabled(client, ClientCapability::Playback));
        assert!(reg.wants_server_time(client));

        assert!(reg.negotiate(client, "znc.in/playback", false));
        assert!(!reg.is_enabled(client, ClientCapability::Playback));
        assert!(!reg.wants_server_time(client));
    }

    #[test]
    fn unknown_and_unoffered_caps_rejected() {
        let mut reg = CapabilityRegistry::new(ClientCapability::Playback.into());
        let client = ClientId(1);

        assert!(!reg.negotiate(client, "multi-prefix", true));
        assert!(!reg.negotiate(client, "echo-message", true));
        assert!(reg.caps(client).is_empty());
        assert!(reg.is_supported("znc.in/playback"));
        assert!(!reg.is_supported("echo-message"));
    }

    #[test]
    fn watermark_from_parameter() {
        let mut reg = registry();
        let client = ClientId(7);

        assert_eq!(reg.watermark(client), 0);
        reg.negotiate(client, "znc.in/smartplayback/1400000000", true);
        assert!(reg.is_enabled(client, ClientCapability::SmartPlayback));
        assert_eq!(reg.watermark(client), 1_400_000_000);

        reg.negotiate(client, "znc.in/smartplayback", false);
        assert_eq!(reg.watermark(client), 0);
    }

    #[test]
    fn malformed_watermark_is_zero() {
        let mut reg = registry();
        let client = ClientId(7);

        assert!(reg.negotiate(client, "znc.in/smartplayback/yesterday", true));
        assert!(reg.is_enabled(client, ClientCapability::SmartPlayback));
        assert_eq!(reg.watermark(client), 0);

        assert!(reg.negotiate(client, "znc.in/smartplayback/-20", true));
        assert_eq!(reg.watermark(client), 0);
    }

    #[test]
    fn watermark_uses_leading_integer() {
        let mut reg = registry();
        let client = ClientId(7);

        reg.negotiate(client, "znc.in/smartplayback/20.5", true);
        assert_eq!(reg.watermark(client), 20);

        reg.negotiate(client, "znc.in/smartplayback/+35s", true);
        assert_eq!(reg.watermark(client), 35);

        reg.negotiate(client, "znc.in/smartplayback/.5", true);
        assert_eq!(reg.watermark(client), 0);
    }

    #[test]
    fn lifecycle_purges_state() {
        let mut reg = registry();
        let client = ClientId(3);
        reg.attach(client);
        reg.negotiate(client, "znc.in/smartplayback/50", true);

        reg.login(client);
        assert_eq!(reg.watermark(client), 0);
        assert!(reg.is_enabled(client, ClientCapability::SmartPlayback));

        reg.negotiate(client, "znc.in/smartplayback/60", true);
        reg.detach(client);
        assert!(!reg.is_attached(client));
        assert!(reg.caps(client).is_empty());
        assert_eq!(reg.watermark(client), 0);
    }

    #[test]
    fn advertises_offered_caps() {
        let reg = CapabilityRegistry::new(
            [ClientCapability::Playback, ClientCapability::ServerTime].into_iter().collect(),
        );
        let mut caps = BTreeSet::new();
        caps.insert("sasl".to_string());
        reg.advertise(&mut caps);

        assert_eq!(
            caps.into_iter().collect::<Vec<_>>(),
            ["sasl", "server-time", "znc.in/playback"]
        );
    }
}
