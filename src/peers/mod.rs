//! Transport breakdown of live connections
//!
//! Remote addresses are multiaddr strings such as
//! `/ip4/1.2.3.4/udp/4001/quic-v1/webtransport/certhash/uE.../p2p/12D3...`.
//! Classification walks the protocol components and ignores their values.
//! [`ConnectionInspector`] exposes the live connections themselves, with
//! per-peer latency, connection age and bootstrap/relay tags.

mod details;

pub use details::{
    ConnectionInspector, ConnectionTable, LiveConnection, PeerInfo, PeerTag, PeerTagger,
    PingSample, format_peer,
};

use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt;

/// Transport family of a connection, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFamily {
    CircuitRelay,
    WebRtc,
    WebRtcDirect,
    WebSockets,
    WebSocketsSecure,
    WebTransport,
    Other,
}

impl TransportFamily {
    pub const ALL: [Self; 7] = [
        Self::CircuitRelay,
        Self::WebRtc,
        Self::WebRtcDirect,
        Self::WebSockets,
        Self::WebSocketsSecure,
        Self::WebTransport,
        Self::Other,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CircuitRelay => "Circuit Relay",
            Self::WebRtc => "WebRTC",
            Self::WebRtcDirect => "WebRTC Direct",
            Self::WebSockets => "WebSockets",
            Self::WebSocketsSecure => "WebSockets (secure)",
            Self::WebTransport => "WebTransport",
            Self::Other => "Other",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TransportFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Protocols whose next component is a value rather than a protocol name
const VALUE_PROTOCOLS: &[&str] = &[
    "ip4", "ip6", "ip6zone", "dns", "dns4", "dns6", "dnsaddr", "tcp", "udp", "p2p", "ipfs",
    "certhash", "sni", "unix", "garlic64", "onion", "onion3",
];

/// `(protocol, value)` pairs of a multiaddr, in order
fn components(address: &str) -> Vec<(&str, Option<&str>)> {
    let mut parts = address.split('/').filter(|p| !p.is_empty());
    let mut components = Vec::new();
    while let Some(name) = parts.next() {
        let value = if VALUE_PROTOCOLS.contains(&name) {
            parts.next()
        } else {
            None
        };
        components.push((name, value));
    }
    components
}

fn protocols(address: &str) -> Vec<&str> {
    components(address).into_iter().map(|(name, _)| name).collect()
}

/// Peer id of the relay in a circuit address such as
/// `/dns4/relay.example.com/tcp/443/wss/p2p/<relay>/p2p-circuit`
#[must_use]
pub fn relay_peer_id(address: &str) -> Option<&str> {
    let components = components(address);
    if !components.iter().any(|(name, _)| *name == "p2p-circuit") {
        return None;
    }
    components
        .into_iter()
        .find(|(name, _)| *name == "p2p")
        .and_then(|(_, value)| value)
}

/// Classify one remote address
///
/// WebRTC is checked first because browser-to-browser WebRTC connections are
/// negotiated over a relay and so also carry `p2p-circuit`.
#[must_use]
pub fn classify_address(address: &str) -> TransportFamily {
    let names = protocols(address);
    let has = |protocol: &str| names.contains(&protocol);

    if has("webrtc") {
        TransportFamily::WebRtc
    } else if has("p2p-circuit") {
        TransportFamily::CircuitRelay
    } else if has("webrtc-direct") {
        TransportFamily::WebRtcDirect
    } else if has("wss") || (has("tls") && has("ws")) {
        TransportFamily::WebSocketsSecure
    } else if has("ws") {
        TransportFamily::WebSockets
    } else if has("webtransport") {
        TransportFamily::WebTransport
    } else {
        TransportFamily::Other
    }
}

/// Number of live connections per transport family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeerTypeCounts {
    counts: [u64; TransportFamily::ALL.len()],
}

impl PeerTypeCounts {
    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = Self::default();
        for address in addresses {
            let family = classify_address(address.as_ref());
            if family == TransportFamily::Other {
                tracing::debug!(address = address.as_ref(), "Unclassified remote address");
            }
            counts.counts[family.index()] += 1;
        }
        counts
    }

    #[must_use]
    pub const fn get(&self, family: TransportFamily) -> u64 {
        self.counts[family.index()]
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Every family with its count, zeros included, in display order
    pub fn iter(&self) -> impl Iterator<Item = (TransportFamily, u64)> + '_ {
        TransportFamily::ALL.iter().map(|f| (*f, self.get(*f)))
    }
}

impl fmt::Display for PeerTypeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (family, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", family, count)?;
        }
        Ok(())
    }
}

impl Serialize for PeerTypeCounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(TransportFamily::ALL.len()))?;
        for (family, count) in self.iter() {
            map.serialize_entry(family.label(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: &str = "12D3KooWDpJ7As7BWAwRMfu1VU2WCqNjvq387JEYKDBj4kx6nXTN";

    #[test]
    fn test_classify_families() {
        let cases = [
            (
                format!("/ip4/1.2.3.4/tcp/4001/p2p/{PEER}/p2p-circuit/webrtc/p2p/{PEER}"),
                TransportFamily::WebRtc,
            ),
            (
                format!("/ip4/1.2.3.4/udp/9090/webrtc-direct/certhash/uEiAb/p2p/{PEER}"),
                TransportFamily::WebRtcDirect,
            ),
            (
                format!("/dns4/node.example.com/tcp/80/ws/p2p/{PEER}"),
                TransportFamily::WebSockets,
            ),
            (
                format!("/dns4/node.example.com/tcp/443/wss/p2p/{PEER}"),
                TransportFamily::WebSocketsSecure,
            ),
            (
                format!("/dns4/node.example.com/tcp/443/tls/sni/node.example.com/ws/p2p/{PEER}"),
                TransportFamily::WebSocketsSecure,
            ),
            (
                format!("/ip4/1.2.3.4/udp/4001/quic-v1/webtransport/certhash/uEiAb/p2p/{PEER}"),
                TransportFamily::WebTransport,
            ),
            (
                format!("/dns4/relay.example.com/tcp/443/wss/p2p/{PEER}/p2p-circuit/p2p/{PEER}"),
                TransportFamily::CircuitRelay,
            ),
            (
                "/ip4/1.2.3.4/tcp/4001".to_string(),
                TransportFamily::Other,
            ),
        ];

        for (address, expected) in cases {
            assert_eq!(classify_address(&address), expected, "{address}");
        }
    }

    #[test]
    fn test_tls_with_sni_is_secure_websockets() {
        // sni and its host sit between tls and ws
        assert_eq!(
            classify_address("/dns4/a.example.com/tcp/443/tls/sni/a.example.com/ws"),
            TransportFamily::WebSocketsSecure
        );
        assert_eq!(
            classify_address("/ip4/1.2.3.4/tcp/443/tls/ws"),
            TransportFamily::WebSocketsSecure
        );
        assert_eq!(
            classify_address("/ip4/1.2.3.4/tcp/80/ws"),
            TransportFamily::WebSockets
        );
    }

    #[test]
    fn test_relay_peer_id() {
        assert_eq!(
            relay_peer_id(&format!("/dns4/relay.example.com/tcp/443/wss/p2p/{PEER}/p2p-circuit")),
            Some(PEER)
        );
        assert_eq!(relay_peer_id(&format!("/ip4/1.2.3.4/tcp/4001/p2p/{PEER}")), None);
        assert_eq!(relay_peer_id("/p2p-circuit"), None);
    }

    #[test]
    fn test_values_are_not_protocols() {
        // a host literally named "ws" is still plain TCP
        assert_eq!(classify_address("/dns4/ws/tcp/4001"), TransportFamily::Other);
        assert_eq!(classify_address(""), TransportFamily::Other);
    }

    #[test]
    fn test_counts_and_display() {
        let counts = PeerTypeCounts::from_addresses([
            "/dns4/a.example.com/tcp/443/wss",
            "/dns4/b.example.com/tcp/443/wss",
            "/ip4/1.2.3.4/udp/4001/quic-v1/webtransport",
            "/ip4/1.2.3.4/tcp/4001",
        ]);
        assert_eq!(counts.get(TransportFamily::WebSocketsSecure), 2);
        assert_eq!(counts.get(TransportFamily::WebTransport), 1);
        assert_eq!(counts.get(TransportFamily::Other), 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(
            counts.to_string(),
            "Circuit Relay: 0, WebRTC: 0, WebRTC Direct: 0, WebSockets: 0, \
             WebSockets (secure): 2, WebTransport: 1, Other: 1"
        );

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["WebSockets (secure)"], 2);
        assert_eq!(json["Circuit Relay"], 0);
    }

    #[test]
    fn test_no_connections() {
        let counts = PeerTypeCounts::from_addresses(Vec::<String>::new());
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.iter().count(), 7);
    }
}
