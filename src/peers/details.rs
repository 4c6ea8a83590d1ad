//! Per-peer connection details

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, SystemTime};

use super::{PeerTypeCounts, relay_peer_id};
use crate::formatting::format_duration;

/// One open connection as reported by the host node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConnection {
    pub peer_id: String,
    pub remote_addr: String,
    pub opened_at: SystemTime,
}

/// Most recent ping round trip to a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSample {
    pub latency: Duration,
    pub measured_at: SystemTime,
}

/// Role a peer plays for this node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerTag {
    /// Listed in the configured bootstrap set
    Bootstrap,
    /// Holds a circuit relay reservation for this node
    Relay,
}

impl fmt::Display for PeerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bootstrap => "bootstrap",
            Self::Relay => "relay",
        })
    }
}

/// Decides the [`PeerTag`]s of a peer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerTagger {
    bootstrap: HashSet<String>,
    relays: HashSet<String>,
}

impl PeerTagger {
    /// `bootstrap` holds peer ids. `listen_addrs` are this node's own
    /// addresses; the relay of every circuit address among them is tagged.
    pub fn new<B, L>(bootstrap: B, listen_addrs: L) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        Self {
            bootstrap: bootstrap.into_iter().map(Into::into).collect(),
            relays: listen_addrs
                .into_iter()
                .filter_map(|addr| relay_peer_id(addr.as_ref()).map(str::to_string))
                .collect(),
        }
    }

    #[must_use]
    pub fn tags(&self, peer_id: &str) -> Vec<PeerTag> {
        let mut tags = Vec::new();
        if self.bootstrap.contains(peer_id) {
            tags.push(PeerTag::Bootstrap);
        }
        if self.relays.contains(peer_id) {
            tags.push(PeerTag::Relay);
        }
        tags
    }
}

/// Everything shown for one connected peer
///
/// Durations are relative to the instant the details were taken, so the
/// record formats without a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerInfo {
    pub peer_id: String,
    pub addresses: Vec<String>,
    /// `None` until the first ping completes
    pub latency: Option<Duration>,
    pub since_last_ping: Option<Duration>,
    /// Age of the peer's first listed connection
    pub connection_age: Duration,
    pub tags: Vec<PeerTag>,
}

/// Read access to the node's live connections
pub trait ConnectionInspector {
    fn connections(&self) -> Vec<LiveConnection>;

    /// Latest ping to `peer_id`, if one has completed
    fn ping(&self, peer_id: &str) -> Option<PingSample>;

    fn remote_addresses(&self) -> Vec<String> {
        self.connections()
            .into_iter()
            .map(|c| c.remote_addr)
            .collect()
    }

    fn peer_type_counts(&self) -> PeerTypeCounts {
        PeerTypeCounts::from_addresses(self.remote_addresses())
    }

    /// One [`PeerInfo`] per connected peer, in order of first connection
    fn peer_details(&self, tagger: &PeerTagger, now: SystemTime) -> Vec<PeerInfo> {
        let mut peers: Vec<PeerInfo> = Vec::new();
        for connection in self.connections() {
            if let Some(peer) = peers.iter_mut().find(|p| p.peer_id == connection.peer_id) {
                peer.addresses.push(connection.remote_addr);
                continue;
            }
            let ping = self.ping(&connection.peer_id);
            peers.push(PeerInfo {
                tags: tagger.tags(&connection.peer_id),
                latency: ping.map(|p| p.latency),
                since_last_ping: ping.map(|p| elapsed(p.measured_at, now)),
                connection_age: elapsed(connection.opened_at, now),
                addresses: vec![connection.remote_addr],
                peer_id: connection.peer_id,
            });
        }
        peers
    }
}

// Clock skew clamps to zero
fn elapsed(since: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(since).unwrap_or_default()
}

/// Connections and ping results pushed in by the host node
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    connections: Vec<LiveConnection>,
    pings: Vec<(String, PingSample)>,
}

impl ConnectionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, peer_id: impl Into<String>, remote_addr: impl Into<String>, at: SystemTime) {
        self.connections.push(LiveConnection {
            peer_id: peer_id.into(),
            remote_addr: remote_addr.into(),
            opened_at: at,
        });
    }

    /// Drop every connection to `remote_addr`; the peer's ping is dropped
    /// with its last connection
    pub fn close(&mut self, remote_addr: &str) {
        self.connections.retain(|c| c.remote_addr != remote_addr);
        let connections = &self.connections;
        self.pings
            .retain(|(peer, _)| connections.iter().any(|c| &c.peer_id == peer));
    }

    pub fn record_ping(&mut self, peer_id: &str, latency: Duration, at: SystemTime) {
        let sample = PingSample {
            latency,
            measured_at: at,
        };
        match self.pings.iter_mut().find(|(peer, _)| peer == peer_id) {
            Some((_, existing)) => *existing = sample,
            None => self.pings.push((peer_id.to_string(), sample)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl ConnectionInspector for ConnectionTable {
    fn connections(&self) -> Vec<LiveConnection> {
        self.connections.clone()
    }

    fn ping(&self, peer_id: &str) -> Option<PingSample> {
        self.pings
            .iter()
            .find(|(peer, _)| peer == peer_id)
            .map(|(_, sample)| *sample)
    }
}

/// Human-readable summary of one peer
///
/// `12D3Koo… [bootstrap, relay] | Ping RTT: 23ms, last measured 4s ago | Connected: 2m 3s | /ip4/...`
#[must_use]
pub fn format_peer(peer: &PeerInfo) -> String {
    let mut out = peer.peer_id.clone();
    if !peer.tags.is_empty() {
        let tags: Vec<String> = peer.tags.iter().map(ToString::to_string).collect();
        out.push_str(&format!(" [{}]", tags.join(", ")));
    }

    match (peer.latency, peer.since_last_ping) {
        (Some(latency), Some(since)) => out.push_str(&format!(
            " | Ping RTT: {}ms, last measured {} ago",
            latency.as_millis(),
            format_duration(since)
        )),
        _ => out.push_str(" | Ping RTT: measuring"),
    }

    out.push_str(&format!(
        " | Connected: {} | {}",
        format_duration(peer.connection_age),
        peer.addresses.join(", ")
    ));
    out
}
