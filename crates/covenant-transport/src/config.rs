/// Configuration for the Covenant pub-sub/direct-message transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Local listen address (e.g. "/ip4/0.0.0.0/tcp/7878").
    pub listen_addr: String,
    /// Bootstrap peer multiaddresses.
    pub bootstrap_peers: Vec<String>,
    /// Protocol version string advertised to peers.
    pub protocol_version: String,
    /// GossipSub topic name for marketplace/operation event replication.
    pub event_topic: String,
    /// Minimum relay replication target, e.g. "replicate to at least 3
    /// relays". Informational for the default transport; used by callers
    /// deciding when a publish has achieved sufficient spread.
    pub min_relay_replication: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            listen_addr: "/ip4/0.0.0.0/tcp/7878".into(),
            bootstrap_peers: Vec::new(),
            protocol_version: "/covenant/1.0.0".into(),
            event_topic: "covenant-events".into(),
            min_relay_replication: 3,
        }
    }
}
