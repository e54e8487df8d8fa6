use covenant_core::{ContentHash, Identifier};
use serde::{Deserialize, Serialize};

/// Messages exchanged over the Covenant gossip network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransportMessage {
    /// A marketplace event or operation receipt broadcast to all
    /// subscribers of `topic`.
    Publish { topic: String, payload: Vec<u8>, content_hash: ContentHash },
    /// An authenticated-encrypted message addressed to a single recipient.
    DirectMessage { to: Identifier, sealed: Vec<u8> },
}

impl TransportMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("TransportMessage serialization is infallible")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
