//! Transport Abstraction (C13): pluggable publish/subscribe/direct-message
//! interface with a libp2p-backed default implementation and a replay cache.

pub mod config;
pub mod message;
pub mod network;
pub mod replay;
pub mod transport;

pub use config::TransportConfig;
pub use message::TransportMessage;
pub use network::{Libp2pNetwork, NetworkHandle};
pub use replay::ReplayCache;
pub use transport::Transport;
