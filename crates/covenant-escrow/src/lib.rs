//! Escrow Manager (C7): conditional bearer tokens, secret vault, pricing
//! contract.

pub mod manager;
pub mod mint;
pub mod pricing;
pub mod vault;

pub use manager::{derive_ticket_id, EscrowManager};
pub use mint::{Mint, TokenState, REQUIRED_MINT_CAPABILITIES};
pub use pricing::price;
pub use vault::SecretVault;
