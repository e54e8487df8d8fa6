//! Identity Resolver client, Credential Store, Replay/Nonce Guard, Schema
//! Translator and Receipt Ledger (C1-C6), bound together by the central
//! `submit` pipeline.

pub mod db;
pub mod engine;
pub mod resolver;
pub mod translator;

pub use db::CovenantDb;
pub use engine::{Engine, NullObligationSink, ObligationSink};
pub use resolver::{CachingResolver, IdentityResolverClient};
pub use translator::{Capability, NodeRpc, SchemaAction, SchemaTranslator};
