//! Schema Translator (C5): maps declarative operation schemas to ordered
//! node-RPC primitive sequences, advertises a capability set, and attaches a
//! danger score the Policy Engine consumes.

use covenant_core::{ContentHash, CovenantError, ExecutionResult, Permission};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `(schema, action)` pair, the key of the capability set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaAction {
    pub schema: String,
    pub action: String,
}

impl SchemaAction {
    pub fn new(schema: impl Into<String>, action: impl Into<String>) -> Self {
        Self { schema: schema.into(), action: action.into() }
    }
}

/// A capability entry: whether the attached node version actually
/// implements this `(schema, action)`, and its fixed danger score (1-10).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Capability {
    pub danger: u8,
}

/// The external node's narrow RPC interface: supplies channel/HTLC/on-chain
/// primitives. `execute` returns the hash of node state touched by the
/// call (`after-state-hash`) and the execution result.
pub trait NodeRpc: Send + Sync {
    fn execute(
        &self,
        schema: &str,
        action: &str,
        params: &serde_json::Value,
    ) -> Result<ExecutionResult, CovenantError>;

    /// Canonical hash over the subset of node state this `(schema, action)`
    /// touches, taken before execution (`before-state-hash`).
    fn state_hash(&self, schema: &str, action: &str) -> Result<ContentHash, CovenantError>;
}

/// The fixed, cross-implementation `(schema, action) -> danger` mapping,
/// shared across node implementations so that credentials remain portable.
pub struct SchemaTranslator {
    capabilities: HashMap<SchemaAction, Capability>,
}

impl SchemaTranslator {
    /// The default capability set for the schemas `monitor, fee-policy,
    /// rebalance, config, channel, htlc, wallet, backup, emergency`.
    pub fn default_capabilities() -> Self {
        let mut capabilities = HashMap::new();
        let entries: &[(&str, &str, u8)] = &[
            ("monitor/v1", "get_status", 1),
            ("monitor/v1", "get_channels", 1),
            ("fee-policy/v1", "set_anchor", 3),
            ("fee-policy/v1", "set_base_fee", 3),
            ("rebalance/v1", "circular", 5),
            ("rebalance/v1", "loop_out", 6),
            ("config/v1", "set_minhtlc", 4),
            ("channel/v1", "open", 7),
            ("channel/v1", "close", 6),
            ("htlc/v1", "forward_policy", 4),
            ("wallet/v1", "send_onchain", 8),
            ("backup/v1", "export", 2),
            ("emergency/v1", "force_close_all", 10),
        ];
        for (schema, action, danger) in entries {
            capabilities.insert(SchemaAction::new(*schema, *action), Capability { danger: *danger });
        }
        Self { capabilities }
    }

    /// Maps a `(schema, action)` pair to the `ManagementCredential`
    /// permission bit required to execute it. Channel actions split across
    /// `ChannelOpen`/`ChannelClose`; `htlc` and `backup` have no dedicated
    /// bit and are gated by `ConfigTune` and `Monitor` respectively;
    /// `wallet` (on-chain spends) is gated by `Emergency`.
    pub fn required_permission(schema: &str, action: &str) -> Option<Permission> {
        let family = schema.split('/').next().unwrap_or(schema);
        Some(match family {
            "monitor" => Permission::Monitor,
            "fee-policy" => Permission::FeePolicy,
            "rebalance" => Permission::Rebalance,
            "config" => Permission::ConfigTune,
            "htlc" => Permission::ConfigTune,
            "backup" => Permission::Monitor,
            "channel" => {
                if action == "open" {
                    Permission::ChannelOpen
                } else {
                    Permission::ChannelClose
                }
            }
            "wallet" => Permission::Emergency,
            "emergency" => Permission::Emergency,
            _ => return None,
        })
    }

    pub fn capability(&self, schema: &str, action: &str) -> Option<&Capability> {
        self.capabilities.get(&SchemaAction::new(schema, action))
    }

    pub fn is_supported(&self, schema: &str, action: &str) -> bool {
        self.capability(schema, action).is_some()
    }

    /// The advertised capability set published at startup.
    pub fn published_capabilities(&self) -> Vec<(SchemaAction, u8)> {
        self.capabilities.iter().map(|(k, v)| (k.clone(), v.danger)).collect()
    }

    pub fn translate_and_execute(
        &self,
        node: &dyn NodeRpc,
        schema: &str,
        action: &str,
        params: &serde_json::Value,
    ) -> Result<(ContentHash, ExecutionResult, ContentHash), CovenantError> {
        if !self.is_supported(schema, action) {
            return Err(CovenantError::UnsupportedSchema(format!("{schema}/{action}")));
        }
        let before = node.state_hash(schema, action)?;
        let result = node.execute(schema, action, params)?;
        let after = node.state_hash(schema, action)?;
        Ok((before, result, after))
    }
}
