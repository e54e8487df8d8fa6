//! Thin HTTP JSON-RPC clients binding the external collaborators named in
//! §1 — the Lightning node, the identity resolver, and the bearer-token
//! mint — to the narrow trait interfaces `covenant-engine`/`covenant-escrow`
//! define. None of these reimplement their counterparty; they translate
//! one JSON shape to another over a blocking HTTP call.

use covenant_core::{
    ContentHash, CovenantError, ExecutionResult, Identifier, PublicKey, ResolvedIdentity, SpendingCondition,
};
use covenant_engine::{IdentityResolverClient, NodeRpc};
use covenant_escrow::{Mint, TokenState};
use serde::Deserialize;
use serde_json::json;

fn http_err(e: reqwest::Error) -> CovenantError {
    if e.is_timeout() || e.is_connect() {
        CovenantError::NodeRpcFailureRetryable(e.to_string())
    } else {
        CovenantError::NodeRpcFailureFatal(e.to_string())
    }
}

/// Calls the underlying Lightning node's narrow RPC surface over HTTP.
/// The node is expected to expose one endpoint per `(schema, action)` at
/// `POST {base_url}/{schema}/{action}` and a state-hash probe at
/// `GET {base_url}/state-hash/{schema}/{action}`.
pub struct HttpNodeRpc {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpNodeRpc {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::blocking::Client::new() }
    }
}

impl NodeRpc for HttpNodeRpc {
    fn execute(
        &self,
        schema: &str,
        action: &str,
        params: &serde_json::Value,
    ) -> Result<ExecutionResult, CovenantError> {
        let url = format!("{}/{schema}/{action}", self.base_url);
        let resp = self.client.post(&url).json(params).send().map_err(http_err)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let retryable = status.is_server_error();
            let detail = resp.text().unwrap_or_default();
            return Err(if retryable {
                CovenantError::NodeRpcFailureRetryable(detail)
            } else {
                CovenantError::NodeRpcFailureFatal(detail)
            });
        }
        resp.json::<ExecutionResult>().map_err(http_err)
    }

    fn state_hash(&self, schema: &str, action: &str) -> Result<ContentHash, CovenantError> {
        let url = format!("{}/state-hash/{schema}/{action}", self.base_url);
        #[derive(Deserialize)]
        struct Resp {
            hash_hex: String,
        }
        let resp: Resp = self.client.get(&url).send().map_err(http_err)?.json().map_err(http_err)?;
        let bytes = hex::decode(&resp.hash_hex)
            .map_err(|e| CovenantError::NodeRpcFailureFatal(format!("bad hash hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(CovenantError::NodeRpcFailureFatal("state hash must be 32 bytes".into()));
        }
        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(ContentHash(array))
    }
}

/// Calls the distributed identity resolver over HTTP.
pub struct HttpIdentityResolver {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpIdentityResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::blocking::Client::new() }
    }
}

impl IdentityResolverClient for HttpIdentityResolver {
    fn resolve(&self, identifier: &Identifier) -> Result<ResolvedIdentity, CovenantError> {
        #[derive(Deserialize)]
        struct Resp {
            public_key_hex: String,
            revoked: bool,
            resolved_at: i64,
        }
        let url = format!("{}/resolve/{}", self.base_url, identifier.0);
        let resp: Resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CovenantError::Unverifiable(e.to_string()))?
            .json()
            .map_err(|e| CovenantError::Unverifiable(e.to_string()))?;
        let public_key = hex::decode(&resp.public_key_hex)
            .map_err(|e| CovenantError::Unverifiable(format!("bad public key hex: {e}")))?;
        Ok(ResolvedIdentity {
            identifier: identifier.clone(),
            public_key: PublicKey(public_key),
            revoked: resp.revoked,
            resolved_at: resp.resolved_at,
        })
    }
}

/// Calls an external bearer-token mint exposing NUT-10/11/14 primitive
/// operations over HTTP.
pub struct HttpMint {
    base_url: String,
    client: reqwest::blocking::Client,
    capabilities: Vec<String>,
}

impl HttpMint {
    pub fn new(base_url: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::blocking::Client::new(), capabilities }
    }
}

impl Mint for HttpMint {
    fn advertised_capabilities(&self) -> Vec<String> {
        self.capabilities.clone()
    }

    fn checkstate(&self, backing_token: &str) -> Result<TokenState, CovenantError> {
        #[derive(Deserialize)]
        struct Resp {
            state: String,
        }
        let url = format!("{}/checkstate", self.base_url);
        let resp: Resp = self
            .client
            .post(&url)
            .json(&json!({ "token": backing_token }))
            .send()
            .map_err(|e| CovenantError::MintUnavailable(e.to_string()))?
            .json()
            .map_err(|e| CovenantError::MintUnavailable(e.to_string()))?;
        Ok(match resp.state.as_str() {
            "unspent" => TokenState::Unspent,
            "spent" => TokenState::Spent,
            _ => TokenState::Unknown,
        })
    }

    fn mint(&self, amount: covenant_core::Amount, condition: &SpendingCondition) -> Result<String, CovenantError> {
        #[derive(Deserialize)]
        struct Resp {
            token: String,
        }
        let url = format!("{}/mint", self.base_url);
        let resp: Resp = self
            .client
            .post(&url)
            .json(&json!({ "amount": amount, "condition": condition.to_wire() }))
            .send()
            .map_err(|e| CovenantError::MintUnavailable(e.to_string()))?
            .json()
            .map_err(|e| CovenantError::MintUnavailable(e.to_string()))?;
        Ok(resp.token)
    }

    fn redeem(&self, backing_token: &str, preimage: &[u8]) -> Result<(), CovenantError> {
        let url = format!("{}/redeem", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "token": backing_token, "preimage": hex::encode(preimage) }))
            .send()
            .map_err(|e| CovenantError::MintUnavailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(CovenantError::MintUnavailable(resp.text().unwrap_or_default()));
        }
        Ok(())
    }
}
