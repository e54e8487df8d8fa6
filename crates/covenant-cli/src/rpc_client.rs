use anyhow::{bail, Context};
use covenant_core::{ManagementCredential, OperationEnvelope, Receipt};

/// Simple JSON-RPC 2.0 client used by the operator CLI to talk to a running
/// node. Uses raw HTTP POST with serde_json rather than the generated
/// jsonrpsee client to keep this binary lean and dependency-minimal.
pub struct CliRpcClient {
    url: String,
    client: reqwest::Client,
}

impl CliRpcClient {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string(), client: reqwest::Client::new() }
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to node at {}", self.url))?;
        let json: serde_json::Value = resp.json().await.context("parsing RPC response")?;
        if let Some(err) = json.get("error") {
            bail!("RPC error: {err}");
        }
        Ok(json["result"].clone())
    }

    pub async fn submit(&self, envelope: &OperationEnvelope) -> anyhow::Result<serde_json::Value> {
        self.call("covenant_submit", serde_json::json!([envelope])).await
    }

    pub async fn issue_credential(&self, credential: &ManagementCredential) -> anyhow::Result<String> {
        let result = self.call("covenant_issueCredential", serde_json::json!([{ "credential": credential }])).await?;
        result["contentHashHex"]
            .as_str()
            .or_else(|| result["content_hash_hex"].as_str())
            .map(|s| s.to_string())
            .context("missing content_hash_hex in response")
    }

    pub async fn revoke_credential(&self, content_hash_hex: &str) -> anyhow::Result<()> {
        self.call("covenant_revokeCredential", serde_json::json!([content_hash_hex])).await?;
        Ok(())
    }

    pub async fn open_contract(&self, negotiation_id: &str, advisor: &str, operator: &str) -> anyhow::Result<()> {
        self.call(
            "covenant_openContract",
            serde_json::json!([{ "negotiationId": negotiation_id, "advisor": advisor, "operator": operator }]),
        )
        .await?;
        Ok(())
    }

    pub async fn close_window(&self, window_id: &str) -> anyhow::Result<serde_json::Value> {
        self.call("covenant_closeWindow", serde_json::json!([window_id])).await
    }

    pub async fn dispute(
        &self,
        dispute_id: &str,
        window_id: &str,
        claimant: &str,
        respondent: &str,
        filed_at: i64,
    ) -> anyhow::Result<()> {
        self.call(
            "covenant_dispute",
            serde_json::json!([{
                "disputeId": dispute_id,
                "windowId": window_id,
                "claimant": claimant,
                "respondent": respondent,
                "filedAt": filed_at,
            }]),
        )
        .await?;
        Ok(())
    }

    pub async fn get_receipt(&self, seq: u64) -> anyhow::Result<Option<Receipt>> {
        let result = self.call("covenant_getReceipt", serde_json::json!([seq])).await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt: Receipt = serde_json::from_value(result["receipt"].clone()).context("parsing receipt")?;
        Ok(Some(receipt))
    }

    pub async fn get_network_info(&self) -> anyhow::Result<serde_json::Value> {
        self.call("covenant_getNetworkInfo", serde_json::json!([])).await
    }
}
