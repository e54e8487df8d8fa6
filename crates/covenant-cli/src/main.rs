//! covenant-cli
//!
//! Operator CLI for Covenant. Manages a Dilithium2 identity keypair, issues
//! and revokes management credentials, builds and signs operation
//! envelopes, and submits them to a running node via JSON-RPC.
//!
//! Usage:
//!   covenant-cli keygen              [--keyfile <path>]
//!   covenant-cli issue-credential    --subject <id> --permissions <csv> --allowed-schemas <csv> --valid-from <ts> --valid-until <ts> [--constraints <json>]
//!   covenant-cli revoke-credential   --content-hash <hex>
//!   covenant-cli submit              --schema <id> --action <name> --params <json> --issuer <id> --nonce <n> --credential-ref <hex>
//!   covenant-cli open-contract       --negotiation-id <id> --advisor <id> --operator <id>
//!   covenant-cli close-window        --window-id <id>
//!   covenant-cli dispute             --dispute-id <id> --window-id <id> --claimant <id> --respondent <id>
//!   covenant-cli receipt             --seq <n>
//!   covenant-cli info

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use covenant_core::{ContentHash, Identifier, ManagementCredential, OperationEnvelope, Permission, VerifiableCredential};
use covenant_crypto::signing::Signer;

mod rpc_client;
use rpc_client::CliRpcClient;

#[derive(Parser, Debug)]
#[command(name = "covenant-cli", version, about = "Covenant operator CLI — issue credentials and submit operations")]
struct Args {
    /// Path to the identity keyfile (JSON).
    #[arg(long, global = true, default_value = "~/.covenant/identity.json")]
    keyfile: PathBuf,

    /// Node RPC endpoint.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8645")]
    rpc: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new Dilithium2 identity keypair and save to the keyfile.
    Keygen,

    /// Issue a management credential and register it with the node.
    IssueCredential {
        #[arg(long)]
        subject: String,
        /// Comma-separated permission names (monitor, fee_policy, rebalance, config_tune, channel_open, channel_close, emergency).
        #[arg(long)]
        permissions: String,
        /// Comma-separated allowed-schema globs.
        #[arg(long)]
        allowed_schemas: String,
        #[arg(long)]
        valid_from: i64,
        #[arg(long)]
        valid_until: i64,
        /// JSON object of numeric constraints, e.g. '{"max_fee_change_pct": 25.0}'.
        #[arg(long, default_value = "{}")]
        constraints: String,
    },

    /// Revoke a previously issued credential.
    RevokeCredential {
        #[arg(long)]
        content_hash: String,
    },

    /// Sign and submit an operation envelope.
    Submit {
        #[arg(long)]
        schema: String,
        #[arg(long)]
        action: String,
        /// JSON object of operation parameters.
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        credential_ref: String,
    },

    /// Open a new bilateral contract negotiation.
    OpenContract {
        #[arg(long)]
        negotiation_id: String,
        #[arg(long)]
        advisor: String,
        #[arg(long)]
        operator: String,
    },

    /// Close a settlement window and trigger netting.
    CloseWindow {
        #[arg(long)]
        window_id: String,
    },

    /// File a dispute.
    Dispute {
        #[arg(long)]
        dispute_id: String,
        #[arg(long)]
        window_id: String,
        #[arg(long)]
        claimant: String,
        #[arg(long)]
        respondent: String,
    },

    /// Fetch a receipt by sequence number.
    Receipt {
        #[arg(long)]
        seq: u64,
    },

    /// Print this node's network info.
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn,covenant_cli=info").init();

    let args = Args::parse();
    let keyfile = expand_tilde(&args.keyfile);
    let client = CliRpcClient::new(&args.rpc);

    match args.command {
        Command::Keygen => cmd_keygen(&keyfile),

        Command::IssueCredential { subject, permissions, allowed_schemas, valid_from, valid_until, constraints } => {
            let signer = load_signer(&keyfile)?;
            let perms = parse_permissions(&permissions)?;
            let schemas: Vec<String> = allowed_schemas.split(',').map(|s| s.trim().to_string()).collect();
            let constraint_map: covenant_core::ConstraintMap =
                serde_json::from_str(&constraints).context("parsing --constraints as JSON object")?;

            let mut credential = VerifiableCredential {
                issuer: Identifier::new("self"),
                issuer_key: signer.public_key.clone(),
                subject: Identifier::new(subject),
                credential_type: "management".into(),
                valid_from,
                valid_until,
                constraints: constraint_map,
                signatures: Vec::new(),
                status: None,
                revoked_at: None,
            };
            let hash = credential.content_hash()?;
            let sig = signer.sign(hash.0.as_slice()).context("signing credential")?;
            credential.signatures.push(sig);

            let management = ManagementCredential { credential, permissions: perms, allowed_schemas: schemas };
            let hash_hex = client.issue_credential(&management).await?;
            println!("Credential issued: {hash_hex}");
            Ok(())
        }

        Command::RevokeCredential { content_hash } => {
            client.revoke_credential(&content_hash).await?;
            println!("Credential revoked: {content_hash}");
            Ok(())
        }

        Command::Submit { schema, action, params, issuer, nonce, credential_ref } => {
            let signer = load_signer(&keyfile)?;
            let params_value: serde_json::Value =
                serde_json::from_str(&params).context("parsing --params as JSON")?;
            let credential_ref = parse_content_hash(&credential_ref)?;
            let ts = chrono::Utc::now().to_rfc3339();

            let mut envelope = OperationEnvelope {
                schema,
                action,
                params: params_value,
                issuer: Identifier::new(issuer),
                nonce,
                ts,
                credential_ref,
                sig: String::new(),
            };
            let signing_bytes = envelope.canonical_signing_bytes()?;
            let sig = signer.sign(&signing_bytes).context("signing operation envelope")?;
            envelope.sig = hex::encode(&sig.0);

            let result = client.submit(&envelope).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        Command::OpenContract { negotiation_id, advisor, operator } => {
            client.open_contract(&negotiation_id, &advisor, &operator).await?;
            println!("Negotiation opened: {negotiation_id}");
            Ok(())
        }

        Command::CloseWindow { window_id } => {
            let result = client.close_window(&window_id).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        Command::Dispute { dispute_id, window_id, claimant, respondent } => {
            let filed_at = chrono::Utc::now().timestamp();
            client.dispute(&dispute_id, &window_id, &claimant, &respondent, filed_at).await?;
            println!("Dispute filed: {dispute_id}");
            Ok(())
        }

        Command::Receipt { seq } => {
            match client.get_receipt(seq).await? {
                Some(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                None => println!("no receipt at seq {seq}"),
            }
            Ok(())
        }

        Command::Info => {
            let info = client.get_network_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}

fn cmd_keygen(keyfile: &PathBuf) -> anyhow::Result<()> {
    if keyfile.exists() {
        bail!("Keyfile {} already exists. Delete it first to generate a new key.", keyfile.display());
    }
    if let Some(parent) = keyfile.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let signer = Signer::generate();
    let record = serde_json::json!({
        "public_key_hex": hex::encode(&signer.public_key.0),
        "secret_key_hex": hex::encode(signer.secret_key_bytes()),
    });
    std::fs::write(keyfile, serde_json::to_string_pretty(&record)?)
        .with_context(|| format!("writing keyfile to {}", keyfile.display()))?;

    println!("Generated new identity keypair.");
    println!("Public key: {}", hex::encode(&signer.public_key.0));
    println!("Keyfile:    {}", keyfile.display());
    println!("\nBACK UP YOUR KEYFILE. Loss of the secret key means loss of signing authority over this identity.");
    Ok(())
}

fn load_signer(keyfile: &PathBuf) -> anyhow::Result<Signer> {
    let json = std::fs::read_to_string(keyfile)
        .with_context(|| format!("reading keyfile {} — run `covenant-cli keygen` first", keyfile.display()))?;
    let record: serde_json::Value = serde_json::from_str(&json).context("parsing keyfile")?;
    let pk = hex::decode(record["public_key_hex"].as_str().context("keyfile missing public_key_hex")?)
        .context("decoding public_key_hex")?;
    let sk = hex::decode(record["secret_key_hex"].as_str().context("keyfile missing secret_key_hex")?)
        .context("decoding secret_key_hex")?;
    Ok(Signer::from_secret_key_bytes(sk, pk))
}

fn parse_permissions(csv: &str) -> anyhow::Result<Vec<Permission>> {
    csv.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "monitor" => Ok(Permission::Monitor),
            "fee_policy" => Ok(Permission::FeePolicy),
            "rebalance" => Ok(Permission::Rebalance),
            "config_tune" => Ok(Permission::ConfigTune),
            "channel_open" => Ok(Permission::ChannelOpen),
            "channel_close" => Ok(Permission::ChannelClose),
            "emergency" => Ok(Permission::Emergency),
            other => bail!("unknown permission {other}"),
        })
        .collect()
}

fn parse_content_hash(hex_str: &str) -> anyhow::Result<ContentHash> {
    let bytes = hex::decode(hex_str).context("decoding content hash hex")?;
    if bytes.len() != 32 {
        bail!("content hash must be 32 bytes (64 hex chars)");
    }
    let mut array = [0u8; 32];
    array.copy_from_slice(&bytes);
    Ok(ContentHash(array))
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.clone()
}
