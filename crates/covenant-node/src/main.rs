//! covenant-node — the Covenant node binary.
//!
//! Startup sequence:
//!   1. Open the receipt/credential database
//!   2. Wire the external collaborators (Lightning node, identity
//!      resolver, mint) behind their narrow RPC client interfaces
//!   3. Construct the engine and its downstream managers (escrow,
//!      settlement, dispute, bond, marketplace)
//!   4. Start the transport and the orchestration loop
//!   5. Start the JSON-RPC 2.0 server and block until shutdown

mod clients;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use covenant_bond::BondManager;
use covenant_core::Identifier;
use covenant_crypto::signing::Signer;
use covenant_dispute::DisputeManager;
use covenant_engine::{CachingResolver, CovenantDb, Engine, SchemaTranslator};
use covenant_escrow::{mint::verify_capabilities, EscrowManager};
use covenant_marketplace::{ContractRegistry, FormationTracker};
use covenant_orchestrator::{Orchestrator, OrchestratorTasks};
use covenant_policy::{PolicyConfig, PolicyEngine, Preset};
use covenant_rpc::{RpcServer, RpcServerState};
use covenant_settlement::{multilateral_net, AgreementTracker, ObligationLedger};
use covenant_transport::{Libp2pNetwork, TransportConfig};

use clients::{HttpIdentityResolver, HttpMint, HttpNodeRpc};

#[derive(Parser, Debug)]
#[command(name = "covenant-node", version, about = "Covenant node — credential-gated Lightning operations overlay")]
struct Args {
    /// Directory for the persistent receipt/credential database.
    #[arg(long, default_value = "~/.covenant/data")]
    data_dir: PathBuf,

    /// Base URL of the underlying Lightning node's narrow RPC interface.
    #[arg(long, default_value = "http://127.0.0.1:9735")]
    node_rpc_url: String,

    /// Base URL of the distributed identity resolver.
    #[arg(long, default_value = "http://127.0.0.1:9900")]
    resolver_url: String,

    /// Base URL of the bearer-token mint.
    #[arg(long, default_value = "http://127.0.0.1:3338")]
    mint_url: String,

    /// P2P listen address.
    #[arg(long, default_value = "/ip4/0.0.0.0/tcp/7878")]
    p2p_listen: String,

    /// Bootstrap peer multiaddresses (comma-separated).
    #[arg(long, value_delimiter = ',')]
    bootstrap: Vec<String>,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8645")]
    rpc_addr: SocketAddr,

    /// Operator risk preset.
    #[arg(long, value_enum, default_value = "moderate")]
    preset: PresetArg,

    /// Base minimum bond for new members, in msat.
    #[arg(long, default_value_t = 1_000)]
    base_min_bond: u64,

    /// This node's own identifier, used as the `to` side of billing
    /// obligations it records against issuers.
    #[arg(long, default_value = "node-1")]
    node_identifier: String,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum PresetArg {
    Conservative,
    Moderate,
    Aggressive,
}

impl From<PresetArg> for Preset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Conservative => Preset::Conservative,
            PresetArg::Moderate => Preset::Moderate,
            PresetArg::Aggressive => Preset::Aggressive,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,covenant=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("Covenant node starting");

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir).with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = CovenantDb::open(&data_dir).context("opening database")?;

    let resolver = CachingResolver::new(Box::new(HttpIdentityResolver::new(args.resolver_url.clone())));
    let translator = SchemaTranslator::default_capabilities();
    let policy = PolicyEngine::new(PolicyConfig::new(args.preset.into()));
    let node_rpc = Box::new(HttpNodeRpc::new(args.node_rpc_url.clone()));
    let node_signer = Signer::generate();
    let node_identifier = Identifier::new(args.node_identifier.clone());

    let ledger = Arc::new(ObligationLedger::new());
    let ledger_for_obligations = Arc::clone(&ledger);
    let engine = Arc::new(Engine::new(
        db,
        resolver,
        translator,
        policy,
        node_rpc,
        node_signer,
        node_identifier,
        Box::new(move |o: covenant_core::Obligation| ledger_for_obligations.append(o)),
    ));

    let mint = Box::new(HttpMint::new(
        args.mint_url.clone(),
        vec!["NUT-10".into(), "NUT-11".into(), "NUT-14".into()],
    ));
    verify_capabilities(mint.as_ref()).context("mint capability check")?;
    let escrow = Arc::new(EscrowManager::new(mint, None, None).context("constructing escrow manager")?);

    let agreements = Arc::new(Mutex::new(AgreementTracker::new()));
    let disputes = Arc::new(DisputeManager::new());
    let bonds = Arc::new(BondManager::new(args.base_min_bond));
    let formation = Arc::new(FormationTracker::new());
    let contracts = Arc::new(ContractRegistry::new());

    let transport_config =
        TransportConfig { listen_addr: args.p2p_listen, bootstrap_peers: args.bootstrap, ..Default::default() };
    let (network, handle) =
        Libp2pNetwork::new(&transport_config).map_err(|e| anyhow::anyhow!("building transport: {e}"))?;
    info!(peer_id = %handle.local_peer_id, "transport identity");
    let peer_multiaddr = format!("{}/p2p/{}", transport_config.listen_addr, handle.local_peer_id);
    tokio::spawn(network.run());

    let bonds_for_monitor = Arc::clone(&bonds);
    let escrow_for_scan = Arc::clone(&escrow);
    let engine_for_revocation = Arc::clone(&engine);
    let ledger_for_settlement = Arc::clone(&ledger);
    let contracts_for_heartbeat = Arc::clone(&contracts);
    let orchestrator = Orchestrator::spawn(OrchestratorTasks {
        scan_expired_escrow: Some(Arc::new(move || {
            let escrow = Arc::clone(&escrow_for_scan);
            Box::pin(async move {
                let now = chrono::Utc::now().timestamp();
                let expired = escrow.scan_expired(now);
                if !expired.is_empty() {
                    info!(count = expired.len(), "escrow tickets reclaimed on expiry scan");
                }
            })
        })),
        monitor_bond_timelocks: Some(Arc::new(move || {
            let bonds = Arc::clone(&bonds_for_monitor);
            Box::pin(async move {
                let now = chrono::Utc::now().timestamp();
                let refunded = bonds.scan_refundable(now);
                if !refunded.is_empty() {
                    info!(count = refunded.len(), "bonds refunded on timelock scan");
                }
            })
        })),
        refresh_revocation_cache: Some(Arc::new(move || {
            let engine = Arc::clone(&engine_for_revocation);
            Box::pin(async move {
                let now = chrono::Utc::now().timestamp();
                engine.resolver().evict_expired(now);
            })
        })),
        close_settlement_windows: Some(Arc::new(move || {
            let ledger = Arc::clone(&ledger_for_settlement);
            Box::pin(async move {
                let now = chrono::Utc::now().timestamp();
                // Net the just-elapsed window, not the one still accruing.
                let window_id = covenant_core::daily_window_id(now - 86_400);
                let obligations = ledger.window(&window_id);
                if obligations.is_empty() {
                    return;
                }
                let payments = multilateral_net(&obligations);
                if let Err(e) = ledger.mark_netted(&window_id) {
                    tracing::error!(window = %window_id, error = %e, "marking settlement window netted");
                    return;
                }
                info!(window = %window_id, payments = payments.len(), "settlement window closed");
            })
        })),
        emit_heartbeat: Some(Arc::new(move || {
            let contracts = Arc::clone(&contracts_for_heartbeat);
            Box::pin(async move {
                let terminated = contracts.tick();
                if !terminated.is_empty() {
                    info!(count = terminated.len(), "contracts terminated on missed heartbeats");
                }
            })
        })),
    });

    let rpc_state = Arc::new(RpcServerState {
        engine: Arc::clone(&engine),
        ledger,
        agreements,
        disputes,
        bonds,
        escrow,
        formation,
        eligible_members: RwLock::new(Vec::new()),
        peer_multiaddr: Some(peer_multiaddr),
    });
    let rpc_handle = RpcServer::new(rpc_state).start(args.rpc_addr).await.context("starting RPC server")?;

    info!("node ready");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    rpc_handle.stop().ok();
    orchestrator.shutdown().await;

    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
