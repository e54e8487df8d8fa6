//! Orchestration Loop (C14): schedules settlement-window closure, escrow
//! expiry scans, revocation-cache refresh, heartbeat emission, and bond
//! timelock monitoring on independent ticks.

use covenant_core::constants::{
    DEFAULT_HEARTBEAT_INTERVAL_SECS, ORCHESTRATOR_BOND_MONITOR_TICK_SECS,
    ORCHESTRATOR_ESCROW_SCAN_TICK_SECS, ORCHESTRATOR_REVOCATION_REFRESH_TICK_SECS,
    ORCHESTRATOR_SETTLEMENT_TICK_SECS,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

type Task = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// The five independently-ticking periodic jobs the orchestrator runs.
/// Each is optional: a `None` slot is simply never scheduled, so a node
/// that embeds only a subset of components (e.g. no marketplace) can omit
/// the corresponding task.
#[derive(Default)]
pub struct OrchestratorTasks {
    pub close_settlement_windows: Option<Task>,
    pub scan_expired_escrow: Option<Task>,
    pub refresh_revocation_cache: Option<Task>,
    pub emit_heartbeat: Option<Task>,
    pub monitor_bond_timelocks: Option<Task>,
}

/// Owns the tokio tasks backing each tick. Dropping this handle aborts all
/// scheduled work.
pub struct Orchestrator {
    handles: Vec<JoinHandle<()>>,
}

impl Orchestrator {
    /// Spawns one `tokio::time::interval` loop per configured task. Panics
    /// inside a task are caught at the tick boundary and logged, not
    /// propagated — one bad tick must not take down the orchestrator.
    pub fn spawn(tasks: OrchestratorTasks) -> Self {
        let mut handles = Vec::new();
        if let Some(task) = tasks.close_settlement_windows {
            handles.push(spawn_tick("settlement_window_close", Duration::from_secs(ORCHESTRATOR_SETTLEMENT_TICK_SECS), task));
        }
        if let Some(task) = tasks.scan_expired_escrow {
            handles.push(spawn_tick("escrow_expiry_scan", Duration::from_secs(ORCHESTRATOR_ESCROW_SCAN_TICK_SECS), task));
        }
        if let Some(task) = tasks.refresh_revocation_cache {
            handles.push(spawn_tick("revocation_cache_refresh", Duration::from_secs(ORCHESTRATOR_REVOCATION_REFRESH_TICK_SECS), task));
        }
        if let Some(task) = tasks.emit_heartbeat {
            handles.push(spawn_tick("heartbeat_emission", Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS as u64), task));
        }
        if let Some(task) = tasks.monitor_bond_timelocks {
            handles.push(spawn_tick("bond_timelock_monitor", Duration::from_secs(ORCHESTRATOR_BOND_MONITOR_TICK_SECS), task));
        }
        Orchestrator { handles }
    }

    pub async fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}

fn spawn_tick(name: &'static str, period: Duration, task: Task) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            info!(task = name, "orchestrator tick");
            let fut = task();
            if let Err(panic) = tokio::spawn(fut).await {
                error!(task = name, error = %panic, "orchestrator task panicked");
            }
        }
    })
}

/// Counts consecutive missed heartbeats against the terminate threshold
/// `HEARTBEAT_MISSES_BEFORE_TERMINATE`.
pub fn heartbeat_misses_exceed_threshold(misses: u32) -> bool {
    misses >= covenant_core::constants::HEARTBEAT_MISSES_BEFORE_TERMINATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn spawned_task_fires_on_its_own_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let tasks = OrchestratorTasks {
            scan_expired_escrow: Some(Arc::new(move || {
                let count = count_clone.clone();
                Box::pin(async move {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            })),
            ..Default::default()
        };
        let orchestrator = Orchestrator::spawn(tasks);
        tokio::time::advance(Duration::from_secs(ORCHESTRATOR_ESCROW_SCAN_TICK_SECS * 3 + 1)).await;
        tokio::task::yield_now().await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        orchestrator.shutdown().await;
    }

    #[test]
    fn heartbeat_threshold_matches_constant() {
        assert!(!heartbeat_misses_exceed_threshold(
            covenant_core::constants::HEARTBEAT_MISSES_BEFORE_TERMINATE - 1
        ));
        assert!(heartbeat_misses_exceed_threshold(covenant_core::constants::HEARTBEAT_MISSES_BEFORE_TERMINATE));
    }
}
