// src/dispatch.rs
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::RateLimiter;
use log::{debug, error, info};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::icon::{self, IconStoreError};
use crate::models::server::{ProbeResult, ProbeTarget, ServerRecord, StatSample};
use crate::providers::fallback::{FallbackResolver, ResolveError};
use crate::ranking;
use crate::storage::{Storage, StorageError};
use crate::utils::now_unix;

/// Token bucket shared by every outbound probe, scheduled or on-demand. One
/// token per pacing interval keeps the request rate against the third-party
/// providers bounded.
type ProbePacer = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// A provider answered; the result was persisted.
    Checked,
    /// Both providers failed; nothing beyond the attempt row was written.
    Failed,
    /// A storage write failed for this server.
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub server_id: String,
    pub address: String,
    pub status: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProbeOutcome {
    fn new(record: &ServerRecord, status: OutcomeKind, message: Option<String>) -> Self {
        Self {
            server_id: record.id.clone(),
            address: record.host_port(),
            status,
            message,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CycleError {
    /// The previous cycle has not finished; this invocation was skipped.
    Busy,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "a probe cycle is already running"),
        }
    }
}

impl std::error::Error for CycleError {}

/// Drives full probe cycles: enumerates approved servers, runs each through
/// the fallback resolver sequentially with pacing, writes results back, and
/// triggers one ranking rebuild per cycle.
pub struct ProbeDispatcher {
    storage: Arc<dyn Storage>,
    resolver: FallbackResolver,
    pacer: ProbePacer,
    cycle_guard: tokio::sync::Mutex<()>,
}

impl ProbeDispatcher {
    pub fn new(storage: Arc<dyn Storage>, resolver: FallbackResolver, config: &Config) -> Self {
        Self {
            storage,
            resolver,
            pacer: RateLimiter::direct(config.pacing_quota()),
            cycle_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// One full cycle over every approved server. Servers are probed one at a
    /// time by design; a single server's failure never aborts the cycle.
    /// Returns `CycleError::Busy` instead of overlapping a running cycle.
    pub async fn run_cycle(&self) -> Result<Vec<ProbeOutcome>, CycleError> {
        let _guard = self.cycle_guard.try_lock().map_err(|_| CycleError::Busy)?;

        let servers = self.storage.approved_servers();
        info!("probe cycle started: {} servers", servers.len());

        let mut outcomes = Vec::with_capacity(servers.len());
        for record in &servers {
            self.pacer.until_ready().await;
            outcomes.push(self.probe_server(record).await);
        }

        // Exactly once per cycle, after all servers. Period failures are
        // isolated inside rebuild_all.
        ranking::rebuild_all(self.storage.as_ref(), now_unix());

        let checked = outcomes
            .iter()
            .filter(|o| o.status == OutcomeKind::Checked)
            .count();
        info!(
            "probe cycle finished: {}/{} servers checked",
            checked,
            outcomes.len()
        );
        Ok(outcomes)
    }

    /// Single on-demand probe for the "test connection" flow. Shares the
    /// pacing budget with scheduled cycles but persists nothing.
    pub async fn probe_one(&self, target: &ProbeTarget) -> Result<ProbeResult, ResolveError> {
        self.pacer.until_ready().await;
        self.resolver.resolve(target).await
    }

    async fn probe_server(&self, record: &ServerRecord) -> ProbeOutcome {
        let target = ProbeTarget::from(record);
        let started = Instant::now();

        match self.resolver.resolve(&target).await {
            Ok(result) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                let now = now_unix();
                match self.persist_result(record, &result, latency_ms, now) {
                    Ok(()) => ProbeOutcome::new(record, OutcomeKind::Checked, None),
                    Err(e) => {
                        error!("persistence failed for {}: {}", record.host_port(), e);
                        ProbeOutcome::new(record, OutcomeKind::Error, Some(e.to_string()))
                    }
                }
            }
            Err(ResolveError::NotReachable) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                let now = now_unix();
                debug!("{} not reachable through any provider", record.host_port());
                // The attempt still gets a stat row, but the record itself is
                // left alone: NotReachable must not look like confirmed-offline.
                let sample = StatSample {
                    server_id: record.id.clone(),
                    timestamp: now,
                    online: false,
                    players_online: None,
                    players_max: None,
                    latency_ms,
                    motd: None,
                };
                if let Err(e) = self.storage.append_sample(sample) {
                    error!("sample write failed for {}: {}", record.host_port(), e);
                    return ProbeOutcome::new(record, OutcomeKind::Error, Some(e.to_string()));
                }
                ProbeOutcome::new(record, OutcomeKind::Failed, None)
            }
        }
    }

    fn persist_result(
        &self,
        record: &ServerRecord,
        result: &ProbeResult,
        latency_ms: u64,
        now: u64,
    ) -> Result<(), StorageError> {
        self.storage.append_sample(StatSample {
            server_id: record.id.clone(),
            timestamp: now,
            online: result.online,
            players_online: result.players.map(|p| p.online),
            players_max: result.players.map(|p| p.max),
            latency_ms,
            motd: result.motd.as_ref().map(|lines| lines.join("\n")),
        })?;

        if result.online && result.players.is_some() {
            self.storage
                .update_probe_state(&record.id, result.players, Some(now), now)?;

            if let Some(payload) = &result.icon {
                match icon::store(self.storage.as_ref(), &record.id, payload, now) {
                    Ok(_) => {}
                    // A bad icon is not a cycle-level error; the cached row
                    // stays as it was.
                    Err(IconStoreError::Rejected(reason)) => {
                        debug!("icon rejected for {}: {}", record.host_port(), reason);
                    }
                    Err(IconStoreError::Storage(e)) => return Err(e),
                }
            }
        } else {
            // Offline answer: clear the counts, keep last_successful_contact.
            self.storage.update_probe_state(&record.id, None, None, now)?;
        }
        Ok(())
    }
}
