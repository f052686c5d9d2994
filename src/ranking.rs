// src/ranking.rs
//
// Leaderboard rebuilds. Each period's snapshot is recomputed from scratch
// after every dispatch cycle and swapped into storage in one operation, so
// readers either see the previous full set or the new one.
use log::{debug, error};
use std::fmt;

use crate::models::server::{RankPeriod, RankSnapshot, ServerRecord};
use crate::storage::{Storage, StorageError};

#[derive(Debug)]
pub enum RankRebuildFailure {
    Storage(StorageError),
}

impl fmt::Display for RankRebuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "rank rebuild failed: {}", e),
        }
    }
}

impl std::error::Error for RankRebuildFailure {}

/// Ordering key for one server within a period: votes inside the period
/// window, then current player count, then registration recency.
fn rank_key(storage: &dyn Storage, record: &ServerRecord, period: RankPeriod, now: u64) -> (u32, u32, u64) {
    let since = now.saturating_sub(period.window_secs());
    (
        storage.votes_since(&record.id, since),
        record.players_online.unwrap_or(0),
        record.created_at,
    )
}

/// Recompute and atomically replace one period's snapshot.
pub fn rebuild(
    storage: &dyn Storage,
    period: RankPeriod,
    now: u64,
) -> Result<(), RankRebuildFailure> {
    let mut servers = storage.approved_servers();
    let mut keyed: Vec<((u32, u32, u64), ServerRecord)> = servers
        .drain(..)
        .map(|record| (rank_key(storage, &record, period, now), record))
        .collect();
    // Highest votes first; ties go to the busier, then the most recently
    // registered server.
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let rows: Vec<RankSnapshot> = keyed
        .iter()
        .enumerate()
        .map(|(i, (_, record))| RankSnapshot {
            period,
            server_id: record.id.clone(),
            rank: (i + 1) as u32,
        })
        .collect();

    debug!("rebuilt {} snapshot with {} servers", period, rows.len());
    storage
        .replace_snapshot(period, rows)
        .map_err(RankRebuildFailure::Storage)
}

/// Rebuild both periods back-to-back. One period's failure is logged and does
/// not block the other.
pub fn rebuild_all(storage: &dyn Storage, now: u64) {
    for period in [RankPeriod::Hourly, RankPeriod::Daily] {
        if let Err(e) = rebuild(storage, period, now) {
            error!("{} snapshot rebuild failed: {}", period, e);
        }
    }
}
