// src/storage/memory.rs
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::models::server::{
    ApprovalStatus, PlayerCount, RankPeriod, RankSnapshot, ServerIcon, ServerRecord, StatSample,
    VoteRecord,
};
use crate::storage::{Storage, StorageError};

/// In-memory storage backend. Writes are per-server-id; the snapshot tables
/// are swapped whole per period so readers never observe a half-built
/// leaderboard.
#[derive(Default)]
pub struct MemoryStorage {
    servers: DashMap<String, ServerRecord>,
    stats: RwLock<Vec<StatSample>>,
    icons: DashMap<String, ServerIcon>,
    votes: RwLock<Vec<VoteRecord>>,
    snapshots: DashMap<RankPeriod, Vec<RankSnapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn add_server(&self, record: ServerRecord) -> Result<(), StorageError> {
        self.servers.insert(record.id.clone(), record);
        Ok(())
    }

    fn get_server(&self, id: &str) -> Option<ServerRecord> {
        self.servers.get(id).map(|r| r.value().clone())
    }

    fn approved_servers(&self) -> Vec<ServerRecord> {
        let mut servers: Vec<ServerRecord> = self
            .servers
            .iter()
            .filter(|r| r.value().status == ApprovalStatus::Approved)
            .map(|r| r.value().clone())
            .collect();
        // Deterministic probe order across cycles.
        servers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        servers
    }

    fn update_probe_state(
        &self,
        id: &str,
        players: Option<PlayerCount>,
        last_successful_contact: Option<u64>,
        now: u64,
    ) -> Result<(), StorageError> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        match players {
            Some(count) => {
                record.players_online = Some(count.online);
                record.players_max = Some(count.max);
            }
            None => {
                record.players_online = None;
                record.players_max = None;
            }
        }
        if let Some(contact) = last_successful_contact {
            record.last_successful_contact = Some(contact);
        }
        record.updated_at = now;
        Ok(())
    }

    fn append_sample(&self, sample: StatSample) -> Result<(), StorageError> {
        self.stats.write().push(sample);
        Ok(())
    }

    fn samples_for(&self, id: &str) -> Vec<StatSample> {
        self.stats
            .read()
            .iter()
            .filter(|s| s.server_id == id)
            .cloned()
            .collect()
    }

    fn get_icon(&self, server_id: &str) -> Option<ServerIcon> {
        self.icons.get(server_id).map(|r| r.value().clone())
    }

    fn put_icon(&self, icon: ServerIcon) -> Result<(), StorageError> {
        self.icons.insert(icon.server_id.clone(), icon);
        Ok(())
    }

    fn add_vote(&self, server_id: &str, timestamp: u64) -> Result<(), StorageError> {
        self.votes.write().push(VoteRecord {
            server_id: server_id.to_string(),
            timestamp,
        });
        Ok(())
    }

    fn votes_since(&self, server_id: &str, since: u64) -> u32 {
        self.votes
            .read()
            .iter()
            .filter(|v| v.server_id == server_id && v.timestamp >= since)
            .count() as u32
    }

    fn replace_snapshot(
        &self,
        period: RankPeriod,
        rows: Vec<RankSnapshot>,
    ) -> Result<(), StorageError> {
        self.snapshots.insert(period, rows);
        Ok(())
    }

    fn snapshot(&self, period: RankPeriod) -> Vec<RankSnapshot> {
        self.snapshots
            .get(&period)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }
}
