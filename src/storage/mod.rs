pub mod memory;

use crate::models::server::{
    PlayerCount, RankPeriod, RankSnapshot, ServerIcon, ServerRecord, StatSample,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    NotFound(String),
    WriteFailed(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "server not found: {}", id),
            Self::WriteFailed(msg) => write!(f, "storage write failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Persistence seam shared by the dispatcher, icon cache and rank builder.
/// The directory and voting collaborators write through `add_server` /
/// `add_vote`; everything else is engine-internal.
pub trait Storage: Send + Sync {
    fn add_server(&self, record: ServerRecord) -> Result<(), StorageError>;
    fn get_server(&self, id: &str) -> Option<ServerRecord>;
    fn approved_servers(&self) -> Vec<ServerRecord>;

    /// Write back the monitoring-derived fields of one record.
    /// `players: None` clears the stored counts (offline result);
    /// `last_successful_contact: None` leaves the stored timestamp untouched.
    fn update_probe_state(
        &self,
        id: &str,
        players: Option<PlayerCount>,
        last_successful_contact: Option<u64>,
        now: u64,
    ) -> Result<(), StorageError>;

    fn append_sample(&self, sample: StatSample) -> Result<(), StorageError>;
    fn samples_for(&self, id: &str) -> Vec<StatSample>;

    fn get_icon(&self, server_id: &str) -> Option<ServerIcon>;
    fn put_icon(&self, icon: ServerIcon) -> Result<(), StorageError>;

    fn add_vote(&self, server_id: &str, timestamp: u64) -> Result<(), StorageError>;
    fn votes_since(&self, server_id: &str, since: u64) -> u32;

    /// Replace the full snapshot row set for one period. Must be atomic with
    /// respect to `snapshot` readers: they see the old rows or the new rows,
    /// never a mix.
    fn replace_snapshot(
        &self,
        period: RankPeriod,
        rows: Vec<RankSnapshot>,
    ) -> Result<(), StorageError>;
    fn snapshot(&self, period: RankPeriod) -> Vec<RankSnapshot>;
}
