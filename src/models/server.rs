// src/models/server.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol family a directory entry speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Java,
    Bedrock,
    #[serde(rename = "crossplatform")]
    CrossPlatform,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Platform::Java),
            "bedrock" => Ok(Platform::Bedrock),
            "crossplatform" => Ok(Platform::CrossPlatform),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Java => write!(f, "java"),
            Platform::Bedrock => write!(f, "bedrock"),
            Platform::CrossPlatform => write!(f, "crossplatform"),
        }
    }
}

/// Moderation state of a directory entry. Only approved servers are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// One directory entry. The directory owns the identity fields; the engine
/// only writes the monitoring-derived fields (`players_online`, `players_max`,
/// `last_successful_contact`, `updated_at`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    pub address: String,
    pub port: Option<u16>,
    pub platform: Platform,
    pub status: ApprovalStatus,
    pub players_online: Option<u32>,
    pub players_max: Option<u32>,
    pub last_successful_contact: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl ServerRecord {
    pub fn new(address: &str, port: Option<u16>, platform: Platform, now: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            address: address.to_string(),
            port,
            platform,
            status: ApprovalStatus::Pending,
            players_online: None,
            players_max: None,
            last_successful_contact: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Address formatted the way the status providers expect it.
    pub fn host_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.address, port),
            None => self.address.clone(),
        }
    }
}

/// What a probe is aimed at; carried separately from `ServerRecord` so the
/// on-demand "test connection" path can probe addresses that are not in the
/// directory at all.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub address: String,
    pub port: Option<u16>,
    pub platform: Platform,
}

impl ProbeTarget {
    pub fn host_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.address, port),
            None => self.address.clone(),
        }
    }
}

impl From<&ServerRecord> for ProbeTarget {
    fn from(record: &ServerRecord) -> Self {
        Self {
            address: record.address.clone(),
            port: record.port,
            platform: record.platform,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCount {
    pub online: u32,
    pub max: u32,
}

/// Normalized result of a single probe, whichever provider answered it.
/// Transient: fields are projected onto `ServerRecord` and `StatSample`,
/// never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub online: bool,
    pub players: Option<PlayerCount>,
    pub version: Option<String>,
    pub motd: Option<Vec<String>>,
    /// Icon payload as the provider sent it: base64 text, possibly with a
    /// data-URI prefix. Validation happens in the icon cache, not here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ProbeResult {
    pub fn offline() -> Self {
        Self {
            online: false,
            players: None,
            version: None,
            motd: None,
            icon: None,
        }
    }
}

/// One row per probe attempt. Append-only time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSample {
    pub server_id: String,
    pub timestamp: u64,
    pub online: bool,
    pub players_online: Option<u32>,
    pub players_max: Option<u32>,
    pub latency_ms: u64,
    pub motd: Option<String>,
}

/// Cached icon row, at most one per server, keyed by server id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerIcon {
    pub server_id: String,
    /// Base64 text after data-URI stripping.
    pub payload: String,
    /// Lowercase hex SHA-256 of the decoded image bytes.
    pub content_hash: String,
    pub updated_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPeriod {
    Hourly,
    Daily,
}

impl RankPeriod {
    /// How far back votes count towards this period's ordering.
    pub fn window_secs(&self) -> u64 {
        match self {
            RankPeriod::Hourly => 3600,
            RankPeriod::Daily => 86400,
        }
    }
}

impl fmt::Display for RankPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankPeriod::Hourly => write!(f, "hourly"),
            RankPeriod::Daily => write!(f, "daily"),
        }
    }
}

/// Derived leaderboard row. The whole set for a period is recomputed and
/// swapped atomically on every rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSnapshot {
    pub period: RankPeriod,
    pub server_id: String,
    pub rank: u32,
}

/// Vote rows are written by the voting collaborator; the engine only counts
/// them inside a snapshot period's window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub server_id: String,
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_all_families() {
        assert_eq!("java".parse::<Platform>().unwrap(), Platform::Java);
        assert_eq!("Bedrock".parse::<Platform>().unwrap(), Platform::Bedrock);
        assert_eq!(
            "crossplatform".parse::<Platform>().unwrap(),
            Platform::CrossPlatform
        );
        assert!("minecraft".parse::<Platform>().is_err());
    }

    #[test]
    fn host_port_omits_missing_port() {
        let mut record = ServerRecord::new("play.hub.net", None, Platform::Java, 1000);
        assert_eq!(record.host_port(), "play.hub.net");
        record.port = Some(25565);
        assert_eq!(record.host_port(), "play.hub.net:25565");
    }
}
