pub mod fallback;
pub mod mcapi;
pub mod mcsrvstat;

use crate::models::server::{ProbeResult, ProbeTarget};
use async_trait::async_trait;
use std::fmt;

/// Failure of a single provider lookup: transport error, timeout, non-2xx
/// response or a payload that does not parse. Never a panic into the caller.
#[derive(Debug)]
pub enum ProviderError {
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "provider unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One external status-lookup service. Implementations do exactly one
/// outbound query and normalize the provider's own response shape into a
/// `ProbeResult`; retry and fallback live in the resolver, not here.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn query(&self, target: &ProbeTarget) -> Result<ProbeResult, ProviderError>;
}
