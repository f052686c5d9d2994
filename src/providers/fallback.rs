// src/providers/fallback.rs
use log::{debug, warn};
use std::fmt;

use crate::models::server::{ProbeResult, ProbeTarget};
use crate::providers::StatusProvider;

/// Both providers failed or returned no usable data. Distinct from a
/// confirmed-offline result: the dispatcher must not touch
/// `last_successful_contact` when it sees this.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    NotReachable,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReachable => write!(f, "server not reachable through any provider"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Tries the primary provider first and falls back to the secondary when the
/// primary fails or answers offline (an offline answer from the primary is
/// ambiguous: "no data" rather than a confirmed down). Pure resolution; all
/// persistence happens in the dispatcher.
pub struct FallbackResolver {
    primary: Box<dyn StatusProvider>,
    secondary: Box<dyn StatusProvider>,
}

impl FallbackResolver {
    pub fn new(primary: Box<dyn StatusProvider>, secondary: Box<dyn StatusProvider>) -> Self {
        Self { primary, secondary }
    }

    pub async fn resolve(&self, target: &ProbeTarget) -> Result<ProbeResult, ResolveError> {
        let primary_result = match self.primary.query(target).await {
            Ok(result) => {
                if result.online {
                    debug!(
                        "{} answered online for {}",
                        self.primary.name(),
                        target.host_port()
                    );
                    return Ok(result);
                }
                Some(result)
            }
            Err(e) => {
                warn!(
                    "{} failed for {}: {}",
                    self.primary.name(),
                    target.host_port(),
                    e
                );
                None
            }
        };

        match self.secondary.query(target).await {
            Ok(result) => {
                debug!(
                    "{} answered for {} (online: {})",
                    self.secondary.name(),
                    target.host_port(),
                    result.online
                );
                Ok(result)
            }
            Err(e) => {
                warn!(
                    "{} failed for {}: {}",
                    self.secondary.name(),
                    target.host_port(),
                    e
                );
                // A primary offline answer still counts as a result when the
                // secondary has nothing better.
                primary_result.ok_or(ResolveError::NotReachable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::{Platform, PlayerCount};
    use crate::providers::{ProviderError, StatusProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum StubBehavior {
        Fail,
        Offline,
        Online(u32, u32),
    }

    struct StubProvider {
        behavior: StubBehavior,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn new(behavior: StubBehavior) -> (Box<dyn StatusProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    behavior,
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl StatusProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn query(&self, _target: &ProbeTarget) -> Result<ProbeResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                StubBehavior::Fail => Err(ProviderError::Unavailable("stubbed".to_string())),
                StubBehavior::Offline => Ok(ProbeResult::offline()),
                StubBehavior::Online(online, max) => Ok(ProbeResult {
                    online: true,
                    players: Some(PlayerCount { online, max }),
                    version: Some("1.20".to_string()),
                    motd: None,
                    icon: None,
                }),
            }
        }
    }

    fn target() -> ProbeTarget {
        ProbeTarget {
            address: "play.hub.net".to_string(),
            port: None,
            platform: Platform::Java,
        }
    }

    #[tokio::test]
    async fn primary_online_wins_without_consulting_secondary() {
        let (primary, _) = StubProvider::new(StubBehavior::Online(3, 20));
        let (secondary, secondary_calls) = StubProvider::new(StubBehavior::Online(99, 100));
        let resolver = FallbackResolver::new(primary, secondary);

        let result = resolver.resolve(&target()).await.unwrap();
        assert!(result.online);
        assert_eq!(result.players, Some(PlayerCount { online: 3, max: 20 }));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_failure_falls_back_to_secondary() {
        let (primary, _) = StubProvider::new(StubBehavior::Fail);
        let (secondary, _) = StubProvider::new(StubBehavior::Online(10, 50));
        let resolver = FallbackResolver::new(primary, secondary);

        let result = resolver.resolve(&target()).await.unwrap();
        assert!(result.online);
        assert_eq!(result.players, Some(PlayerCount { online: 10, max: 50 }));
    }

    #[tokio::test]
    async fn primary_offline_prefers_available_secondary() {
        let (primary, _) = StubProvider::new(StubBehavior::Offline);
        let (secondary, secondary_calls) = StubProvider::new(StubBehavior::Online(7, 30));
        let resolver = FallbackResolver::new(primary, secondary);

        let result = resolver.resolve(&target()).await.unwrap();
        assert!(result.online);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn primary_offline_result_survives_secondary_failure() {
        let (primary, _) = StubProvider::new(StubBehavior::Offline);
        let (secondary, _) = StubProvider::new(StubBehavior::Fail);
        let resolver = FallbackResolver::new(primary, secondary);

        let result = resolver.resolve(&target()).await.unwrap();
        assert!(!result.online);
    }

    #[tokio::test]
    async fn both_failing_is_not_reachable() {
        let (primary, _) = StubProvider::new(StubBehavior::Fail);
        let (secondary, _) = StubProvider::new(StubBehavior::Fail);
        let resolver = FallbackResolver::new(primary, secondary);

        let err = resolver.resolve(&target()).await.unwrap_err();
        assert_eq!(err, ResolveError::NotReachable);
    }
}
