pub mod status;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use std::net::IpAddr;

use crate::config::Config;

type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Per-IP limiters for each route, bundled so they register as one piece of
/// app data.
pub struct RateLimiters {
    pub status: KeyedLimiter,
    pub cycle: KeyedLimiter,
}

impl RateLimiters {
    pub fn new(config: &Config) -> Self {
        Self {
            status: RateLimiter::keyed(config.status_quota()),
            cycle: RateLimiter::keyed(config.cycle_quota()),
        }
    }
}
