use governor::Quota;
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    // HTTP surface
    pub bind_address: String,
    pub bind_port: u16,

    // External status providers
    pub primary_base_url: String,
    pub primary_api_token: Option<String>,
    pub secondary_base_url: String,
    pub secondary_api_token: Option<String>,
    pub provider_timeout_secs: u64,

    // Monitoring policy
    pub staleness_window_secs: u64,
    pub probe_pacing_ms: u64,
    pub cycle_interval_secs: u64,

    // Rate limiting configs
    pub status_period_secs: u64,
    pub status_burst_limit: u32,
    pub cycle_period_secs: u64,
    pub cycle_burst_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 8080,
            primary_base_url: "https://api.mcsrvstat.us".to_string(),
            primary_api_token: None,
            secondary_base_url: "https://mcapi.us".to_string(),
            secondary_api_token: None,
            provider_timeout_secs: 10,
            // Single window for every online check. The product question of
            // whether this should be 2h or 4h is tracked in DESIGN.md; 2h is
            // the default until decided otherwise.
            staleness_window_secs: 7200,
            probe_pacing_ms: 1500,
            cycle_interval_secs: 900, // 15 minutes
            status_period_secs: 5,
            status_burst_limit: 10,
            cycle_period_secs: 60,
            cycle_burst_limit: 2,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),

            bind_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_port),

            primary_base_url: env::var("PRIMARY_PROVIDER_URL").unwrap_or(defaults.primary_base_url),

            primary_api_token: env::var("PRIMARY_PROVIDER_TOKEN").ok(),

            secondary_base_url: env::var("SECONDARY_PROVIDER_URL")
                .unwrap_or(defaults.secondary_base_url),

            secondary_api_token: env::var("SECONDARY_PROVIDER_TOKEN").ok(),

            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider_timeout_secs),

            staleness_window_secs: env::var("STALENESS_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.staleness_window_secs),

            probe_pacing_ms: env::var("PROBE_PACING_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.probe_pacing_ms),

            cycle_interval_secs: env::var("CYCLE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cycle_interval_secs),

            status_period_secs: env::var("STATUS_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_period_secs),

            status_burst_limit: env::var("STATUS_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_burst_limit),

            cycle_period_secs: env::var("CYCLE_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cycle_period_secs),

            cycle_burst_limit: env::var("CYCLE_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cycle_burst_limit),
        }
    }

    pub fn status_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.status_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.status_burst_limit).unwrap())
    }

    pub fn cycle_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.cycle_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.cycle_burst_limit).unwrap())
    }

    /// One token per pacing interval, shared across all probes in a cycle.
    pub fn pacing_quota(&self) -> Quota {
        Quota::with_period(Duration::from_millis(self.probe_pacing_ms.max(1)))
            .unwrap()
            .allow_burst(NonZeroU32::new(1).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.staleness_window_secs, 7200);
        assert_eq!(config.cycle_interval_secs, 900);
        assert!(config.probe_pacing_ms > 0);
    }

    #[test]
    fn quotas_build_from_defaults() {
        let config = Config::default();
        // Quota construction panics on zero values, so building each one is
        // the whole assertion.
        let _ = config.status_quota();
        let _ = config.cycle_quota();
        let _ = config.pacing_quota();
    }
}
