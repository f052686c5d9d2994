// src/providers/mcsrvstat.rs
//
// Primary provider. Rich nested response shape, covers the widest range of
// protocol versions, but is occasionally rate-limited, which is why the
// resolver keeps a structurally different secondary behind it.
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::config::Config;
use crate::models::server::{Platform, PlayerCount, ProbeResult, ProbeTarget};
use crate::providers::{ProviderError, StatusProvider};

pub struct McSrvStatProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct McSrvStatResponse {
    online: bool,
    players: Option<McSrvStatPlayers>,
    version: Option<String>,
    motd: Option<McSrvStatMotd>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct McSrvStatPlayers {
    online: u32,
    max: u32,
}

#[derive(Debug, Deserialize)]
struct McSrvStatMotd {
    clean: Option<Vec<String>>,
}

impl McSrvStatProvider {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.primary_base_url.trim_end_matches('/').to_string(),
            api_token: config.primary_api_token.clone(),
        }
    }

    fn lookup_url(&self, target: &ProbeTarget) -> String {
        // Bedrock lookups use a dedicated path; cross-platform servers are
        // queried through the Java endpoint, which both families answer.
        match target.platform {
            Platform::Bedrock => format!("{}/bedrock/3/{}", self.base_url, target.host_port()),
            Platform::Java | Platform::CrossPlatform => {
                format!("{}/3/{}", self.base_url, target.host_port())
            }
        }
    }
}

fn normalize(response: McSrvStatResponse) -> ProbeResult {
    let players = response
        .players
        .map(|p| PlayerCount {
            online: p.online,
            max: p.max,
        });
    ProbeResult {
        online: response.online,
        players,
        version: response.version,
        motd: response.motd.and_then(|m| m.clean),
        icon: response.icon,
    }
}

#[async_trait]
impl StatusProvider for McSrvStatProvider {
    fn name(&self) -> &'static str {
        "mcsrvstat"
    }

    async fn query(&self, target: &ProbeTarget) -> Result<ProbeResult, ProviderError> {
        let url = self.lookup_url(target);
        debug!("mcsrvstat lookup: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "mcsrvstat returned {}",
                response.status()
            )));
        }

        let body: McSrvStatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("malformed response: {}", e)))?;

        Ok(normalize(body))
    }
}
