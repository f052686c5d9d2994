// src/providers/mcapi.rs
//
// Secondary provider: a flat health-check style API used only as a safety
// net when the primary fails or claims the server is down.
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::config::Config;
use crate::models::server::{PlayerCount, ProbeResult, ProbeTarget};
use crate::providers::{ProviderError, StatusProvider};

pub struct McApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct McApiResponse {
    status: String,
    #[serde(default)]
    online: bool,
    players: Option<McApiPlayers>,
    server: Option<McApiServer>,
    motd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct McApiPlayers {
    now: u32,
    max: u32,
}

#[derive(Debug, Deserialize)]
struct McApiServer {
    name: Option<String>,
}

impl McApiProvider {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.secondary_base_url.trim_end_matches('/').to_string(),
            api_token: config.secondary_api_token.clone(),
        }
    }
}

fn normalize(response: McApiResponse) -> ProbeResult {
    // The API reports lookup failures through `status`, not HTTP codes; a
    // non-success status means "no usable data", which the resolver treats
    // the same as an offline answer.
    let online = response.status == "success" && response.online;
    ProbeResult {
        online,
        players: response.players.map(|p| PlayerCount {
            online: p.now,
            max: p.max,
        }),
        version: response.server.and_then(|s| s.name),
        motd: response.motd.map(|m| vec![m]),
        icon: None,
    }
}

#[async_trait]
impl StatusProvider for McApiProvider {
    fn name(&self) -> &'static str {
        "mcapi"
    }

    async fn query(&self, target: &ProbeTarget) -> Result<ProbeResult, ProviderError> {
        let url = format!("{}/server/status", self.base_url);
        debug!("mcapi lookup: {} for {}", url, target.host_port());

        let mut request = self.client.get(&url).query(&[("ip", target.address.as_str())]);
        if let Some(port) = target.port {
            request = request.query(&[("port", port.to_string())]);
        }
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "mcapi returned {}",
                response.status()
            )));
        }

        let body: McApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("malformed response: {}", e)))?;

        Ok(normalize(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_flat_online_response() {
        let body = r#"{
            "status": "success",
            "online": true,
            "players": {"now": 10, "max": 50},
            "server": {"name": "1.19.2"},
            "motd": "A Minecraft Server"
        }"#;
        let response: McApiResponse = serde_json::from_str(body).unwrap();
        let result = normalize(response);

        assert!(result.online);
        assert_eq!(result.players, Some(PlayerCount { online: 10, max: 50 }));
        assert_eq!(result.version.as_deref(), Some("1.19.2"));
        assert_eq!(result.motd, Some(vec!["A Minecraft Server".to_string()]));
        assert!(result.icon.is_none());
    }

    #[test]
    fn error_status_normalizes_to_offline() {
        let body = r#"{"status": "error", "online": true}"#;
        let response: McApiResponse = serde_json::from_str(body).unwrap();
        assert!(!normalize(response).online);
    }

    #[test]
    fn missing_online_flag_defaults_to_offline() {
        let body = r#"{"status": "success"}"#;
        let response: McApiResponse = serde_json::from_str(body).unwrap();
        assert!(!normalize(response).online);
    }
}
