// src/handlers/status.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use serde::Deserialize;

use crate::dispatch::{CycleError, ProbeDispatcher};
use crate::handlers::RateLimiters;
use crate::models::server::{Platform, ProbeTarget};
use crate::providers::fallback::ResolveError;
use crate::utils::{extract_peer_ip, RequestError};

#[derive(Deserialize)]
pub struct StatusQuery {
    ip: String,
    port: Option<u16>,
    platform: Option<String>,
}

/// `GET /status` — single on-demand probe of one address. Used by the "test
/// connection" flow and the directory's manual refresh; persists nothing.
pub async fn get_status(
    req: HttpRequest,
    query: web::Query<StatusQuery>,
    dispatcher: web::Data<ProbeDispatcher>,
    limiters: web::Data<RateLimiters>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !limiters.status.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for status lookup for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let address = query.ip.trim();
    if address.is_empty() {
        return Err(RequestError::MissingAddress);
    }
    let platform = match &query.platform {
        Some(p) => p
            .parse::<Platform>()
            .map_err(|_| RequestError::InvalidPlatform(p.clone()))?,
        None => Platform::Java,
    };

    let target = ProbeTarget {
        address: address.to_string(),
        port: query.port,
        platform,
    };
    debug!("on-demand probe for {}", target.host_port());

    match dispatcher.probe_one(&target).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(ResolveError::NotReachable) => Ok(HttpResponse::BadGateway().json(
            serde_json::json!({ "online": false, "error": "server not reachable" }),
        )),
    }
}

/// `POST /status/cycle` — runs one full probe cycle and returns the
/// per-server outcome list. 409 when a cycle is already in flight.
pub async fn run_cycle(
    req: HttpRequest,
    dispatcher: web::Data<ProbeDispatcher>,
    limiters: web::Data<RateLimiters>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !limiters.cycle.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for cycle trigger for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    match dispatcher.run_cycle().await {
        Ok(outcomes) => Ok(HttpResponse::Ok().json(outcomes)),
        Err(CycleError::Busy) => Ok(HttpResponse::Conflict().body(CycleError::Busy.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::server::{PlayerCount, ProbeResult};
    use crate::providers::fallback::FallbackResolver;
    use crate::providers::{ProviderError, StatusProvider};
    use crate::storage::memory::MemoryStorage;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubOnline;

    #[async_trait]
    impl StatusProvider for StubOnline {
        fn name(&self) -> &'static str {
            "stub"
        }
        async fn query(&self, _target: &ProbeTarget) -> Result<ProbeResult, ProviderError> {
            Ok(ProbeResult {
                online: true,
                players: Some(PlayerCount { online: 10, max: 50 }),
                version: None,
                motd: None,
                icon: None,
            })
        }
    }

    struct StubFail;

    #[async_trait]
    impl StatusProvider for StubFail {
        fn name(&self) -> &'static str {
            "stub-fail"
        }
        async fn query(&self, _target: &ProbeTarget) -> Result<ProbeResult, ProviderError> {
            Err(ProviderError::Unavailable("stubbed".to_string()))
        }
    }

    fn dispatcher(primary: Box<dyn StatusProvider>) -> web::Data<ProbeDispatcher> {
        let config = Config {
            probe_pacing_ms: 1,
            ..Config::default()
        };
        web::Data::new(ProbeDispatcher::new(
            Arc::new(MemoryStorage::new()),
            FallbackResolver::new(primary, Box::new(StubFail)),
            &config,
        ))
    }

    fn limiters() -> web::Data<RateLimiters> {
        web::Data::new(RateLimiters::new(&Config::default()))
    }

    #[actix_web::test]
    async fn status_returns_normalized_result() {
        let app = test::init_service(
            App::new()
                .app_data(dispatcher(Box::new(StubOnline)))
                .app_data(limiters())
                .route("/status", web::get().to(get_status)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/status?ip=play.hub.net&port=25565&platform=java")
            .peer_addr("10.1.1.1:4000".parse().unwrap())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["online"], true);
        assert_eq!(body["players"]["online"], 10);
        assert_eq!(body["players"]["max"], 50);
    }

    #[actix_web::test]
    async fn status_rejects_unknown_platform() {
        let app = test::init_service(
            App::new()
                .app_data(dispatcher(Box::new(StubOnline)))
                .app_data(limiters())
                .route("/status", web::get().to(get_status)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/status?ip=play.hub.net&platform=forge")
            .peer_addr("10.1.1.1:4000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unreachable_address_maps_to_bad_gateway() {
        let app = test::init_service(
            App::new()
                .app_data(dispatcher(Box::new(StubFail)))
                .app_data(limiters())
                .route("/status", web::get().to(get_status)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/status?ip=play.hub.net")
            .peer_addr("10.1.1.1:4000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn cycle_endpoint_returns_outcome_list() {
        let app = test::init_service(
            App::new()
                .app_data(dispatcher(Box::new(StubOnline)))
                .app_data(limiters())
                .route("/status/cycle", web::post().to(run_cycle)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/status/cycle")
            .peer_addr("10.1.1.1:4000".parse().unwrap())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().is_empty());
    }
}
