// src/main.rs
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use serverpulse::config::Config;
use serverpulse::dispatch::{CycleError, ProbeDispatcher};
use serverpulse::handlers::{self, RateLimiters};
use serverpulse::providers::fallback::FallbackResolver;
use serverpulse::providers::mcapi::McApiProvider;
use serverpulse::providers::mcsrvstat::McSrvStatProvider;
use serverpulse::storage::memory::MemoryStorage;
use serverpulse::storage::Storage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("debug"));

    dotenv::dotenv().ok();
    let config = Config::from_env();

    let http_client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build provider HTTP client: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to build provider HTTP client: {}", e),
            ));
        }
    };

    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let resolver = FallbackResolver::new(
        Box::new(McSrvStatProvider::new(http_client.clone(), &config)),
        Box::new(McApiProvider::new(http_client, &config)),
    );
    let dispatcher = web::Data::new(ProbeDispatcher::new(storage, resolver, &config));
    let limiters = web::Data::new(RateLimiters::new(&config));

    // Background scheduler: one probe cycle per interval. The dispatcher's
    // own guard skips a tick when the previous cycle is still running.
    {
        let dispatcher = dispatcher.clone();
        let interval_secs = config.cycle_interval_secs;
        actix_web::rt::spawn(async move {
            let mut timer = tokio::time::interval(Duration::from_secs(interval_secs));
            timer.tick().await; // the first tick fires immediately
            loop {
                timer.tick().await;
                match dispatcher.run_cycle().await {
                    Ok(outcomes) => {
                        info!("scheduled cycle processed {} servers", outcomes.len())
                    }
                    Err(CycleError::Busy) => {
                        warn!("previous probe cycle still running, skipping this tick")
                    }
                }
            }
        });
    }

    let bind = format!("{}:{}", config.bind_address, config.bind_port);
    info!("Starting monitoring service on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .app_data(limiters.clone())
            .route("/status", web::get().to(handlers::status::get_status))
            .route("/status/cycle", web::post().to(handlers::status::run_cycle))
    })
    .bind(&bind)?
    .run()
    .await
}
