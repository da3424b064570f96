//! # Yatube Web Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use yatube_core::ports::TokenService;
use yatube_infra::JwtTokenService;

mod config;
mod fixtures;
mod handlers;
mod middleware;
mod state;
mod telemetry;
mod views;

use config::AppConfig;
use state::{AppState, Storage};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Yatube on {}:{}",
        config.host,
        config.port
    );

    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
    let state = AppState::new(&config).await;

    if let Some(path) = &config.fixtures_path {
        if state.storage == Storage::InMemory {
            let data = fixtures::load(path)?;
            fixtures::apply(&state, data)
                .await
                .context("loading fixtures")?;
        } else {
            tracing::warn!(path = %path.display(), "Fixtures are only loaded into in-memory storage");
        }
    }

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(handlers::configure_app(state.clone(), tokens.clone()))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("binding {}:{}", config.host, config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
