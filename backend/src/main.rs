//! Backend entry-point: loads settings, seeds reference data and serves the
//! REST API with OpenAPI docs.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use social_backend::bootstrap::{ServiceSettings, seed_reference_data_on_startup};
use social_backend::inbound::http::health::HealthState;
use social_backend::outbound::persistence::DbPool;
use social_backend::outbound::token::JwtTokenService;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load().wrap_err("load service settings")?;
    let bind_addr = settings.bind_addr()?;
    let tokens = JwtTokenService::new(settings.jwt_secret()?, Arc::new(DefaultClock))
        .with_ttl(settings.token_ttl()?);

    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("connect to PostgreSQL")?;
    if let Some(summary) = seed_reference_data_on_startup(&settings, &pool).await? {
        info!(
            cities_added = summary.cities_added,
            accounts_created = summary.accounts_created,
            "startup seeding finished"
        );
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr, pool, tokens))?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
