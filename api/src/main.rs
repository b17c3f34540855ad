use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;

use pv_api::{create_app, telemetry, AppState};
use pv_core::services::otp::OtpService;
use pv_core::services::rate_limit::{spawn_counter_cleanup, CounterCleanupConfig};
use pv_infra::{create_phone_lookup, create_sms_gateway, DatabasePool, MySqlStore};
use pv_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting PhoneVerify API server"
    );

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        database
            .run_migrations()
            .await
            .context("failed to run database migrations")?;
    }
    let store = Arc::new(MySqlStore::from_database(&database));

    let gateway = Arc::new(create_sms_gateway(&config.sms)?);
    let lookup = Arc::new(create_phone_lookup(&config.intelligence)?);
    let otp_service = OtpService::from_app_config(Arc::clone(&store), gateway, lookup, &config)?;

    let cleanup = config.rate_limit.enabled.then(|| {
        spawn_counter_cleanup(Arc::clone(&store), CounterCleanupConfig::from(&config.rate_limit))
    });

    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let shutdown_timeout = config.server.shutdown_timeout;
    let state = web::Data::new(AppState::new(Arc::new(otp_service), config));

    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone()))
        .shutdown_timeout(shutdown_timeout);
    if workers > 0 {
        server = server.workers(workers);
    }
    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(handle) = cleanup {
        handle.abort();
    }
    // Drain pending statements before exit
    tokio::time::timeout(Duration::from_secs(5), database.close())
        .await
        .ok();
    tracing::info!("Server stopped");

    Ok(())
}
