//! services/sync/src/bin/syncd.rs

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use sync_lib::{
    adapters::{JsonFileStore, PgRemoteStore, SharedConnectivity, SystemClock},
    config::Config,
    engine::{presence, SyncContext, SyncEngine},
    error::SyncError,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), SyncError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting sync daemon...");

    // --- 2. Connect to the Remote Store & Run Migrations ---
    info!("Connecting to the remote document store...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let remote = Arc::new(PgRemoteStore::new(db_pool));
    info!("Running database migrations...");
    remote.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Open the Local Store & Build the Engine ---
    let storage = Arc::new(JsonFileStore::open(&config.storage_path)?);
    let connectivity = Arc::new(SharedConnectivity::new(true));
    let ctx = SyncContext {
        storage,
        remote: remote.clone(),
        connectivity,
        clock: Arc::new(SystemClock),
        config: config.clone(),
    };
    let engine = SyncEngine::new(&ctx);

    // --- 4. Start the Presence Heartbeat ---
    let heartbeat = presence::start_presence_heartbeat(ctx.remote.clone(), config.user_id.clone());
    info!(user_id = %config.user_id, "Presence heartbeat started.");

    // --- 5. Reconcile on the Configured Interval ---
    let mut ticker = tokio::time::interval(config.sync_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = engine.reconciler.sync_offline_data().await;
                if report.success {
                    info!(message = %report.message, "reconciler run finished");
                } else {
                    warn!(message = %report.message, "reconciler run failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested.");
                break;
            }
        }
    }

    // --- 6. Tear Down ---
    heartbeat.stop().await;
    info!("Sync daemon stopped.");
    Ok(())
}
