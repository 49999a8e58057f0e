use std::sync::Arc;

use anyhow::Context;
use robofleet_events::EventBus;
use robofleet_worker::{shutdown, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "robofleet_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = robofleet_db::create_pool(&database_url)
        .await
        .context("connecting to the database")?;
    robofleet_db::run_migrations(&pool)
        .await
        .context("running migrations")?;

    let config = WorkerConfig::from_env();
    tracing::info!(
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Worker starting"
    );

    // Nothing subscribes to this bus. Live clients are reached through the
    // API's embedded worker.
    let bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();
    let loops = robofleet_worker::spawn(pool.clone(), bus, config, cancel.clone());

    shutdown::signal().await;
    cancel.cancel();
    for handle in loops {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Worker loop panicked");
        }
    }

    pool.close().await;
    tracing::info!("Worker stopped");
    Ok(())
}
