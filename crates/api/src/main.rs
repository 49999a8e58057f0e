use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use robofleet_api::background::event_fanout;
use robofleet_api::config::ServerConfig;
use robofleet_api::router::build_app_router;
use robofleet_api::state::AppState;
use robofleet_api::ws::{self, WsManager};
use robofleet_db::DbPool;
use robofleet_events::EventBus;
use robofleet_worker::{shutdown, WorkerConfig};

const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const FANOUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "robofleet_api=debug,robofleet_worker=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        app_name = %config.app_name,
        port = config.port,
        embedded_worker = config.embedded_worker,
        "Configuration loaded"
    );

    let pool = open_database().await?;

    let ws_manager = Arc::new(WsManager::new());
    let heartbeat = ws::start_heartbeat(Arc::clone(&ws_manager));

    let event_bus = Arc::new(EventBus::default());
    let fanout = tokio::spawn(event_fanout::run(
        Arc::clone(&ws_manager),
        event_bus.subscribe(),
    ));

    let worker_cancel = CancellationToken::new();
    let worker_loops = if config.embedded_worker {
        tracing::info!("Starting embedded task worker");
        robofleet_worker::spawn(
            pool.clone(),
            Arc::clone(&event_bus),
            WorkerConfig::from_env(),
            worker_cancel.clone(),
        )
    } else {
        tracing::info!("Embedded task worker disabled");
        Vec::new()
    };

    let addr = SocketAddr::new(
        config.host.parse().context("HOST is not an IP address")?,
        config.port,
    );
    let app = build_app_router(
        AppState {
            pool,
            config: Arc::new(config.clone()),
            ws_manager: Arc::clone(&ws_manager),
            event_bus: Arc::clone(&event_bus),
        },
        &config,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Fleet API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped, draining background work");

    // Task runs in flight still publish, so the bus outlives the worker.
    worker_cancel.cancel();
    drain("task worker", worker_loops, WORKER_DRAIN_TIMEOUT).await;

    // Last sender gone: the fan-out loop sees the closed channel and returns.
    drop(event_bus);
    drain("event fan-out", vec![fanout], FANOUT_DRAIN_TIMEOUT).await;

    let open_streams = ws_manager.connection_count(None).await;
    tracing::info!(open_streams, "Closing WebSocket streams");
    ws_manager.shutdown_all().await;
    heartbeat.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Connect, verify, and migrate.
async fn open_database() -> anyhow::Result<DbPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = robofleet_db::create_pool(&url)
        .await
        .context("connecting to the database")?;
    robofleet_db::health_check(&pool)
        .await
        .context("database health check")?;
    robofleet_db::run_migrations(&pool)
        .await
        .context("running migrations")?;
    tracing::info!("Database ready");
    Ok(pool)
}

async fn drain(what: &str, handles: Vec<JoinHandle<()>>, limit: Duration) {
    for handle in handles {
        match tokio::time::timeout(limit, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, what, "Background task panicked"),
            Err(_) => tracing::warn!(what, "Background task did not stop in time"),
        }
    }
    tracing::info!(what, "Stopped");
}
