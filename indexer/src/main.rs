use anyhow::Context;
use std::time::Duration;

use ledup_indexer::application::reconciler::{Scheduler, StreamRegistry};
use ledup_indexer::config::AppConfig;
use ledup_indexer::infrastructure::ethereum::EthRpcClient;
use ledup_indexer::infrastructure::persistence::{DbPool, RepositoryFactory};
use ledup_indexer::infrastructure::web::{start_server, AppState};
use ledup_indexer::utils::logging;

/// How long an in-flight run may take to finish once shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logger();

    let config = AppConfig::from_env();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc = %logging::redact_url(&config.chain.rpc_url),
        streams = config.streams.len(),
        row_key = %config.indexer.event_row_key,
        "configuration loaded"
    );

    if config.streams.is_empty() {
        tracing::warn!("no contract address configured; only the read endpoints will be served");
    }

    let db_pool = DbPool::new(&config)
        .await
        .context("failed to connect to database")?;
    let repositories = RepositoryFactory::create_repositories(&db_pool);

    let client = EthRpcClient::new(&config.chain).context("failed to create RPC client")?;

    // Lease holder identity of this process
    let holder_id = uuid::Uuid::new_v4().to_string();
    let registry = StreamRegistry::from_config(&config, &repositories, &client, &holder_id)
        .context("failed to load contract ABI")?;

    let mut scheduler = Scheduler::from_config(&config.indexer);
    scheduler.start_all(&registry);

    let state = AppState { registry };
    let served = start_server(&config.server, state, shutdown_signal()).await;

    scheduler.shutdown(SHUTDOWN_GRACE).await;
    served.context("web server failed")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
