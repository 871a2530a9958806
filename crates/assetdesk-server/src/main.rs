//! assetdesk server - main entry point

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use assetdesk_common::{
    logging::{init_logging, LogConfig},
    types::RoleCode,
};
use tokio::signal;
use tracing::info;

use assetdesk_server::{
    access::{AccessEvaluator, LabelThreshold},
    api,
    config::{Config, StorageBackend},
    db::{self, PgStore},
    features::FeatureState,
    models::Principal,
    store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("assetdesk-server")
        .filter_directives("assetdesk_server=debug,tower_http=debug,sqlx=info")
        .build();

    // Environment variables take precedence over the builder defaults
    let log_config = LogConfig::from_env_with(log_config)?;
    let _log_guard = init_logging(&log_config)?;

    info!("Starting assetdesk server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let state = build_state(&config).await?;
    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Wire the configured storage backend and access policy into the feature state
async fn build_state(config: &Config) -> Result<FeatureState> {
    let evaluator = match config.access.clearance_threshold {
        Some(threshold) => {
            info!(%threshold, "Security labels enforced for non-admins");
            AccessEvaluator::new(Arc::new(LabelThreshold::new(threshold)))
        },
        None => AccessEvaluator::default(),
    };
    let max_attempts = config.access.version_retry_attempts;

    match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            info!("Database connection pool established");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            info!("Database migrations completed");

            Ok(FeatureState::from_pg(PgStore::new(pool), evaluator, max_attempts))
        },
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on shutdown");
            let store = MemoryStore::new();
            if let Some(admin_id) = config.access.bootstrap_admin {
                store
                    .insert_principal(Principal::new(admin_id).with_role(RoleCode::Admin))
                    .await;
                info!(%admin_id, "Bootstrap admin registered");
            }
            Ok(FeatureState::from_memory(store, evaluator, max_attempts))
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
