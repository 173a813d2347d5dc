//! Standalone mode - every subsystem in one process.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use shardjob_core::ShardjobConfig;
use shardjob_lifecycle::HandlerRegistry;
use shardjob_scheduler::LocalCoordinator;
use shardjob_state::RecordStore;

pub async fn run(config: ShardjobConfig, restore: bool) -> anyhow::Result<()> {
    info!("shardjob daemon starting in standalone mode");

    // Ensure data directory exists.
    std::fs::create_dir_all(&config.server.data_dir)?;
    let db_path = config.server.data_dir.join("shardjob.redb");

    // ── Initialize subsystems ──────────────────────────────────

    let store = RecordStore::open(&db_path)?;
    info!(path = ?db_path, "record store opened");

    let coordinator = LocalCoordinator::new();
    info!("coordinator initialized");

    let registry = HandlerRegistry::from_config(&config, Arc::new(store), Arc::new(coordinator));
    info!(
        kinds = ?registry.kinds(),
        serialize_by_name = config.lifecycle.serialize_by_name,
        "lifecycle handlers initialized"
    );

    // A fresh coordinator knows nothing; bring READY records back up.
    if restore {
        let restored = registry.restore_all().await?;
        info!(restored, "READY jobs restored");
    }

    // ── Start API server ───────────────────────────────────────

    let router = shardjob_api::build_router(Arc::new(registry));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to install CTRL+C handler");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("shardjob daemon stopped");
    Ok(())
}
