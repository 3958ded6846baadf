use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use color_eyre::{
    eyre::{bail, WrapErr},
    Result,
};
use splitvault_coordinator::{routes, Coordinator, HttpBlobStore};
use splitvault_core::storage::HashedIndexStore;
use splitvault_crypto::AesGcmEngine;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{Config, StorageConfig};

/// Serve the coordinator, forwarding ciphertext to the configured storage service.
pub async fn run_coordinator(config: &Config) -> Result<()> {
    let endpoint = config.storage_endpoint();
    info!(
        storage = %endpoint.base_url,
        timeout_secs = endpoint.timeout.as_secs(),
        "coordinator forwarding to storage"
    );
    let coordinator = Coordinator::new(AesGcmEngine::new(), HttpBlobStore::new(endpoint));
    let app = routes::router(Arc::new(coordinator));
    serve(app, config.coordinator.listen_port, "coordinator").await
}

/// Serve the storage service over a fresh in-memory index.
pub async fn run_storage(config: &Config) -> Result<()> {
    let app = storage_app(&config.storage)?;
    serve(app, config.storage.port, "storage").await
}

fn storage_app(storage: &StorageConfig) -> Result<Router> {
    for path in [&storage.store_path, &storage.retrieve_path] {
        if !path.starts_with('/') {
            bail!("storage path {path:?} must start with '/'");
        }
    }
    if storage.store_path == storage.retrieve_path {
        bail!(
            "storage store and retrieve paths must differ (both are {:?})",
            storage.store_path
        );
    }
    if storage.salt.is_empty() {
        warn!("storage salt is empty; identifier hashes are unsalted");
    }
    let store = HashedIndexStore::new(storage.salt.clone());
    Ok(splitvault_storage::router_at(
        Arc::new(store),
        &storage.store_path,
        &storage.retrieve_path,
    ))
}

async fn serve(app: Router, port: u16, name: &'static str) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {name} on {addr}"))?;
    info!(service = name, %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(name))
        .await
        .wrap_err_with(|| format!("{name} server failed"))?;

    info!(service = name, "stopped");
    Ok(())
}

async fn shutdown_signal(name: &'static str) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(service = name, "shutdown requested"),
        Err(err) => {
            warn!(service = name, error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await
        }
    }
}
