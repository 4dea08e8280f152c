//! HTTP front end for the livraria catalog.
//!
//! [`router`] builds the axum application over a [`SharedCatalog`]. [`run`] wires it to the
//! backend named in [`Config`], seeds the sample books when the store is empty, and serves
//! until Ctrl-C.

pub mod config;
pub mod error;
pub mod routes;

pub use config::{BackendKind, Config};
pub use error::{ApiError, ApiResult};
pub use routes::{SharedCatalog, router, shared_catalog};

use tokio::net::TcpListener;
use tracing::{info, warn};

pub async fn run(config: Config) -> anyhow::Result<()> {
    let catalog = shared_catalog(config.open_backend().await?);

    if !config.no_seed {
        let seeded = catalog.seed_if_empty().await?;
        if seeded > 0 {
            info!(count = seeded, "loaded sample catalog");
        }
    }

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, backend = ?config.backend, "listening");

    axum::serve(listener, router(catalog.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    catalog.shutdown().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C, shutting down");
    }
}
