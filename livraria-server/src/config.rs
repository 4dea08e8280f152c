//! Server configuration from command-line flags and `LIVRARIA_*` environment variables.

use std::{net::SocketAddr, sync::Arc};

use clap::{Parser, ValueEnum};

use livraria::{
    backend::{CatalogBackend, CatalogBackendBuilder},
    memory::InMemoryCatalog,
};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Records live in process memory and are lost on exit.
    Memory,
    /// Records live in a MongoDB database. Requires the `mongodb` feature.
    Mongodb,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "livraria-server", about = "Bookstore catalog REST API")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LIVRARIA_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Storage backend
    #[arg(long, env = "LIVRARIA_BACKEND", value_enum, default_value_t = BackendKind::Memory)]
    pub backend: BackendKind,

    /// MongoDB connection string (mongodb backend only)
    #[arg(long, env = "LIVRARIA_MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name (mongodb backend only)
    #[arg(long, env = "LIVRARIA_DATABASE", default_value = "livraria")]
    pub database: String,

    /// MongoDB collection holding the books (mongodb backend only)
    #[arg(long, env = "LIVRARIA_COLLECTION", default_value = "livros")]
    pub collection: String,

    /// Do not load the sample catalog into an empty collection
    #[arg(long, env = "LIVRARIA_NO_SEED")]
    pub no_seed: bool,
}

impl Config {
    /// Builds the configured backend.
    pub async fn open_backend(&self) -> anyhow::Result<Arc<dyn CatalogBackend>> {
        let backend: Arc<dyn CatalogBackend> = match self.backend {
            BackendKind::Memory => Arc::new(InMemoryCatalog::builder().build().await?),
            #[cfg(feature = "mongodb")]
            BackendKind::Mongodb => Arc::new(
                livraria::mongodb::MongoDbCatalog::builder(&self.mongodb_uri, &self.database)
                    .collection(&self.collection)
                    .build()
                    .await?,
            ),
            #[cfg(not(feature = "mongodb"))]
            BackendKind::Mongodb => anyhow::bail!("built without the `mongodb` feature"),
        };

        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_port_3000_in_memory() {
        let config = Config::try_parse_from(["livraria-server"]).unwrap();

        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.collection, "livros");
        assert!(!config.no_seed);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "livraria-server",
            "--bind",
            "127.0.0.1:8080",
            "--database",
            "acervo",
            "--collection",
            "estante",
            "--no-seed",
        ])
        .unwrap();

        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.database, "acervo");
        assert_eq!(config.collection, "estante");
        assert!(config.no_seed);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Config::try_parse_from(["livraria-server", "--backend", "sqlite"]).is_err());
    }
}
