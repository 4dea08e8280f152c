//! Main livraria crate providing the bookstore catalog over pluggable storage.
//!
//! This crate re-exports the core types and the available backends.
//!
//! # Quick Start
//!
//! ```ignore
//! use livraria::{prelude::*, memory::InMemoryCatalog};
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = Catalog::new(InMemoryCatalog::builder().build().await.unwrap());
//!     catalog.seed_if_empty().await.unwrap();
//!
//!     let created = catalog
//!         .create(NewBook {
//!             title: "Grande Sertão: Veredas".to_string(),
//!             author: "João Guimarães Rosa".to_string(),
//!             publisher: "Editora A".to_string(),
//!             year: 1956,
//!             quantity: 1,
//!             price: 59.9,
//!         })
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(catalog.most_recent().await.unwrap(), vec![created]);
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use livraria_core::{backend, book, catalog, engine, error, query, sample};

/// In-memory storage backend.
pub mod memory {
    pub use livraria_memory::{InMemoryCatalog, InMemoryCatalogBuilder};
}

/// MongoDB storage backend.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use livraria_mongodb::{MongoDbCatalog, MongoDbCatalogBuilder};
}
