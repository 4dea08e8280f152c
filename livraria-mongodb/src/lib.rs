//! MongoDB backend implementation for livraria.
//!
//! This crate provides a MongoDB-based implementation of the `CatalogBackend` trait. Catalog
//! queries are translated into MongoDB filter documents and executed by the server.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! livraria = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use livraria::{backend::CatalogBackendBuilder, catalog::Catalog, mongodb::MongoDbCatalog};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MongoDbCatalog::builder("mongodb://localhost:27017", "livraria")
//!         .build()
//!         .await?;
//!     let catalog = Catalog::new(backend);
//!     println!("{:?}", catalog.most_recent().await?);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as livraria_mongodb;

pub mod store;
pub(crate) mod query;

pub use store::{MongoDbCatalog, MongoDbCatalogBuilder};
